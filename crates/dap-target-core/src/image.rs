use std::{
    collections::BTreeSet,
    io::{Read, Seek},
};

use ::elf::{endian::AnyEndian, ElfStream, ParseError};
use log::*;
use thiserror::Error;

use crate::{
    address_range::{address_ranges_from_elf, AddressRangeError, AddressRangeType, AddressRangesExt},
    target_config::{Region, TargetConfig},
};

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to open elf file")]
    FailedToOpenElfFile(#[source] ParseError),
    #[error("The input file has no loadable segments")]
    NoLoadableSegments,
    #[error(transparent)]
    InvalidRange(#[from] AddressRangeError),
    #[error("Segment at {0:#010x} of {1:#x} bytes wraps past the end of the address space")]
    AddressOverflow(u64, u64),
}

/// Where an image lands on a target
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageReport {
    pub entry: u64,
    pub flash_bytes: u64,
    pub ram_bytes: u64,
    /// Flash sectors the flash algorithm has to erase
    pub sectors: BTreeSet<u32>,
}

impl ImageReport {
    pub fn is_ram_image(&self) -> bool {
        self.flash_bytes == 0
    }
}

/// Checks that every loadable segment of the ELF image in `input` fits `cfg`.
///
/// Initialized contents may go to flash or RAM, uninitialized (BSS) spans only
/// to RAM.
pub fn check_image(
    input: impl Read + Seek,
    cfg: &TargetConfig,
) -> Result<ImageReport, ImageError> {
    let elf = ElfStream::<AnyEndian, _>::open_stream(input)
        .map_err(ImageError::FailedToOpenElfFile)?;

    let image_ranges = address_ranges_from_elf(&elf).map_err(|err| match err {
        AddressRangeError::AddressOverflow(start, size) => ImageError::AddressOverflow(start, size),
        err => ImageError::InvalidRange(err),
    })?;
    if image_ranges.is_empty() {
        return Err(ImageError::NoLoadableSegments);
    }

    let target_ranges = cfg.address_ranges();
    let ram_only = [target_ranges[1]];

    let mut report = ImageReport {
        entry: elf.ehdr.e_entry,
        ..Default::default()
    };

    for range in &image_ranges {
        let uninitialized = range.typ == AddressRangeType::NoContents;
        let allowed = if uninitialized {
            &ram_only[..]
        } else {
            &target_ranges[..]
        };
        let target_range = allowed.check_address_range(range.from, range.len(), uninitialized)?;

        if uninitialized {
            continue;
        }

        // Inside a target range, so both ends fit in 32 bits
        let from = range.from as u32;
        let to = range.to as u32;

        match cfg.region_of(target_range.from as u32) {
            Some(Region::Flash) => {
                report.flash_bytes += range.len();
                if let Some(sectors) = cfg.sectors_spanning(from, to) {
                    debug!(
                        "{:#010x}->{:#010x} touches sectors {}..={}",
                        from,
                        to,
                        sectors.start(),
                        sectors.end()
                    );
                    report.sectors.extend(sectors);
                }
            }
            Some(Region::Ram) => report.ram_bytes += range.len(),
            None => {}
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::atsam4e::ATSAM4E_HOME_GATEWAY;
    use std::io::Cursor;

    const PT_LOAD: u32 = 1;

    /// (paddr, filesz, memsz) per loadable segment
    fn elf32(entry: u32, segments: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 1, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        out.extend_from_slice(&40u16.to_le_bytes()); // EM_ARM
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&entry.to_le_bytes());
        let phoff: u32 = if segments.is_empty() { 0 } else { 52 };
        out.extend_from_slice(&phoff.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        out.extend_from_slice(&52u16.to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&(segments.len() as u16).to_le_bytes());
        out.extend_from_slice(&40u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
        assert_eq!(out.len(), 52);

        for &(paddr, filesz, memsz) in segments {
            for word in [PT_LOAD, 0, paddr, paddr, filesz, memsz, 0x5, 4] {
                out.extend_from_slice(&word.to_le_bytes());
            }
        }
        out
    }

    /// One loadable ELF64 segment at `paddr`
    fn elf64(paddr: u64, filesz: u64, memsz: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
        out.extend_from_slice(&[0; 8]);
        out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
        out.extend_from_slice(&183u16.to_le_bytes()); // EM_AARCH64
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&paddr.to_le_bytes()); // e_entry
        out.extend_from_slice(&64u64.to_le_bytes()); // e_phoff
        out.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
        out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
        out.extend_from_slice(&64u16.to_le_bytes());
        out.extend_from_slice(&56u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&64u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
        out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
        assert_eq!(out.len(), 64);

        out.extend_from_slice(&PT_LOAD.to_le_bytes());
        out.extend_from_slice(&0x5u32.to_le_bytes()); // p_flags
        for word in [0, paddr, paddr, filesz, memsz, 4] {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }

    #[test]
    fn flash_image() {
        let elf = elf32(
            0x0040_0101,
            &[
                (0x0040_0000, 0x3000, 0x3000),
                (0x0040_3000, 0x100, 0x100),
                (0x2000_0000, 0, 0x800),
            ],
        );
        let report = check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY).unwrap();

        assert_eq!(report.entry, 0x0040_0101);
        assert_eq!(report.flash_bytes, 0x3100);
        assert_eq!(report.ram_bytes, 0);
        assert_eq!(report.sectors.into_iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn ram_image() {
        let elf = elf32(0x2000_0001, &[(0x2000_0000, 0x200, 0x400)]);
        let report = check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY).unwrap();

        assert!(report.is_ram_image());
        assert_eq!(report.ram_bytes, 0x200);
        assert!(report.sectors.is_empty());
    }

    #[test]
    fn uninitialized_flash_is_rejected() {
        let elf = elf32(0x0040_0001, &[(0x0040_0000, 0x100, 0x200)]);
        assert!(matches!(
            check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::InvalidRange(
                AddressRangeError::SegmentInvalidForDevice(0x0040_0100, 0x0040_0200)
            ))
        ));
    }

    #[test]
    fn segment_past_flash_end_is_rejected() {
        let elf = elf32(0x004f_f001, &[(0x004f_f000, 0x2000, 0x2000)]);
        assert!(matches!(
            check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::InvalidRange(
                AddressRangeError::SegmentInvalidForDevice(0x004f_f000, 0x0050_1000)
            ))
        ));
    }

    #[test]
    fn segment_wrapping_address_space_is_rejected() {
        let elf = elf64(u64::MAX - 0x10, 0, 0x100);
        assert!(matches!(
            check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::AddressOverflow(start, 0x100)) if start == u64::MAX - 0x10
        ));
    }

    #[test]
    fn segment_above_four_gib_is_rejected() {
        let elf = elf64(0x1_0040_0000, 0x100, 0x100);
        assert!(matches!(
            check_image(Cursor::new(elf), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::InvalidRange(
                AddressRangeError::SegmentInvalidForDevice(0x1_0040_0000, 0x1_0040_0100)
            ))
        ));
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(matches!(
            check_image(Cursor::new(elf32(0, &[])), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::NoLoadableSegments)
        ));
        assert!(matches!(
            check_image(Cursor::new(vec![0u8; 64]), &ATSAM4E_HOME_GATEWAY),
            Err(ImageError::FailedToOpenElfFile(_))
        ));
    }
}
