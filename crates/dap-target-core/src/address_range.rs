use std::io::{Read, Seek};

use elf::{abi::PT_LOAD, endian::EndianParse, ElfStream};
use log::debug;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddressRangeType {
    /// May have contents
    Contents,
    /// Must be uninitialized
    NoContents,
    /// will be ignored
    Ignore,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AddressRange {
    pub typ: AddressRangeType,
    pub to: u64,
    pub from: u64,
}

impl AddressRange {
    pub const fn new(from: u64, to: u64, typ: AddressRangeType) -> Self {
        Self { typ, to, from }
    }

    pub const fn len(&self) -> u64 {
        self.to.saturating_sub(self.from)
    }

    pub const fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    pub const fn contains(&self, addr: u64) -> bool {
        self.from <= addr && self.to > addr
    }
}

impl Default for AddressRange {
    fn default() -> Self {
        Self {
            typ: AddressRangeType::Ignore,
            to: 0,
            from: 0,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRangeError {
    #[error("Image contains memory contents for uninitialized memory at {0:#010x}")]
    ContentsForUninitializedMemory(u64),
    #[error("Memory segment {0:#010x}->{1:#010x} is outside of valid address range for target")]
    SegmentInvalidForDevice(u64, u64),
    #[error("Memory segment at {0:#010x} of {1:#x} bytes wraps past the end of the address space")]
    AddressOverflow(u64, u64),
}

/// Splits the loadable segments of an ELF file into initialized and
/// uninitialized (BSS) ranges, by physical address.
pub fn address_ranges_from_elf<E: EndianParse, S: Read + Seek>(
    file: &ElfStream<E, S>,
) -> Result<Vec<AddressRange>, AddressRangeError> {
    let mut ranges = Vec::new();

    for seg in file.segments() {
        if seg.p_type != PT_LOAD || seg.p_memsz == 0 {
            continue;
        }

        let start = seg.p_paddr;
        let end = start
            .checked_add(seg.p_memsz)
            .ok_or(AddressRangeError::AddressOverflow(start, seg.p_memsz))?;
        // filesz <= memsz, so start + filesz <= end
        let filesz = seg.p_filesz.min(seg.p_memsz);

        if filesz > 0 {
            ranges.push(AddressRange::new(
                start,
                start + filesz,
                AddressRangeType::Contents,
            ));
        }

        if seg.p_memsz > filesz {
            ranges.push(AddressRange::new(
                start + filesz,
                end,
                AddressRangeType::NoContents,
            ));
        }
    }

    Ok(ranges)
}

pub trait AddressRangesExt<'a>: IntoIterator<Item = &'a AddressRange> + Clone {
    fn range_for(&self, addr: u64) -> Option<&'a AddressRange> {
        self.clone().into_iter().find(|r| r.contains(addr))
    }

    fn is_address_initialized(&self, addr: u64) -> bool {
        let range = if let Some(range) = self.range_for(addr) {
            range
        } else {
            return false;
        };

        matches!(range.typ, AddressRangeType::Contents)
    }

    /// Finds the range holding all of `addr..addr + size`.
    ///
    /// `uninitialized` marks a BSS span, which is allowed in any range that is
    /// not ignored; contents are only allowed in `Contents` ranges.
    fn check_address_range(
        &self,
        addr: u64,
        size: u64,
        uninitialized: bool,
    ) -> Result<AddressRange, AddressRangeError> {
        let end = addr
            .checked_add(size)
            .ok_or(AddressRangeError::AddressOverflow(addr, size))?;

        for range in self.clone().into_iter() {
            if range.typ == AddressRangeType::Ignore {
                continue;
            }
            if range.from <= addr && range.to >= end {
                if range.typ == AddressRangeType::NoContents && !uninitialized {
                    return Err(AddressRangeError::ContentsForUninitializedMemory(addr));
                }
                debug!(
                    "{} range {:#010x}->{:#010x}",
                    if uninitialized {
                        "Uninitialized"
                    } else {
                        "Mapped"
                    },
                    addr,
                    end,
                );
                return Ok(*range);
            }
        }
        Err(AddressRangeError::SegmentInvalidForDevice(addr, end))
    }
}

impl<'a, T> AddressRangesExt<'a> for T where T: IntoIterator<Item = &'a AddressRange> + Clone {}
