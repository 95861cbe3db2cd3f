use std::{fmt, ops::RangeInclusive};

use thiserror::Error;

use crate::address_range::{AddressRange, AddressRangeType};

/// Length of a DAPLink board ID, the first characters of its unique ID
pub const BOARD_ID_LEN: usize = 4;

/// Longest secret the firmware record has room for
pub const SECRET_MAX_LEN: usize = 8;

pub const fn kb(n: u32) -> u32 {
    n * 1024
}

pub const fn mb(n: u32) -> u32 {
    n * 1024 * 1024
}

/// Flash and RAM geometry of one target, as consumed by the interface firmware.
///
/// Every declared record is a `const` and never changes after the build. Flash
/// is described as `sector_cnt` sectors of `sector_size` bytes: sectors are
/// assumed to be the same size, and a flash algorithm ignores requests when a
/// part has variable sized sectors. Both address ranges are end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetConfig {
    pub board_id: &'static str,
    pub secret: &'static str,
    pub sector_size: u32,
    pub sector_cnt: u32,
    pub flash_start: u32,
    pub flash_end: u32,
    pub ram_start: u32,
    pub ram_end: u32,
    pub disc_size: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Region {
    Flash,
    Ram,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Flash => f.write_str("flash"),
            Region::Ram => f.write_str("ram"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetConfigError {
    #[error("Board id {0:?} is not four hex digits")]
    InvalidBoardId(&'static str),
    #[error("Secret must be at most eight ASCII bytes")]
    InvalidSecret,
    #[error("Flash range {0:#010x}..{1:#010x} is empty")]
    EmptyFlash(u32, u32),
    #[error("RAM range {0:#010x}..{1:#010x} is empty")]
    EmptyRam(u32, u32),
    #[error("Sector size {0} is not a power of two")]
    InvalidSectorSize(u32),
    #[error("{sector_cnt} sectors of {sector_size} bytes do not cover {flash_size} bytes of flash")]
    SectorCountMismatch {
        sector_cnt: u32,
        sector_size: u32,
        flash_size: u32,
    },
    #[error("Flash start {0:#010x} is not aligned to the sector size {1:#x}")]
    UnalignedFlash(u32, u32),
    #[error("Flash and RAM ranges overlap")]
    OverlappingRanges,
    #[error("Disc size is zero")]
    EmptyDisc,
}

impl TargetConfig {
    pub const fn flash_size(&self) -> u32 {
        self.flash_end.saturating_sub(self.flash_start)
    }

    pub const fn ram_size(&self) -> u32 {
        self.ram_end.saturating_sub(self.ram_start)
    }

    /// Checks every invariant of the record, reporting the first one violated.
    ///
    /// This is a `const fn` so declared records can be checked at build time
    /// through [`TargetConfig::is_consistent`].
    pub const fn validate(&self) -> Result<(), TargetConfigError> {
        let id = self.board_id.as_bytes();
        if id.len() != BOARD_ID_LEN {
            return Err(TargetConfigError::InvalidBoardId(self.board_id));
        }
        let mut i = 0;
        while i < id.len() {
            if !id[i].is_ascii_hexdigit() {
                return Err(TargetConfigError::InvalidBoardId(self.board_id));
            }
            i += 1;
        }

        let secret = self.secret.as_bytes();
        if secret.len() > SECRET_MAX_LEN {
            return Err(TargetConfigError::InvalidSecret);
        }
        let mut i = 0;
        while i < secret.len() {
            if !secret[i].is_ascii() || secret[i] == 0 {
                return Err(TargetConfigError::InvalidSecret);
            }
            i += 1;
        }

        if self.flash_end <= self.flash_start {
            return Err(TargetConfigError::EmptyFlash(
                self.flash_start,
                self.flash_end,
            ));
        }
        if self.ram_end <= self.ram_start {
            return Err(TargetConfigError::EmptyRam(self.ram_start, self.ram_end));
        }
        if !self.sector_size.is_power_of_two() {
            return Err(TargetConfigError::InvalidSectorSize(self.sector_size));
        }
        if self.sector_cnt as u64 * self.sector_size as u64 != self.flash_size() as u64 {
            return Err(TargetConfigError::SectorCountMismatch {
                sector_cnt: self.sector_cnt,
                sector_size: self.sector_size,
                flash_size: self.flash_size(),
            });
        }
        if self.flash_start % self.sector_size != 0 {
            return Err(TargetConfigError::UnalignedFlash(
                self.flash_start,
                self.sector_size,
            ));
        }
        if self.flash_start < self.ram_end && self.ram_start < self.flash_end {
            return Err(TargetConfigError::OverlappingRanges);
        }
        if self.disc_size == 0 {
            return Err(TargetConfigError::EmptyDisc);
        }

        Ok(())
    }

    pub const fn is_consistent(&self) -> bool {
        self.validate().is_ok()
    }

    pub const fn contains_flash(&self, addr: u32) -> bool {
        addr >= self.flash_start && addr < self.flash_end
    }

    pub const fn contains_ram(&self, addr: u32) -> bool {
        addr >= self.ram_start && addr < self.ram_end
    }

    pub const fn region_of(&self, addr: u32) -> Option<Region> {
        if self.contains_flash(addr) {
            Some(Region::Flash)
        } else if self.contains_ram(addr) {
            Some(Region::Ram)
        } else {
            None
        }
    }

    /// Index of the flash sector holding `addr`
    pub const fn sector_of(&self, addr: u32) -> Option<u32> {
        if !self.contains_flash(addr) || self.sector_size == 0 {
            return None;
        }
        Some((addr - self.flash_start) / self.sector_size)
    }

    /// First address of sector `index`
    pub const fn sector_address(&self, index: u32) -> Option<u32> {
        if index >= self.sector_cnt {
            return None;
        }
        match index.checked_mul(self.sector_size) {
            Some(offset) => self.flash_start.checked_add(offset),
            None => None,
        }
    }

    /// Sectors touched by the flash range `from..to`.
    ///
    /// Returns `None` for an empty range or one that leaves flash.
    pub fn sectors_spanning(&self, from: u32, to: u32) -> Option<RangeInclusive<u32>> {
        if to <= from {
            return None;
        }
        let first = self.sector_of(from)?;
        let last = self.sector_of(to - 1)?;
        Some(first..=last)
    }

    /// The secret has not been provisioned yet
    pub fn has_placeholder_secret(&self) -> bool {
        self.secret.is_empty() || self.secret.bytes().all(|b| b == b'x')
    }

    /// Flash and RAM as ranges that may both hold image contents
    pub fn address_ranges(&self) -> [AddressRange; 2] {
        [
            AddressRange::new(
                self.flash_start as u64,
                self.flash_end as u64,
                AddressRangeType::Contents,
            ),
            AddressRange::new(
                self.ram_start as u64,
                self.ram_end as u64,
                AddressRangeType::Contents,
            ),
        ]
    }
}
