use std::mem;

use static_assertions::const_assert;
use thiserror::Error;
use zerocopy::{little_endian::U32, FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::target_config::{TargetConfig, TargetConfigError, BOARD_ID_LEN, SECRET_MAX_LEN};

pub const TARGET_CFG_RECORD_SIZE: usize = 40;

/// Wire layout of a [`TargetConfig`], little endian, no padding
#[repr(C)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetCfgRecord {
    pub board_id: [u8; BOARD_ID_LEN],
    /// NUL padded
    pub secret: [u8; SECRET_MAX_LEN],
    pub sector_size: U32,
    pub sector_cnt: U32,
    pub flash_start: U32,
    pub flash_end: U32,
    pub ram_start: U32,
    pub ram_end: U32,
    pub disc_size: U32,
}

const_assert!(mem::size_of::<TargetCfgRecord>() == TARGET_CFG_RECORD_SIZE);

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Target config is invalid")]
    InvalidConfig(#[from] TargetConfigError),
    #[error("Secret must be one to eight ASCII bytes")]
    InvalidSecret,
    #[error("Record is {0} bytes, expected 40")]
    WrongSize(usize),
    #[error("Record {0} field is not ASCII")]
    NotAscii(&'static str),
}

/// A record read back from its wire form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTargetCfg {
    pub board_id: String,
    pub secret: String,
    pub sector_size: u32,
    pub sector_cnt: u32,
    pub flash_start: u32,
    pub flash_end: u32,
    pub ram_start: u32,
    pub ram_end: u32,
    pub disc_size: u32,
}

impl DecodedTargetCfg {
    /// Same board id and geometry as `cfg`; the secret is not compared
    pub fn describes(&self, cfg: &TargetConfig) -> bool {
        self.board_id.eq_ignore_ascii_case(cfg.board_id)
            && self.sector_size == cfg.sector_size
            && self.sector_cnt == cfg.sector_cnt
            && self.flash_start == cfg.flash_start
            && self.flash_end == cfg.flash_end
            && self.ram_start == cfg.ram_start
            && self.ram_end == cfg.ram_end
            && self.disc_size == cfg.disc_size
    }
}

impl TargetCfgRecord {
    /// Builds the record for `cfg`, with `secret` replacing the declared one
    /// when given.
    pub fn encode(cfg: &TargetConfig, secret: Option<&str>) -> Result<Self, RecordError> {
        cfg.validate()?;

        let secret = secret.unwrap_or(cfg.secret);
        if secret.is_empty()
            || secret.len() > SECRET_MAX_LEN
            || !secret.bytes().all(|b| b.is_ascii() && b != 0)
        {
            return Err(RecordError::InvalidSecret);
        }

        let mut board_id = [0; BOARD_ID_LEN];
        board_id.copy_from_slice(cfg.board_id.as_bytes());

        let mut secret_bytes = [0; SECRET_MAX_LEN];
        secret_bytes[..secret.len()].copy_from_slice(secret.as_bytes());

        Ok(Self {
            board_id,
            secret: secret_bytes,
            sector_size: U32::new(cfg.sector_size),
            sector_cnt: U32::new(cfg.sector_cnt),
            flash_start: U32::new(cfg.flash_start),
            flash_end: U32::new(cfg.flash_end),
            ram_start: U32::new(cfg.ram_start),
            ram_end: U32::new(cfg.ram_end),
            disc_size: U32::new(cfg.disc_size),
        })
    }

    pub fn to_bytes(&self) -> [u8; TARGET_CFG_RECORD_SIZE] {
        let mut out = [0; TARGET_CFG_RECORD_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<DecodedTargetCfg, RecordError> {
        let record =
            Self::read_from_bytes(bytes).map_err(|_| RecordError::WrongSize(bytes.len()))?;

        Ok(DecodedTargetCfg {
            board_id: ascii_field(&record.board_id, "board_id")?,
            secret: ascii_field(&record.secret, "secret")?,
            sector_size: record.sector_size.get(),
            sector_cnt: record.sector_cnt.get(),
            flash_start: record.flash_start.get(),
            flash_end: record.flash_end.get(),
            ram_start: record.ram_start.get(),
            ram_end: record.ram_end.get(),
            disc_size: record.disc_size.get(),
        })
    }
}

fn ascii_field(raw: &[u8], name: &'static str) -> Result<String, RecordError> {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = &raw[..len];
    if !text.is_ascii() {
        return Err(RecordError::NotAscii(name));
    }
    Ok(text.iter().map(|&b| b as char).collect())
}
