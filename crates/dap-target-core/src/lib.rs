//! Target descriptors for CMSIS-DAP interface firmware.
//!
//! Each supported target is one constant [`TargetConfig`] describing its flash
//! and RAM geometry. The rest of this crate answers questions about those
//! records: which sector an address lives in, whether an image fits, what the
//! firmware-side wire form looks like, and which target a mounted DAPLink drive
//! belongs to.

pub mod address_range;
pub mod detect;
pub mod image;
pub mod memory_map;
pub mod record;
pub mod target_config;
pub mod targets;

pub use image::{check_image, ImageError, ImageReport};
pub use record::{DecodedTargetCfg, RecordError, TargetCfgRecord, TARGET_CFG_RECORD_SIZE};
pub use target_config::{
    kb, mb, Region, TargetConfig, TargetConfigError, BOARD_ID_LEN, SECRET_MAX_LEN,
};
pub use targets::{TargetInfo, TargetIter};
