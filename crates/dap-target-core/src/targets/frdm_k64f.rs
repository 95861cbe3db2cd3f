// Based off the MK64FN1M0VLL12 memory map: 1 MiB flash in 4 KiB sectors,
// 64 KiB SRAM_L below 0x20000000 and 192 KiB SRAM_U above it.

use static_assertions::const_assert;

use crate::{
    memory_map::{MemoryMap, MemoryRegion},
    target_config::{kb, mb, TargetConfig},
    targets::TargetInfo,
};

pub const SECTOR_SIZE_K64F: u32 = kb(4);
pub const FLASH_START_K64F: u32 = 0x0000_0000;
pub const FLASH_END_K64F: u32 = 0x0010_0000;
pub const SRAM_L_START_K64F: u32 = 0x1fff_0000;
pub const SRAM_U_START_K64F: u32 = 0x2000_0000;
pub const SRAM_U_END_K64F: u32 = 0x2003_0000;

pub const FRDM_K64F: TargetConfig = TargetConfig {
    board_id: "0240",
    secret: "xxxxxxxx",
    sector_size: SECTOR_SIZE_K64F,
    sector_cnt: mb(1) / SECTOR_SIZE_K64F,
    flash_start: FLASH_START_K64F,
    flash_end: FLASH_END_K64F,
    ram_start: SRAM_L_START_K64F,
    ram_end: SRAM_U_END_K64F,
    disc_size: mb(1),
};

const_assert!(FRDM_K64F.is_consistent());

#[derive(Debug, Default, Clone)]
pub struct FrdmK64f;

impl TargetInfo for FrdmK64f {
    fn board_name(&self) -> &'static str {
        "frdm-k64f"
    }

    fn description(&self) -> &'static str {
        "NXP FRDM-K64F (MK64FN1M0VLL12)"
    }

    fn target_config(&self) -> &'static TargetConfig {
        &FRDM_K64F
    }

    fn memory_map(&self) -> MemoryMap {
        MemoryMap {
            regions: vec![
                MemoryRegion::flash(FLASH_START_K64F, FLASH_END_K64F, SECTOR_SIZE_K64F),
                MemoryRegion::ram(SRAM_L_START_K64F, SRAM_U_START_K64F),
                MemoryRegion::ram(SRAM_U_START_K64F, SRAM_U_END_K64F),
            ],
        }
    }
}
