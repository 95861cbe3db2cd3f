use static_assertions::const_assert;

use crate::{
    target_config::{mb, TargetConfig},
    targets::TargetInfo,
};

pub const SECTOR_SIZE_ATSAM4E: u32 = 8192;
pub const FLASH_START_ATSAM4E: u32 = 0x0040_0000;
pub const FLASH_END_ATSAM4E: u32 = 0x0050_0000;
pub const RAM_START_ATSAM4E: u32 = 0x2000_0000;
pub const RAM_END_ATSAM4E: u32 = 0x2002_0000;

/// Atmel ATSAM4E running the home gateway application
pub const ATSAM4E_HOME_GATEWAY: TargetConfig = TargetConfig {
    board_id: "5020",
    secret: "xxxxxxxx",
    sector_size: SECTOR_SIZE_ATSAM4E,
    sector_cnt: mb(1) / SECTOR_SIZE_ATSAM4E,
    flash_start: FLASH_START_ATSAM4E,
    flash_end: FLASH_END_ATSAM4E,
    ram_start: RAM_START_ATSAM4E,
    ram_end: RAM_END_ATSAM4E,
    disc_size: mb(1),
};

const_assert!(ATSAM4E_HOME_GATEWAY.is_consistent());

#[derive(Debug, Default, Clone)]
pub struct Atsam4eHomeGateway;

impl TargetInfo for Atsam4eHomeGateway {
    fn board_name(&self) -> &'static str {
        "atsam4e-home-gateway"
    }

    fn description(&self) -> &'static str {
        "Atmel ATSAM4E, home gateway application"
    }

    fn target_config(&self) -> &'static TargetConfig {
        &ATSAM4E_HOME_GATEWAY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sectors_cover_flash() {
        let cfg = &ATSAM4E_HOME_GATEWAY;
        assert_eq!(cfg.flash_end - cfg.flash_start, cfg.sector_cnt * cfg.sector_size);
        assert_eq!(cfg.sector_cnt, 128);
        assert_eq!(cfg.sector_size, 8192);
    }

    #[test]
    fn ranges_are_ordered() {
        let cfg = &ATSAM4E_HOME_GATEWAY;
        assert!(cfg.flash_start < cfg.flash_end);
        assert!(cfg.ram_start < cfg.ram_end);
        assert_eq!(cfg.ram_size(), 128 * 1024);
    }

    #[test]
    fn disc_is_one_mebibyte() {
        assert_eq!(ATSAM4E_HOME_GATEWAY.disc_size, 1024 * 1024);
    }

    #[test]
    fn board_id_matches_host_side_id() {
        assert!(!ATSAM4E_HOME_GATEWAY.board_id.is_empty());
        assert_eq!(ATSAM4E_HOME_GATEWAY.board_id, "5020");
    }

    #[test]
    fn ships_with_placeholder_secret() {
        assert_eq!(ATSAM4E_HOME_GATEWAY.secret, "xxxxxxxx");
        assert!(ATSAM4E_HOME_GATEWAY.has_placeholder_secret());
    }

    #[test]
    fn last_sector_ends_flash() {
        let cfg = &ATSAM4E_HOME_GATEWAY;
        let last = cfg.sector_address(cfg.sector_cnt - 1).unwrap();
        assert_eq!(last + cfg.sector_size, cfg.flash_end);
    }
}
