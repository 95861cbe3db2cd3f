use std::{error::Error, fs::File, io::BufReader, path::Path};

use dap_target_core::{check_image, TargetInfo, TargetIter};
use log::{debug, error, info};

pub fn list() {
    for target in TargetIter::new() {
        let cfg = target.target_config();
        println!(
            "{:<24} {}  flash {:#010x}..{:#010x}  ram {:#010x}..{:#010x}",
            target.board_name(),
            cfg.board_id,
            cfg.flash_start,
            cfg.flash_end,
            cfg.ram_start,
            cfg.ram_end
        );
    }
}

pub fn show(target: &dyn TargetInfo) {
    let cfg = target.target_config();

    println!("{} ({})", target.board_name(), target.description());
    println!("board_id    = {}", cfg.board_id);
    println!(
        "secret      = {}",
        if cfg.has_placeholder_secret() {
            "<placeholder>"
        } else {
            "<set>"
        }
    );
    println!("sector_size = {}", cfg.sector_size);
    println!("sector_cnt  = {}", cfg.sector_cnt);
    println!("flash_start = {:#010x}", cfg.flash_start);
    println!("flash_end   = {:#010x}", cfg.flash_end);
    println!("ram_start   = {:#010x}", cfg.ram_start);
    println!("ram_end     = {:#010x}", cfg.ram_end);
    println!("disc_size   = {}", cfg.disc_size);
    println!(
        "flash {} KiB, ram {} KiB",
        cfg.flash_size() / 1024,
        cfg.ram_size() / 1024
    );
}

pub fn check() -> Result<(), Box<dyn Error>> {
    let mut invalid = 0;

    for target in TargetIter::new() {
        match target.target_config().validate() {
            Ok(()) => info!("{}: ok", target.board_name()),
            Err(err) => {
                error!("{}: {}", target.board_name(), err);
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        return Err(format!("{} target record(s) are invalid", invalid).into());
    }
    Ok(())
}

pub fn memory_map(target: &dyn TargetInfo) {
    print!("{}", target.memory_map().to_gdb_xml());
}

pub fn image<P: AsRef<Path>>(input_path: &P, target: &dyn TargetInfo) -> Result<(), Box<dyn Error>> {
    let cfg = target.target_config();
    let input = BufReader::new(File::open(input_path.as_ref())?);

    info!("Checking image against {}", target.board_name());

    let report = check_image(input, cfg)?;

    debug!("Entry point {:#010x}", report.entry);
    if report.is_ram_image() {
        println!("RAM image, {} bytes", report.ram_bytes);
    } else {
        println!(
            "{} bytes of flash in {} of {} sectors, {} bytes of RAM",
            report.flash_bytes,
            report.sectors.len(),
            cfg.sector_cnt,
            report.ram_bytes
        );
        for sector in &report.sectors {
            if let Some(addr) = cfg.sector_address(*sector) {
                debug!("Erase sector {} at {:#010x}", sector, addr);
            }
        }
    }

    Ok(())
}
