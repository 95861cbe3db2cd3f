use std::{
    error::Error,
    fs::{self, File},
    io::Write,
    path::Path,
};

use dap_target_core::{DecodedTargetCfg, TargetCfgRecord, TargetInfo, TargetIter};
use log::{info, warn};

pub fn export<P: AsRef<Path>>(
    output_path: &P,
    target: &dyn TargetInfo,
    secret: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let cfg = target.target_config();
    let output_path = output_path.as_ref();

    if secret.is_none() && cfg.has_placeholder_secret() {
        warn!(
            "{} still carries the placeholder secret, pass --secret to provision one",
            target.board_name()
        );
    }

    let record = TargetCfgRecord::encode(cfg, secret)?;

    info!(
        "Writing record for {} (board id {}) to {}",
        target.board_name(),
        cfg.board_id,
        output_path.display()
    );

    let output = File::create(output_path)?;
    write_or_remove(output, output_path, &record.to_bytes())
}

/// Writes `bytes`, deleting `output_path` if the write fails part way
fn write_or_remove<W: Write>(
    mut output: W,
    output_path: &Path,
    bytes: &[u8],
) -> Result<(), Box<dyn Error>> {
    let result = output.write_all(bytes).and_then(|_| output.flush());

    if let Err(err) = result {
        drop(output);
        fs::remove_file(output_path)?;
        return Err(Box::new(err));
    }

    Ok(())
}

/// The declared target with the board id and geometry of `decoded`
fn matching_target(decoded: &DecodedTargetCfg) -> Option<Box<dyn TargetInfo>> {
    TargetIter::find_by_board_id(&decoded.board_id)
        .filter(|target| decoded.describes(target.target_config()))
}

pub fn inspect<P: AsRef<Path>>(input_path: &P) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(input_path.as_ref())?;
    let decoded = TargetCfgRecord::decode(&bytes)?;

    println!("board_id    = {}", decoded.board_id);
    println!("sector_size = {}", decoded.sector_size);
    println!("sector_cnt  = {}", decoded.sector_cnt);
    println!("flash_start = {:#010x}", decoded.flash_start);
    println!("flash_end   = {:#010x}", decoded.flash_end);
    println!("ram_start   = {:#010x}", decoded.ram_start);
    println!("ram_end     = {:#010x}", decoded.ram_end);
    println!("disc_size   = {}", decoded.disc_size);

    match matching_target(&decoded) {
        Some(target) => info!("Record matches {}", target.board_name()),
        None => warn!(
            "No known target has board id {} with this geometry",
            decoded.board_id
        ),
    }

    Ok(())
}
