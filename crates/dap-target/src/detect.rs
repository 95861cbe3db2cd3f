use std::{error::Error, fs, path::Path};

use dap_target_core::{
    detect::{board_id_from_details, board_id_from_mbed_htm, DETAILS_FILE, MBED_HTM_FILE},
    TargetIter,
};
use log::{debug, info};
use sysinfo::Disks;

fn read_board_id(mount: &Path) -> Option<String> {
    let details = mount.join(DETAILS_FILE);
    if details.is_file() {
        if let Some(id) = fs::read_to_string(&details)
            .ok()
            .and_then(|text| board_id_from_details(&text))
        {
            return Some(id);
        }
    }

    let htm = mount.join(MBED_HTM_FILE);
    if htm.is_file() {
        return fs::read_to_string(&htm)
            .ok()
            .and_then(|text| board_id_from_mbed_htm(&text));
    }

    None
}

pub fn detect() -> Result<(), Box<dyn Error>> {
    let disks = Disks::new_with_refreshed_list();

    let mut found = 0;
    for disk in disks.list() {
        let mount = disk.mount_point();

        let board_id = match read_board_id(mount) {
            Some(board_id) => board_id,
            None => continue,
        };

        info!("Found DAPLink drive {}", &mount.to_string_lossy());
        found += 1;

        match TargetIter::find_by_board_id(&board_id) {
            Some(target) => {
                debug!(
                    "Drive reports {} bytes, record disc size is {}",
                    disk.total_space(),
                    target.target_config().disc_size
                );
                println!(
                    "{}  {}  {}",
                    mount.display(),
                    board_id,
                    target.board_name()
                );
            }
            None => println!("{}  {}  unknown target", mount.display(), board_id),
        }
    }

    if found == 0 {
        return Err("Unable to find a mounted DAPLink drive".into());
    }

    Ok(())
}
