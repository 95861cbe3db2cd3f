//! Reads the board id from the files a DAPLink interface puts on its drive.

use crate::target_config::BOARD_ID_LEN;

pub const DETAILS_FILE: &str = "DETAILS.TXT";
pub const MBED_HTM_FILE: &str = "MBED.HTM";

fn board_id_prefix(unique_id: &str) -> Option<String> {
    let id = unique_id.trim().get(..BOARD_ID_LEN)?;
    if id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(id.to_ascii_uppercase())
    } else {
        None
    }
}

/// Board id from the `Unique ID:` or `Board ID:` line of DETAILS.TXT
pub fn board_id_from_details(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        match key.trim() {
            "Unique ID" | "Board ID" => board_id_prefix(value),
            _ => None,
        }
    })
}

/// Board id from the `code=` (or older `auth=`) parameter of the MBED.HTM
/// redirect
pub fn board_id_from_mbed_htm(text: &str) -> Option<String> {
    ["code=", "auth="].into_iter().find_map(|param| {
        let start = text.find(param)? + param.len();
        board_id_prefix(&text[start..])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAILS: &str = "# DAPLink Firmware - see https://mbed.com/daplink
Unique ID: 0240000032044e4500257009997b00386781000097969900
HIC ID: 97969900
Auto Reset: 0
Automation allowed: 0
Daplink Mode: Interface
Interface Version: 0244
";

    #[test]
    fn details_unique_id() {
        assert_eq!(board_id_from_details(DETAILS), Some("0240".to_string()));
    }

    #[test]
    fn details_board_id_line() {
        let text = "Version: 0226\r\nBoard ID: 5020\r\n";
        assert_eq!(board_id_from_details(text), Some("5020".to_string()));
    }

    #[test]
    fn details_without_id() {
        assert_eq!(board_id_from_details("HIC ID: 97969900\n"), None);
        assert_eq!(board_id_from_details("Unique ID: 02\n"), None);
        assert_eq!(board_id_from_details("Unique ID: zz40000\n"), None);
    }

    #[test]
    fn mbed_htm_redirect() {
        let htm = r#"<!-- mbed Microcontroller Website and Authentication Shortcut -->
<html>
<head>
<meta http-equiv="refresh" content="0; URL=http://mbed.org/device/?code=5020000032044e4500257009997b003867810000"/>
<title>mbed Website Shortcut</title>
</head>
</html>"#;
        assert_eq!(board_id_from_mbed_htm(htm), Some("5020".to_string()));
    }

    #[test]
    fn mbed_htm_auth_and_case() {
        let htm = "URL=http://mbed.org/start?auth=0240abcd&loader=1";
        assert_eq!(board_id_from_mbed_htm(htm), Some("0240".to_string()));

        let htm = "URL=http://mbed.org/device/?code=00aF0000";
        assert_eq!(board_id_from_mbed_htm(htm), Some("00AF".to_string()));

        assert_eq!(board_id_from_mbed_htm("<html></html>"), None);
    }
}
