use std::fs;
use std::path::Path;

use crate::model::RawApplication;

/// Reads one `.desktop` descriptor; the file path becomes the application id.
pub fn read_desktop_entry(path: &Path) -> Result<RawApplication, std::io::Error> {
    let bytes = fs::read(path)?;
    let contents = String::from_utf8_lossy(&bytes);
    Ok(parse_desktop_entry(
        path.to_string_lossy().as_ref(),
        &contents,
    ))
}

/// First occurrence of each recognised key wins. Everything else is ignored.
pub fn parse_desktop_entry(id: &str, contents: &str) -> RawApplication {
    let mut raw = RawApplication {
        id: id.to_string(),
        ..Default::default()
    };

    for line in contents.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(value) = line.strip_prefix("Name=") {
            fill_once(&mut raw.name, value);
        } else if let Some(value) = line.strip_prefix("GenericName=") {
            fill_once(&mut raw.generic_name, value);
        } else if let Some(value) = line.strip_prefix("Comment=") {
            fill_once(&mut raw.comment, value);
        } else if let Some(value) = line.strip_prefix("Exec=") {
            fill_once(&mut raw.launch_command, value);
        } else if let Some(value) = line.strip_prefix("Keywords=") {
            fill_once(&mut raw.raw_keywords, value);
        }
    }

    raw
}

fn fill_once(slot: &mut String, value: &str) {
    if slot.is_empty() {
        *slot = value.to_string();
    }
}
