use std::io::{self, BufRead};

/// Reads a newline-delimited list: one entry per line, trimmed, skipping
/// blank lines and `#` comments.
pub fn read_list<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }
        entries.push(entry.to_string());
    }
    Ok(entries)
}
