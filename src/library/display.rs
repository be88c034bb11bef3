use std::time::Duration;

use super::model::{DurationInfo, FileEntry};

/// Format a `Duration` as `M:SS`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format a byte count in kilobytes (1 KB = 1024 bytes) with two decimals.
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Duration text for a listing row, `placeholder` when it could not be read.
pub fn duration_text(duration: DurationInfo, placeholder: &str) -> String {
    match duration {
        DurationInfo::Known(d) => format_duration(d),
        DurationInfo::Unknown => placeholder.to_string(),
    }
}

/// Duration and size columns of a file pane row.
pub fn entry_details(entry: &FileEntry, placeholder: &str) -> String {
    let size = entry
        .size_bytes
        .map(format_size_kb)
        .unwrap_or_else(|| "?".to_string());
    format!("[{}]  {}", duration_text(entry.duration, placeholder), size)
}
