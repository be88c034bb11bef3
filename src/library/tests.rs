use super::display::{duration_text, entry_details, format_duration, format_size_kb};
use super::metadata::fixtures::{mp3_frames, mp3_seconds};
use super::*;
use crate::config::LibrarySettings;
use crate::error::ShelfError;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn format_duration_is_minutes_and_padded_seconds() {
    assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
    assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
    assert_eq!(format_duration(Duration::from_millis(3_599_900)), "59:59");
}

#[test]
fn format_size_kb_uses_binary_kilobytes() {
    assert_eq!(format_size_kb(500 * 1024), "500.00 KB");
    assert_eq!(format_size_kb(1536), "1.50 KB");
}

#[test]
fn entry_details_show_placeholder_for_unknown_duration() {
    let entry = FileEntry {
        name: "broken.mp3".into(),
        path: PathBuf::from("/x/broken.mp3"),
        size_bytes: Some(0),
        duration: DurationInfo::Unknown,
    };
    assert_eq!(duration_text(entry.duration, "--:--"), "--:--");
    assert_eq!(entry_details(&entry, "--:--"), "[--:--]  0.00 KB");
}

#[test]
fn upload_to_new_category_shows_up_everywhere() {
    let dir = tempdir().unwrap();
    let lib = Library::new(LibrarySettings {
        root: dir.path().join("audio_files"),
        ..LibrarySettings::default()
    });

    assert!(lib.list_categories().unwrap().is_empty());
    assert!(lib.list_files("Rock").unwrap().is_empty());

    // Roughly 500 KB of constant-bitrate audio.
    let frames = 500 * 1024 / 417;
    let clip = mp3_frames(frames);
    let path = lib.upload("Rock", "song1.mp3", &clip).unwrap();

    assert!(lib.list_categories().unwrap().contains(&"Rock".to_string()));
    assert!(lib.list_files("Rock").unwrap().contains(&"song1.mp3".to_string()));

    let meta = read_metadata(&path).unwrap();
    assert_eq!(meta.size_bytes, clip.len() as u64);
    assert!((meta.size_bytes as i64 - 500 * 1024).abs() < 417);
    assert!((meta.duration_seconds() - mp3_seconds(frames)).abs() < 0.5);
}

#[test]
fn zero_byte_upload_on_disk_still_lists() {
    let dir = tempdir().unwrap();
    let lib = Library::new(LibrarySettings {
        root: dir.path().to_path_buf(),
        ..LibrarySettings::default()
    });
    lib.ensure_category("Rock").unwrap();
    let path = lib.file_path("Rock", "empty.mp3").unwrap();
    fs::write(&path, b"").unwrap();

    assert!(matches!(
        read_metadata(&path),
        Err(ShelfError::Metadata { .. })
    ));

    let entries = lib.list_entries("Rock").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration, DurationInfo::Unknown);
}

#[test]
fn empty_category_only_exists_after_ensure_category() {
    let dir = tempdir().unwrap();
    let lib = Library::new(LibrarySettings {
        root: dir.path().to_path_buf(),
        ..LibrarySettings::default()
    });

    assert!(lib.upload("Pop", "bad.txt", b"x").is_err());
    assert!(lib.list_categories().unwrap().is_empty());

    lib.ensure_category("Pop").unwrap();
    assert_eq!(lib.list_categories().unwrap(), vec!["Pop".to_string()]);
    assert!(lib.list_entries("Pop").unwrap().is_empty());
}
