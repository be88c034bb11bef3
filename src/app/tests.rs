use super::*;
use crate::config::LibrarySettings;
use crate::library::{FileEntry, Library};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

fn library_at(root: &Path) -> Library {
    Library::new(LibrarySettings {
        root: root.join("shelf"),
        download_dir: root.join("downloads"),
        ..LibrarySettings::default()
    })
}

fn app_with_files(files: &[(&str, &str)]) -> (TempDir, App) {
    let dir = tempdir().unwrap();
    let lib = library_at(dir.path());
    for (category, name) in files {
        lib.upload(category, name, b"not really audio").unwrap();
    }
    let mut app = App::new(lib, true);
    app.refresh();
    (dir, app)
}

fn entry(name: &str) -> FileEntry {
    FileEntry {
        name: name.into(),
        path: PathBuf::from(name),
        size_bytes: None,
        duration: crate::library::DurationInfo::Unknown,
    }
}

#[test]
fn fuzzy_match_simple() {
    let name = "Hello World.mp3";
    assert!(App::fuzzy_match_positions(name, "hw").is_some());
    assert!(App::fuzzy_match_positions(name, "ello").is_some());
    assert!(App::fuzzy_match_positions(name, "xyz").is_none());
}

#[test]
fn refresh_sorts_categories_and_files_case_insensitively() {
    let (_dir, app) = app_with_files(&[
        ("rock", "b.mp3"),
        ("Jazz", "z.mp3"),
        ("rock", "A.mp3"),
    ]);

    assert_eq!(app.categories, vec!["Jazz".to_string(), "rock".to_string()]);
    assert_eq!(app.current_category(), Some("Jazz"));
    assert_eq!(app.entries.len(), 1);
    assert_eq!(app.entries[0].name, "z.mp3");
}

#[test]
fn moving_between_categories_reloads_files() {
    let (_dir, mut app) = app_with_files(&[("Jazz", "z.mp3"), ("Rock", "a.mp3"), ("Rock", "b.mp3")]);

    app.next();
    assert_eq!(app.current_category(), Some("Rock"));
    let names: Vec<&str> = app.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.mp3", "b.mp3"]);

    // Wraps around.
    app.next();
    assert_eq!(app.current_category(), Some("Jazz"));
    app.prev();
    assert_eq!(app.current_category(), Some("Rock"));
}

#[test]
fn unreadable_files_still_list_with_unknown_duration() {
    let (_dir, app) = app_with_files(&[("Rock", "broken.mp3")]);
    assert_eq!(app.entries.len(), 1);
    assert_eq!(app.entries[0].duration, crate::library::DurationInfo::Unknown);
    assert_eq!(app.entries[0].size_bytes, Some(16));
}

#[test]
fn display_indices_respects_filter_query() {
    let mut app = App::new(Library::new(LibrarySettings::default()), false);
    app.set_entries(vec![
        entry("Alpha.mp3"),
        entry("Beta.mp3"),
        entry("Gamma.mp3"),
        entry("Delta.mp3"),
    ]);

    app.filter_query = "et".into();
    assert_eq!(app.display_indices(), vec![1usize, 3usize]);

    app.filter_query = "   ".into();
    assert_eq!(app.display_indices(), vec![0, 1, 2, 3]);
}

#[test]
fn next_prev_in_view_helpers_work() {
    let mut app = App::new(Library::new(LibrarySettings::default()), false);
    app.set_entries(vec![entry("Alpha"), entry("Beta"), entry("Gamma")]);
    app.filter_query = "et".into(); // only Beta is visible

    assert_eq!(app.next_in_view_from(0), Some(1));
    assert_eq!(app.prev_in_view_from(0), Some(1));
    assert_eq!(app.next_in_view_from(1), Some(1));
    assert_eq!(app.prev_in_view_from(1), Some(1));
}

#[test]
fn filtering_moves_selection_into_view() {
    let mut app = App::new(Library::new(LibrarySettings::default()), false);
    app.set_entries(vec![entry("Alpha"), entry("Beta"), entry("Gamma")]);

    app.enter_filter_mode();
    assert_eq!(app.focus, Focus::Files);
    app.push_filter_char('g');
    app.push_filter_char('m');
    assert_eq!(app.selected, 2);
    assert_eq!(app.selected_entry().map(|e| e.name.as_str()), Some("Gamma"));

    app.push_filter_char('z');
    assert!(app.selected_entry().is_none());

    app.clear_filter();
    assert!(!app.filter_mode);
    assert!(app.selected_entry().is_some());
}

#[test]
fn large_listings_use_precomputed_lowercase_names() {
    let mut app = App::new(Library::new(LibrarySettings::default()), false);
    let entries: Vec<FileEntry> = (0..150).map(|i| entry(&format!("Track {i:03}.mp3"))).collect();
    app.set_entries(entries);

    assert!(app.uses_lower_names());
    app.filter_query = "TRACK 149".into();
    assert_eq!(app.display_indices(), vec![149]);
}

#[test]
fn upload_form_distinguishes_missing_file_and_category() {
    let form = UploadForm::new(None);
    assert_eq!(form.validate(), Err(UploadFormError::NoFile));
    assert_eq!(UploadFormError::NoFile.to_string(), "No file chosen");

    let mut form = UploadForm::new(None);
    form.source = "/tmp/song.mp3".into();
    assert_eq!(form.validate(), Err(UploadFormError::NoCategory));
    assert_eq!(UploadFormError::NoCategory.to_string(), "No category chosen");

    form.category = "  Rock ".into();
    assert_eq!(
        form.validate(),
        Ok((PathBuf::from("/tmp/song.mp3"), "Rock".to_string()))
    );
}

#[test]
fn upload_prompt_creates_category_and_selects_new_file() {
    let (dir, mut app) = app_with_files(&[("Jazz", "z.mp3")]);
    let source = dir.path().join("song1.mp3");
    fs::write(&source, b"fresh audio").unwrap();

    app.open_upload_prompt();
    match &app.prompt {
        Some(Prompt::Upload(form)) => assert_eq!(form.category, "Jazz"),
        other => panic!("unexpected prompt: {other:?}"),
    }
    for c in source.to_str().unwrap().chars() {
        app.prompt_push_char(c);
    }
    app.prompt_next_field();
    for _ in 0.."Jazz".len() {
        app.prompt_pop_char();
    }
    for c in "Rock".chars() {
        app.prompt_push_char(c);
    }
    app.submit_prompt();

    assert!(app.prompt.is_none());
    assert_eq!(app.categories, vec!["Jazz".to_string(), "Rock".to_string()]);
    assert_eq!(app.current_category(), Some("Rock"));
    assert_eq!(app.focus, Focus::Files);
    assert_eq!(app.selected_entry().map(|e| e.name.as_str()), Some("song1.mp3"));
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
}

#[test]
fn failed_upload_keeps_prompt_open_with_message() {
    let (dir, mut app) = app_with_files(&[]);

    app.open_upload_prompt();
    app.submit_prompt();
    assert!(app.prompt.is_some());
    assert_eq!(
        app.status,
        Some(StatusMessage {
            kind: StatusKind::Error,
            text: "No file chosen".to_string()
        })
    );

    let source = dir.path().join("notes.txt");
    fs::write(&source, b"text").unwrap();
    let form = UploadForm {
        source: source.to_str().unwrap().to_string(),
        category: "Rock".to_string(),
        field: UploadField::Source,
    };
    assert!(!app.submit_upload(&form));
    let text = app.status.as_ref().map(|s| s.text.clone()).unwrap_or_default();
    assert!(text.contains("not an accepted audio file"), "{text}");
    assert!(app.categories.is_empty());
}

#[test]
fn upload_failure_message_labels_write_failures() {
    let err = crate::error::ShelfError::storage(
        "writing /x/y.mp3",
        std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    );
    assert!(upload_failure_message(&err).starts_with("Write failed: writing /x/y.mp3"));

    let err = crate::error::ShelfError::InvalidArgument("no category chosen".into());
    assert_eq!(upload_failure_message(&err), "No category chosen");
}

#[test]
fn new_category_prompt_creates_empty_category() {
    let (_dir, mut app) = app_with_files(&[]);
    app.open_new_category_prompt();
    for c in "Podcasts".chars() {
        app.prompt_push_char(c);
    }
    app.submit_prompt();

    assert!(app.prompt.is_none());
    assert_eq!(app.categories, vec!["Podcasts".to_string()]);
    assert!(app.entries.is_empty());
}

#[test]
fn download_selected_writes_into_download_dir() {
    let (dir, mut app) = app_with_files(&[("Rock", "a.mp3")]);
    app.toggle_focus();
    app.download_selected();

    let saved = dir.path().join("downloads").join("a.mp3");
    assert_eq!(fs::read(saved).unwrap(), b"not really audio");
    assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
}

#[test]
fn download_of_vanished_file_reports_and_refreshes() {
    let (dir, mut app) = app_with_files(&[("Rock", "a.mp3")]);
    fs::remove_file(dir.path().join("shelf").join("Rock").join("a.mp3")).unwrap();

    app.download_selected();
    assert_eq!(
        app.status.as_ref().map(|s| s.text.as_str()),
        Some("Download failed: a.mp3 no longer exists")
    );
    assert!(app.entries.is_empty());
}

#[test]
fn metadata_window_reads_selected_file_once() {
    let (_dir, mut app) = app_with_files(&[("Rock", "a.mp3")]);
    app.toggle_metadata_window();
    let view = app.metadata_view.as_ref().unwrap();
    assert_eq!(view.name, "a.mp3");
    assert!(view.result.is_err());

    app.toggle_metadata_window();
    assert!(app.metadata_view.is_none());
}
