//! Application model types: `App`, pane focus and the input prompts.
//!
//! The `App` struct holds the categories and files currently shown, the
//! selection in each pane and the transient UI state (filter, popups,
//! status line). All filesystem work goes through [`Library`].

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::error::ShelfError;
use crate::library::{AudioMetadata, DOWNLOAD_MIME, FileEntry, Library, read_metadata};

/// Which pane receives navigation keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Categories,
    Files,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Feedback line shown under the header after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UploadField {
    Source,
    Category,
}

/// Reasons the upload form cannot be submitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadFormError {
    #[error("No file chosen")]
    NoFile,
    #[error("No category chosen")]
    NoCategory,
}

/// The upload form: a local file and the category to put it in.
///
/// Typing a category that does not exist yet creates it on submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadForm {
    pub source: String,
    pub category: String,
    pub field: UploadField,
}

impl UploadForm {
    pub fn new(category: Option<&str>) -> Self {
        Self {
            source: String::new(),
            category: category.unwrap_or_default().to_string(),
            field: UploadField::Source,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            UploadField::Source => UploadField::Category,
            UploadField::Category => UploadField::Source,
        };
    }

    fn active_mut(&mut self) -> &mut String {
        match self.field {
            UploadField::Source => &mut self.source,
            UploadField::Category => &mut self.category,
        }
    }

    /// Check the form is complete and return `(source, category)`.
    pub fn validate(&self) -> Result<(PathBuf, String), UploadFormError> {
        let source = self.source.trim();
        if source.is_empty() {
            return Err(UploadFormError::NoFile);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(UploadFormError::NoCategory);
        }
        Ok((PathBuf::from(source), category.to_string()))
    }
}

/// Modal input currently on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Upload(UploadForm),
    NewCategory(String),
}

/// Metadata popup content, read once when the popup opens.
#[derive(Clone, Debug)]
pub struct MetadataView {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<AudioMetadata, String>,
}

/// Turn an upload failure into the message shown to the user.
pub fn upload_failure_message(err: &ShelfError) -> String {
    match err {
        ShelfError::InvalidArgument(msg) => {
            let mut chars = msg.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        ShelfError::NotFound(what) => format!("No file chosen: {what} does not exist"),
        ShelfError::Storage { .. } | ShelfError::Metadata { .. } => {
            format!("Write failed: {err}")
        }
    }
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub categories: Vec<String>,
    pub selected_category: usize,
    pub entries: Vec<FileEntry>,
    pub selected: usize,

    lower_names: Option<Vec<String>>,

    pub focus: Focus,
    pub filter_mode: bool,
    pub filter_query: String,
    pub prompt: Option<Prompt>,
    pub metadata_view: Option<MetadataView>,
    pub status: Option<StatusMessage>,
    pub sort_entries: bool,
}

impl App {
    /// Create an `App` over `library`. Call [`App::refresh`] to load the panes.
    pub fn new(library: Library, sort_entries: bool) -> Self {
        Self {
            library,
            categories: Vec::new(),
            selected_category: 0,
            entries: Vec::new(),
            selected: 0,

            lower_names: None,

            focus: Focus::default(),
            filter_mode: false,
            filter_query: String::new(),
            prompt: None,
            metadata_view: None,
            status: None,
            sort_entries,
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
        });
    }

    /// Re-read categories and files from disk, keeping the selection by name.
    pub fn refresh(&mut self) {
        let keep_category = self.current_category().map(str::to_string);
        let keep_file = self.selected_entry().map(|e| e.name.clone());

        match self.library.list_categories() {
            Ok(mut categories) => {
                if self.sort_entries {
                    categories.sort_by_key(|c| c.to_lowercase());
                }
                self.categories = categories;
            }
            Err(e) => {
                warn!(error = %e, "cannot list categories");
                self.categories.clear();
                self.set_error(format!("Cannot list categories: {e}"));
            }
        }

        self.selected_category = keep_category
            .and_then(|name| self.categories.iter().position(|c| *c == name))
            .unwrap_or(0);
        self.reload_entries();

        if let Some(name) = keep_file {
            self.select_entry_by_name(&name);
        }
    }

    /// Re-read the files of the current category.
    pub fn reload_entries(&mut self) {
        let entries = match self.current_category() {
            Some(category) => {
                let category = category.to_string();
                match self.library.list_entries(&category) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(error = %e, category = %category, "cannot list files");
                        self.set_error(format!("Cannot list files: {e}"));
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };
        self.set_entries(entries);
    }

    /// Replace the file pane contents, resetting selection and popups.
    pub fn set_entries(&mut self, mut entries: Vec<FileEntry>) {
        if self.sort_entries {
            entries.sort_by_key(|e| e.name.to_lowercase());
        }
        // For larger categories, precompute lowercase names to speed up fuzzy
        // filtering on every redraw/keystroke.
        self.lower_names = if entries.len() > 100 {
            Some(entries.iter().map(|e| e.name.to_ascii_lowercase()).collect())
        } else {
            None
        };
        self.entries = entries;
        self.selected = 0;
        self.metadata_view = None;
        self.ensure_selected_visible();
    }

    pub fn current_category(&self) -> Option<&str> {
        self.categories
            .get(self.selected_category)
            .map(String::as_str)
    }

    pub fn selected_entry(&self) -> Option<&FileEntry> {
        if !self.display_indices().contains(&self.selected) {
            return None;
        }
        self.entries.get(self.selected)
    }

    /// Select `name` in the category pane and load its files.
    pub fn select_category(&mut self, name: &str) -> bool {
        match self.categories.iter().position(|c| c == name) {
            Some(idx) => {
                if idx != self.selected_category || self.entries.is_empty() {
                    self.selected_category = idx;
                    self.clear_filter();
                    self.reload_entries();
                }
                true
            }
            None => false,
        }
    }

    fn select_entry_by_name(&mut self, name: &str) {
        if let Some(idx) = self.entries.iter().position(|e| e.name == name) {
            self.set_selected(idx);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Categories => Focus::Files,
            Focus::Files => Focus::Categories,
        };
    }

    pub fn toggle_metadata_window(&mut self) {
        if self.metadata_view.take().is_some() {
            return;
        }
        let Some((name, path)) = self
            .selected_entry()
            .map(|e| (e.name.clone(), e.path.clone()))
        else {
            return;
        };
        let result = read_metadata(&path).map_err(|e| e.to_string());
        self.metadata_view = Some(MetadataView { name, path, result });
    }

    /// Return the display order of file indices, taking active filtering into account.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.entries.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            base.collect()
        } else {
            match self.lower_names.as_deref() {
                Some(lower_names) => {
                    let query_lower = query.to_ascii_lowercase();
                    base.filter(|&i| {
                        Self::fuzzy_match_positions_lower(&lower_names[i], &query_lower).is_some()
                    })
                    .collect()
                }
                None => base
                    .filter(|&i| Self::fuzzy_match_positions(&self.entries[i].name, query).is_some())
                    .collect(),
            }
        }
    }

    /// Return true if this `App` uses precomputed lowercase names.
    pub fn uses_lower_names(&self) -> bool {
        self.lower_names.is_some()
    }

    /// Fuzzy-match `query_lower` against a specific file by index.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_entry_lower(
        &self,
        entry_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_names.as_deref() {
            Some(lower_names) => {
                Self::fuzzy_match_positions_lower(&lower_names[entry_index], query_lower)
            }
            None => Self::fuzzy_match_positions(&self.entries[entry_index].name, query_lower),
        }
    }

    /// Return the next visible index in the current display order after `current`.
    /// Wraps around to the first element.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index in the current display order before `current`.
    /// Wraps around to the last element.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Set the selected file index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    pub fn fuzzy_match_positions(name: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut name_iter = name.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match name_iter.next() {
                    Some((ni, nc)) if nc.to_ascii_lowercase() == qc_low => {
                        positions.push(ni);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    fn fuzzy_match_positions_lower(name_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut name_iter = name_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match name_iter.next() {
                    Some((ni, nc)) if nc == qc => {
                        positions.push(ni);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode: filtering applies to the file pane.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.focus = Focus::Files;
        self.ensure_selected_visible();
    }
    /// Exit filter mode, keeping the query.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }
    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }
    /// Append a character to the filter query and refresh view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }
    /// Remove the last character from the filter query and refresh view.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible file.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection down in the focused pane.
    pub fn next(&mut self) {
        match self.focus {
            Focus::Categories => {
                if !self.categories.is_empty() {
                    let idx = (self.selected_category + 1) % self.categories.len();
                    self.move_category_to(idx);
                }
            }
            Focus::Files => {
                if let Some(next) = self.next_in_view_from(self.selected) {
                    self.selected = next;
                }
            }
        }
    }

    /// Move selection up in the focused pane.
    pub fn prev(&mut self) {
        match self.focus {
            Focus::Categories => {
                if !self.categories.is_empty() {
                    let len = self.categories.len();
                    let idx = (self.selected_category + len - 1) % len;
                    self.move_category_to(idx);
                }
            }
            Focus::Files => {
                if let Some(prev) = self.prev_in_view_from(self.selected) {
                    self.selected = prev;
                }
            }
        }
    }

    /// Jump to the first item of the focused pane.
    pub fn first(&mut self) {
        match self.focus {
            Focus::Categories => self.move_category_to(0),
            Focus::Files => {
                if let Some(&first) = self.display_indices().first() {
                    self.set_selected(first);
                }
            }
        }
    }

    /// Jump to the last item of the focused pane.
    pub fn last(&mut self) {
        match self.focus {
            Focus::Categories => self.move_category_to(self.categories.len().saturating_sub(1)),
            Focus::Files => {
                if let Some(&last) = self.display_indices().last() {
                    self.set_selected(last);
                }
            }
        }
    }

    fn move_category_to(&mut self, idx: usize) {
        if idx < self.categories.len() && idx != self.selected_category {
            self.selected_category = idx;
            self.clear_filter();
            self.reload_entries();
        }
    }

    pub fn open_upload_prompt(&mut self) {
        let form = UploadForm::new(self.current_category());
        self.prompt = Some(Prompt::Upload(form));
    }

    pub fn open_new_category_prompt(&mut self) {
        self.prompt = Some(Prompt::NewCategory(String::new()));
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn prompt_push_char(&mut self, c: char) {
        match self.prompt.as_mut() {
            Some(Prompt::Upload(form)) => form.active_mut().push(c),
            Some(Prompt::NewCategory(name)) => name.push(c),
            None => {}
        }
    }

    pub fn prompt_pop_char(&mut self) {
        match self.prompt.as_mut() {
            Some(Prompt::Upload(form)) => {
                form.active_mut().pop();
            }
            Some(Prompt::NewCategory(name)) => {
                name.pop();
            }
            None => {}
        }
    }

    pub fn prompt_next_field(&mut self) {
        if let Some(Prompt::Upload(form)) = self.prompt.as_mut() {
            form.next_field();
        }
    }

    /// Submit the open prompt. The prompt stays open when validation fails.
    pub fn submit_prompt(&mut self) {
        match self.prompt.clone() {
            Some(Prompt::Upload(form)) => {
                if self.submit_upload(&form) {
                    self.prompt = None;
                }
            }
            Some(Prompt::NewCategory(name)) => {
                if self.create_category(name.trim()) {
                    self.prompt = None;
                }
            }
            None => {}
        }
    }

    /// Upload the file named in `form`. Returns `true` on success.
    pub fn submit_upload(&mut self, form: &UploadForm) -> bool {
        let (source, category) = match form.validate() {
            Ok(v) => v,
            Err(e) => {
                self.set_error(e.to_string());
                return false;
            }
        };

        match self.library.import_file(&category, &source) {
            Ok(path) => {
                let name = path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                self.refresh();
                self.select_category(&category);
                self.select_entry_by_name(&name);
                self.focus = Focus::Files;
                self.set_info(format!("Uploaded {name} to {category}"));
                true
            }
            Err(e) => {
                warn!(error = %e, source = %source.display(), category = %category, "upload failed");
                self.set_error(upload_failure_message(&e));
                false
            }
        }
    }

    /// Create an empty category. Returns `true` on success.
    pub fn create_category(&mut self, name: &str) -> bool {
        match self.library.ensure_category(name) {
            Ok(_) => {
                self.refresh();
                self.select_category(name);
                self.set_info(format!("Category {name} ready"));
                true
            }
            Err(e) => {
                self.set_error(format!("Cannot create category: {e}"));
                false
            }
        }
    }

    /// Save the selected file into the configured download directory.
    pub fn download_selected(&mut self) {
        let Some(category) = self.current_category().map(str::to_string) else {
            self.set_error("Download failed: no category selected");
            return;
        };
        let Some(name) = self.selected_entry().map(|e| e.name.clone()) else {
            self.set_error("Download failed: no file selected");
            return;
        };

        let dest_dir = self.library.settings().download_dir.clone();
        match self.library.export(&category, &name, &dest_dir) {
            Ok(dest) => {
                info!(file = %name, dest = %dest.display(), "download complete");
                self.set_info(format!(
                    "Saved {name} to {} ({DOWNLOAD_MIME})",
                    dest.display()
                ));
            }
            Err(ShelfError::NotFound(_)) => {
                self.refresh();
                self.set_error(format!("Download failed: {name} no longer exists"));
            }
            Err(e) => self.set_error(format!("Download failed: {e}")),
        }
    }
}
