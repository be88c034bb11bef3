use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{Result, ShelfError};

use super::metadata::{file_size, read_duration};
use super::model::{DurationInfo, FileEntry};

/// Audio files on disk, laid out as `root/<category>/<file>`.
#[derive(Debug, Clone)]
pub struct Library {
    settings: LibrarySettings,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Check that `name` can be used as a single path component.
///
/// Empty names are an argument error; names the filesystem cannot hold as one
/// component (separators, NUL, `.`/`..`) are a storage error.
pub(crate) fn validate_component(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ShelfError::InvalidArgument(format!("no {kind} chosen")));
    }
    let bad = name == "."
        || name == ".."
        || name.contains('\0')
        || name.contains('/')
        || name.contains('\\')
        || name.contains(std::path::MAIN_SEPARATOR);
    if bad {
        return Err(ShelfError::storage(
            format!("invalid {kind} name `{name}`"),
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "name must be a single path component",
            ),
        ));
    }
    Ok(())
}

impl Library {
    pub fn new(settings: LibrarySettings) -> Self {
        Self { settings }
    }

    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Directory of `category`, whether or not it exists yet.
    pub fn category_path(&self, category: &str) -> Result<PathBuf> {
        validate_component("category", category)?;
        Ok(self.settings.root.join(category))
    }

    /// Reject names that would be written but then skipped by listings.
    pub(crate) fn ensure_listable(&self, kind: &str, name: &str) -> Result<()> {
        if !self.settings.include_hidden && is_hidden(name) {
            return Err(ShelfError::InvalidArgument(format!(
                "{kind} name `{name}` starts with a dot and would be hidden"
            )));
        }
        Ok(())
    }

    /// Location of `file_name` inside `category`.
    pub fn file_path(&self, category: &str, file_name: &str) -> Result<PathBuf> {
        let dir = self.category_path(category)?;
        validate_component("file", file_name)?;
        Ok(dir.join(file_name))
    }

    /// Immediate children of `dir` of the given kind, in filesystem order.
    ///
    /// A missing `dir` has no children.
    fn children(&self, dir: &Path, kind: EntryKind) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let include_hidden = self.settings.include_hidden;
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.settings.follow_links);

        let mut names = Vec::new();
        for entry in walker.into_iter().filter_entry(|e| {
            include_hidden
                || e.depth() == 0
                || !e.file_name().to_str().map(is_hidden).unwrap_or(false)
        }) {
            let entry = match entry {
                Ok(entry) => entry,
                // A dangling symlink is not worth failing the listing over.
                Err(e) if e.io_error().map(|io| io.kind()) == Some(io::ErrorKind::NotFound) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
                Err(e) => {
                    return Err(ShelfError::storage(
                        format!("listing {}", dir.display()),
                        io::Error::from(e),
                    ));
                }
            };

            let ft = entry.file_type();
            let wanted = match kind {
                EntryKind::Dir => ft.is_dir(),
                EntryKind::File => ft.is_file(),
            };
            if !wanted {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(path = %entry.path().display(), "skipping non UTF-8 name"),
            }
        }
        Ok(names)
    }

    /// Names of all categories, i.e. the immediate subdirectories of the root.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let names = self.children(&self.settings.root, EntryKind::Dir)?;
        debug!(count = names.len(), root = %self.settings.root.display(), "listed categories");
        Ok(names)
    }

    /// Names of the files stored in `category`.
    ///
    /// An absent category, or a name that could never denote one, has no files.
    pub fn list_files(&self, category: &str) -> Result<Vec<String>> {
        let Ok(dir) = self.category_path(category) else {
            return Ok(Vec::new());
        };
        let names = self.children(&dir, EntryKind::File)?;
        debug!(category, count = names.len(), "listed files");
        Ok(names)
    }

    /// Create the category directory if it does not exist yet.
    pub fn ensure_category(&self, category: &str) -> Result<PathBuf> {
        let dir = self.category_path(category)?;
        self.ensure_listable("category", category)?;
        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| {
                ShelfError::storage(format!("creating category {}", dir.display()), e)
            })?;
            info!(category, path = %dir.display(), "created category");
        }
        Ok(dir)
    }

    /// Files of `category` with their size and duration.
    ///
    /// A file whose metadata cannot be read is still listed, with
    /// [`DurationInfo::Unknown`].
    pub fn list_entries(&self, category: &str) -> Result<Vec<FileEntry>> {
        let Ok(dir) = self.category_path(category) else {
            return Ok(Vec::new());
        };
        let names = self.children(&dir, EntryKind::File)?;
        debug!(category, count = names.len(), "listed entries");

        let entries = names
            .into_iter()
            .map(|name| {
                let path = dir.join(&name);
                let size_bytes = match file_size(&path) {
                    Ok(size) => Some(size),
                    Err(e) => {
                        warn!(error = %e, "size unavailable");
                        None
                    }
                };
                let duration = match read_duration(&path) {
                    Ok(d) => DurationInfo::Known(d),
                    Err(e) => {
                        warn!(error = %e, "duration unavailable");
                        DurationInfo::Unknown
                    }
                };
                FileEntry {
                    name,
                    path,
                    size_bytes,
                    duration,
                }
            })
            .collect();
        Ok(entries)
    }
}
