use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, ShelfError};

use super::layout::{Library, validate_component};
use super::model::Download;

/// Content-type hint handed out with every download.
///
/// Fixed to MPEG audio whatever the stored codec is; a `.flac` upload is
/// still announced as `audio/mpeg`.
pub const DOWNLOAD_MIME: &str = "audio/mpeg";

impl Library {
    /// Whether `file_name` carries one of the configured upload extensions.
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        let exts: Vec<String> = self
            .settings()
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                exts.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    /// Store `content` as `root/category/file_name` and return the final path.
    ///
    /// The category is created first; an existing file of the same name is
    /// overwritten. The two steps are not atomic: a failed write can leave
    /// an empty category behind.
    pub fn upload(&self, category: &str, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        validate_component("category", category)?;
        validate_component("file", file_name)?;
        self.ensure_listable("category", category)?;
        self.ensure_listable("file", file_name)?;
        if !self.accepts_extension(file_name) {
            return Err(ShelfError::InvalidArgument(format!(
                "`{file_name}` is not an accepted audio file (allowed: {})",
                self.settings().extensions.join(", ")
            )));
        }
        if content.is_empty() {
            return Err(ShelfError::InvalidArgument(format!("`{file_name}` is empty")));
        }

        let dir = self.ensure_category(category)?;
        let path = dir.join(file_name);
        fs::write(&path, content)
            .map_err(|e| ShelfError::storage(format!("writing {}", path.display()), e))?;

        info!(category, file = file_name, bytes = content.len(), "uploaded file");
        Ok(path)
    }

    /// Upload a local file under its own name.
    pub fn import_file(&self, category: &str, source: &Path) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ShelfError::InvalidArgument("no file chosen".to_string()))?
            .to_string();

        let content = fs::read(source).map_err(|e| {
            ShelfError::from_io(format!("reading {}", source.display()), source, e)
        })?;
        self.upload(category, &file_name, &content)
    }

    /// Full content of a stored file.
    pub fn download(&self, category: &str, file_name: &str) -> Result<Download> {
        let path = self.file_path(category, file_name)?;
        let bytes = fs::read(&path)
            .map_err(|e| ShelfError::from_io(format!("reading {}", path.display()), &path, e))?;

        Ok(Download {
            file_name: file_name.to_string(),
            bytes,
            mime: DOWNLOAD_MIME,
        })
    }

    /// Copy a stored file into `dest_dir` under its original name.
    pub fn export(&self, category: &str, file_name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let download = self.download(category, file_name)?;

        fs::create_dir_all(dest_dir)
            .map_err(|e| ShelfError::storage(format!("creating {}", dest_dir.display()), e))?;
        let dest = dest_dir.join(&download.file_name);
        fs::write(&dest, &download.bytes)
            .map_err(|e| ShelfError::storage(format!("writing {}", dest.display()), e))?;

        info!(category, file = file_name, dest = %dest.display(), "exported file");
        Ok(dest)
    }
}
