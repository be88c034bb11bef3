use std::path::PathBuf;
use std::time::Duration;

/// Derived attributes of a stored file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioMetadata {
    pub duration: Duration,
    pub size_bytes: u64,
}

impl AudioMetadata {
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Duration as seen by a listing: one unreadable file must not break the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationInfo {
    Known(Duration),
    Unknown,
}

/// One row of a category listing.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
    pub duration: DurationInfo,
}

/// Full content of a stored file, ready to hand to the client.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Always [`DOWNLOAD_MIME`](super::DOWNLOAD_MIME), whatever the codec really is.
    pub mime: &'static str,
}
