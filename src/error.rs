//! Error types shared by the library and the terminal front-end.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while browsing, uploading or downloading.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// A category, stored file or upload source is absent at read time.
    #[error("not found: {0}")]
    NotFound(String),

    /// Empty names, empty content or a disallowed extension.
    #[error("{0}")]
    InvalidArgument(String),

    /// Any I/O failure, including names the filesystem cannot hold.
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The file could not be parsed as audio.
    #[error("cannot read audio metadata from {}: {reason}", path.display())]
    Metadata { path: PathBuf, reason: String },
}

impl ShelfError {
    pub fn storage(context: impl Into<String>, source: io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Map an I/O error on `path`, turning `NotFound` into [`ShelfError::NotFound`].
    pub fn from_io(context: impl Into<String>, path: &std::path::Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.display().to_string())
        } else {
            Self::storage(context, source)
        }
    }

    pub fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn from_io_maps_not_found_kind() {
        let err = ShelfError::from_io(
            "reading",
            Path::new("/tmp/gone.mp3"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, ShelfError::NotFound(ref p) if p == "/tmp/gone.mp3"));

        let err = ShelfError::from_io(
            "reading",
            Path::new("/tmp/locked.mp3"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ShelfError::Storage { .. }));
        assert!(err.to_string().starts_with("reading: "));
    }
}
