//! Error types shared by the codecs, the merge engine and the builder.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::index::types::TermId;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    /// Unknown codec name, missing or invalid directories. Raised before any
    /// file is created.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A run holds a malformed record. The run is unusable.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A writer was handed a posting list that is not strictly increasing.
    #[error("Invalid posting list for term {term_id}: {reason}")]
    InvalidPosting { term_id: TermId, reason: String },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl IndexError {
    pub fn config(description: impl Into<String>) -> Self {
        IndexError::Configuration(description.into())
    }

    pub fn decode(description: impl Into<String>) -> Self {
        IndexError::Decode(description.into())
    }

    pub fn fs(path: &Path, source: io::Error) -> Self {
        IndexError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, IndexError::Decode(_))
    }
}

/// Attach a path to bare `io::Error`s coming out of file operations.
pub trait PathContext<T> {
    fn at_path(self, path: &Path) -> Result<T>;
}

impl<T> PathContext<T> for io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| IndexError::fs(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_error_mentions_path() {
        let err = IndexError::fs(
            Path::new("/tmp/missing.run"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.run"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_path_context() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
        let err = res.at_path(Path::new("block_0001.run")).unwrap_err();
        assert!(matches!(err, IndexError::Filesystem { .. }));
        assert!(!err.is_decode());
    }
}
