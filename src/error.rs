use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the `relzip` crate.
pub type Result<T> = std::result::Result<T, ArchiverError>;

/// The primary error type for all operations in the `relzip` crate.
#[derive(Debug, Error)]
pub enum ArchiverError {
    /// A path was missing, unreadable, or unwritable.
    /// Includes the path where the error happened.
    #[error("filesystem error on path '{}': {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A walked path did not live under the root it was walked from.
    #[error("could not strip prefix '{}' from path '{}'", prefix.display(), path.display())]
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// The file name cannot be stored as a ZIP entry name.
    #[error("file name is not valid UTF-8: '{}'", path.display())]
    NonUtf8Name { path: PathBuf },

    /// Entry names must be a single, non-empty path component.
    #[error("invalid entry name '{name}'")]
    InvalidName { name: String },

    /// A file and a folder were requested under the same sibling name.
    #[error("entry '{name}' already exists with a different kind")]
    NameConflict { name: String },

    /// A compression option is out of range for the selected algorithm.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Any failure reported by the archive codec, passed through unchanged.
    #[error("archive codec error: {0}")]
    Codec(#[from] zip::result::ZipError),
}

impl ArchiverError {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiverError::Filesystem { path: path.into(), source }
    }
}
