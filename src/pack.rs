//! End-to-end packing: walk the source tree, serialize it, write the release archive.
//!
//! The archive is only written once the whole tree has been read and serialized, so a
//! failure anywhere before the final write leaves no output file behind.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::collect::{self, ScanOptions};
use crate::common::{DEFAULT_OUTPUT, DEFAULT_ROOT};
use crate::compress::{self, CompressOptions};
use crate::{fsx, Result};

/// Everything a pack run needs.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Source directory.
    pub root: PathBuf,
    /// Destination archive, overwritten if present.
    pub output: PathBuf,
    pub scan: ScanOptions,
    pub compress: CompressOptions,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            scan: ScanOptions::default(),
            compress: CompressOptions::default(),
        }
    }
}

/// What a successful pack produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackSummary {
    pub files: usize,
    pub folders: usize,
    pub skipped: usize,
    /// Sum of the included files' sizes.
    pub input_bytes: u64,
    /// Size of the written archive.
    pub archive_bytes: u64,
}

/// Writes serialized archive bytes to `dest`, replacing any existing file.
pub fn write_archive(bytes: &[u8], dest: &Path) -> Result<()> {
    fsx::write_atomic(dest, bytes)
}

/// Packs `options.root` into `options.output`.
pub fn pack(options: &PackOptions) -> Result<PackSummary> {
    // Reject bad levels before spending time on the walk.
    options.compress.validate()?;

    let outcome = collect::scan(&options.root, &options.scan)?;
    let archive = outcome.archive;
    let bytes = compress::serialize(&archive, &options.compress)?;
    write_archive(&bytes, &options.output)?;

    let summary = PackSummary {
        files: archive.file_count(),
        folders: archive.folder_count(),
        skipped: outcome.skipped.len(),
        input_bytes: archive.total_bytes(),
        archive_bytes: bytes.len() as u64,
    };
    info!(
        root = %options.root.display(),
        output = %options.output.display(),
        files = summary.files,
        folders = summary.folders,
        skipped = summary.skipped,
        input_bytes = summary.input_bytes,
        archive_bytes = summary.archive_bytes,
        "wrote release archive"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiverError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_pack_reports_counts() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("dist");
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("app.js"), b"12345").unwrap();
        fs::write(root.join("app.js.map"), b"{}").unwrap();
        fs::write(root.join("vendor/lib.js"), b"678").unwrap();

        let options = PackOptions {
            root,
            output: dir.path().join("release.zip"),
            ..PackOptions::default()
        };
        let summary = pack(&options).unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.folders, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.input_bytes, 8);
        assert_eq!(summary.archive_bytes, fs::metadata(&options.output).unwrap().len());
    }

    #[test]
    fn test_failed_walk_writes_nothing() {
        let dir = tempdir().unwrap();
        let options = PackOptions {
            root: dir.path().join("missing"),
            output: dir.path().join("release.zip"),
            ..PackOptions::default()
        };

        assert!(matches!(pack(&options), Err(ArchiverError::Filesystem { .. })));
        assert!(!options.output.exists());
    }

    #[test]
    fn test_invalid_level_fails_before_writing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        let mut options = PackOptions {
            root: dir.path().join("dist"),
            output: dir.path().join("release.zip"),
            ..PackOptions::default()
        };
        options.compress.level = Some(0);

        assert!(matches!(pack(&options), Err(ArchiverError::InvalidOption(_))));
        assert!(!options.output.exists());
    }
}
