//! # File Discovery
//!
//! Walks a source directory and builds the in-memory [`Archive`] that mirrors it.
//!
//! The walk is depth-first with parents visited before their children, so every file's
//! folder chain already exists (or is created on the spot) when the file is added. Symbolic
//! links are followed; a dangling link or a link loop aborts the walk like any other
//! unreadable path.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::archive::Archive;
use crate::common::ExcludeRule;
use crate::{fsx, ArchiverError, Result};

/// Options controlling how a source tree is turned into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Files matching this rule are left out.
    pub exclude: ExcludeRule,
    /// Visit directory entries in file-name order. When false, the raw filesystem
    /// enumeration order is kept, which differs between platforms.
    pub sorted: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { exclude: ExcludeRule::default(), sorted: true }
    }
}

/// The archive built from a source tree plus the files the exclusion rule skipped.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub archive: Archive,
    pub skipped: Vec<PathBuf>,
}

/// Builds an archive mirroring the directory at `root`.
///
/// Fails with [`ArchiverError::Filesystem`] if `root` is missing, is not a directory, or if
/// any entry below it cannot be read. A file or directory whose name is not valid UTF-8
/// aborts the walk with [`ArchiverError::NonUtf8Name`], since ZIP entry names are stored
/// as UTF-8 text.
pub fn build_archive(root: &Path, options: &ScanOptions) -> Result<Archive> {
    scan(root, options).map(|outcome| outcome.archive)
}

/// Like [`build_archive`], but also reports which files were excluded.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<ScanOutcome> {
    let meta = std::fs::metadata(root).map_err(|e| ArchiverError::fs(root, e))?;
    if !meta.is_dir() {
        return Err(ArchiverError::fs(
            root,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut walker = WalkDir::new(root).min_depth(1).follow_links(true);
    if options.sorted {
        walker = walker.sort_by_file_name();
    }

    let mut outcome = ScanOutcome::default();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ArchiverError::fs(path, e.into())
        })?;
        let path = entry.path();

        let relative = path.strip_prefix(root).map_err(|_e| ArchiverError::StripPrefix {
            prefix: root.to_path_buf(),
            path: path.to_path_buf(),
        })?;
        let mut names = Vec::with_capacity(entry.depth());
        for component in relative.components() {
            let name = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| ArchiverError::NonUtf8Name { path: path.to_path_buf() })?;
            names.push(name);
        }
        let Some((name, parents)) = names.split_last() else {
            continue;
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            outcome.archive.root_mut().descend(parents.iter().copied())?.folder(name)?;
        } else if file_type.is_file() {
            if options.exclude.is_excluded(name) {
                debug!(path = %path.display(), "skipping excluded file");
                outcome.skipped.push(path.to_path_buf());
                continue;
            }
            let contents = fsx::read_file(path)?;
            debug!(path = %path.display(), bytes = contents.len(), "adding file");
            outcome.archive.root_mut().descend(parents.iter().copied())?.file(name, contents)?;
        } else {
            warn!(path = %path.display(), "skipping special file");
        }
    }

    Ok(outcome)
}
