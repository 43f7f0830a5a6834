//! # Archive Inspection
//!
//! Read-side helpers for a release archive that has already been written: listing its
//! entries, unpacking it, and checking it against the source tree it was built from.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::archive::Entry;
use crate::collect::{self, ScanOptions};
use crate::{ArchiverError, Result};

/// One entry of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub compressed_size: u64,
    pub crc32: u32,
}

/// Differences between a written archive and its source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// In the source tree but not in the archive.
    pub missing: Vec<String>,
    /// In the archive but not in the source tree.
    pub unexpected: Vec<String>,
    /// Present in both, but with different contents or a different kind.
    pub modified: Vec<String>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.modified.is_empty()
    }
}

fn open(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive_path).map_err(|e| ArchiverError::fs(archive_path, e))?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Lists every entry in the archive at `archive_path`, in stored order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<ListedEntry>> {
    let mut zip = open(archive_path)?;
    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let f = zip.by_index(i)?;
        entries.push(ListedEntry {
            name: f.name().to_string(),
            is_dir: f.is_dir(),
            size: f.size(),
            compressed_size: f.compressed_size(),
            crc32: f.crc32(),
        });
    }
    Ok(entries)
}

/// Unpacks the archive into `out_dir`, creating it if needed.
///
/// Entry names that would resolve outside `out_dir` are rejected by the codec.
pub fn extract_archive(archive_path: &Path, out_dir: &Path) -> Result<()> {
    let mut zip = open(archive_path)?;
    std::fs::create_dir_all(out_dir).map_err(|e| ArchiverError::fs(out_dir, e))?;
    zip.extract(out_dir)?;
    debug!(archive = %archive_path.display(), out = %out_dir.display(), entries = zip.len(), "extracted");
    Ok(())
}

/// Compares the archive at `archive_path` with what packing `root` would produce today.
pub fn verify_archive(archive_path: &Path, root: &Path, options: &ScanOptions) -> Result<VerifyReport> {
    let expected = collect::build_archive(root, options)?;
    let actual: BTreeMap<String, ListedEntry> = list_entries(archive_path)?
        .into_iter()
        .map(|e| (e.name.clone(), e))
        .collect();

    let mut report = VerifyReport::default();
    let mut seen = BTreeSet::new();
    for (path, entry) in expected.flatten() {
        let Some(listed) = actual.get(&path) else {
            report.missing.push(path);
            continue;
        };
        let matches = match entry {
            Entry::Folder(_) => listed.is_dir,
            Entry::File(f) => {
                !listed.is_dir
                    && listed.size == f.contents().len() as u64
                    && listed.crc32 == crc32fast::hash(f.contents())
            }
        };
        if !matches {
            report.modified.push(path.clone());
        }
        seen.insert(path);
    }

    report.unexpected = actual.into_keys().filter(|name| !seen.contains(name)).collect();
    Ok(report)
}
