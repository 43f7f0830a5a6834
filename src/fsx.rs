//! Binary-safe filesystem helpers.
//!
//! Every read and write in relzip goes through raw byte buffers: no newline translation and
//! no character-encoding transcoding. Errors are wrapped with the path they happened on so
//! the CLI can name the offending file.
//!
//! Archives are written atomically: the bytes land in a temporary file next to the
//! destination, which is then renamed over it. A failure before the rename leaves any
//! previous archive untouched and no partial file behind.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{ArchiverError, Result};

/// Permission bits given to written archives on Unix.
pub const ARCHIVE_MODE: u32 = 0o644;

/// Reads a whole file into memory.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ArchiverError::fs(path, e))
}

/// Writes `bytes` to `dest`, replacing any existing file.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ArchiverError::fs(dest, e))?;
    tmp.write_all(bytes).map_err(|e| ArchiverError::fs(dest, e))?;
    tmp.as_file().sync_all().map_err(|e| ArchiverError::fs(dest, e))?;
    set_unix_permissions(tmp.path(), ARCHIVE_MODE).map_err(|e| ArchiverError::fs(dest, e))?;
    tmp.persist(dest).map_err(|e| ArchiverError::fs(dest, e.error))?;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(target_os = "windows")]
/// No-op on Windows: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
