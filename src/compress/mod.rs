//! # Archive Serialization
//!
//! Turns an in-memory [`Archive`] into the bytes of a standard ZIP container.
//!
//! The binary layout and the compression itself belong to the codec; this module only walks
//! the tree and feeds it through the [`ArchiveCodec`] seam:
//! - every folder becomes a directory entry (`name/`), empty ones included;
//! - every file becomes a file entry with its exact bytes;
//! - entries are emitted depth-first in the archive's child order.
//!
//! [`ZipCodec`] is the production codec, backed by the `zip` crate.

use std::io::{Cursor, Write};

use base64::Engine;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::{Archive, Entry};
use crate::{ArchiverError, Result};

/// Defines the available compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionAlgo {
    /// Plain storage without any compression.
    Store,
    /// DEFLATE, readable by every ZIP tool.
    #[default]
    Deflate,
    /// Zstandard inside ZIP. Smaller and faster, but not every unzip tool can read it.
    Zstd,
}

impl CompressionAlgo {
    fn method(self) -> CompressionMethod {
        match self {
            CompressionAlgo::Store => CompressionMethod::Stored,
            CompressionAlgo::Deflate => CompressionMethod::Deflated,
            CompressionAlgo::Zstd => CompressionMethod::Zstd,
        }
    }

    /// Accepted compression levels, `None` if the algorithm takes no level.
    pub fn level_range(self) -> Option<std::ops::RangeInclusive<i32>> {
        match self {
            CompressionAlgo::Store => None,
            CompressionAlgo::Deflate => Some(1..=9),
            CompressionAlgo::Zstd => Some(1..=22),
        }
    }
}

/// How the serialized archive is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Raw ZIP bytes.
    #[default]
    Binary,
    /// Standard base64 text of the ZIP bytes. Not a ZIP file on its own.
    Base64,
}

/// Holds all configuration options for a serialization.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    pub algo: CompressionAlgo,
    /// Codec level. `None` uses the codec default.
    pub level: Option<i32>,
    pub encoding: OutputEncoding,
    /// Stamp every entry with the DOS epoch instead of the current time, so unchanged
    /// input serializes to identical bytes.
    pub reproducible: bool,
}

impl CompressOptions {
    /// Checks the level against the selected algorithm.
    pub fn validate(&self) -> Result<()> {
        match (self.level, self.algo.level_range()) {
            (None, _) => Ok(()),
            (Some(level), None) => Err(ArchiverError::InvalidOption(format!(
                "{:?} does not take a compression level (got {level})",
                self.algo
            ))),
            (Some(level), Some(range)) if !range.contains(&level) => {
                Err(ArchiverError::InvalidOption(format!(
                    "{:?} level must be within {}..={} (got {level})",
                    self.algo,
                    range.start(),
                    range.end()
                )))
            }
            _ => Ok(()),
        }
    }
}

/// The archive container encoder.
///
/// Paths are `/`-separated and relative to the archive root. Directory paths end in `/`.
pub trait ArchiveCodec {
    fn add_directory(&mut self, path: &str) -> Result<()>;

    fn add_file(&mut self, path: &str, contents: &[u8]) -> Result<()>;

    /// Finalizes the container and returns its bytes.
    fn finish(self) -> Result<Vec<u8>>;
}

/// ZIP codec writing into an in-memory buffer.
pub struct ZipCodec {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    file_options: FileOptions,
    dir_options: FileOptions,
}

impl ZipCodec {
    pub fn new(options: &CompressOptions) -> Result<Self> {
        options.validate()?;

        let mut file_options = FileOptions::default()
            .compression_method(options.algo.method())
            .compression_level(options.level);
        if options.reproducible {
            file_options = file_options.last_modified_time(zip::DateTime::default());
        }
        let dir_options = file_options.unix_permissions(0o755);
        let file_options = file_options.unix_permissions(0o644);

        Ok(Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            file_options,
            dir_options,
        })
    }
}

impl ArchiveCodec for ZipCodec {
    fn add_directory(&mut self, path: &str) -> Result<()> {
        self.writer.add_directory(path, self.dir_options)?;
        Ok(())
    }

    fn add_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let options = self.file_options.large_file(needs_zip64(contents.len() as u64));
        self.writer.start_file(path, options)?;
        self.writer.write_all(contents).map_err(ZipError::Io)?;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

/// Entries of 4 GiB and more need ZIP64 extra fields. `zip` refuses to write them otherwise.
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

/// Feeds every entry of `archive` through `codec` and returns the finished container.
pub fn serialize_with<C: ArchiveCodec>(archive: &Archive, mut codec: C) -> Result<Vec<u8>> {
    for (path, entry) in archive.flatten() {
        match entry {
            Entry::Folder(_) => codec.add_directory(&path)?,
            Entry::File(file) => codec.add_file(&path, file.contents())?,
        }
    }
    codec.finish()
}

/// Serializes `archive` to a ZIP container using `options`.
pub fn serialize(archive: &Archive, options: &CompressOptions) -> Result<Vec<u8>> {
    let bytes = serialize_with(archive, ZipCodec::new(options)?)?;
    Ok(match options.encoding {
        OutputEncoding::Binary => bytes,
        OutputEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(bytes).into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> Archive {
        let mut archive = Archive::new();
        archive.file("app.js", b"console.log('hi');\n".repeat(50)).unwrap();
        let vendor = archive.folder("vendor").unwrap();
        vendor.file("lib.js", vec![0, 1, 2, 255, b'\r', b'\n']).unwrap();
        vendor.folder("empty").unwrap();
        archive
    }

    fn read_back(bytes: &[u8]) -> Vec<(String, bool, Vec<u8>)> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = Vec::new();
        for i in 0..zip.len() {
            let mut f = zip.by_index(i).unwrap();
            let mut data = Vec::new();
            f.read_to_end(&mut data).unwrap();
            out.push((f.name().to_string(), f.is_dir(), data));
        }
        out
    }

    /// Records calls so the traversal order can be checked without a real codec.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ArchiveCodec for Recorder {
        fn add_directory(&mut self, path: &str) -> Result<()> {
            self.0.push(format!("dir {path}"));
            Ok(())
        }

        fn add_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
            self.0.push(format!("file {path} {}", contents.len()));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>> {
            Ok(self.0.join("\n").into_bytes())
        }
    }

    #[test]
    fn test_codec_sees_depth_first_order() {
        let out = serialize_with(&sample(), Recorder::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "file app.js 950\ndir vendor/\nfile vendor/lib.js 6\ndir vendor/empty/"
        );
    }

    #[test]
    fn test_deflate_roundtrip() {
        let archive = sample();
        let bytes = serialize(&archive, &CompressOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));

        let entries = read_back(&bytes);
        let names: Vec<_> = entries.iter().map(|(n, d, _)| (n.as_str(), *d)).collect();
        assert_eq!(
            names,
            vec![("app.js", false), ("vendor/", true), ("vendor/lib.js", false), ("vendor/empty/", true)]
        );
        assert_eq!(entries[0].2, b"console.log('hi');\n".repeat(50));
        assert_eq!(entries[2].2, vec![0, 1, 2, 255, b'\r', b'\n']);

        let mut zip = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        assert_eq!(zip.by_name("app.js").unwrap().compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn test_store_and_zstd_roundtrip() {
        for algo in [CompressionAlgo::Store, CompressionAlgo::Zstd] {
            let options = CompressOptions { algo, ..CompressOptions::default() };
            let bytes = serialize(&sample(), &options).unwrap();
            let entries = read_back(&bytes);
            assert_eq!(entries.len(), 4, "{algo:?}");
            assert_eq!(entries[2].2, vec![0, 1, 2, 255, b'\r', b'\n'], "{algo:?}");

            let mut zip = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
            assert_eq!(zip.by_name("app.js").unwrap().compression(), algo.method());
        }
    }

    #[test]
    fn test_reproducible_output_is_byte_identical() {
        let options = CompressOptions { reproducible: true, ..CompressOptions::default() };
        let first = serialize(&sample(), &options).unwrap();
        let second = serialize(&sample(), &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_base64_encoding() {
        let options = CompressOptions {
            encoding: OutputEncoding::Base64,
            reproducible: true,
            ..CompressOptions::default()
        };
        let text = serialize(&sample(), &options).unwrap();
        let binary = serialize(
            &sample(),
            &CompressOptions { reproducible: true, ..CompressOptions::default() },
        )
        .unwrap();

        assert!(text.is_ascii());
        let decoded = base64::engine::general_purpose::STANDARD.decode(&text).unwrap();
        assert_eq!(decoded, binary);
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = serialize(&Archive::new(), &CompressOptions::default()).unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }

    #[test]
    fn test_zip64_threshold() {
        assert!(!needs_zip64(0));
        assert!(!needs_zip64(u64::from(u32::MAX) - 1));
        assert!(needs_zip64(u64::from(u32::MAX)));
        assert!(needs_zip64(5 * 1024 * 1024 * 1024));
    }

    #[test]
    fn test_level_validation() {
        let ok = CompressOptions { level: Some(9), ..CompressOptions::default() };
        assert!(ok.validate().is_ok());

        let too_high = CompressOptions { level: Some(10), ..CompressOptions::default() };
        assert!(matches!(too_high.validate(), Err(ArchiverError::InvalidOption(_))));

        let store = CompressOptions {
            algo: CompressionAlgo::Store,
            level: Some(1),
            ..CompressOptions::default()
        };
        assert!(matches!(serialize(&sample(), &store), Err(ArchiverError::InvalidOption(_))));

        let zstd = CompressOptions { algo: CompressionAlgo::Zstd, level: Some(19), ..CompressOptions::default() };
        assert!(serialize(&sample(), &zstd).is_ok());
    }
}
