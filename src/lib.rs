//! # relzip Core Library
//!
//! This crate packages a build output directory into a single release archive. It is used by
//! the `relzip` command-line application, but its public API can also be used directly.
//!
//! ## Key Modules
//!
//! - [`archive`]: The in-memory archive tree (folders and files) built before serialization.
//! - [`collect`]: Walks a source directory and builds the archive tree, skipping excluded files.
//! - [`compress`]: Serializes the archive tree to a ZIP container through a codec.
//! - [`pack`]: The end-to-end operation: walk, serialize, write.
//! - [`extract`]: Lists, extracts and verifies an archive that has already been written.
//!
//! ## Examples
//!
//! ```no_run
//! use relzip::pack::{pack, PackOptions};
//!
//! // Packs ./dist into ./release.zip, leaving out *.map files.
//! let summary = pack(&PackOptions::default())?;
//! println!("{} files packed", summary.files);
//! # Ok::<(), relzip::ArchiverError>(())
//! ```

pub mod archive;
pub mod cli;
pub mod cli_runner;
pub mod collect;
pub mod common;
pub mod compress;
pub mod extract;
pub mod pack;

pub mod error;
pub use error::{ArchiverError, Result};

// Binary-safe filesystem helpers
pub mod fsx;
