use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::collect::ScanOptions;
use crate::common::{ExcludeRule, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_OUTPUT, DEFAULT_ROOT};
use crate::compress::{CompressOptions, CompressionAlgo, OutputEncoding};
use crate::pack::PackOptions;

/// Packs a build output directory into a release ZIP archive.
///
/// Run without arguments to pack `./dist` into `./release.zip`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub pack: PackArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RELZIP_LOG overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Pack a directory into a release archive (the default when no command is given).
    #[command(alias = "p")]
    Pack(PackArgs),

    /// List the contents of an archive without extracting it.
    #[command(alias = "l")]
    List {
        /// The archive file to list contents of.
        #[arg(required = true)]
        archive: PathBuf,
    },

    /// Extract an archive.
    #[command(alias = "x")]
    Extract {
        /// The archive file to extract.
        #[arg(required = true)]
        archive: PathBuf,

        /// The directory where files will be extracted. Defaults to the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that an archive matches its source directory.
    Verify {
        /// The archive file to check.
        #[arg(required = true)]
        archive: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Which directory to read and which files to leave out.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// The directory to pack.
    #[arg(long, env = "RELZIP_ROOT", default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// Extra file extension to leave out (repeatable), on top of `map`. Matches the last
    /// suffix only, case-sensitive.
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_ext: Vec<String>,

    /// Do not leave out `.map` files by default. Only `--exclude-ext` values apply.
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Keep raw directory enumeration order instead of sorting entries by name.
    #[arg(long)]
    pub no_sort: bool,
}

impl SourceArgs {
    pub fn scan_options(&self) -> ScanOptions {
        let defaults: &[&str] =
            if self.no_default_excludes { &[] } else { DEFAULT_EXCLUDED_EXTENSIONS };
        let extensions =
            defaults.iter().copied().chain(self.exclude_ext.iter().map(String::as_str));
        ScanOptions { exclude: ExcludeRule::new(extensions), sorted: !self.no_sort }
    }
}

#[derive(Args, Clone, Debug)]
pub struct PackArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// The path for the output archive. Overwritten if it exists.
    #[arg(short, long, env = "RELZIP_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Compression method for file entries.
    #[arg(long, value_enum, default_value_t = Compression::Deflate)]
    pub compression: Compression,

    /// Compression level (deflate 1-9, zstd 1-22). Not accepted with `store`.
    #[arg(long)]
    pub level: Option<i32>,

    /// Stamp every entry with a fixed timestamp so identical input gives identical bytes.
    #[arg(long)]
    pub reproducible: bool,

    /// Write the archive as base64 text instead of raw ZIP bytes.
    #[arg(long)]
    pub base64: bool,
}

impl PackArgs {
    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            root: self.source.root.clone(),
            output: self.output.clone(),
            scan: self.source.scan_options(),
            compress: CompressOptions {
                algo: self.compression.into(),
                level: self.level,
                encoding: if self.base64 { OutputEncoding::Base64 } else { OutputEncoding::Binary },
                reproducible: self.reproducible,
            },
        }
    }
}

/// Compression method as spelled on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Store entries uncompressed.
    Store,
    /// DEFLATE, readable everywhere.
    Deflate,
    /// Zstandard. Needs a modern unzip tool.
    Zstd,
}

impl From<Compression> for CompressionAlgo {
    fn from(c: Compression) -> Self {
        match c {
            Compression::Store => CompressionAlgo::Store,
            Compression::Deflate => CompressionAlgo::Deflate,
            Compression::Zstd => CompressionAlgo::Zstd,
        }
    }
}

impl Cli {
    /// The command to run. A bare invocation means `pack` with the top-level arguments.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Pack(self.pack))
    }
}

/// Parses command-line arguments using `clap`.
pub fn run() -> Cli {
    Cli::parse()
}
