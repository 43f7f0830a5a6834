//! CLI runner: logging setup and command dispatch for the `relzip` binary.

use std::error::Error;

use tracing_subscriber::EnvFilter;

use crate::cli::{self, Cli, Commands};
use crate::{extract, pack};

/// Environment variable holding an `EnvFilter` directive that overrides `-v`/`-q`.
pub const LOG_ENV: &str = "RELZIP_LOG";

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<(), Box<dyn Error>> {
    let cli = cli::run();
    init_logging(&cli);

    match cli.into_command() {
        Commands::Pack(args) => {
            let options = args.pack_options();
            let summary = pack::pack(&options)?;
            println!(
                "{} -> {} ({} files, {} folders, {} skipped, {} bytes)",
                options.root.display(),
                options.output.display(),
                summary.files,
                summary.folders,
                summary.skipped,
                summary.archive_bytes
            );
        }
        Commands::List { archive } => {
            let entries = extract::list_entries(&archive)?;
            println!("Archive Index ({} entries):", entries.len());
            for entry in entries {
                if entry.is_dir {
                    println!("- {}", entry.name);
                } else {
                    println!("- {} ({} bytes, {} stored)", entry.name, entry.size, entry.compressed_size);
                }
            }
        }
        Commands::Extract { archive, output } => {
            let out_dir = match output {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            extract::extract_archive(&archive, &out_dir)?;
        }
        Commands::Verify { archive, source } => {
            let report = extract::verify_archive(&archive, &source.root, &source.scan_options())?;
            for path in &report.missing {
                println!("missing:    {path}");
            }
            for path in &report.unexpected {
                println!("unexpected: {path}");
            }
            for path in &report.modified {
                println!("modified:   {path}");
            }
            if !report.is_clean() {
                return Err(format!(
                    "'{}' does not match '{}'",
                    archive.display(),
                    source.root.display()
                )
                .into());
            }
            println!("{} matches {}", archive.display(), source.root.display());
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays clean for listings.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
