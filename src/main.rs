//! Main entry point for the unzar CLI application.
//!
//! Every failure is fatal: the error is printed to stderr and the process
//! exits with status 1. Running without `-e` prints usage and exits 0.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use unzar::{Cli, LocalFileReader, ReadAt, ZarExtractor};

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // A missing archive is not an error, just a request for usage
    let Some(archive) = cli.archive.as_deref() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let dest = cli.destination()?;

    let reader = LocalFileReader::new(archive)
        .with_context(|| format!("error opening {}", archive.display()))?;
    process_zar(Arc::new(reader), dest, &cli)
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// List or extract a ZAR archive based on CLI options.
fn process_zar<R: ReadAt>(reader: Arc<R>, dest: Option<&Path>, cli: &Cli) -> Result<()> {
    let extractor = ZarExtractor::new(reader);

    if cli.list {
        return list_files(&extractor);
    }

    extractor.extract_all(dest, |entry| {
        if !cli.quiet {
            println!(
                "Extracting: {} ({} bytes compressed)",
                entry.file_name, entry.compressed_size
            );
        }
    })?;

    Ok(())
}

/// Print each entry's payload offset, compressed size and name.
fn list_files<R: ReadAt>(extractor: &ZarExtractor<R>) -> Result<()> {
    let entries = extractor.list_files()?;

    println!("{:>10}  {:>10}  Name", "Offset", "Size");
    println!("{}", "-".repeat(36));

    let mut total_compressed = 0u64;
    for entry in &entries {
        println!(
            "{:>10}  {:>10}  {}",
            entry.data_offset, entry.compressed_size, entry.file_name
        );
        total_compressed += entry.compressed_size;
    }

    println!("{}", "-".repeat(36));
    println!(
        "{:>10}  {:>10}  {} files",
        "",
        total_compressed,
        entries.len()
    );

    Ok(())
}
