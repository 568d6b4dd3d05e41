//! `pp-split` -- move the loose files of a directory into `batch_NNN`
//! folders of a fixed size, resuming after the last existing batch.
//!
//! Exit codes: 0 on success (including nothing to do), 1 when the argument
//! is not a directory, 2 when the directory cannot be read.

use clap::Parser;
use pixelpuritan::splitter::{DEFAULT_BATCH_SIZE, batch_name, split_directory};
use pixelpuritan::utils::logging::{LogFormat, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

/// Split a directory into numbered batch folders.
#[derive(Parser)]
#[command(name = "pp-split", version)]
struct Cli {
    /// Directory whose loose files are split.
    directory: PathBuf,

    /// Files per batch folder.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

fn main() -> ExitCode {
    init_logging(Level::WARN, LogFormat::from_env());
    let cli = Cli::parse();

    let report = match split_directory(&cli.directory, cli.batch_size) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if report.total_files == 0 {
        println!("No loose files found to split.");
        return ExitCode::SUCCESS;
    }

    println!(
        "Found {} files. Resuming split at {}...",
        report.total_files,
        batch_name(report.first_index)
    );
    for batch in &report.batches {
        println!("Processed {}: {} images.", batch.name, batch.moved);
        for (file, error) in &batch.failed {
            eprintln!("Failed to move {}: {}", file.display(), error);
        }
    }

    ExitCode::SUCCESS
}
