//! `pixelpuritan` -- scanning client for the PixelPuritan server.
//!
//! - `pixelpuritan scan <path>` -- classify a file or every image below a
//!   directory, optionally sorting them into `nsfw/` and `safe/`.
//! - `pixelpuritan bench --image <file>` -- measure detect latency and
//!   throughput.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use pixelpuritan::Config;
use pixelpuritan::client::{
    BatchSummary, BenchReport, BoundedScanner, Outcome, Placement, RetryPolicy,
    RetryingHttpClient, ScanProgress, ScanResult, discover, organize, report_dir, run_bench,
    write_error_report,
};
use pixelpuritan::utils::format_duration;
use pixelpuritan::utils::logging::{LogFormat, init_logging};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// PixelPuritan scanning client.
#[derive(Parser)]
#[command(name = "pixelpuritan", about = "NSFW image scanning client", version)]
struct Cli {
    /// Detect endpoint (overrides PIXELPURITAN_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a file or every image in a directory tree.
    Scan(ScanArgs),
    /// Send one image repeatedly and report latency.
    Bench(BenchArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// File or directory to scan.
    path: PathBuf,

    /// Move classified files into nsfw/ and safe/ below the directory.
    #[arg(short = 'm', long = "move")]
    move_files: bool,

    /// Print one row per file.
    #[arg(short, long)]
    verbose: bool,

    /// Concurrent uploads (overrides PIXELPURITAN_CONCURRENCY).
    #[arg(short, long)]
    concurrency: Option<usize>,
}

#[derive(Args)]
struct BenchArgs {
    /// Image to send.
    #[arg(long)]
    image: PathBuf,

    /// Number of requests.
    #[arg(long, default_value_t = 50)]
    rounds: usize,

    /// Requests in flight at once.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_logging(Level::WARN, LogFormat::from_env());

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(url) = cli.api_url {
        config.client.api_url = url;
    }

    let result = match cli.command {
        Commands::Scan(args) => scan(args, config).await,
        Commands::Bench(args) => bench(args, config).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn scan(args: ScanArgs, mut config: Config) -> anyhow::Result<ExitCode> {
    if let Some(concurrency) = args.concurrency {
        config.client.concurrency = concurrency;
    }

    let files = discover(&args.path)
        .with_context(|| format!("cannot scan {}", args.path.display()))?;
    if files.is_empty() {
        println!("No image files found in {}", args.path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let endpoint = config.client.api_url.clone();
    let client = Arc::new(RetryingHttpClient::from_config(&config.client)?);
    if let Err(e) = client.probe(&endpoint).await {
        eprintln!("Cannot reach {}: {}", endpoint, e);
        return Ok(ExitCode::FAILURE);
    }

    let total = files.len();
    println!(
        "Scanning {} file(s) with concurrency {}",
        total, config.client.concurrency
    );
    let progress = ScanProgress::with_callback(move |result, done| {
        eprintln!("[{}/{}] {} {}", done, total, verdict(result), result.path().display());
    });

    let scanner = BoundedScanner::new(client, endpoint, config.client.concurrency)
        .with_progress(progress);
    let mut results = scanner.scan(files).await;

    let placements = if args.move_files {
        if args.path.is_dir() {
            organize(&args.path, &results)
        } else {
            eprintln!("--move only applies when scanning a directory");
            HashMap::new()
        }
    } else {
        HashMap::new()
    };

    let summary = BatchSummary::from_results(&results);
    if args.verbose {
        results.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        print_details(&results, &placements);
    }
    print_summary(&summary);

    if summary.has_errors() {
        match write_error_report(&report_dir(&args.path), &results) {
            Ok(Some(path)) => println!("Errors written to {}", path.display()),
            Ok(None) => {}
            Err(e) => eprintln!("Failed to write error report: {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn bench(args: BenchArgs, config: Config) -> anyhow::Result<ExitCode> {
    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("cannot read {}", args.image.display()))?;
    let file_name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bench.png".to_string());

    let endpoint = config.client.api_url.clone();
    let client = RetryingHttpClient::from_config(&config.client)?
        .with_policy(RetryPolicy::single_attempt());

    println!(
        "Sending {} x {} to {} ({} concurrent)",
        args.rounds, file_name, endpoint, args.concurrency
    );
    let report = run_bench(
        Arc::new(client),
        &endpoint,
        image.into(),
        &file_name,
        args.rounds,
        args.concurrency,
    )
    .await;

    print_bench(&report);
    Ok(ExitCode::SUCCESS)
}

fn verdict(result: &ScanResult) -> &'static str {
    match result.outcome() {
        Outcome::Nsfw => "NSFW",
        Outcome::Safe => "safe",
        Outcome::Error => "error",
    }
}

fn print_summary(summary: &BatchSummary) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["TOTAL", "NSFW", "SAFE", "ERRORS"]);
    table.add_row([
        summary.total.to_string(),
        summary.nsfw_count.to_string(),
        summary.safe_count.to_string(),
        summary.error_count.to_string(),
    ]);
    println!("{table}");
}

fn print_details(results: &[ScanResult], placements: &HashMap<PathBuf, Placement>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["FILE", "VERDICT", "CONFIDENCE", "DETAIL"]);

    for result in results {
        let confidence = result
            .confidence
            .map(|c| format!("{:.2}%", c))
            .unwrap_or_else(|| "-".to_string());
        let detail = match (&result.error, placements.get(&result.source_path)) {
            (Some(error), _) => error.clone(),
            (None, Some(Placement::Moved(dest))) => format!("moved to {}", short(dest)),
            (None, Some(Placement::Unchanged)) => "already sorted".to_string(),
            (None, Some(Placement::Failed(e))) => format!("move failed: {}", e),
            (None, None) => String::new(),
        };
        table.add_row([
            result.path().display().to_string(),
            verdict(result).to_string(),
            confidence,
            detail,
        ]);
    }
    println!("{table}");
}

fn print_bench(report: &BenchReport) {
    let ms = |d: Option<Duration>| {
        d.map(|d| format!("{:.1} ms", d.as_secs_f64() * 1000.0))
            .unwrap_or_else(|| "-".to_string())
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["METRIC", "VALUE"]);
    table.add_row(["OK".to_string(), report.ok.to_string()]);
    table.add_row(["Failed".to_string(), report.failed.to_string()]);
    table.add_row(["Avg latency".to_string(), ms(report.average())]);
    table.add_row(["Min latency".to_string(), ms(report.min())]);
    table.add_row(["Max latency".to_string(), ms(report.max())]);
    table.add_row([
        "Total time".to_string(),
        format_duration(report.elapsed.as_millis() as u64),
    ]);
    table.add_row([
        "Throughput".to_string(),
        format!("{:.2} req/s", report.throughput()),
    ]);
    println!("{table}");
}

fn short(path: &Path) -> String {
    let mut parts: Vec<_> = path
        .components()
        .rev()
        .take(2)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.reverse();
    parts.join("/")
}
