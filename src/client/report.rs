//! Result aggregation and the partial-failure report

use super::types::{Outcome, ScanResult};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the partial-failure report
pub const ERROR_REPORT_FILE: &str = "errors.csv";

/// Header row of the partial-failure report
pub const ERROR_REPORT_HEADER: &str = "file,error";

/// Outcome tally of one batch, derived from its results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub safe_count: usize,
    pub nsfw_count: usize,
    pub error_count: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ScanResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            summary.total += 1;
            match result.outcome() {
                Outcome::Safe => summary.safe_count += 1,
                Outcome::Nsfw => summary.nsfw_count += 1,
                Outcome::Error => summary.error_count += 1,
            }
            summary
        })
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Directory that receives the error report for a scan target: the target
/// itself when it is a directory, otherwise its parent.
pub fn report_dir(target: &Path) -> PathBuf {
    if target.is_dir() {
        return target.to_path_buf();
    }
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write `errors.csv` into `dir` when any result failed.
///
/// Returns the report path, or `None` when there was nothing to report.
pub fn write_error_report(dir: &Path, results: &[ScanResult]) -> io::Result<Option<PathBuf>> {
    let failures: Vec<(&Path, &str)> = results
        .iter()
        .filter_map(|r| r.error.as_deref().map(|e| (r.source_path.as_path(), e)))
        .collect();

    if failures.is_empty() {
        return Ok(None);
    }

    let path = dir.join(ERROR_REPORT_FILE);
    let mut writer = BufWriter::new(File::create(&path)?);
    writeln!(writer, "{}", ERROR_REPORT_HEADER)?;
    for (file, error) in &failures {
        let file = file.to_string_lossy();
        writeln!(writer, "{},{}", csv_field(&file), csv_field(error))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = failures.len(), "Wrote error report");
    Ok(Some(path))
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
