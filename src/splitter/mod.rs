//! Splitting a flat directory into numbered batch folders
//!
//! Loose files directly inside a directory are moved, in name order, into
//! `batch_001`, `batch_002`, ... with a fixed number of files per folder.
//! A re-run starts at the first batch index that does not exist yet, so
//! newly added files never land in a batch that was already filled.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Files per batch folder
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Prefix of batch folder names
pub const BATCH_PREFIX: &str = "batch_";

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SplitError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            SplitError::NotADirectory(_) => 1,
            SplitError::ReadDir { .. } => 2,
        }
    }
}

/// One filled batch folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub name: String,
    pub moved: usize,
    /// Files that could not be moved, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub total_files: usize,
    pub first_index: usize,
    pub batches: Vec<BatchOutcome>,
}

impl SplitReport {
    pub fn moved(&self) -> usize {
        self.batches.iter().map(|b| b.moved).sum()
    }
}

pub fn batch_name(index: usize) -> String {
    format!("{}{:03}", BATCH_PREFIX, index)
}

/// First batch index whose folder does not exist yet
pub fn next_batch_index(dir: &Path) -> usize {
    let mut index = 1;
    while dir.join(batch_name(index)).exists() {
        index += 1;
    }
    index
}

/// Regular files directly inside `dir`, sorted by path
pub fn loose_files(dir: &Path) -> Result<Vec<PathBuf>, SplitError> {
    if !dir.is_dir() {
        return Err(SplitError::NotADirectory(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| SplitError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Move the loose files of `dir` into batch folders of `batch_size`.
///
/// Per-file failures are logged and recorded; they do not stop the split.
pub fn split_directory(dir: &Path, batch_size: usize) -> Result<SplitReport, SplitError> {
    let files = loose_files(dir)?;
    let first_index = next_batch_index(dir);
    let mut report = SplitReport {
        total_files: files.len(),
        first_index,
        batches: Vec::new(),
    };

    for (offset, chunk) in files.chunks(batch_size.max(1)).enumerate() {
        let name = batch_name(first_index + offset);
        let batch_path = dir.join(&name);
        let mut outcome = BatchOutcome {
            name,
            moved: 0,
            failed: Vec::new(),
        };

        if let Err(e) = fs::create_dir_all(&batch_path) {
            warn!(path = %batch_path.display(), error = %e, "Failed to create batch folder");
            outcome
                .failed
                .extend(chunk.iter().map(|f| (f.clone(), e.to_string())));
            report.batches.push(outcome);
            continue;
        }

        for file in chunk {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            let dest = batch_path.join(file_name);
            match fs::rename(file, &dest) {
                Ok(()) => outcome.moved += 1,
                Err(e) => {
                    warn!(from = %file.display(), to = %dest.display(), error = %e, "Failed to move file");
                    outcome.failed.push((file.clone(), e.to_string()));
                }
            }
        }
        report.batches.push(outcome);
    }

    Ok(report)
}
