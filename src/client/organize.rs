//! Moving classified files into `nsfw/` and `safe/`

use super::types::{Outcome, ScanResult};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const NSFW_DIR: &str = "nsfw";
pub const SAFE_DIR: &str = "safe";

/// What happened to one file during organizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Moved(PathBuf),
    /// Already in its destination folder
    Unchanged,
    Failed(String),
}

/// Move each classified file under `root` into `root/nsfw` or `root/safe`.
///
/// Failed scans stay where they are and are not listed. A move failure is
/// recorded for that file and the remaining files are still processed.
pub fn organize(root: &Path, results: &[ScanResult]) -> HashMap<PathBuf, Placement> {
    let mut placements = HashMap::new();

    for result in results {
        let folder = match result.outcome() {
            Outcome::Nsfw => NSFW_DIR,
            Outcome::Safe => SAFE_DIR,
            Outcome::Error => continue,
        };

        let placement = match move_into(&result.source_path, &root.join(folder)) {
            Ok(Some(dest)) => {
                debug!(from = %result.source_path.display(), to = %dest.display(), "Moved file");
                Placement::Moved(dest)
            }
            Ok(None) => Placement::Unchanged,
            Err(e) => {
                warn!(path = %result.source_path.display(), error = %e, "Failed to move file");
                Placement::Failed(e.to_string())
            }
        };
        placements.insert(result.source_path.clone(), placement);
    }

    placements
}

/// Move `src` into `dest_dir`, keeping its file name.
///
/// Returns `None` when the file already lives in `dest_dir`. An existing
/// file of the same name is never overwritten.
pub fn move_into(src: &Path, dest_dir: &Path) -> io::Result<Option<PathBuf>> {
    let name = src.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;

    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(name);

    if let (Ok(a), Ok(b)) = (src.canonicalize(), dest.canonicalize()) {
        if a == b {
            return Ok(None);
        }
    }
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }

    if fs::rename(src, &dest).is_err() {
        // rename fails across filesystems
        fs::copy(src, &dest)?;
        fs::remove_file(src)?;
    }
    Ok(Some(dest))
}
