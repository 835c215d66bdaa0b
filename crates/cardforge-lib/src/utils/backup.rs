// Backup manager
// Point-in-time copies of the database file, taken before any migration
// that will mutate it. Backups are a human safety net: the library never
// reads them back or deletes them.

use std::fs;
use std::path::{Path, PathBuf};

/// Copy `path` to a timestamped sibling `<path>.backup.<timestamp>` and
/// return the backup path. The name is uniquified with a numeric suffix if
/// two snapshots land in the same second.
pub fn snapshot(path: &Path) -> Result<PathBuf, String> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut candidate = PathBuf::from(format!("{}.backup.{}", path.display(), stamp));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}.backup.{}_{}", path.display(), stamp, suffix));
        suffix += 1;
    }

    fs::copy(path, &candidate)
        .map_err(|e| format!("Failed to back up database to {:?}: {}", candidate, e))?;
    Ok(candidate)
}
