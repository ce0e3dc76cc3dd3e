// backuptool/src/backup/scan.rs
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A per-entry traversal problem. The scan records it and keeps walking.
#[derive(Debug)]
pub struct ScanWarning {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Skipped {} during scan: {}", path.display(), self.message),
            None => write!(f, "Scan error: {}", self.message),
        }
    }
}

/// Recursively collects every regular file reachable under `root`.
///
/// Directories, symlinks and special files are not recorded. A failure on
/// any single entry (permission denied, file vanished mid-walk) becomes a
/// warning and the walk continues with the remaining entries, so one bad
/// entry never aborts a backup run.
pub fn collect_files(root: &Path) -> (Vec<PathBuf>, Vec<ScanWarning>) {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
            Err(e) => {
                let warning = ScanWarning {
                    path: e.path().map(Path::to_path_buf),
                    message: e.to_string(),
                };
                eprintln!("⚠ {}", warning);
                warnings.push(warning);
            }
        }
    }

    (files, warnings)
}
