// backuptool/src/backup/db_dump.rs
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which;

use crate::errors::{BackupError, Result};

/// Produces a full dump of every database as raw bytes.
///
/// The backup flow only depends on this trait, so tests can substitute a
/// provider with deterministic content instead of a running database engine.
pub trait DumpProvider {
    fn dump_all_databases(&self) -> Result<Vec<u8>>;
}

/// Production provider backed by the external `mariadb-dump` utility.
pub struct MariaDbDump {
    user: String,
    password: String,
}

impl MariaDbDump {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        MariaDbDump {
            user: user.into(),
            password: password.into(),
        }
    }
}

// Helper function to find the mariadb-dump executable
fn find_dump_executable() -> Result<PathBuf> {
    which("mariadb-dump").map_err(|e| {
        BackupError::DumpLaunch(format!(
            "mariadb-dump executable not found in PATH ({}). Please ensure MariaDB client tools are installed and in your PATH.",
            e
        ))
    })
}

impl DumpProvider for MariaDbDump {
    fn dump_all_databases(&self) -> Result<Vec<u8>> {
        let dump_path = find_dump_executable()?;
        println!("Found mariadb-dump executable at: {}", dump_path.display());

        let output = Command::new(&dump_path)
            .arg(format!("-u{}", self.user))
            .arg(format!("-p{}", self.password))
            .arg("--all-databases")
            .output()
            .map_err(|e| {
                BackupError::DumpLaunch(format!(
                    "Failed to execute {}: {}",
                    dump_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(BackupError::DumpFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        // The dump payload is stdout; anything on stderr is diagnostics.
        if !output.stderr.is_empty() {
            eprintln!(
                "⚠ mariadb-dump diagnostics: {}",
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }
        Ok(output.stdout)
    }
}

/// Writes the captured dump to `<temp_dump_root>/db-<token>.sql`.
///
/// The file holds a full dump of every database, so it is created readable
/// by the owner only.
pub fn write_dump_file(temp_dump_root: &Path, token: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = temp_dump_root.join(format!("db-{}.sql", token));

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&path).map_err(|e| BackupError::DumpWrite {
        path: path.clone(),
        source: e,
    })?;
    if let Err(e) = file.write_all(contents) {
        // Do not leave a half-written dump behind.
        let _ = fs::remove_file(&path);
        return Err(BackupError::DumpWrite {
            path,
            source: e,
        });
    }
    Ok(path)
}
