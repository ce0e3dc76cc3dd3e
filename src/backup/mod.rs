// backuptool/src/backup/mod.rs
pub(crate) mod archive; // Tarball creation
pub(crate) mod db_dump; // Database dumping logic
mod logic;
pub(crate) mod scan; // Folder enumeration

use anyhow::Result;
use std::path::Path;

use crate::config::BackupConfig;
use db_dump::MariaDbDump;

pub use logic::BackupReport;

/// Public entry point for the backup process.
///
/// Wires the production database dump provider into the orchestration for
/// one run identified by `token`.
pub fn run_backup_flow(
    config: &BackupConfig,
    backup_dir: &Path,
    token: &str,
) -> Result<BackupReport> {
    let provider = MariaDbDump::new(&config.db_user, &config.db_password);
    logic::perform_backup_orchestration(config, backup_dir, &provider, token)
}
