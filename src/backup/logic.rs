// backuptool/src/backup/logic.rs
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backup::archive::{self, ArchiveWarning};
use crate::backup::db_dump::{self, DumpProvider};
use crate::backup::scan::{self, ScanWarning};
use crate::config::BackupConfig;

/// Summary of one completed backup run.
#[derive(Debug)]
pub struct BackupReport {
    pub archive_path: PathBuf,
    pub entries_written: usize,
    pub scan_warnings: Vec<ScanWarning>,
    pub archive_warnings: Vec<ArchiveWarning>,
}

/// Runs one backup: folder enumeration, optional database dump, archive
/// build, dump-file cleanup.
///
/// A failed dump or an uncreatable archive aborts the run; everything else
/// degrades to skipped entries reported in the returned summary. The
/// temporary dump file is removed on success and failure alike.
pub fn perform_backup_orchestration(
    config: &BackupConfig,
    backup_dir: &Path,
    provider: &dyn DumpProvider,
    token: &str,
) -> Result<BackupReport> {
    let mut manifest: Vec<PathBuf> = Vec::new();
    let mut scan_warnings = Vec::new();

    for folder in &config.folders {
        println!("📂 Compiling folder → {}", folder.display());
        let (files, warnings) = scan::collect_files(folder);
        manifest.extend(files);
        scan_warnings.extend(warnings);
    }

    let dump_file = if config.include_database {
        println!("🔍 Compiling → database");
        let dump_bytes = provider
            .dump_all_databases()
            .context("Database dump failed, aborting backup run")?;
        let dump_path = db_dump::write_dump_file(&config.temp_dump_root, token, &dump_bytes)
            .context("Failed to store database dump, aborting backup run")?;
        manifest.push(dump_path.clone());
        Some(dump_path)
    } else {
        None
    };

    println!("🗜 Compilation started");
    let archive_dest = backup_dir.join(format!("bkp-{}.tar.gz", token));
    let archive_result = archive::create_tar_gz_archive(&manifest, &archive_dest);

    // The dump file is scratch space for this run only. Remove it whether
    // or not the archive build succeeded; removal failure is logged, never
    // fatal.
    if let Some(dump_path) = dump_file {
        if let Err(e) = fs::remove_file(&dump_path) {
            eprintln!(
                "⚠ Failed to remove temporary database dump {}: {}",
                dump_path.display(),
                e
            );
        }
    }

    let archive_report = archive_result
        .with_context(|| format!("Failed to build archive at {}", archive_dest.display()))?;
    println!("✅ File compiled → {}", archive_dest.display());

    Ok(BackupReport {
        archive_path: archive_report.archive_path,
        entries_written: archive_report.entries_written,
        scan_warnings,
        archive_warnings: archive_report.skipped,
    })
}
