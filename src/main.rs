//! Host Backup Tool
//!
//! Compiles configured folders, plus an optional full database dump, into a
//! timestamped tar.gz archive under the backup destination directory.

// backuptool/src/main.rs
mod backup;
mod config;
mod errors;

use anyhow::{Context, Result};
use chrono::Local;
use dotenv::dotenv;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "/etc/backuptool/config.json";
const DEFAULT_BACKUP_DIR: &str = "/backup";

/// Main entry point for the backup tool
fn main() -> ExitCode {
    match run_app() {
        Ok(_) => {
            println!("✅ Backup completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_app() -> Result<()> {
    dotenv().ok();

    let config_path = env::var("BACKUPTOOL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let backup_dir = env::var("BACKUP_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BACKUP_DIR));

    println!("Checking: {}", config_path.display());
    let backup_config = config::load_or_create_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    println!("Validating backup folder");
    create_backup_dir(&backup_dir)?;

    let token = Local::now().format("%Y-%m-%d_%H_%M_%S").to_string();
    println!("🚀 Starting backup run {}", token);
    let report = backup::run_backup_flow(&backup_config, &backup_dir, &token)
        .context("Backup process failed")?;

    let skipped = report.scan_warnings.len() + report.archive_warnings.len();
    if skipped > 0 {
        println!("⚠ {} entries were skipped during this run", skipped);
    }
    println!(
        "📦 Archived {} files to {}",
        report.entries_written,
        report.archive_path.display()
    );
    Ok(())
}

/// Creates the backup destination directory when it does not exist yet.
fn create_backup_dir(folder: &Path) -> Result<()> {
    if !folder.exists() {
        println!("Creating folder {}", folder.display());
        fs::create_dir_all(folder).with_context(|| {
            format!("Failed to create backup directory: {}", folder.display())
        })?;
    }
    println!("📂 Folder {} is OK", folder.display());
    Ok(())
}
