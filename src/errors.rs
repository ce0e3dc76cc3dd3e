use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Database dump could not be started: {0}")]
    DumpLaunch(String),

    #[error("Database dump failed with {status}: {stderr}")]
    DumpFailed { status: ExitStatus, stderr: String },

    #[error("Failed to write database dump to {path}: {source}")]
    DumpWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create archive file {path}: {source}")]
    ArchiveCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to finalize archive {path}: {source}")]
    ArchiveFinalize {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
