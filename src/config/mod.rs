// backuptool/src/config/mod.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

// Structs for deserializing config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJsonConfig {
    pub db: bool,
    pub folders: Vec<String>,
    pub user_mariadb: String,
    pub pass_mariadb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dump_root: Option<PathBuf>,
}

// Application's internal configuration struct
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub include_database: bool,
    pub folders: Vec<PathBuf>,
    pub db_user: String,
    pub db_password: String,
    pub temp_dump_root: PathBuf,
}

/// The configuration written on first run when no config file exists yet.
fn default_raw_config() -> RawJsonConfig {
    RawJsonConfig {
        db: false,
        folders: [
            "/etc",
            "/home",
            "/var/log",
            "/var/www",
            "/usr/local/bin",
            "/usr/local/sbin",
            "/var/spool/cron",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        user_mariadb: "root".to_string(),
        pass_mariadb: "root".to_string(),
        temp_dump_root: None,
    }
}

/// Loads the backup configuration, writing the default document first if the
/// file does not exist.
pub fn load_or_create_config(config_path: &Path) -> Result<BackupConfig> {
    if config_path.exists() {
        println!("Config file exists");
    } else {
        println!("Config file does not exist\nCreating file");
        write_default_config(config_path)?;
        println!("File created at {}", config_path.display());
    }

    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    let raw_config: RawJsonConfig = serde_json::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse JSON from config file at {}",
            config_path.display()
        )
    })?;

    backup_config_from_raw(raw_config)
}

/// Converts the on-disk JSON shape into the internal configuration,
/// validating the folder list.
pub fn backup_config_from_raw(raw_config: RawJsonConfig) -> Result<BackupConfig> {
    let mut folders = Vec::with_capacity(raw_config.folders.len());
    for folder in &raw_config.folders {
        let path = PathBuf::from(folder);
        if !path.is_absolute() {
            return Err(anyhow::anyhow!(
                "Configured folder '{}' must be an absolute path.",
                folder
            ));
        }
        folders.push(path);
    }

    let temp_dump_root = raw_config
        .temp_dump_root
        .unwrap_or_else(|| PathBuf::from("/"));
    if !temp_dump_root.is_absolute() {
        return Err(anyhow::anyhow!(
            "temp_dump_root '{}' must be an absolute path.",
            temp_dump_root.display()
        ));
    }

    Ok(BackupConfig {
        include_database: raw_config.db,
        folders,
        db_user: raw_config.user_mariadb,
        db_password: raw_config.pass_mariadb,
        temp_dump_root,
    })
}

fn write_default_config(config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                parent.display()
            )
        })?;
    }

    let json_data = serde_json::to_string_pretty(&default_raw_config())
        .context("Failed to serialize default config")?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        // The file carries database credentials, keep it out of world-readable.
        options.mode(0o640);
    }
    let mut file = options.open(config_path).with_context(|| {
        format!(
            "Failed to create default config file at {}",
            config_path.display()
        )
    })?;
    file.write_all(json_data.as_bytes()).with_context(|| {
        format!(
            "Failed to write default config file at {}",
            config_path.display()
        )
    })?;
    Ok(())
}
