// backuptool/src/backup/archive.rs
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tar::{Builder, Header};

use crate::errors::{BackupError, Result};

// Entry permissions are fixed; source file modes are not round-tripped.
const ENTRY_MODE: u32 = 0o644;

/// Outcome of one archive build: where it landed, what went in, what was
/// skipped along the way.
#[derive(Debug)]
pub struct ArchiveReport {
    pub archive_path: PathBuf,
    pub entries_written: usize,
    pub skipped: Vec<ArchiveWarning>,
}

/// A manifest entry that could not be archived. The build records it and
/// moves on to the next entry.
#[derive(Debug)]
pub struct ArchiveWarning {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ArchiveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipped {} while archiving: {}",
            self.path.display(),
            self.message
        )
    }
}

/// Creates a GZipped TAR archive containing one entry per manifest path,
/// in manifest order.
///
/// Entry names are the source paths made relative to the filesystem root,
/// so extracting the archive at `/` restores the original layout. A file
/// that cannot be read or relativized is skipped with a warning rather than
/// failing the build. Failing to create the destination file is fatal.
pub fn create_tar_gz_archive(files: &[PathBuf], archive_dest_path: &Path) -> Result<ArchiveReport> {
    if let Some(parent) = archive_dest_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| BackupError::ArchiveCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    println!(
        "Creating tar.gz archive at {} ({} files)",
        archive_dest_path.display(),
        files.len()
    );

    let archive_file =
        File::create(archive_dest_path).map_err(|e| BackupError::ArchiveCreate {
            path: archive_dest_path.to_path_buf(),
            source: e,
        })?;
    let enc = GzEncoder::new(archive_file, Compression::default());
    let mut tar_builder = Builder::new(enc);

    let mut entries_written = 0;
    let mut skipped = Vec::new();
    for file_path in files {
        match append_file_entry(&mut tar_builder, file_path) {
            Ok(()) => entries_written += 1,
            Err(message) => {
                let warning = ArchiveWarning {
                    path: file_path.clone(),
                    message,
                };
                eprintln!("⚠ {}", warning);
                skipped.push(warning);
            }
        }
    }

    // Flush the tar terminator, the gzip trailer and the file, in that
    // order. An archive with skipped entries must still extract cleanly.
    let enc = tar_builder
        .into_inner()
        .map_err(|e| BackupError::ArchiveFinalize {
            path: archive_dest_path.to_path_buf(),
            source: e,
        })?;
    enc.finish().map_err(|e| BackupError::ArchiveFinalize {
        path: archive_dest_path.to_path_buf(),
        source: e,
    })?;

    println!(
        "✓ Tar.gz archive created successfully at {}",
        archive_dest_path.display()
    );
    Ok(ArchiveReport {
        archive_path: archive_dest_path.to_path_buf(),
        entries_written,
        skipped,
    })
}

fn append_file_entry(
    tar_builder: &mut Builder<GzEncoder<File>>,
    file_path: &Path,
) -> std::result::Result<(), String> {
    let data = fs::read(file_path).map_err(|e| format!("failed to read file: {}", e))?;
    let name = file_path
        .strip_prefix("/")
        .map_err(|_| "path is not absolute, cannot relativize against /".to_string())?;

    let mut header = Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(ENTRY_MODE);
    tar_builder
        .append_data(&mut header, name, data.as_slice())
        .map_err(|e| format!("failed to append entry: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tar::Archive;
    use tempfile::TempDir;

    fn read_entries(archive_path: &Path) -> anyhow::Result<Vec<(String, u32, Vec<u8>)>> {
        let mut archive = Archive::new(GzDecoder::new(File::open(archive_path)?));
        let mut entries = Vec::new();
        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            let mode = entry.header().mode()?;
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            entries.push((name, mode, content));
        }
        Ok(entries)
    }

    #[test]
    fn test_entries_keep_manifest_order_and_fixed_mode() -> anyhow::Result<()> {
        let src = TempDir::new()?;
        let dest = TempDir::new()?;
        fs::write(src.path().join("b.txt"), b"second")?;
        fs::write(src.path().join("a.txt"), b"first")?;

        let manifest = vec![src.path().join("b.txt"), src.path().join("a.txt")];
        let archive_path = dest.path().join("out.tar.gz");
        let report = create_tar_gz_archive(&manifest, &archive_path)?;

        assert_eq!(report.entries_written, 2);
        assert!(report.skipped.is_empty());

        let entries = read_entries(&archive_path)?;
        let expected_first = src.path().join("b.txt");
        let expected_second = src.path().join("a.txt");
        assert_eq!(
            entries[0].0,
            expected_first.strip_prefix("/")?.to_string_lossy()
        );
        assert_eq!(
            entries[1].0,
            expected_second.strip_prefix("/")?.to_string_lossy()
        );
        for (_, mode, _) in &entries {
            assert_eq!(*mode, 0o644);
        }
        assert_eq!(entries[0].2, b"second");
        assert_eq!(entries[1].2, b"first");
        Ok(())
    }

    #[test]
    fn test_unreadable_entry_is_skipped_and_archive_stays_valid() -> anyhow::Result<()> {
        let src = TempDir::new()?;
        let dest = TempDir::new()?;
        fs::write(src.path().join("kept.txt"), b"kept")?;

        let manifest = vec![
            src.path().join("kept.txt"),
            src.path().join("vanished.txt"),
            src.path().join("also-kept.txt"),
        ];
        fs::write(src.path().join("also-kept.txt"), b"also")?;

        let archive_path = dest.path().join("out.tar.gz");
        let report = create_tar_gz_archive(&manifest, &archive_path)?;

        assert_eq!(report.entries_written, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, src.path().join("vanished.txt"));

        // Trailer must be intact despite the skip.
        let entries = read_entries(&archive_path)?;
        assert_eq!(entries.len(), 2);
        Ok(())
    }

    #[test]
    fn test_relative_manifest_path_is_skipped() -> anyhow::Result<()> {
        let dest = TempDir::new()?;
        let archive_path = dest.path().join("out.tar.gz");

        let report =
            create_tar_gz_archive(&[PathBuf::from("relative/x.txt")], &archive_path)?;

        assert_eq!(report.entries_written, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(read_entries(&archive_path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_manifest_still_produces_extractable_archive() -> anyhow::Result<()> {
        let dest = TempDir::new()?;
        let archive_path = dest.path().join("empty.tar.gz");

        let report = create_tar_gz_archive(&[], &archive_path)?;

        assert_eq!(report.entries_written, 0);
        assert!(read_entries(&archive_path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_unwritable_destination_is_fatal() -> anyhow::Result<()> {
        let dest = TempDir::new()?;
        // Parent of the destination is a regular file, creation must fail.
        let blocker = dest.path().join("blocker");
        fs::write(&blocker, b"")?;
        let archive_path = blocker.join("out.tar.gz");

        let result = create_tar_gz_archive(&[], &archive_path);

        assert!(matches!(
            result,
            Err(BackupError::ArchiveCreate { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_destination_parent_is_created() -> anyhow::Result<()> {
        let src = TempDir::new()?;
        let dest = TempDir::new()?;
        fs::write(src.path().join("f"), b"f")?;
        let archive_path = dest.path().join("deep").join("er").join("out.tar.gz");

        let report = create_tar_gz_archive(&[src.path().join("f")], &archive_path)?;

        assert_eq!(report.entries_written, 1);
        assert!(archive_path.exists());
        Ok(())
    }
}
