use crate::errors::Result;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension appended to a document's full name to form its backup name.
pub const BACKUP_EXTENSION: &str = "bak";

/// Statistics from an `undo` operation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UndoStats {
    /// The number of backup files found.
    pub found: usize,
    /// The number of documents successfully restored from backups.
    pub restored: usize,
}

/// Statistics from a `clean-backups` operation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub found: usize,
    pub removed: usize,
    /// Combined size of the backups found, in bytes.
    pub bytes: u64,
}

/// Returns the backup location for a document: `Trust Summary.docx` becomes
/// `Trust Summary.docx.bak` in the same folder.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// Copies `path` to its backup location, replacing any older backup.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::copy(path, &backup)?;
    log::debug!("Backed up {} to {}", path.display(), backup.display());
    Ok(backup)
}

/// Lists the document backups (`*.docx.bak`) directly inside `dir`.
fn find_backups(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut backups = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && is_document_backup(path) {
            backups.push(path.to_path_buf());
        }
    }
    Ok(backups)
}

fn is_document_backup(path: &Path) -> bool {
    let has_ext = |p: &Path, ext: &str| {
        p.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(ext))
    };
    has_ext(path, BACKUP_EXTENSION) && has_ext(&path.with_extension(""), "docx")
}

/// Restores every document in `dir` from its backup.
///
/// # Arguments
///
/// * `dir` - The folder that was processed.
/// * `keep_backups` - If `false`, the `.bak` files are deleted after being restored.
pub fn undo(dir: &Path, keep_backups: bool) -> Result<UndoStats> {
    let mut stats = UndoStats::default();

    for backup in find_backups(dir)? {
        stats.found += 1;
        let original = backup.with_extension("");
        fs::copy(&backup, &original)?;
        if !keep_backups {
            fs::remove_file(&backup)?;
        }
        stats.restored += 1;
        log::info!("Restored {}", original.display());
    }

    Ok(stats)
}

/// Removes document backups from `dir` without restoring them.
///
/// In dry-run mode the backups are only counted.
pub fn clean(dir: &Path, dry_run: bool) -> Result<CleanStats> {
    let mut stats = CleanStats::default();

    for backup in find_backups(dir)? {
        stats.found += 1;
        if let Ok(metadata) = backup.metadata() {
            stats.bytes += metadata.len();
        }

        if dry_run {
            println!("Would remove: {}", backup.display());
            continue;
        }

        match fs::remove_file(&backup) {
            Ok(_) => {
                stats.removed += 1;
                println!("Removed: {}", backup.display());
            }
            Err(e) => {
                log::warn!("Failed to remove {}: {}", backup.display(), e);
            }
        }
    }

    Ok(stats)
}

/// The main entry point for the `undo` command.
pub fn run_undo(dir: PathBuf, keep_backups: bool) -> Result<()> {
    let stats = undo(&dir, keep_backups)?;
    println!(
        "\nBackups found: {}, restored: {}",
        stats.found, stats.restored
    );
    Ok(())
}

/// The main entry point for the `clean-backups` command.
pub fn run_clean_backups(dir: PathBuf, dry_run: bool) -> Result<()> {
    println!("Searching for backup files in {}...\n", dir.display());

    let stats = clean(&dir, dry_run)?;
    let size_mb = stats.bytes as f64 / 1_048_576.0;

    println!("\n{}", "-".repeat(50));
    println!("Backup files found: {}", stats.found);
    if dry_run {
        println!("Total size: {size_mb:.2} MB");
        println!("\nRun without --dry-run to remove these files");
    } else {
        println!("Backup files removed: {}", stats.removed);
        println!("Space freed: {size_mb:.2} MB");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_appends_extension() {
        assert_eq!(
            backup_path(Path::new("/tmp/Trust Summary.docx")),
            PathBuf::from("/tmp/Trust Summary.docx.bak")
        );
    }

    #[test]
    fn test_undo_restores_and_removes_backups() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("RLT.docx");
        fs::write(&doc, "original").unwrap();
        create_backup(&doc).unwrap();
        fs::write(&doc, "changed").unwrap();
        fs::write(temp_dir.path().join("notes.txt.bak"), "unrelated").unwrap();

        let stats = undo(temp_dir.path(), false).unwrap();

        assert_eq!(stats, UndoStats { found: 1, restored: 1 });
        assert_eq!(fs::read_to_string(&doc).unwrap(), "original");
        assert!(!backup_path(&doc).exists());
        assert!(temp_dir.path().join("notes.txt.bak").exists());
    }

    #[test]
    fn test_undo_can_keep_backups() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("RLT.docx");
        fs::write(&doc, "original").unwrap();
        create_backup(&doc).unwrap();

        undo(temp_dir.path(), true).unwrap();
        assert!(backup_path(&doc).exists());
    }

    #[test]
    fn test_clean_dry_run_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let doc = temp_dir.path().join("Trust Summary.docx");
        fs::write(&doc, "12345").unwrap();
        create_backup(&doc).unwrap();

        let preview = clean(temp_dir.path(), true).unwrap();
        assert_eq!(preview, CleanStats { found: 1, removed: 0, bytes: 5 });
        assert!(backup_path(&doc).exists());

        let stats = clean(temp_dir.path(), false).unwrap();
        assert_eq!(stats.removed, 1);
        assert!(!backup_path(&doc).exists());
        assert!(doc.exists());
    }
}
