//
// storage.rs
// DicomDir-Tools-rs
//
// Backup copy of an existing DICOMDIR for the duration of one build cycle.
//
// Thales Matheus Mendonça Santos - November 2025

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Context, Result};

/// Filename extension of the backup copy.
pub const BACKUP_EXTENSION: &str = ".BAK";

/// `<path>.BAK`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// A backup owned by the controller until the next successful write.
#[derive(Debug)]
pub struct Backup {
    original: PathBuf,
    copy: PathBuf,
}

impl Backup {
    /// Copies `path` to `<path>.BAK` when it exists. A stale backup is replaced.
    pub fn create(path: &Path) -> Result<Option<Backup>> {
        if !path.is_file() {
            return Ok(None);
        }
        let copy = backup_path(path);
        if copy.exists() {
            fs::remove_file(&copy).context(format!("removing old backup {}", copy.display()))?;
        }
        fs::copy(path, &copy).context(format!("creating backup {}", copy.display()))?;
        debug!(file = %copy.display(), "backup created");
        Ok(Some(Backup {
            original: path.to_path_buf(),
            copy,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.copy
    }

    /// Deletes the backup after the new file has been written.
    pub fn discard(self) -> Result<()> {
        fs::remove_file(&self.copy).context(format!("deleting backup {}", self.copy.display()))?;
        debug!(file = %self.copy.display(), "backup deleted");
        Ok(())
    }

    /// Puts the backed up file back in place, used when a build is abandoned.
    pub fn restore(self) -> Result<()> {
        fs::rename(&self.copy, &self.original)
            .context(format!("restoring {} from backup", self.original.display()))?;
        Ok(())
    }
}

/// Removes `path` if present; failures are only logged.
pub fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!(file = %path.display(), "cannot delete file: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn backup_name_appends_the_extension() {
        assert_eq!(backup_path(Path::new("/media/DICOMDIR")), PathBuf::from("/media/DICOMDIR.BAK"));
    }

    #[test]
    fn nothing_to_back_up_without_a_file() {
        let dir = tempdir().expect("tmpdir");
        assert!(Backup::create(&dir.path().join("DICOMDIR")).expect("backup").is_none());
    }

    #[test]
    fn backup_can_be_discarded_or_restored() {
        let dir = tempdir().expect("tmpdir");
        let path = dir.path().join("DICOMDIR");
        fs::write(&path, b"old").expect("write");

        let backup = Backup::create(&path).expect("backup").expect("file existed");
        assert_eq!(fs::read(backup.path()).expect("read"), b"old");
        backup.discard().expect("discard");
        assert!(!backup_path(&path).exists());

        let backup = Backup::create(&path).expect("backup").expect("file existed");
        fs::remove_file(&path).expect("remove original");
        backup.restore().expect("restore");
        assert_eq!(fs::read(&path).expect("read"), b"old");
    }
}
