use crate::error::{Error, Result};
use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Writes rule files with atomic replace semantics.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Writer {
    dry_run: bool,
}

impl Writer {
    /// Creates a writer; in dry run mode nothing touches the disk.
    pub(crate) const fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Creates a directory and all of its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub(crate) fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
    }

    /// Writes `content` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be written.
    pub(crate) fn write(&self, path: &Path, content: &str) -> Result<()> {
        if self.dry_run {
            debug!("Dry run: would write {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }

        Self::write_file_atomic(path, content)?;
        debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// Writes a file atomically.
    ///
    /// # Process
    ///
    /// 1. Writes content to a sibling temporary file
    /// 2. Syncs the temporary file to disk
    /// 3. Atomically renames it onto the target path
    fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
        let temp_path = temp_path_for(path);
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .sync_all()
            .map_err(|e| Error::io(&temp_path, e))?;

        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::io(path, e)
        })?;

        Ok(())
    }
}

/// `guide.md` -> `guide.md.tmp`, next to the target.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_write_creates_parent_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out/acme/widgets/guide.md");

        Writer::new(false).write(target.path(), "content").unwrap();

        target.assert("content");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("guide.md");
        target.write_str("old content").unwrap();

        Writer::new(false).write(target.path(), "new content").unwrap();

        target.assert("new content");
        assert!(!temp.child("guide.md.tmp").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out/guide.md");

        let writer = Writer::new(true);
        writer.ensure_dir(temp.child("out").path()).unwrap();
        writer.write(target.path(), "content").unwrap();

        assert!(!temp.child("out").exists());
    }

    #[test]
    fn test_write_fails_when_parent_is_a_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("blocker").write_str("not a dir").unwrap();

        let result = Writer::new(false).write(temp.child("blocker/guide.md").path(), "content");

        assert!(result.unwrap_err().is_io());
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(
            temp_path_for(Path::new("/out/guide.md")),
            PathBuf::from("/out/guide.md.tmp")
        );
    }
}
