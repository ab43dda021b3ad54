//! Local file-backed key-value store

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStore;

/// File-per-key store rooted at a directory
///
/// Each key lives at `<dir>/<key>.json`. Writes land in a temp file in the
/// same directory and are renamed over the target, so a crash never leaves
/// a torn value behind.
///
/// Opening takes an exclusive advisory lock on `<dir>/.lock` held for the
/// lifetime of the handle, making this process the single writer for the
/// directory. A second process opening the same directory gets a clear
/// error instead of silently racing read-modify-write cycles. The lock
/// releases when the handle (and its file) is dropped.
pub struct LocalStore {
    dir: PathBuf,
    _lock: File,
}

impl LocalStore {
    /// Open (creating if needed) the store directory and take the lock
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let lock_path = dir.join(".lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)?;
        lock.try_lock_exclusive().map_err(|_| {
            Error::store(format!(
                "the data directory {} is in use by another easel process",
                dir.display()
            ))
        })?;

        Ok(Self {
            dir: dir.to_path_buf(),
            _lock: lock,
        })
    }

    /// Directory this store is rooted at
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        // Keys are short internal identifiers; anything else could escape
        // the store directory.
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::store(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
