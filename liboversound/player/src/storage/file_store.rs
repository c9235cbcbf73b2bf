use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use eyre::{Context, Result};

use super::KeyValueStore;
use super::storage_error::StorageError;

/// One file per key inside the player's data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn try_new() -> Result<Self, StorageError> {
        let proj_dirs = directories::ProjectDirs::from("", "", "oversound")
            .ok_or(StorageError::NoHomeDir)?;
        Self::new_from_path(proj_dirs.data_dir())
    }

    pub fn new_from_path<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        let dir_string = dir.to_string_lossy().to_string();
        if dir.to_str().is_none() {
            return Err(StorageError::InvalidUnicode(dir_string));
        }
        if dir.is_file() {
            return Err(StorageError::NotADirectory(dir_string));
        }
        if !dir.exists() {
            create_dir_all(dir).map_err(|e| StorageError::DirCreationFailed(dir_string, e))?;
        }

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key))
            .ok()
            .map(|contents| contents.trim().to_owned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs::write(&path, value).wrap_err(format!("Error writing to store file {path:?}"))
    }
}
