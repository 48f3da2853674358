/// TOML persistence with a cross-process exclusive lock
use crate::error::{Error, Result};
use crate::site::SiteConfig;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Load/save boundary for the credential set.
///
/// A run holds the store's exclusive lock across the whole
/// load-modify-save window, so two concurrent runs against the same file
/// cannot interleave their writes.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the exclusive lock for this config file.
    ///
    /// Blocks until any other holder releases it. The lock lives in a
    /// sidecar `<file>.lock` and is released when the returned guard drops.
    pub fn lock(&self) -> Result<StoreLock> {
        let lock_path = self.lock_path();

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;

        Ok(StoreLock {
            file: Some(file),
            path: lock_path,
        })
    }

    pub fn load(&self) -> Result<SiteConfig> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| Error::ConfigLoad(format!("{}: {e}", self.path.display())))?;

        toml::from_str(&contents)
            .map_err(|e| Error::ConfigLoad(format!("{}: {e}", self.path.display())))
    }

    /// Write the whole set back wholesale, preserving entry order.
    pub fn save(&self, config: &SiteConfig) -> Result<()> {
        let contents = toml::to_string_pretty(config)
            .map_err(|e| Error::ConfigSave(format!("{}: {e}", self.path.display())))?;

        fs::write(&self.path, contents)
            .map_err(|e| Error::ConfigSave(format!("{}: {e}", self.path.display())))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }
}

/// RAII guard for the store lock.
///
/// Unlocks and best-effort removes the lock file on drop.
pub struct StoreLock {
    file: Option<File>,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
        }
        let _ = fs::remove_file(&self.path);
    }
}
