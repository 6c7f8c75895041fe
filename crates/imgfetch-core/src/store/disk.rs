//! Filesystem-backed store: `<root>/<namespace>/<key>`.
//!
//! Blobs are written to a temp file in the namespace directory, synced,
//! then renamed over the final name, so readers never see a partial blob.

use super::{check_key, check_namespace, CacheStore, StoreError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl DiskStore {
    /// Store rooted at `root`. Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `$XDG_CACHE_HOME/imgfetch` (`~/.cache/imgfetch`).
    pub fn open_default() -> Result<Self, StoreError> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("imgfetch")?;
        Ok(Self::new(xdg_dirs.get_cache_home()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, StoreError> {
        check_namespace(namespace)?;
        Ok(self.root.join(namespace))
    }

    /// On-disk location of `key`, whether or not it exists yet.
    pub fn path_for(&self, namespace: &str, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.namespace_dir(namespace)?.join(key))
    }
}

impl CacheStore for DiskStore {
    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path_for(namespace, key)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn write(&self, namespace: &str, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        let final_path = self.path_for(namespace, key)?;
        let dir = self.namespace_dir(namespace)?;
        fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".blob")
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(io_err(&dir))?;
        tmp.write_all(blob).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(&final_path)
            .map_err(|e| io_err(&final_path)(e.error))?;

        tracing::trace!(path = %final_path.display(), bytes = blob.len(), "blob stored");
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(namespace, key)?;
        match fs::read(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn clear(&self, namespace: &str) -> Result<(), StoreError> {
        let dir = self.namespace_dir(namespace)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&dir)(e)),
        }
    }
}
