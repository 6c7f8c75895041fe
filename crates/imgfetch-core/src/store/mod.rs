//! Cache store: namespaced key/blob persistence.
//!
//! The fetcher writes and clears; readers (view code, the CLI) use
//! `exists` and `read`. Keys are normalized identifiers
//! (see [`crate::normalize::normalize_key`]).

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Key is empty, `.`/`..`, or contains `/` or NUL.
    #[error("invalid cache key {0:?}")]
    InvalidKey(String),
    /// Namespace is not a single plain path component.
    #[error("invalid cache namespace {0:?}")]
    InvalidNamespace(String),
    #[error("cache I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot locate cache directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

/// Minimal store contract consumed by the fetcher and by cache readers.
///
/// `write` must be atomic from the caller's point of view: after it
/// returns either the whole blob is stored or nothing is.
pub trait CacheStore: Send + Sync + 'static {
    fn exists(&self, namespace: &str, key: &str) -> bool;

    fn write(&self, namespace: &str, key: &str, blob: &[u8]) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove every blob in `namespace`. Clearing an empty or missing
    /// namespace succeeds.
    fn clear(&self, namespace: &str) -> Result<(), StoreError>;
}

/// A single path component on Linux: anything but empty, `.`, `..`, `/`
/// and NUL. Every `normalize_key` output that is not empty or a dot name
/// qualifies, backslashes included.
fn is_plain_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\0'])
}

pub(crate) fn check_key(key: &str) -> Result<(), StoreError> {
    if is_plain_component(key) {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub fn check_namespace(namespace: &str) -> Result<(), StoreError> {
    if is_plain_component(namespace) {
        Ok(())
    } else {
        Err(StoreError::InvalidNamespace(namespace.to_string()))
    }
}
