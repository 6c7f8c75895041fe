//! In-process store, for embedding without a disk cache and for tests.

use super::{check_namespace, CacheStore, StoreError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Namespaces = HashMap<String, HashMap<String, Vec<u8>>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: Mutex<Namespaces>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Namespaces> {
        self.namespaces.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of blobs in `namespace`.
    pub fn len(&self, namespace: &str) -> usize {
        self.lock().get(namespace).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, namespace: &str) -> bool {
        self.len(namespace) == 0
    }
}

impl CacheStore for MemoryStore {
    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.lock()
            .get(namespace)
            .is_some_and(|ns| ns.contains_key(key))
    }

    fn write(&self, namespace: &str, key: &str, blob: &[u8]) -> Result<(), StoreError> {
        check_namespace(namespace)?;
        self.lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .lock()
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    fn clear(&self, namespace: &str) -> Result<(), StoreError> {
        self.lock().remove(namespace);
        Ok(())
    }
}
