//! In-memory object store.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ObjectStore, StoreError, StoredObject};

#[derive(Default)]
struct Inner {
    objects: BTreeMap<String, StoredObject>,
    writes: usize,
    failing_keys: HashSet<String>,
}

/// Object store keeping every object in a map.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `key` fail.
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.lock().failing_keys.insert(key.into());
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.lock().objects.get(key).cloned()
    }

    /// Stored keys in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    /// Number of successful writes, overwrites included.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, object: StoredObject) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.failing_keys.contains(&object.key) {
            return Err(StoreError::Write {
                key: object.key,
                message: "write rejected".to_string(),
            });
        }
        inner.writes += 1;
        inner.objects.insert(object.key.clone(), object);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn caption(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.lock().objects.get(key) {
            Some(object) => Ok(object.caption.clone()),
            None => Err(StoreError::Head {
                key: key.to_string(),
                message: "no such key".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(key: &str, caption: Option<&str>) -> StoredObject {
        StoredObject {
            key: key.to_string(),
            body: b"bytes".to_vec(),
            content_type: "image/png".to_string(),
            caption: caption.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemoryStore::new();

        store.put(object("photos/a.png", Some("one"))).await.unwrap();
        store.put(object("photos/a.png", Some("two"))).await.unwrap();

        assert_eq!(store.keys(), vec!["photos/a.png"]);
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.caption("photos/a.png").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_list_keys_by_prefix() {
        let store = MemoryStore::new();
        store.put(object("photos/a.png", None)).await.unwrap();
        store.put(object("index.html", None)).await.unwrap();

        assert_eq!(store.list_keys("photos/").await.unwrap(), vec!["photos/a.png"]);
    }

    #[tokio::test]
    async fn test_failing_key() {
        let store = MemoryStore::new();
        store.fail_writes_to("photos/bad.png");

        let err = store.put(object("photos/bad.png", None)).await.unwrap_err();

        assert!(matches!(err, StoreError::Write { .. }));
        assert_eq!(store.write_count(), 0);
        assert!(store.caption("photos/bad.png").await.is_err());
    }
}
