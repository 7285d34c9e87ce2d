// In-memory ObjectStore used by router tests

use super::{
    object_key, ObjectData, ObjectStore, StorageError, StorageResult, StoredObject,
    PRESIGN_EXPIRY_SECS,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, Bytes>>,
    puts: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a backend-style error.
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    fn check(&self) -> StorageResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Credentials("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        data: Bytes,
        original_filename: &str,
        _content_type: Option<&str>,
    ) -> StorageResult<StoredObject> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let key = object_key(original_filename);
        let url = format!(
            "http://memory.local/photos/{}?X-Amz-Expires={}",
            key, PRESIGN_EXPIRY_SECS
        );

        self.objects.write().await.insert(key.clone(), data);
        Ok(StoredObject { key, url })
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        self.check()?;
        let objects = self.objects.read().await;
        let bytes = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        Ok(ObjectData {
            bytes: bytes.clone(),
            last_modified: Some("Mon, 19 Oct 2026 10:00:00 GMT".to_string()),
        })
    }
}
