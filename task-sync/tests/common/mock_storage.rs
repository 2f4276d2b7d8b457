// tests/common/mock_storage.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use task_sync::error::AppResult;
use task_sync::service::storage_service::StorageService;
use task_sync::utils::error_helper::network_error;

/// テスト用のモックストレージサービス
#[derive(Clone)]
pub struct MockStorageService {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_delete: Arc<AtomicBool>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
            fail_delete: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<String> {
        self.storage.lock().unwrap().keys().cloned().collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.storage.lock().unwrap().contains_key(path)
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload(&self, path: &str, data: Vec<u8>, _content_type: &str) -> AppResult<String> {
        let mut storage = self.storage.lock().unwrap();
        storage.insert(path.to_string(), data);
        Ok(format!("http://mock-storage.local/task-attachments/{}", path))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(network_error("storage unavailable", "mock_storage::delete"));
        }
        let mut storage = self.storage.lock().unwrap();
        storage.remove(path);
        Ok(())
    }
}
