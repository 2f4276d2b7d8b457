// tests/common/mod.rs
#![allow(dead_code)]

pub mod mock_collaborators;
pub mod mock_gateway;
pub mod mock_storage;
pub mod test_data;

use mock_gateway::MockTaskGateway;
use std::sync::{Arc, Once};
use task_sync::config::SyncConfig;
use task_sync::repository::task_gateway::TaskRecord;
use task_sync::service::{TaskOperations, TaskStore};

// テスト環境の初期化を一度だけ実行
static INIT: Once = Once::new();

/// テスト環境を初期化
pub fn init_test_env() {
    INIT.call_once(|| {
        // .env.testファイルがあれば環境変数を読み込む
        if std::path::Path::new(".env.test").exists() {
            dotenvy::from_filename(".env.test").ok();
        }

        // テスト用のログ設定
        let _ = tracing_subscriber::fmt()
            .with_env_filter("task_sync=debug")
            .with_test_writer()
            .try_init();
    });
}

/// ストア・変更操作・モックゲートウェイを組み立てる
pub fn setup_operations(
    records: Vec<TaskRecord>,
) -> (Arc<MockTaskGateway>, Arc<TaskStore>, TaskOperations) {
    init_test_env();
    let gateway = Arc::new(MockTaskGateway::with_records(records));
    let store = Arc::new(TaskStore::new(gateway.clone()));
    let operations =
        TaskOperations::new(store.clone(), gateway.clone(), &SyncConfig::for_testing());
    (gateway, store, operations)
}
