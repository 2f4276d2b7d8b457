// src/config.rs
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 500;
const DEFAULT_MODAL_CLOSE_DELAY_MS: u64 = 300;
const DEFAULT_RELATION_CACHE_TTL_SECS: i64 = 300;
const DEFAULT_LOG_FILTER: &str = "task_sync=info";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// 変更確定後のサイレントリロードをまとめる待ち時間
    pub reload_debounce: Duration,
    /// ダイアログを閉じてから対象タスクを破棄するまでの待ち時間
    pub modal_close_delay: Duration,
    /// 関連エンティティ候補リストのキャッシュ有効期間
    pub relation_cache_ttl: chrono::Duration,
    pub log_filter: String,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok(); // .env ファイルを読み込む (存在しなくてもエラーにしない)

        Ok(Self {
            reload_debounce: Duration::from_millis(parse_var(
                "TASK_SYNC_RELOAD_DEBOUNCE_MS",
                DEFAULT_RELOAD_DEBOUNCE_MS,
            )?),
            modal_close_delay: Duration::from_millis(parse_var(
                "TASK_SYNC_MODAL_CLOSE_DELAY_MS",
                DEFAULT_MODAL_CLOSE_DELAY_MS,
            )?),
            relation_cache_ttl: chrono::Duration::seconds(parse_var(
                "TASK_SYNC_RELATION_CACHE_TTL_SECS",
                DEFAULT_RELATION_CACHE_TTL_SECS,
            )?),
            log_filter: env::var("TASK_SYNC_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            reload_debounce: Duration::from_millis(50),
            modal_close_delay: Duration::from_millis(100),
            relation_cache_ttl: chrono::Duration::seconds(60),
            log_filter: "task_sync=debug".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reload_debounce: Duration::from_millis(DEFAULT_RELOAD_DEBOUNCE_MS),
            modal_close_delay: Duration::from_millis(DEFAULT_MODAL_CLOSE_DELAY_MS),
            relation_cache_ttl: chrono::Duration::seconds(DEFAULT_RELATION_CACHE_TTL_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {} value: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}
