// task-sync/src/service/storage_service.rs

use async_trait::async_trait;

use crate::error::AppResult;

/// 添付ファイル本体の保存先
#[async_trait]
pub trait StorageService: Send + Sync {
    /// 指定パスにファイルを保存し、公開URLを返す
    async fn upload(&self, path: &str, file_data: Vec<u8>, content_type: &str)
        -> AppResult<String>;

    /// ファイルを削除
    async fn delete(&self, path: &str) -> AppResult<()>;
}

/// ファイル名から記号などを取り除く
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-' || *c == '_' || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string()
}

/// ファイル名の拡張子（小文字、なければ `None`）
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}
