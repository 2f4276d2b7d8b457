// task-sync/src/repository/attachment_repository.rs

use crate::domain::task_attachment_model::{NewTaskAttachment, TaskAttachment};
use crate::error::AppResult;
use async_trait::async_trait;

/// 添付ファイルのメタデータ行
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// タスクの添付ファイル一覧（アップロード日時の降順）
    async fn list_by_task(&self, task_id: i64) -> AppResult<Vec<TaskAttachment>>;

    /// IDで添付ファイルを取得
    async fn find_by_id(&self, id: i64) -> AppResult<Option<TaskAttachment>>;

    /// 新しい添付ファイル行を作成
    async fn create(&self, data: NewTaskAttachment) -> AppResult<TaskAttachment>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// タスクに付いた行をすべて削除し、削除件数を返す
    async fn delete_by_task(&self, task_id: i64) -> AppResult<usize>;
}
