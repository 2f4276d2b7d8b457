// task-sync/src/service/comment_service.rs

use crate::domain::task_comment_model::{NewTaskComment, TaskComment};
use crate::domain::SessionContext;
use crate::error::AppResult;
use crate::log_with_context;
use crate::utils::error_helper::convert_validation_errors;
use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

/// タスクコメントの保存先
#[async_trait]
pub trait CommentService: Send + Sync {
    /// タスクのコメント一覧（投稿日時の昇順、投稿者情報付き）
    async fn list(&self, task_id: i64) -> AppResult<Vec<TaskComment>>;

    async fn create(&self, comment: NewTaskComment) -> AppResult<TaskComment>;

    /// タスクに付いたコメントをすべて削除し、削除件数を返す
    async fn delete_by_task(&self, task_id: i64) -> AppResult<usize>;
}

/// 一つのタスクのコメント欄
pub struct CommentPanel {
    service: Arc<dyn CommentService>,
    task_id: i64,
    comments: Vec<TaskComment>,
}

impl CommentPanel {
    pub fn new(service: Arc<dyn CommentService>, task_id: i64) -> Self {
        Self {
            service,
            task_id,
            comments: Vec::new(),
        }
    }

    pub fn comments(&self) -> &[TaskComment] {
        &self.comments
    }

    pub async fn refresh(&mut self) -> AppResult<&[TaskComment]> {
        self.comments = self.service.list(self.task_id).await?;
        Ok(&self.comments)
    }

    /// コメントを投稿する。投稿者はセッションの社員
    pub async fn add(
        &mut self,
        session: &SessionContext,
        content: &str,
    ) -> AppResult<&[TaskComment]> {
        let comment = NewTaskComment {
            task_id: self.task_id,
            employee_id: session.employee_id,
            content: content.trim().to_string(),
        };
        comment
            .validate()
            .map_err(|e| convert_validation_errors(e, "comment_panel::add"))?;

        let created = self.service.create(comment).await?;
        log_with_context!(
            tracing::Level::DEBUG,
            "Comment added",
            "task_id" => self.task_id,
            "comment_id" => created.id,
            "employee_id" => session.employee_id
        );
        self.refresh().await
    }
}
