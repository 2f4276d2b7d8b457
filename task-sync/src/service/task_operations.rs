// task-sync/src/service/task_operations.rs

use crate::config::SyncConfig;
use crate::domain::{SessionContext, Task, TaskCommand, TaskDraft, TaskId, TaskStatus};
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::repository::task_gateway::TaskGateway;
use crate::service::attachment_service::AttachmentService;
use crate::service::comment_service::CommentService;
use crate::service::field_translator::FieldTranslator;
use crate::service::task_store::{MutationTicket, ReloadScheduler, TaskStore};
use crate::types::OperationResult;
use crate::utils::error_helper::{convert_validation_errors, validation_error};
use crate::utils::validation::common;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// タスクの変更操作
///
/// 楽観的更新 → 変換 → リモート呼び出し。成功時はサイレントリロードを予約し、
/// 失敗時は全件を再読み込みしてサーバーの状態に戻す。
pub struct TaskOperations {
    store: Arc<TaskStore>,
    gateway: Arc<dyn TaskGateway>,
    reloads: ReloadScheduler,
    attachments: Option<Arc<AttachmentService>>,
    comments: Option<Arc<dyn CommentService>>,
}

impl TaskOperations {
    pub fn new(store: Arc<TaskStore>, gateway: Arc<dyn TaskGateway>, config: &SyncConfig) -> Self {
        Self {
            reloads: ReloadScheduler::new(store.clone(), config),
            store,
            gateway,
            attachments: None,
            comments: None,
        }
    }

    /// タスク削除時に添付ファイルも削除する
    pub fn with_attachments(mut self, attachments: Arc<AttachmentService>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// タスク削除時にコメントも削除する
    pub fn with_comments(mut self, comments: Arc<dyn CommentService>) -> Self {
        self.comments = Some(comments);
        self
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// タスクを作成
    pub async fn create_task(
        &self,
        session: &SessionContext,
        draft: TaskDraft,
    ) -> AppResult<OperationResult> {
        if let Err(errors) = draft.validate() {
            let error = convert_validation_errors(errors, "task_operations::create_task");
            return Ok(OperationResult::from(&error));
        }
        let record = FieldTranslator::encode_draft(&draft, session)?;

        let optimistic = Task::from_draft(&draft, session);
        let temp_id = optimistic.id.clone();
        let ticket = self.store.begin_mutation(&temp_id);
        self.store.optimistic_add_task(optimistic);

        match self.gateway.create_task(record).await {
            Ok(created) => {
                let task = FieldTranslator::decode_task(created);
                log_with_context!(
                    tracing::Level::INFO,
                    "Task created",
                    "task_id" => task.id.as_str(),
                    "created_by" => session.employee_id
                );
                self.store.replace_task(&temp_id, task);
                self.finish_success(&ticket, "create_task");
                Ok(OperationResult::success("Task created"))
            }
            Err(e) => {
                let message = format!("Failed to create task: {}", e.user_message());
                Ok(self.finish_failure(&ticket, "create_task", &e, message).await)
            }
        }
    }

    /// 編集フォームの内容でタスクを更新
    pub async fn update_task(
        &self,
        session: &SessionContext,
        id: &TaskId,
        draft: TaskDraft,
    ) -> AppResult<OperationResult> {
        if let Err(errors) = draft.validate() {
            let error = convert_validation_errors(errors, "task_operations::update_task");
            return Ok(OperationResult::from(&error));
        }
        self.apply_commands(session, id, draft.commands(), "update_task")
            .await
    }

    /// 単一フィールドの更新（インライン編集）
    pub async fn update_task_field(
        &self,
        session: &SessionContext,
        id: &TaskId,
        command: TaskCommand,
    ) -> AppResult<OperationResult> {
        if let Err(error) = validate_command(&command) {
            return Ok(OperationResult::from(&error));
        }
        self.apply_commands(session, id, vec![command], "update_task_field")
            .await
    }

    /// ステータスのみ更新
    pub async fn update_task_status(
        &self,
        session: &SessionContext,
        id: &TaskId,
        status: TaskStatus,
    ) -> AppResult<OperationResult> {
        let storage_id = id.storage_id()?;
        let ticket = self.store.begin_mutation(id);
        self.store
            .optimistic_update_task(id, &[TaskCommand::SetStatus(status)]);
        let completed_at = match self.store.task(id) {
            Some(task) => task.completed_at,
            None => status.is_completed().then(Utc::now),
        };

        match self
            .gateway
            .update_task_status(
                storage_id,
                FieldTranslator::encode_status(status),
                completed_at,
            )
            .await
        {
            Ok(()) => {
                log_with_context!(
                    tracing::Level::INFO,
                    "Task status updated",
                    "task_id" => storage_id,
                    "status" => status,
                    "employee_id" => session.employee_id
                );
                self.finish_success(&ticket, "update_task_status");
                Ok(OperationResult::success(format!(
                    "Status changed to {}",
                    status.display_name()
                )))
            }
            Err(e) => {
                let message = format!("Failed to update status: {}", e.user_message());
                Ok(self
                    .finish_failure(&ticket, "update_task_status", &e, message)
                    .await)
            }
        }
    }

    /// タスクを削除
    ///
    /// 添付ファイル、コメント、タスク本体の順に削除する。
    pub async fn delete_task(
        &self,
        session: &SessionContext,
        id: &TaskId,
    ) -> AppResult<OperationResult> {
        let storage_id = id.storage_id()?;
        let ticket = self.store.begin_mutation(id);
        self.store.optimistic_delete_task(id);

        match self.delete_with_dependents(storage_id).await {
            Ok(()) => {
                log_with_context!(
                    tracing::Level::INFO,
                    "Task deleted",
                    "task_id" => storage_id,
                    "employee_id" => session.employee_id
                );
                self.finish_success(&ticket, "delete_task");
                Ok(OperationResult::success("Task deleted"))
            }
            Err(e) => {
                let message = delete_failure_message(&e);
                Ok(self.finish_failure(&ticket, "delete_task", &e, message).await)
            }
        }
    }

    /// タイトルのみでタスクを作成（期限なし、その他は既定値）
    pub async fn quick_create_task(
        &self,
        session: &SessionContext,
        title: &str,
    ) -> AppResult<OperationResult> {
        self.create_task(session, TaskDraft::quick(title)).await
    }

    async fn delete_with_dependents(&self, storage_id: i64) -> AppResult<()> {
        if let Some(attachments) = &self.attachments {
            attachments.delete_for_task(storage_id).await?;
        }
        if let Some(comments) = &self.comments {
            let removed = comments.delete_by_task(storage_id).await?;
            log_with_context!(
                tracing::Level::DEBUG,
                "Task comments deleted",
                "task_id" => storage_id,
                "count" => removed
            );
        }
        self.gateway.delete_task(storage_id).await
    }

    async fn apply_commands(
        &self,
        session: &SessionContext,
        id: &TaskId,
        commands: Vec<TaskCommand>,
        operation: &str,
    ) -> AppResult<OperationResult> {
        let storage_id = id.storage_id()?;
        let mut patch = FieldTranslator::encode_commands(&commands)?;

        let previous_status = self.store.task(id).map(|task| task.status);
        let ticket = self.store.begin_mutation(id);
        self.store.optimistic_update_task(id, &commands);
        patch.completed_at = match self.store.task(id) {
            Some(current) => FieldTranslator::encode_completion(previous_status, &current),
            None => commands.iter().rev().find_map(|command| match command {
                TaskCommand::SetStatus(status) => Some(status.is_completed().then(Utc::now)),
                _ => None,
            }),
        };

        match self.gateway.update_task(storage_id, patch).await {
            Ok(()) => {
                log_with_context!(
                    tracing::Level::INFO,
                    "Task updated",
                    "task_id" => storage_id,
                    "operation" => operation,
                    "fields" => commands.iter().map(TaskCommand::name).collect::<Vec<_>>(),
                    "employee_id" => session.employee_id
                );
                self.finish_success(&ticket, operation);
                Ok(OperationResult::success("Task updated"))
            }
            Err(e) => {
                let message = format!("Failed to update task: {}", e.user_message());
                Ok(self.finish_failure(&ticket, operation, &e, message).await)
            }
        }
    }

    fn finish_success(&self, ticket: &MutationTicket, operation: &str) {
        if self.store.settle(ticket) {
            self.reloads.schedule();
        } else {
            log_with_context!(
                tracing::Level::DEBUG,
                "Response superseded by a newer mutation",
                "task_id" => ticket.task_id().as_str(),
                "operation" => operation
            );
        }
    }

    async fn finish_failure(
        &self,
        ticket: &MutationTicket,
        operation: &str,
        error: &AppError,
        message: String,
    ) -> OperationResult {
        self.store.settle(ticket);
        log_with_context!(
            tracing::Level::WARN,
            "Task mutation failed, reloading",
            "task_id" => ticket.task_id().as_str(),
            "operation" => operation,
            "error_kind" => error.kind(),
            "error" => error.to_string()
        );
        if let Err(reload_error) = self.store.reload().await {
            log_with_context!(
                tracing::Level::WARN,
                "Reload after failed mutation also failed",
                "error" => reload_error.to_string()
            );
        }
        OperationResult::failure(message, error)
    }
}

fn validate_command(command: &TaskCommand) -> AppResult<()> {
    match command {
        TaskCommand::SetTitle(title) => {
            common::validate_task_title(title).map_err(|e| {
                let message = e
                    .message
                    .map_or_else(|| "Invalid title".to_string(), |m| m.to_string());
                validation_error("title", &message)
            })?;
            if title.trim().chars().count() as u64 > common::task::TITLE_MAX_LENGTH {
                return Err(validation_error(
                    "title",
                    "Task title must be between 1 and 200 characters",
                ));
            }
            Ok(())
        }
        TaskCommand::SetDescription(description)
            if description.chars().count() as u64 > common::task::DESCRIPTION_MAX_LENGTH =>
        {
            Err(validation_error(
                "description",
                "Task description must not exceed 2000 characters",
            ))
        }
        _ => Ok(()),
    }
}

fn delete_failure_message(error: &AppError) -> String {
    match error {
        AppError::NotFound(_) => "Task no longer exists".to_string(),
        AppError::Conflict(_) => {
            "Task is still referenced by other records and cannot be deleted".to_string()
        }
        AppError::ExternalServiceError(_) => {
            "Network error while deleting task, please retry".to_string()
        }
        other => format!("Failed to delete task: {}", other.user_message()),
    }
}
