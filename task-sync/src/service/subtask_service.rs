// task-sync/src/service/subtask_service.rs

use crate::domain::subtask_model::{NewSubtask, Subtask};
use crate::error::AppResult;
use crate::log_with_context;
use crate::utils::error_helper::convert_validation_errors;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

/// サブタスクの保存先
#[async_trait]
pub trait SubtaskService: Send + Sync {
    async fn list(&self, task_id: i64) -> AppResult<Vec<Subtask>>;

    async fn create(&self, subtask: NewSubtask) -> AppResult<Subtask>;

    async fn toggle_completed(&self, id: i64, completed: bool) -> AppResult<()>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// 一つのタスクのサブタスク一覧
///
/// 変更のたびに一覧を取り直す。親タスクのステータスには触れない。
pub struct SubtaskPanel {
    service: Arc<dyn SubtaskService>,
    task_id: i64,
    subtasks: Vec<Subtask>,
}

impl SubtaskPanel {
    pub fn new(service: Arc<dyn SubtaskService>, task_id: i64) -> Self {
        Self {
            service,
            task_id,
            subtasks: Vec::new(),
        }
    }

    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    pub fn completed_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    pub async fn refresh(&mut self) -> AppResult<&[Subtask]> {
        self.subtasks = self.service.list(self.task_id).await?;
        Ok(&self.subtasks)
    }

    pub async fn add(
        &mut self,
        title: &str,
        description: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> AppResult<&[Subtask]> {
        let subtask = NewSubtask {
            task_id: self.task_id,
            title: title.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            due_date,
        };
        subtask
            .validate()
            .map_err(|e| convert_validation_errors(e, "subtask_panel::add"))?;

        let created = self.service.create(subtask).await?;
        log_with_context!(
            tracing::Level::DEBUG,
            "Subtask created",
            "task_id" => self.task_id,
            "subtask_id" => created.id
        );
        self.refresh().await
    }

    pub async fn toggle(&mut self, id: i64, completed: bool) -> AppResult<&[Subtask]> {
        self.service.toggle_completed(id, completed).await?;
        self.refresh().await
    }

    pub async fn remove(&mut self, id: i64) -> AppResult<&[Subtask]> {
        self.service.delete(id).await?;
        self.refresh().await
    }
}
