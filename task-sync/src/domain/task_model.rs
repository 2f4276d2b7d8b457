// task-sync/src/domain/task_model.rs

use super::related_entity::{EntityPreview, RelatedEntity, RelatedEntityType, RelatedMeeting};
use super::session::SessionContext;
use super::task_command::TaskCommand;
use super::task_domain::TaskDomain;
use super::task_priority::TaskPriority;
use super::task_status::TaskStatus;
use crate::error::AppResult;
use crate::utils::error_helper::bad_request_error;
use crate::utils::validation::common;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

const TEMPORARY_ID_PREFIX: &str = "tmp-";

/// UI側のタスクID（ストレージ側では整数）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_storage(id: i64) -> Self {
        Self(id.to_string())
    }

    /// 楽観的追加用の一時ID（サーバー確定前）
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMPORARY_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ストレージ側の整数IDに変換（不正な形式はBadRequest）
    pub fn storage_id(&self) -> AppResult<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                bad_request_error(
                    &format!("Malformed task id: '{}'", self.0),
                    "task_id::storage_id",
                )
            })
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// 担当者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Option<String>,
}

impl Assignee {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
            role: None,
        }
    }
}

/// UI層のタスク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub assignees: Vec<Assignee>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub domain: TaskDomain,
    related: RelatedEntity,
    preview: Option<EntityPreview>,
    pub related_meeting: Option<RelatedMeeting>,
    pub created_by: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// 最小限のフィールドでタスクを作成
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: String::new(),
            assignees: Vec::new(),
            start_date: None,
            due_date: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            tags: Vec::new(),
            domain: TaskDomain::default(),
            related: RelatedEntity::None,
            preview: None,
            related_meeting: None,
            created_by: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// ドラフトから楽観的追加用のタスクを組み立てる
    pub fn from_draft(draft: &TaskDraft, session: &SessionContext) -> Self {
        let mut task = Self::new(TaskId::temporary(), draft.title.trim());
        task.description = draft.description.clone();
        task.assignees = draft.assignees.clone();
        task.start_date = draft.start_date;
        task.due_date = draft.due_date;
        task.priority = draft.priority;
        task.status = draft.status;
        task.tags = draft.tags.clone();
        task.domain = draft.domain;
        task.related = draft.related;
        task.related_meeting = draft.related_meeting.clone();
        task.created_by = session.employee_id;
        task
    }

    /// 後方互換用の単一担当者（先頭の担当者）
    pub fn assignee(&self) -> Option<&Assignee> {
        self.assignees.first()
    }

    pub fn related(&self) -> RelatedEntity {
        self.related
    }

    pub fn related_type(&self) -> RelatedEntityType {
        self.related.kind()
    }

    pub fn related_id(&self) -> Option<i64> {
        self.related.id()
    }

    /// 関連エンティティを変更する。別の値になる場合はプレビューを破棄
    pub fn set_related(&mut self, related: RelatedEntity) {
        if self.related != related {
            self.related = related;
            self.preview = None;
        }
    }

    /// プレビューを設定（現在の関連エンティティと一致しない場合は無視）
    pub fn set_preview(&mut self, preview: EntityPreview) -> bool {
        if preview.entity != self.related || self.related.is_none() {
            return false;
        }
        self.preview = Some(preview);
        true
    }

    /// 現在の関連エンティティに一致するプレビュー
    pub fn preview(&self) -> Option<&EntityPreview> {
        self.preview
            .as_ref()
            .filter(|preview| preview.entity == self.related)
    }

    pub fn related_student(&self) -> Option<&EntityPreview> {
        self.preview()
            .filter(|p| p.entity.kind() == RelatedEntityType::Student)
    }

    pub fn related_lead(&self) -> Option<&EntityPreview> {
        self.preview().filter(|p| p.entity.kind() == RelatedEntityType::Lead)
    }

    pub fn related_entity_name(&self) -> Option<&str> {
        self.preview().map(|p| p.name.as_str())
    }

    /// 担当者IDの集合（順序を無視した比較用）
    pub fn assignee_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.assignees.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// UI形式の部分更新を適用（楽観的更新）
    pub fn apply(&mut self, command: &TaskCommand) {
        match command {
            TaskCommand::SetTitle(title) => self.title = title.clone(),
            TaskCommand::SetDescription(description) => self.description = description.clone(),
            TaskCommand::SetStatus(status) => {
                if status.is_completed() && !self.status.is_completed() {
                    self.completed_at = Some(Utc::now());
                } else if !status.is_completed() {
                    self.completed_at = None;
                }
                self.status = *status;
            }
            TaskCommand::SetPriority(priority) => self.priority = *priority,
            TaskCommand::SetAssignees(assignees) => self.assignees = assignees.clone(),
            TaskCommand::SetStartDate(date) => self.start_date = *date,
            TaskCommand::SetDueDate(date) => self.due_date = *date,
            TaskCommand::SetTags(tags) => self.tags = tags.clone(),
            TaskCommand::SetDomain(domain) => self.domain = *domain,
            TaskCommand::SetRelatedEntity(related) => self.set_related(*related),
            TaskCommand::SetRelatedMeeting(meeting) => self.related_meeting = meeting.clone(),
        }
        self.updated_at = Utc::now();
    }
}

/// 新規作成・編集フォームの入力
#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct TaskDraft {
    #[validate(
        length(
            min = common::task::TITLE_MIN_LENGTH,
            max = common::task::TITLE_MAX_LENGTH,
            message = "Task title must be between 1 and 200 characters"
        ),
        custom(function = common::validate_task_title)
    )]
    pub title: String,

    #[validate(length(
        max = common::task::DESCRIPTION_MAX_LENGTH,
        message = "Task description must not exceed 2000 characters"
    ))]
    pub description: String,

    pub assignees: Vec<Assignee>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub domain: TaskDomain,
    pub related: RelatedEntity,
    pub related_meeting: Option<RelatedMeeting>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// クイック作成（タイトルのみ、その他は既定値）
    pub fn quick(title: &str) -> Self {
        Self::new(title.trim())
    }

    /// 編集フォームの初期値
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            assignees: task.assignees.clone(),
            start_date: task.start_date,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            tags: task.tags.clone(),
            domain: task.domain,
            related: task.related(),
            related_meeting: task.related_meeting.clone(),
        }
    }

    /// 編集内容を更新コマンド列に変換
    pub fn commands(&self) -> Vec<TaskCommand> {
        vec![
            TaskCommand::SetTitle(self.title.trim().to_string()),
            TaskCommand::SetDescription(self.description.clone()),
            TaskCommand::SetStatus(self.status),
            TaskCommand::SetPriority(self.priority),
            TaskCommand::SetAssignees(self.assignees.clone()),
            TaskCommand::SetStartDate(self.start_date),
            TaskCommand::SetDueDate(self.due_date),
            TaskCommand::SetTags(self.tags.clone()),
            TaskCommand::SetDomain(self.domain),
            TaskCommand::SetRelatedEntity(self.related),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(entity: RelatedEntity, name: &str) -> EntityPreview {
        EntityPreview {
            entity,
            name: name.to_string(),
            status: None,
            avatar: None,
        }
    }

    #[test]
    fn test_storage_id_parsing() {
        assert_eq!(TaskId::from_storage(12).storage_id().unwrap(), 12);
        assert!(TaskId::new("abc").storage_id().is_err());
        assert!(TaskId::new("-3").storage_id().is_err());
        assert!(TaskId::temporary().storage_id().is_err());
        assert!(TaskId::temporary().is_temporary());
    }

    #[test]
    fn test_changing_related_entity_drops_preview() {
        let mut task = Task::new(TaskId::from_storage(1), "Call parents");
        task.set_related(RelatedEntity::Student(5));
        assert!(task.set_preview(preview(RelatedEntity::Student(5), "Li Wei")));
        assert_eq!(task.related_entity_name(), Some("Li Wei"));

        task.apply(&TaskCommand::SetRelatedEntity(RelatedEntity::Lead(5)));
        assert_eq!(task.related_type(), RelatedEntityType::Lead);
        assert!(task.preview().is_none());
        assert!(task.related_student().is_none());
    }

    #[test]
    fn test_mismatched_preview_is_rejected() {
        let mut task = Task::new(TaskId::from_storage(1), "Call parents");
        task.set_related(RelatedEntity::Lead(9));
        assert!(!task.set_preview(preview(RelatedEntity::Student(9), "Wrong")));
        assert!(task.preview().is_none());
    }

    #[test]
    fn test_completed_at_follows_status() {
        let mut task = Task::new(TaskId::from_storage(1), "Submit application");
        task.apply(&TaskCommand::SetStatus(TaskStatus::Completed));
        assert!(task.completed_at.is_some());
        task.apply(&TaskCommand::SetStatus(TaskStatus::InProgress));
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_first_assignee_is_single_assignee() {
        let mut task = Task::new(TaskId::from_storage(1), "Review essay");
        task.apply(&TaskCommand::SetAssignees(vec![
            Assignee::new("3", "Wang"),
            Assignee::new("1", "Chen"),
        ]));
        assert_eq!(task.assignee().map(|a| a.id.as_str()), Some("3"));
        assert_eq!(task.assignee_ids_sorted(), vec!["1", "3"]);
    }

    #[test]
    fn test_draft_validation() {
        assert!(TaskDraft::new("   ").validate().is_err());
        assert!(TaskDraft::new("Follow up with Zhao").validate().is_ok());

        let mut long = TaskDraft::new("ok");
        long.description = "x".repeat(2001);
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_from_draft_uses_session() {
        let session = SessionContext::new(8, "Zhou");
        let mut draft = TaskDraft::new("  Follow up with Zhao  ");
        draft.priority = TaskPriority::High;
        let task = Task::from_draft(&draft, &session);
        assert_eq!(task.title, "Follow up with Zhao");
        assert_eq!(task.created_by, Some(8));
        assert!(task.id.is_temporary());
        assert_eq!(task.priority, TaskPriority::High);
    }
}
