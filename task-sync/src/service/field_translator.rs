// task-sync/src/service/field_translator.rs

//! UI形式 ↔ ストレージ形式の変換
//!
//! 列挙値の対応表は `storage_codes!` で一箇所に定義し、エンコード側は
//! 網羅的な `match` として展開されるため、対応の抜けはコンパイルエラーになる。

use crate::domain::{
    Assignee, EntityPreview, RelatedEntity, RelatedEntityType, RelatedMeeting, SessionContext,
    Task, TaskCommand, TaskDomain, TaskDraft, TaskId, TaskPriority, TaskStatus,
};
use crate::error::AppResult;
use crate::repository::task_gateway::{EmployeeRecord, NewTaskRecord, TaskPatch, TaskRecord};
use crate::utils::error_helper::bad_request_error;
use crate::utils::validation::parse_tags;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// ストレージ側のコード値を持つ列挙
pub trait StorageCode: Sized + Copy + PartialEq + 'static {
    const CODES: &'static [(Self, &'static str)];

    fn storage_code(self) -> &'static str;

    fn from_storage_code(code: &str) -> Option<Self>;
}

macro_rules! storage_codes {
    ($ty:ty { $($variant:path => $code:literal),+ $(,)? }) => {
        impl StorageCode for $ty {
            const CODES: &'static [(Self, &'static str)] = &[$(($variant, $code)),+];

            fn storage_code(self) -> &'static str {
                match self {
                    $($variant => $code),+
                }
            }

            fn from_storage_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($variant),)+
                    _ => None,
                }
            }
        }
    };
}

storage_codes!(TaskStatus {
    TaskStatus::Pending => "待处理",
    TaskStatus::InProgress => "进行中",
    TaskStatus::Completed => "已完成",
    TaskStatus::Canceled => "已取消",
});

storage_codes!(TaskPriority {
    TaskPriority::Low => "低",
    TaskPriority::Medium => "中",
    TaskPriority::High => "高",
});

storage_codes!(TaskDomain {
    TaskDomain::General => "general",
    TaskDomain::StudentSuccess => "student_success",
    TaskDomain::CompanyOps => "company_ops",
    TaskDomain::Marketing => "marketing",
});

storage_codes!(RelatedEntityType {
    RelatedEntityType::Student => "student",
    RelatedEntityType::Lead => "lead",
    RelatedEntityType::Employee => "employee",
    RelatedEntityType::None => "none",
});

/// UI側のフィールド識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiField {
    Title,
    Description,
    Status,
    Priority,
    Assignees,
    StartDate,
    DueDate,
    Tags,
    Domain,
    RelatedEntity,
    RelatedMeeting,
}

/// UIフィールド名 ↔ ストレージ列名
pub const FIELD_TABLE: &[(UiField, &str, &str)] = &[
    (UiField::Title, "title", "title"),
    (UiField::Description, "description", "description"),
    (UiField::Status, "status", "status"),
    (UiField::Priority, "priority", "priority"),
    (UiField::Assignees, "assignees", "assigned_to"),
    (UiField::StartDate, "startDate", "start_date"),
    (UiField::DueDate, "dueDate", "due_date"),
    (UiField::Tags, "tags", "tags"),
    (UiField::Domain, "domain", "task_domain"),
    (UiField::RelatedEntity, "relatedEntity", "linked_entity_type"),
    (UiField::RelatedMeeting, "relatedMeeting", "meeting_id"),
];

impl UiField {
    pub fn of(command: &TaskCommand) -> Self {
        match command {
            TaskCommand::SetTitle(_) => Self::Title,
            TaskCommand::SetDescription(_) => Self::Description,
            TaskCommand::SetStatus(_) => Self::Status,
            TaskCommand::SetPriority(_) => Self::Priority,
            TaskCommand::SetAssignees(_) => Self::Assignees,
            TaskCommand::SetStartDate(_) => Self::StartDate,
            TaskCommand::SetDueDate(_) => Self::DueDate,
            TaskCommand::SetTags(_) => Self::Tags,
            TaskCommand::SetDomain(_) => Self::Domain,
            TaskCommand::SetRelatedEntity(_) => Self::RelatedEntity,
            TaskCommand::SetRelatedMeeting(_) => Self::RelatedMeeting,
        }
    }

    pub fn ui_name(self) -> &'static str {
        FIELD_TABLE
            .iter()
            .find(|(field, _, _)| *field == self)
            .map_or("", |(_, ui, _)| *ui)
    }

    pub fn storage_column(self) -> &'static str {
        FIELD_TABLE
            .iter()
            .find(|(field, _, _)| *field == self)
            .map_or("", |(_, _, column)| *column)
    }

    pub fn from_storage_column(column: &str) -> Option<Self> {
        FIELD_TABLE
            .iter()
            .find(|(_, _, c)| *c == column)
            .map(|(field, _, _)| *field)
    }
}

/// 担当者の入力値（単一ID・複数ID・未指定）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeInput {
    None,
    One(i64),
    Many(Vec<i64>),
}

/// 関連エンティティの列（正規の列と後方互換のミラー列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelationColumns {
    pub linked_entity_type: Option<&'static str>,
    pub linked_entity_id: Option<i64>,
    pub related_student_id: Option<i64>,
    pub related_lead_id: Option<i64>,
}

/// 日付入力欄の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    Due,
}

pub struct FieldTranslator;

impl FieldTranslator {
    // --- 列挙値 ---

    pub fn encode_status(status: TaskStatus) -> &'static str {
        status.storage_code()
    }

    pub fn decode_status(code: &str) -> Option<TaskStatus> {
        TaskStatus::from_storage_code(code)
    }

    pub fn encode_priority(priority: TaskPriority) -> &'static str {
        priority.storage_code()
    }

    pub fn decode_priority(code: &str) -> Option<TaskPriority> {
        TaskPriority::from_storage_code(code)
    }

    // --- 担当者 ---

    /// 空の場合は `null`
    pub fn encode_assignees(assignees: &[Assignee]) -> AppResult<Option<Vec<i64>>> {
        let ids = assignees
            .iter()
            .map(|a| Self::parse_entity_id(&a.id, "assigned_to"))
            .collect::<AppResult<Vec<i64>>>()?;
        Ok(Self::encode_assignee_input(AssigneeInput::Many(ids)))
    }

    /// 空配列・ゼロは `null`
    pub fn encode_assignee_input(input: AssigneeInput) -> Option<Vec<i64>> {
        match input {
            AssigneeInput::None | AssigneeInput::One(0) => None,
            AssigneeInput::One(id) => Some(vec![id]),
            AssigneeInput::Many(ids) => {
                let ids: Vec<i64> = ids.into_iter().filter(|id| *id != 0).collect();
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
        }
    }

    // --- 日付 ---

    /// `None` は列をクリアする（`null`）
    pub fn encode_date(date: Option<NaiveDate>) -> Option<String> {
        date.map(|d| d.format(STORAGE_DATE_FORMAT).to_string())
    }

    /// 日付または日時文字列から日付部分を取得
    pub fn decode_date(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, STORAGE_DATE_FORMAT)
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
            .or_else(|| {
                raw.get(..10)
                    .and_then(|prefix| NaiveDate::parse_from_str(prefix, STORAGE_DATE_FORMAT).ok())
            })
    }

    /// 日付入力欄の文字列をコマンドに変換
    ///
    /// 空文字列は「変更しない」（コマンドなし）。日付のクリアは
    /// `SetDueDate(None)` / `SetStartDate(None)` を直接使う。
    pub fn date_command_from_input(field: DateField, raw: &str) -> AppResult<Option<TaskCommand>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let date = Self::decode_date(raw).ok_or_else(|| {
            bad_request_error(
                &format!("Invalid date: '{}'", raw),
                "field_translator::date_command_from_input",
            )
        })?;
        Ok(Some(match field {
            DateField::Start => TaskCommand::SetStartDate(Some(date)),
            DateField::Due => TaskCommand::SetDueDate(Some(date)),
        }))
    }

    /// カンマ区切りのタグ入力をコマンドに変換
    pub fn tags_command_from_input(raw: &str) -> TaskCommand {
        TaskCommand::SetTags(parse_tags(raw))
    }

    // --- 関連エンティティ ---

    /// 空文字列・`null` は `null`、数値文字列は整数
    pub fn encode_related_student_id(raw: Option<&str>) -> AppResult<Option<i64>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::parse_entity_id(value, "related_student_id").map(Some),
        }
    }

    pub fn encode_related_entity(entity: RelatedEntity) -> RelationColumns {
        let kind = entity.kind();
        RelationColumns {
            linked_entity_type: if entity.is_none() {
                None
            } else {
                Some(kind.storage_code())
            },
            linked_entity_id: entity.id(),
            related_student_id: entity.student_id(),
            related_lead_id: entity.lead_id(),
        }
    }

    /// ストレージ行から関連エンティティを復元
    ///
    /// `linked_entity_*` を優先し、未設定の古い行は
    /// `related_student_id` / `related_lead_id` から推定する。
    pub fn decode_related_entity(record: &TaskRecord) -> RelatedEntity {
        let linked_type = record
            .linked_entity_type
            .as_deref()
            .and_then(|code| {
                let decoded = RelatedEntityType::from_storage_code(code);
                if decoded.is_none() {
                    warn!(task_id = record.id, code = %code, "Unknown linked_entity_type");
                }
                decoded
            })
            .unwrap_or(RelatedEntityType::None);

        if linked_type != RelatedEntityType::None {
            return match record.linked_entity_id {
                Some(id) => linked_type.with_id(id),
                None => {
                    warn!(
                        task_id = record.id,
                        linked_type = %linked_type,
                        "linked_entity_type without linked_entity_id"
                    );
                    RelatedEntity::None
                }
            };
        }

        if let Some(id) = record.related_student_id {
            RelatedEntity::Student(id)
        } else if let Some(id) = record.related_lead_id {
            RelatedEntity::Lead(id)
        } else {
            RelatedEntity::None
        }
    }

    // --- タスク全体 ---

    /// ストレージのレコードをUI形式のタスクに変換
    pub fn decode_task(record: TaskRecord) -> Task {
        let status = Self::decode_status(&record.status).unwrap_or_else(|| {
            warn!(task_id = record.id, status = %record.status, "Unknown storage status");
            TaskStatus::default()
        });
        let priority = Self::decode_priority(&record.priority).unwrap_or_else(|| {
            warn!(task_id = record.id, priority = %record.priority, "Unknown storage priority");
            TaskPriority::default()
        });
        let domain = record
            .task_domain
            .as_deref()
            .and_then(TaskDomain::from_storage_code)
            .unwrap_or_default();
        let related = Self::decode_related_entity(&record);

        let mut task = Task::new(TaskId::from_storage(record.id), record.title.clone());
        task.description = record.description.clone().unwrap_or_default();
        task.assignees = Self::decode_assignees(&record);
        task.start_date = record.start_date.as_deref().and_then(Self::decode_date);
        task.due_date = record.due_date.as_deref().and_then(Self::decode_date);
        task.priority = priority;
        task.status = status;
        task.tags = record.tags.clone().unwrap_or_default();
        task.domain = domain;
        task.set_related(related);
        task.related_meeting = record.meeting.as_ref().map(|m| RelatedMeeting {
            id: m.id,
            title: m.title.clone(),
            meeting_type: m.meeting_type.clone(),
            start_time: m.start_time,
            status: m.status.clone(),
        });
        task.created_by = record.created_by;
        task.completed_at = record.completed_at;
        task.created_at = record.created_at;
        task.updated_at = record.updated_at;

        if let Some(student) = record.student.as_ref() {
            task.set_preview(EntityPreview {
                entity: RelatedEntity::Student(student.id),
                name: student.name.clone(),
                status: student.status.clone(),
                avatar: student.avatar_url.clone(),
            });
        } else if let Some(lead) = record.lead.as_ref() {
            task.set_preview(EntityPreview {
                entity: RelatedEntity::Lead(lead.id),
                name: lead.name.clone(),
                status: lead.status.clone(),
                avatar: None,
            });
        }

        task
    }

    /// `assigned_to` の順序で結合済み社員を並べる（見つからないIDは除外）
    fn decode_assignees(record: &TaskRecord) -> Vec<Assignee> {
        let employees = record.assignees.as_deref().unwrap_or_default();
        let to_assignee = |employee: &EmployeeRecord| Assignee {
            id: employee.id.to_string(),
            name: employee.name.clone(),
            avatar: employee.avatar_url.clone(),
            role: employee.position.clone(),
        };

        match record.assigned_to.as_deref() {
            Some(ids) => ids
                .iter()
                .filter_map(|id| employees.iter().find(|e| e.id == *id))
                .map(to_assignee)
                .collect(),
            None => employees.iter().map(to_assignee).collect(),
        }
    }

    /// 更新コマンド列を部分更新ペイロードに変換
    pub fn encode_commands(commands: &[TaskCommand]) -> AppResult<TaskPatch> {
        let mut patch = TaskPatch::default();
        for command in commands {
            match command {
                TaskCommand::SetTitle(title) => patch.title = Some(title.trim().to_string()),
                TaskCommand::SetDescription(description) => {
                    patch.description = Some(description.clone())
                }
                TaskCommand::SetStatus(status) => {
                    patch.status = Some(Self::encode_status(*status).to_string())
                }
                TaskCommand::SetPriority(priority) => {
                    patch.priority = Some(Self::encode_priority(*priority).to_string())
                }
                TaskCommand::SetAssignees(assignees) => {
                    patch.assigned_to = Some(Self::encode_assignees(assignees)?)
                }
                TaskCommand::SetStartDate(date) => patch.start_date = Some(Self::encode_date(*date)),
                TaskCommand::SetDueDate(date) => patch.due_date = Some(Self::encode_date(*date)),
                TaskCommand::SetTags(tags) => patch.tags = Some(tags.clone()),
                TaskCommand::SetDomain(domain) => {
                    patch.task_domain = Some(domain.storage_code().to_string())
                }
                TaskCommand::SetRelatedEntity(entity) => {
                    let columns = Self::encode_related_entity(*entity);
                    patch.linked_entity_type =
                        Some(columns.linked_entity_type.map(str::to_string));
                    patch.linked_entity_id = Some(columns.linked_entity_id);
                    patch.related_student_id = Some(columns.related_student_id);
                    patch.related_lead_id = Some(columns.related_lead_id);
                }
                TaskCommand::SetRelatedMeeting(meeting) => {
                    patch.meeting_id = Some(meeting.as_ref().map(|m| m.id))
                }
            }
        }
        Ok(patch)
    }

    /// ステータスが変わったときだけ完了日時の列を送る
    ///
    /// `current` は楽観的更新を適用した後のタスク。
    pub fn encode_completion(
        previous: Option<TaskStatus>,
        current: &Task,
    ) -> Option<Option<DateTime<Utc>>> {
        (previous != Some(current.status)).then_some(current.completed_at)
    }

    /// 作成フォームのドラフトを新規作成ペイロードに変換
    pub fn encode_draft(draft: &TaskDraft, session: &SessionContext) -> AppResult<NewTaskRecord> {
        let columns = Self::encode_related_entity(draft.related);
        let description = draft.description.trim();
        Ok(NewTaskRecord {
            title: draft.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            status: Self::encode_status(draft.status).to_string(),
            priority: Self::encode_priority(draft.priority).to_string(),
            assigned_to: Self::encode_assignees(&draft.assignees)?,
            created_by: session.employee_id,
            start_date: Self::encode_date(draft.start_date),
            due_date: Self::encode_date(draft.due_date),
            tags: draft.tags.clone(),
            task_domain: draft.domain.storage_code().to_string(),
            linked_entity_type: columns.linked_entity_type.map(str::to_string),
            linked_entity_id: columns.linked_entity_id,
            related_student_id: columns.related_student_id,
            related_lead_id: columns.related_lead_id,
            meeting_id: draft.related_meeting.as_ref().map(|m| m.id),
        })
    }

    fn parse_entity_id(raw: &str, field: &str) -> AppResult<i64> {
        raw.trim().parse::<i64>().map_err(|_| {
            bad_request_error(
                &format!("Malformed id for {}: '{}'", field, raw),
                "field_translator::parse_entity_id",
            )
        })
    }
}
