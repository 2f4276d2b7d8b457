// task-sync/src/domain/task_command.rs

use super::related_entity::{RelatedEntity, RelatedMeeting};
use super::task_domain::TaskDomain;
use super::task_model::Assignee;
use super::task_priority::TaskPriority;
use super::task_status::TaskStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// タスクの部分更新コマンド
///
/// 日付の `None` は「日付をクリアする」を意味する。
/// 「変更しない」はコマンドを送らないことで表現する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum TaskCommand {
    SetTitle(String),
    SetDescription(String),
    SetStatus(TaskStatus),
    SetPriority(TaskPriority),
    SetAssignees(Vec<Assignee>),
    SetStartDate(Option<NaiveDate>),
    SetDueDate(Option<NaiveDate>),
    SetTags(Vec<String>),
    SetDomain(TaskDomain),
    SetRelatedEntity(RelatedEntity),
    SetRelatedMeeting(Option<RelatedMeeting>),
}

impl TaskCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetTitle(_) => "set_title",
            Self::SetDescription(_) => "set_description",
            Self::SetStatus(_) => "set_status",
            Self::SetPriority(_) => "set_priority",
            Self::SetAssignees(_) => "set_assignees",
            Self::SetStartDate(_) => "set_start_date",
            Self::SetDueDate(_) => "set_due_date",
            Self::SetTags(_) => "set_tags",
            Self::SetDomain(_) => "set_domain",
            Self::SetRelatedEntity(_) => "set_related_entity",
            Self::SetRelatedMeeting(_) => "set_related_meeting",
        }
    }
}
