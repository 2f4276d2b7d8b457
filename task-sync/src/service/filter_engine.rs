// task-sync/src/service/filter_engine.rs

use crate::domain::{
    EntityPreview, RelatedEntity, RelatedEntityType, RelatedMeeting, Task, TaskDomain,
    TaskPriority, TaskStatus,
};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// 期限による絞り込み
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeView {
    #[default]
    All,
    Today,
    Tomorrow,
    Week,
    Expired,
}

impl TimeView {
    /// 期限日の判定。`All` 以外は期限のないタスクに一致しない
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if *self == Self::All {
            return true;
        }
        let Some(due) = task.due_date else {
            return false;
        };
        match self {
            Self::All => true,
            Self::Today => due == today,
            Self::Tomorrow => due == today + Duration::days(1),
            Self::Week => due >= today && due < today + Duration::days(7),
            Self::Expired => due < today && !task.status.is_finished(),
        }
    }
}

/// 一覧の絞り込み条件（`None` は「すべて」）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
    pub tag: Option<String>,
    pub time_view: TimeView,
    pub student: Option<i64>,
    pub meeting: Option<i64>,
    pub domain: Option<TaskDomain>,
    pub related_entity_type: Option<RelatedEntityType>,
}

/// 絞り込み条件の個別変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    Search(String),
    Status(Option<TaskStatus>),
    Priority(Option<TaskPriority>),
    Assignee(Option<String>),
    Tag(Option<String>),
    TimeView(TimeView),
    Student(Option<i64>),
    Meeting(Option<i64>),
    Domain(Option<TaskDomain>),
    RelatedEntityType(Option<RelatedEntityType>),
}

impl FilterState {
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Search(search) => self.search = search,
            FilterUpdate::Status(status) => self.status = status,
            FilterUpdate::Priority(priority) => self.priority = priority,
            FilterUpdate::Assignee(assignee) => self.assignee = assignee,
            FilterUpdate::Tag(tag) => self.tag = tag,
            FilterUpdate::TimeView(time_view) => self.time_view = time_view,
            FilterUpdate::Student(student) => self.student = student,
            FilterUpdate::Meeting(meeting) => self.meeting = meeting,
            FilterUpdate::Domain(domain) => self.domain = domain,
            FilterUpdate::RelatedEntityType(kind) => self.related_entity_type = kind,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// すべての条件を満たすか
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        self.matches_search(task)
            && self.status.is_none_or(|status| task.status == status)
            && self.priority.is_none_or(|priority| task.priority == priority)
            && self.assignee.as_deref().is_none_or(|assignee| {
                task.assignee().is_some_and(|first| first.id == assignee)
            })
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| task.tags.iter().any(|t| t == tag))
            && self.time_view.matches(task, today)
            && self
                .student
                .is_none_or(|id| task.related() == RelatedEntity::Student(id))
            && self.meeting.is_none_or(|id| {
                task.related_meeting
                    .as_ref()
                    .is_some_and(|meeting| meeting.id == id)
            })
            && self.domain.is_none_or(|domain| task.domain == domain)
            && self
                .related_entity_type
                .is_none_or(|kind| task.related_type() == kind)
    }

    fn matches_search(&self, task: &Task) -> bool {
        let needle = self.search.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
            || task
                .related_student()
                .is_some_and(|student| student.name.to_lowercase().contains(&needle))
    }
}

/// 条件に一致するタスクを元の順序のまま返す
pub fn filter_tasks_at(tasks: &[Task], state: &FilterState, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| state.matches(task, today))
        .cloned()
        .collect()
}

/// 一覧に現れるタグ（重複なし、昇順）
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .flat_map(|task| task.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 関連付けられた学生（重複なし、名前順）
pub fn related_students(tasks: &[Task]) -> Vec<EntityPreview> {
    let mut seen = HashSet::new();
    let mut students: Vec<EntityPreview> = tasks
        .iter()
        .filter_map(Task::related_student)
        .filter(|student| seen.insert(student.entity))
        .cloned()
        .collect();
    students.sort_by(|a, b| a.name.cmp(&b.name));
    students
}

/// 関連付けられた会議（重複なし、開始日時の新しい順）
pub fn related_meetings(tasks: &[Task]) -> Vec<RelatedMeeting> {
    let mut seen = HashSet::new();
    let mut meetings: Vec<RelatedMeeting> = tasks
        .iter()
        .filter_map(|task| task.related_meeting.as_ref())
        .filter(|meeting| seen.insert(meeting.id))
        .cloned()
        .collect();
    meetings.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    meetings
}

/// 画面の絞り込み状態
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    state: FilterState,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn update_filter(&mut self, update: FilterUpdate) {
        self.state.apply(update);
    }

    pub fn reset_filters(&mut self) {
        self.state = FilterState::default();
    }

    /// 端末のローカル日付を「今日」として絞り込む
    pub fn filtered_tasks(&self, tasks: &[Task]) -> Vec<Task> {
        self.filtered_tasks_at(tasks, Local::now().date_naive())
    }

    pub fn filtered_tasks_at(&self, tasks: &[Task], today: NaiveDate) -> Vec<Task> {
        filter_tasks_at(tasks, &self.state, today)
    }
}
