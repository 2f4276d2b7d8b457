// task-sync/src/repository/task_gateway.rs

//! リモートのタスクストアとの境界
//!
//! ストレージ側のレコード形式（中国語の列挙値、整数ID、`null` 許容列）を
//! そのまま表現する。UI形式への変換は `FieldTranslator` が担う。

use crate::error::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 結合済みの担当者情報
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub meeting_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

/// ストレージ側のタスクレコード（結合データ付き）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(default)]
    pub assigned_to: Option<Vec<i64>>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub related_student_id: Option<i64>,
    #[serde(default)]
    pub related_lead_id: Option<i64>,
    #[serde(default)]
    pub task_domain: Option<String>,
    #[serde(default)]
    pub linked_entity_type: Option<String>,
    #[serde(default)]
    pub linked_entity_id: Option<i64>,
    #[serde(default)]
    pub meeting_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // 関連データ
    #[serde(default)]
    pub assignees: Option<Vec<EmployeeRecord>>,
    #[serde(default)]
    pub student: Option<StudentRecord>,
    #[serde(default)]
    pub lead: Option<LeadRecord>,
    #[serde(default)]
    pub meeting: Option<MeetingRecord>,
}

/// 新規作成ペイロード
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaskRecord {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assigned_to: Option<Vec<i64>>,
    pub created_by: Option<i64>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub tags: Vec<String>,
    pub task_domain: String,
    pub linked_entity_type: Option<String>,
    pub linked_entity_id: Option<i64>,
    // 後方互換のためのミラー列
    pub related_student_id: Option<i64>,
    pub related_lead_id: Option<i64>,
    pub meeting_id: Option<i64>,
}

/// 部分更新ペイロード
///
/// 外側の `None` は「変更しない」（シリアライズ時に省略）、
/// `Some(None)` は列を `null` にする。
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<Vec<i64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity_type: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_student_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_lead_id: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// リモートのタスクストア
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// 全タスクを取得（作成日時の降順、結合データ付き）
    async fn list_tasks(&self) -> AppResult<Vec<TaskRecord>>;

    async fn create_task(&self, record: NewTaskRecord) -> AppResult<TaskRecord>;

    async fn update_task(&self, id: i64, patch: TaskPatch) -> AppResult<()>;

    /// ステータスと完了日時を書き込む（完了以外の状態では `completed_at` は `None`）
    async fn update_task_status(
        &self,
        id: i64,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// タスクを削除。存在しない場合は `NotFound`、参照制約違反は `Conflict`、
    /// 通信失敗は `ExternalServiceError` を返す
    async fn delete_task(&self, id: i64) -> AppResult<()>;
}
