// task-sync/src/domain/related_entity.rs

use crate::service::field_translator::StorageCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 関連エンティティの種別（判別子）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelatedEntityType {
    Student,
    Lead,
    Employee,
    #[default]
    None,
}

impl RelatedEntityType {
    pub fn all() -> [Self; 4] {
        [Self::Student, Self::Lead, Self::Employee, Self::None]
    }

    /// 指定IDでエンティティを組み立てる（`None` 種別はIDを持てない）
    pub fn with_id(&self, id: i64) -> RelatedEntity {
        match self {
            Self::Student => RelatedEntity::Student(id),
            Self::Lead => RelatedEntity::Lead(id),
            Self::Employee => RelatedEntity::Employee(id),
            Self::None => RelatedEntity::None,
        }
    }
}

impl fmt::Display for RelatedEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_code())
    }
}

/// タスクが参照する関連エンティティ
///
/// 種別とIDを一つの値で持つため、「種別はリードなのにIDは古い学生のまま」
/// といった不整合は表現できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RelatedEntity {
    #[default]
    None,
    Student(i64),
    Lead(i64),
    Employee(i64),
}

impl RelatedEntity {
    pub fn kind(&self) -> RelatedEntityType {
        match self {
            Self::None => RelatedEntityType::None,
            Self::Student(_) => RelatedEntityType::Student,
            Self::Lead(_) => RelatedEntityType::Lead,
            Self::Employee(_) => RelatedEntityType::Employee,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::None => None,
            Self::Student(id) | Self::Lead(id) | Self::Employee(id) => Some(*id),
        }
    }

    pub fn student_id(&self) -> Option<i64> {
        match self {
            Self::Student(id) => Some(*id),
            _ => None,
        }
    }

    pub fn lead_id(&self) -> Option<i64> {
        match self {
            Self::Lead(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// 関連エンティティの表示用プレビュー（非正規化、常に再導出可能）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPreview {
    pub entity: RelatedEntity,
    pub name: String,
    pub status: Option<String>,
    pub avatar: Option<String>,
}

/// タスクに紐づく会議（関連エンティティとは独立した軸）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedMeeting {
    pub id: i64,
    pub title: String,
    pub meeting_type: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
}
