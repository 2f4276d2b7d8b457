// task-sync/src/domain/task_domain.rs

use super::related_entity::RelatedEntityType;
use crate::service::field_translator::StorageCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// タスクの業務領域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskDomain {
    #[default]
    General,
    StudentSuccess,
    CompanyOps,
    Marketing,
}

impl TaskDomain {
    pub fn all() -> [Self; 4] {
        [
            Self::General,
            Self::StudentSuccess,
            Self::CompanyOps,
            Self::Marketing,
        ]
    }

    /// 領域ごとの既定の関連エンティティ種別
    pub fn default_related_type(&self) -> RelatedEntityType {
        match self {
            Self::General => RelatedEntityType::None,
            Self::StudentSuccess => RelatedEntityType::Student,
            Self::CompanyOps => RelatedEntityType::Employee,
            Self::Marketing => RelatedEntityType::Lead,
        }
    }
}

impl fmt::Display for TaskDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_code())
    }
}
