// task-sync/src/repository/relation_directory.rs

use crate::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 関連付け候補（学生・リード・社員）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOption {
    pub id: i64,
    pub name: String,
    /// 学生・リードは状態、社員は役職
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl EntityOption {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: None,
            avatar_url: None,
            is_active: None,
        }
    }
}

/// 関連付け候補の取得元
#[async_trait]
pub trait RelationDirectory: Send + Sync {
    async fn list_students(&self) -> AppResult<Vec<EntityOption>>;

    async fn list_leads(&self) -> AppResult<Vec<EntityOption>>;

    async fn list_employees(&self) -> AppResult<Vec<EntityOption>>;
}
