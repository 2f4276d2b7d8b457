// task-sync/src/domain/task_comment_model.rs

use crate::utils::validation::common;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// コメント投稿者（結合済みの社員情報）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: i64,
    pub task_id: i64,
    pub employee_id: Option<i64>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub employee: Option<CommentAuthor>,
}

impl TaskComment {
    pub fn author_name(&self) -> Option<&str> {
        self.employee.as_ref().map(|author| author.name.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewTaskComment {
    pub task_id: i64,

    /// 投稿者（セッションの社員。未ログインなら `None`）
    pub employee_id: Option<i64>,

    #[validate(
        length(
            max = common::comment::CONTENT_MAX_LENGTH,
            message = "Comment must not exceed 2000 characters"
        ),
        custom(function = common::validate_not_empty_or_whitespace)
    )]
    pub content: String,
}
