// task-sync/src/domain/subtask_model.rs

use crate::utils::validation::common;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// サブタスク（親タスクの状態とは連動しない）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewSubtask {
    pub task_id: i64,

    #[validate(
        length(
            max = common::subtask::TITLE_MAX_LENGTH,
            message = "Subtask title must not exceed 200 characters"
        ),
        custom(function = common::validate_not_empty_or_whitespace)
    )]
    pub title: String,

    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
}
