// task-sync/src/domain/task_status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// タスクの状態を表すenum（UI側の表現）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Canceled,
}

impl TaskStatus {
    /// 文字列からTaskStatusに変換
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "canceled" | "cancelled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// TaskStatusを文字列として取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// すべての有効なステータスを取得
    pub fn all() -> [Self; 4] {
        [
            Self::Pending,
            Self::InProgress,
            Self::Completed,
            Self::Canceled,
        ]
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// ステータスが終了状態かチェック（期限切れ判定の対象外）
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    /// ステータスの表示名を取得
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Invalid task status: '{}'. Valid statuses are: {}",
                s,
                Self::all()
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}
