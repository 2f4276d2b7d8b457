// task-sync/src/types/response.rs

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorDetail};

/// 変更操作の結果（画面のトースト表示用）
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl OperationResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: &AppError) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(ErrorDetail::from(error)),
        }
    }

    /// エラー種別のタグ（失敗時のみ）
    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.error_type.as_str())
    }
}

impl From<&AppError> for OperationResult {
    fn from(error: &AppError) -> Self {
        Self::failure(error.user_message(), error)
    }
}
