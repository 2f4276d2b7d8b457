// src/error.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 参照制約違反など、他のレコードとの整合性で拒否された
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// ネットワーク・リモートストアへの到達失敗
    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// エラー種別を安定したタグとして取得
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) => "validation_error",
            AppError::ValidationErrors(_) | AppError::ValidationFailure(_) => "validation_errors",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::InternalServerError(_) => "internal_server_error",
            AppError::ExternalServiceError(_) => "network_error",
        }
    }

    /// バリデーション系のエラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::ValidationErrors(_)
                | AppError::ValidationFailure(_)
        )
    }

    /// 画面に表示するためのメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(message) => format!("Task not found: {}", message),
            AppError::ValidationError(message) => message.clone(),
            AppError::ValidationErrors(errors) => errors.join("; "),
            AppError::ValidationFailure(errors) => field_messages(errors)
                .into_iter()
                .flat_map(|(field, messages)| {
                    messages
                        .into_iter()
                        .map(move |msg| format!("{}: {}", field, msg))
                })
                .collect::<Vec<_>>()
                .join("; "),
            AppError::BadRequest(message) => format!("Invalid request: {}", message),
            AppError::Conflict(message) => {
                format!("Blocked by related records: {}", message)
            }
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
            AppError::ExternalServiceError(message) => {
                format!("Network error, please retry: {}", message)
            }
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラー詳細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub error_type: String,
    pub message: String,
}

impl From<&AppError> for ErrorDetail {
    fn from(error: &AppError) -> Self {
        Self {
            error_type: error.kind().to_string(),
            message: error.user_message(),
        }
    }
}
