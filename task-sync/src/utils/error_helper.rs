// task-sync/src/utils/error_helper.rs

//! エラーハンドリングの統一化ヘルパー
//!
//! ストア・サービス層で共通して使用するエラー処理パターンを提供します。

use crate::error::AppError;
use tracing::warn;
use validator::ValidationErrors;

// =============================================================================
// バリデーションエラー処理の統一
// =============================================================================

/// validatorのValidationErrorsをAppErrorに変換する統一処理
///
/// # Arguments
/// * `validation_errors` - validator crate からのバリデーションエラー
/// * `context` - エラーが発生したコンテキスト（ログ用）
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Invalid value".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();

    AppError::ValidationErrors(errors)
}

/// 単一のバリデーションエラーメッセージを生成
pub fn validation_error(field: &str, message: &str) -> AppError {
    AppError::ValidationError(format!("{}: {}", field, message))
}

// =============================================================================
// ログ付きエラー変換パターン
// =============================================================================

/// リソース未発見エラーをログ付きで生成
pub fn not_found_error(resource: &str, identifier: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        resource = %resource,
        identifier = %identifier,
        "Resource not found"
    );
    AppError::NotFound(format!(
        "{} with identifier {} not found",
        resource, identifier
    ))
}

/// 競合（参照制約）エラーをログ付きで生成
pub fn conflict_error(message: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        message = %message,
        "Resource conflict occurred"
    );
    AppError::Conflict(message.to_string())
}

/// ネットワーク・リモートストアエラーをログ付きで生成
pub fn network_error<E: std::fmt::Display>(error: E, context: &str) -> AppError {
    warn!(
        error = %error,
        context = %context,
        "Remote call failed"
    );
    AppError::ExternalServiceError(error.to_string())
}

/// 不正なリクエスト値（ID形式など）をログ付きで生成
pub fn bad_request_error(message: &str, context: &str) -> AppError {
    warn!(
        context = %context,
        message = %message,
        "Bad request"
    );
    AppError::BadRequest(message.to_string())
}
