// task-sync/src/utils/validation/common.rs

//! 共通バリデーション定数と関数
//!
//! タスク作成・編集のドラフトで共有するバリデーションルールを統一管理します。

use validator::ValidationError;

// =============================================================================
// バリデーション定数
// =============================================================================

/// タスク関連の制約
pub mod task {
    pub const TITLE_MIN_LENGTH: u64 = 1;
    pub const TITLE_MAX_LENGTH: u64 = 200;
    pub const DESCRIPTION_MAX_LENGTH: u64 = 2000;
}

/// サブタスク関連の制約
pub mod subtask {
    pub const TITLE_MAX_LENGTH: u64 = 200;
}

/// コメント関連の制約
pub mod comment {
    pub const CONTENT_MAX_LENGTH: u64 = 2000;
}

// =============================================================================
// カスタムバリデーション関数
// =============================================================================

/// 文字列が空白のみでないかをチェック
pub fn validate_not_empty_or_whitespace(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("empty_or_whitespace");
        error.message = Some("Field cannot be empty or contain only whitespace".into());
        return Err(error);
    }
    Ok(())
}

/// タスクタイトルのバリデーション
pub fn validate_task_title(title: &str) -> Result<(), ValidationError> {
    validate_not_empty_or_whitespace(title)?;

    if title.contains('\0') || title.contains('\r') || title.contains('\n') {
        let mut error = ValidationError::new("invalid_characters");
        error.message =
            Some("Title cannot contain null, carriage return, or newline characters".into());
        return Err(error);
    }

    Ok(())
}

// =============================================================================
// テスト
// =============================================================================
