// task-sync/src/domain/session.rs

use serde::{Deserialize, Serialize};

/// 操作を行う社員のコンテキスト
///
/// 作成者・アップロード者の記録に使う。ブラウザのストレージなど
/// 暗黙の状態からは読まず、すべての変更操作に明示的に渡す。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
}

impl SessionContext {
    pub fn new(employee_id: i64, employee_name: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id),
            employee_name: Some(employee_name.into()),
        }
    }

    /// ログインしていない（社員不明の）セッション
    pub fn anonymous() -> Self {
        Self::default()
    }
}
