// tests/common/test_data.rs

use chrono::{NaiveDate, Utc};
use task_sync::domain::SessionContext;
use task_sync::repository::task_gateway::{LeadRecord, TaskRecord};

/// テストの「今日」
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

pub fn session() -> SessionContext {
    SessionContext::new(1, "Chen")
}

/// ストレージ形式のタスクレコードを生成
pub fn record(id: i64, title: &str) -> TaskRecord {
    let now = Utc::now();
    TaskRecord {
        id,
        title: title.to_string(),
        description: None,
        status: "待处理".to_string(),
        priority: "中".to_string(),
        assigned_to: None,
        created_by: Some(1),
        start_date: None,
        due_date: None,
        completed_at: None,
        tags: None,
        related_student_id: None,
        related_lead_id: None,
        task_domain: Some("general".to_string()),
        linked_entity_type: None,
        linked_entity_id: None,
        meeting_id: None,
        created_at: now,
        updated_at: now,
        assignees: None,
        student: None,
        lead: None,
        meeting: None,
    }
}

/// リードに紐づいたタスクレコード
pub fn lead_record(id: i64, title: &str, lead_id: i64, lead_name: &str) -> TaskRecord {
    let mut record = record(id, title);
    record.task_domain = Some("marketing".to_string());
    record.linked_entity_type = Some("lead".to_string());
    record.linked_entity_id = Some(lead_id);
    record.related_lead_id = Some(lead_id);
    record.lead = Some(LeadRecord {
        id: lead_id,
        name: lead_name.to_string(),
        status: None,
    });
    record
}
