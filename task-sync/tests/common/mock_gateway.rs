// tests/common/mock_gateway.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use task_sync::error::{AppError, AppResult};
use task_sync::repository::task_gateway::{NewTaskRecord, TaskGateway, TaskPatch, TaskRecord};
use task_sync::utils::error_helper::not_found_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    List,
    Create,
    Update,
    UpdateStatus,
    Delete,
}

/// テスト用のインメモリタスクストア
///
/// 操作ごとに次回の失敗・遅延を積んでおける。
pub struct MockTaskGateway {
    records: Mutex<Vec<TaskRecord>>,
    next_id: AtomicI64,
    failures: Mutex<HashMap<GatewayOp, VecDeque<AppError>>>,
    delays: Mutex<HashMap<GatewayOp, VecDeque<Duration>>>,
    reply_delays: Mutex<HashMap<GatewayOp, VecDeque<Duration>>>,
    calls: Mutex<Vec<GatewayOp>>,
    patches: Mutex<Vec<(i64, TaskPatch)>>,
}

impl MockTaskGateway {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            records: Mutex::new(records),
            next_id: AtomicI64::new(next_id),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            reply_delays: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            patches: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, op: GatewayOp, error: AppError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    pub fn delay_next(&self, op: GatewayOp, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    /// 変更を保存した後、応答だけを遅らせる
    pub fn delay_reply(&self, op: GatewayOp, delay: Duration) {
        self.reply_delays
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    pub fn call_count(&self, op: GatewayOp) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn patches(&self) -> Vec<(i64, TaskPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn record(&self, id: i64) -> Option<TaskRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// 他の利用者による変更を再現する
    pub fn edit_record(&self, id: i64, edit: impl FnOnce(&mut TaskRecord)) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            edit(record);
        }
    }

    async fn before(&self, op: GatewayOp) -> AppResult<()> {
        self.calls.lock().unwrap().push(op);
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn reply(&self, op: GatewayOp) {
        let delay = self
            .reply_delays
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn apply_patch(record: &mut TaskRecord, patch: &TaskPatch) {
    if let Some(title) = &patch.title {
        record.title = title.clone();
    }
    if let Some(description) = &patch.description {
        record.description = Some(description.clone());
    }
    if let Some(status) = &patch.status {
        record.status = status.clone();
    }
    if let Some(priority) = &patch.priority {
        record.priority = priority.clone();
    }
    if let Some(assigned_to) = &patch.assigned_to {
        record.assigned_to = assigned_to.clone();
    }
    if let Some(start_date) = &patch.start_date {
        record.start_date = start_date.clone();
    }
    if let Some(due_date) = &patch.due_date {
        record.due_date = due_date.clone();
    }
    if let Some(completed_at) = patch.completed_at {
        record.completed_at = completed_at;
    }
    if let Some(tags) = &patch.tags {
        record.tags = Some(tags.clone());
    }
    if let Some(domain) = &patch.task_domain {
        record.task_domain = Some(domain.clone());
    }
    if let Some(kind) = &patch.linked_entity_type {
        record.linked_entity_type = kind.clone();
    }
    if let Some(id) = patch.linked_entity_id {
        record.linked_entity_id = id;
    }
    if let Some(id) = patch.related_student_id {
        record.related_student_id = id;
        record.student = None;
    }
    if let Some(id) = patch.related_lead_id {
        record.related_lead_id = id;
        record.lead = None;
    }
    if let Some(id) = patch.meeting_id {
        record.meeting_id = id;
        record.meeting = None;
    }
    record.updated_at = Utc::now();
}

#[async_trait]
impl TaskGateway for MockTaskGateway {
    async fn list_tasks(&self) -> AppResult<Vec<TaskRecord>> {
        // 遅延前の状態を返す（遅れて届く古い応答を再現する）
        let snapshot = self.records.lock().unwrap().clone();
        self.before(GatewayOp::List).await?;
        Ok(snapshot)
    }

    async fn create_task(&self, new: NewTaskRecord) -> AppResult<TaskRecord> {
        self.before(GatewayOp::Create).await?;
        let now = Utc::now();
        let record = TaskRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            assigned_to: new.assigned_to,
            created_by: new.created_by,
            start_date: new.start_date,
            due_date: new.due_date,
            completed_at: None,
            tags: Some(new.tags),
            related_student_id: new.related_student_id,
            related_lead_id: new.related_lead_id,
            task_domain: Some(new.task_domain),
            linked_entity_type: new.linked_entity_type,
            linked_entity_id: new.linked_entity_id,
            meeting_id: new.meeting_id,
            created_at: now,
            updated_at: now,
            assignees: None,
            student: None,
            lead: None,
            meeting: None,
        };
        self.records.lock().unwrap().insert(0, record.clone());
        self.reply(GatewayOp::Create).await;
        Ok(record)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> AppResult<()> {
        self.before(GatewayOp::Update).await?;
        self.patches.lock().unwrap().push((id, patch.clone()));
        {
            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found_error("Task", &id.to_string(), "mock_gateway"))?;
            apply_patch(record, &patch);
        }
        self.reply(GatewayOp::Update).await;
        Ok(())
    }

    async fn update_task_status(
        &self,
        id: i64,
        status: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.before(GatewayOp::UpdateStatus).await?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found_error("Task", &id.to_string(), "mock_gateway"))?;
        record.status = status.to_string();
        record.completed_at = completed_at;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_task(&self, id: i64) -> AppResult<()> {
        self.before(GatewayOp::Delete).await?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(not_found_error("Task", &id.to_string(), "mock_gateway"));
        }
        Ok(())
    }
}
