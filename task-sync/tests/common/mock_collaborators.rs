// tests/common/mock_collaborators.rs

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use task_sync::domain::subtask_model::{NewSubtask, Subtask};
use task_sync::domain::task_attachment_model::{NewTaskAttachment, TaskAttachment};
use task_sync::domain::task_comment_model::{CommentAuthor, NewTaskComment, TaskComment};
use task_sync::error::AppResult;
use task_sync::repository::attachment_repository::AttachmentRepository;
use task_sync::repository::relation_directory::{EntityOption, RelationDirectory};
use task_sync::service::comment_service::CommentService;
use task_sync::service::subtask_service::SubtaskService;
use task_sync::utils::error_helper::{network_error, not_found_error};

// === 関連付け候補 ===

pub struct MockRelationDirectory {
    pub students: Vec<EntityOption>,
    pub leads: Vec<EntityOption>,
    pub employees: Vec<EntityOption>,
    pub calls: AtomicUsize,
}

impl MockRelationDirectory {
    pub fn new() -> Self {
        Self {
            students: vec![
                EntityOption::new(5, "Li Wei"),
                EntityOption::new(6, "An Qi"),
            ],
            leads: vec![EntityOption::new(42, "Zhao Min")],
            employees: vec![EntityOption::new(1, "Chen"), EntityOption::new(3, "Wang")],
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RelationDirectory for MockRelationDirectory {
    async fn list_students(&self) -> AppResult<Vec<EntityOption>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.students.clone())
    }

    async fn list_leads(&self) -> AppResult<Vec<EntityOption>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.leads.clone())
    }

    async fn list_employees(&self) -> AppResult<Vec<EntityOption>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.employees.clone())
    }
}

// === 添付ファイルのメタデータ ===

pub struct MockAttachmentRepository {
    rows: Mutex<Vec<TaskAttachment>>,
    next_id: AtomicI64,
    fail_create: AtomicBool,
}

impl MockAttachmentRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_create: AtomicBool::new(false),
        }
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl AttachmentRepository for MockAttachmentRepository {
    async fn list_by_task(&self, task_id: i64) -> AppResult<Vec<TaskAttachment>> {
        let mut rows: Vec<TaskAttachment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.task_id == task_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<TaskAttachment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, data: NewTaskAttachment) -> AppResult<TaskAttachment> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(network_error("metadata insert failed", "mock_attachments::create"));
        }
        let row = TaskAttachment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            task_id: data.task_id,
            file_name: data.file_name,
            file_url: data.file_url,
            file_path: data.file_path,
            file_size: data.file_size,
            mime_type: data.mime_type,
            uploaded_by: data.uploaded_by,
            uploaded_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }

    async fn delete_by_task(&self, task_id: i64) -> AppResult<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.task_id != task_id);
        Ok(before - rows.len())
    }
}

// === サブタスク ===

pub struct MockSubtaskService {
    rows: Mutex<Vec<Subtask>>,
    next_id: AtomicI64,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl MockSubtaskService {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SubtaskService for MockSubtaskService {
    async fn list(&self, task_id: i64) -> AppResult<Vec<Subtask>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn create(&self, subtask: NewSubtask) -> AppResult<Subtask> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let row = Subtask {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            task_id: subtask.task_id,
            title: subtask.title,
            description: subtask.description,
            status: "待处理".to_string(),
            completed: false,
            due_date: subtask.due_date,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn toggle_completed(&self, id: i64, completed: bool) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found_error("Subtask", &id.to_string(), "mock_subtasks"))?;
        row.completed = completed;
        row.status = if completed { "已完成" } else { "待处理" }.to_string();
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.rows.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

// === コメント ===

pub struct MockCommentService {
    rows: Mutex<Vec<TaskComment>>,
    next_id: AtomicI64,
    fail_delete: AtomicBool,
}

impl MockCommentService {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_delete: AtomicBool::new(false),
        }
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn count_for(&self, task_id: i64) -> usize {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.task_id == task_id)
            .count()
    }
}

#[async_trait]
impl CommentService for MockCommentService {
    async fn list(&self, task_id: i64) -> AppResult<Vec<TaskComment>> {
        let mut rows: Vec<TaskComment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.created_at, c.id));
        Ok(rows)
    }

    async fn create(&self, comment: NewTaskComment) -> AppResult<TaskComment> {
        let employee = comment.employee_id.map(|id| CommentAuthor {
            id,
            name: if id == 1 { "Chen" } else { "Wang" }.to_string(),
            avatar_url: None,
        });
        let row = TaskComment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            task_id: comment.task_id,
            employee_id: comment.employee_id,
            content: comment.content,
            created_at: Utc::now(),
            employee,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete_by_task(&self, task_id: i64) -> AppResult<usize> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(network_error("comments unavailable", "mock_comments::delete_by_task"));
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.task_id != task_id);
        Ok(before - rows.len())
    }
}
