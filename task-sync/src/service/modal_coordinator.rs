// task-sync/src/service/modal_coordinator.rs

use crate::config::SyncConfig;
use crate::domain::Task;
use std::time::Duration;
use tokio::time::Instant;

/// 表示中のダイアログ
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    Idle,
    Creating,
    Editing(Task),
    ViewingDetail(Task),
    ConfirmingDelete(Task),
}

impl ModalState {
    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Editing(task) | Self::ViewingDetail(task) | Self::ConfirmingDelete(task) => {
                Some(task)
            }
            Self::Idle | Self::Creating => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// ダイアログの排他制御
///
/// 閉じた直後も閉じるアニメーションの間は対象タスクを保持し、
/// `close_delay` 経過後に破棄する。
#[derive(Debug)]
pub struct ModalCoordinator {
    state: ModalState,
    lingering: Option<(Task, Instant)>,
    close_delay: Duration,
}

impl ModalCoordinator {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            state: ModalState::Idle,
            lingering: None,
            close_delay: config.modal_close_delay,
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn open_create(&mut self) {
        self.transition(ModalState::Creating);
    }

    pub fn open_edit(&mut self, task: Task) {
        self.transition(ModalState::Editing(task));
    }

    pub fn open_detail(&mut self, task: Task) {
        self.transition(ModalState::ViewingDetail(task));
    }

    pub fn open_delete_confirm(&mut self, task: Task) {
        self.transition(ModalState::ConfirmingDelete(task));
    }

    pub fn close_all(&mut self) {
        let previous = std::mem::take(&mut self.state);
        if let ModalState::Editing(task)
        | ModalState::ViewingDetail(task)
        | ModalState::ConfirmingDelete(task) = previous
        {
            self.lingering = Some((task, Instant::now() + self.close_delay));
        }
    }

    fn transition(&mut self, next: ModalState) {
        self.lingering = None;
        self.state = next;
    }

    /// 対象タスク（閉じた直後は `close_delay` の間だけ直前のタスク）
    pub fn current_task(&self) -> Option<&Task> {
        self.state.task().or_else(|| {
            self.lingering
                .as_ref()
                .filter(|(_, until)| Instant::now() < *until)
                .map(|(task, _)| task)
        })
    }

    /// ストアの最新の一覧に合わせて保持中のタスクを更新する
    ///
    /// 編集中・詳細表示中のタスクの表示に関わる項目が変わった場合のみ
    /// 差し替え、`true` を返す。
    pub fn sync_with(&mut self, tasks: &[Task]) -> bool {
        let held = match &mut self.state {
            ModalState::Editing(task) | ModalState::ViewingDetail(task) => task,
            _ => return false,
        };
        match tasks.iter().find(|latest| latest.id == held.id) {
            Some(latest) if needs_refresh(held, latest) => {
                *held = latest.clone();
                true
            }
            _ => false,
        }
    }
}

fn needs_refresh(held: &Task, latest: &Task) -> bool {
    held.status != latest.status
        || held.priority != latest.priority
        || held.title != latest.title
        || held.description != latest.description
        || held.start_date != latest.start_date
        || held.due_date != latest.due_date
        || held.assignee_ids_sorted() != latest.assignee_ids_sorted()
        || held.related() != latest.related()
}
