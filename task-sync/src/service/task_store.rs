// task-sync/src/service/task_store.rs

//! タスク一覧の唯一の保持者
//!
//! 楽観的更新は同期的に一覧へ反映し、リモートの確定は `TaskOperations` が
//! `begin_mutation` / `settle` で追跡する。未確定の変更を持つタスクと、
//! 読み込み開始より後に確定したタスクは、スナップショットで上書きせず
//! ローカルの内容を保つ。

use crate::config::SyncConfig;
use crate::domain::{Task, TaskCommand, TaskId};
use crate::error::{AppResult, ErrorDetail};
use crate::log_with_context;
use crate::repository::task_gateway::TaskGateway;
use crate::service::field_translator::FieldTranslator;
use crate::service::relation_resolver::RelationResolver;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct StoreState {
    tasks: Vec<Task>,
    loads_in_flight: usize,
    error: Option<ErrorDetail>,
    started_load: u64,
    applied_load: u64,
    pending: HashMap<TaskId, u64>,
    /// 確定時点で開始済みだった最新の読み込み世代
    settled: HashMap<TaskId, u64>,
    next_seq: u64,
}

impl StoreState {
    /// 世代 `generation` のスナップショットで上書きしてはならないタスク
    fn protected_ids(&self, generation: u64) -> HashSet<TaskId> {
        self.pending
            .keys()
            .chain(
                self.settled
                    .iter()
                    .filter(|(_, settled_at)| **settled_at >= generation)
                    .map(|(id, _)| id),
            )
            .cloned()
            .collect()
    }
}

/// 変更要求の受付票（タスクごとの最新要求かどうかの判定に使う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    task_id: TaskId,
    seq: u64,
}

impl MutationTicket {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct TaskStore {
    gateway: Arc<dyn TaskGateway>,
    resolver: Option<Arc<RelationResolver>>,
    state: RwLock<StoreState>,
    revision: watch::Sender<u64>,
}

impl TaskStore {
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            gateway,
            resolver: None,
            state: RwLock::new(StoreState::default()),
            revision,
        }
    }

    /// 読み込み時にプレビューを補完するリゾルバを設定
    pub fn with_resolver(mut self, resolver: Arc<RelationResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    // --- 参照 ---

    pub fn tasks(&self) -> Vec<Task> {
        self.read().tasks.clone()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.read().tasks.iter().find(|task| &task.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().tasks.is_empty()
    }

    pub fn loading(&self) -> bool {
        self.read().loads_in_flight > 0
    }

    pub fn error(&self) -> Option<ErrorDetail> {
        self.read().error.clone()
    }

    /// 一覧が変わるたびに増えるリビジョン番号
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    // --- 読み込み ---

    /// 全件を読み込む（読み込み中フラグを立てる）
    ///
    /// 失敗時は一覧をそのまま残し、エラーを記録する。
    pub async fn load(&self) -> AppResult<Vec<Task>> {
        self.fetch(false).await
    }

    pub async fn reload(&self) -> AppResult<Vec<Task>> {
        self.fetch(false).await
    }

    /// 読み込み中フラグを立てずに再読み込みする
    pub async fn silent_reload(&self) -> AppResult<Vec<Task>> {
        self.fetch(true).await
    }

    async fn fetch(&self, silent: bool) -> AppResult<Vec<Task>> {
        let generation = {
            let mut state = self.write();
            state.started_load += 1;
            if !silent {
                state.loads_in_flight += 1;
            }
            state.started_load
        };
        if !silent {
            self.notify();
        }

        let fetched = self.gateway.list_tasks().await;
        let mut tasks = match fetched {
            Ok(records) => records
                .into_iter()
                .map(FieldTranslator::decode_task)
                .collect::<Vec<_>>(),
            Err(e) => {
                log_with_context!(
                    tracing::Level::WARN,
                    "Failed to load tasks",
                    "silent" => silent,
                    "error" => e.to_string()
                );
                {
                    let mut state = self.write();
                    if !silent {
                        state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
                    }
                    state.error = Some(ErrorDetail::from(&e));
                }
                self.notify();
                return Err(e);
            }
        };

        if let Some(resolver) = &self.resolver {
            resolver.hydrate(&mut tasks).await;
        }

        let snapshot = {
            let mut state = self.write();
            if !silent {
                state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
            }
            if generation < state.applied_load {
                log_with_context!(
                    tracing::Level::DEBUG,
                    "Discarding stale task snapshot",
                    "generation" => generation,
                    "applied" => state.applied_load
                );
            } else {
                state.applied_load = generation;
                let protected = state.protected_ids(generation);
                let merged = merge_snapshot(tasks, &state.tasks, &protected);
                state.tasks = merged;
                state
                    .settled
                    .retain(|_, settled_at| *settled_at >= generation);
                state.error = None;
            }
            state.tasks.clone()
        };
        self.notify();

        log_with_context!(
            tracing::Level::DEBUG,
            "Tasks loaded",
            "count" => snapshot.len(),
            "silent" => silent
        );
        Ok(snapshot)
    }

    // --- 楽観的更新 ---

    /// 一覧中のタスクに更新を適用する。該当タスクがなければ `false`
    pub fn optimistic_update_task(&self, id: &TaskId, commands: &[TaskCommand]) -> bool {
        let updated = {
            let mut state = self.write();
            match state.tasks.iter_mut().find(|task| &task.id == id) {
                Some(task) => {
                    for command in commands {
                        task.apply(command);
                    }
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify();
        }
        updated
    }

    /// 先頭に追加
    pub fn optimistic_add_task(&self, task: Task) {
        self.write().tasks.insert(0, task);
        self.notify();
    }

    /// 一覧から取り除き、取り除いたタスクを返す
    pub fn optimistic_delete_task(&self, id: &TaskId) -> Option<Task> {
        let removed = {
            let mut state = self.write();
            let index = state.tasks.iter().position(|task| &task.id == id);
            index.map(|index| state.tasks.remove(index))
        };
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    /// 指定IDのタスクを置き換える（一時IDから確定タスクへの差し替えなど）
    ///
    /// 新しいIDを持つ別の要素は取り除き、未確定の受付はそのIDへ引き継ぐ。
    pub fn replace_task(&self, id: &TaskId, task: Task) -> bool {
        let replaced = {
            let mut state = self.write();
            match state.tasks.iter().position(|existing| &existing.id == id) {
                Some(index) => {
                    let new_id = task.id.clone();
                    state.tasks[index] = task;
                    let mut position = 0;
                    state.tasks.retain(|existing| {
                        let keep = position == index || existing.id != new_id;
                        position += 1;
                        keep
                    });
                    if &new_id != id {
                        if let Some(seq) = state.pending.remove(id) {
                            state.pending.insert(new_id, seq);
                        }
                    }
                    true
                }
                None => false,
            }
        };
        if replaced {
            self.notify();
        }
        replaced
    }

    // --- 要求の順序管理 ---

    pub fn begin_mutation(&self, task_id: &TaskId) -> MutationTicket {
        let mut state = self.write();
        state.next_seq += 1;
        let seq = state.next_seq;
        state.pending.insert(task_id.clone(), seq);
        MutationTicket {
            task_id: task_id.clone(),
            seq,
        }
    }

    /// 要求の完了を記録する。そのタスクの最新の要求であれば `true`
    ///
    /// 受付票は `replace_task` によるIDの差し替えにも追従する。
    pub fn settle(&self, ticket: &MutationTicket) -> bool {
        let mut state = self.write();
        let task_id = state
            .pending
            .iter()
            .find(|(_, seq)| **seq == ticket.seq)
            .map(|(id, _)| id.clone());
        match task_id {
            Some(task_id) => {
                state.pending.remove(&task_id);
                let started_load = state.started_load;
                state.settled.insert(task_id, started_load);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self, task_id: &TaskId) -> bool {
        self.read().pending.contains_key(task_id)
    }
}

/// サーバーのスナップショットとローカルの一覧を突き合わせる
///
/// 保護対象のタスクはローカルの状態を優先する。サーバーにまだ存在しない
/// 追加は先頭に残し、削除したタスクは復活させない。
fn merge_snapshot(server: Vec<Task>, local: &[Task], protected: &HashSet<TaskId>) -> Vec<Task> {
    if protected.is_empty() {
        return server;
    }

    let local_by_id: HashMap<&TaskId, &Task> = local.iter().map(|task| (&task.id, task)).collect();
    let server_ids: HashSet<TaskId> = server.iter().map(|task| task.id.clone()).collect();

    let mut merged: Vec<Task> = local
        .iter()
        .filter(|task| protected.contains(&task.id) && !server_ids.contains(&task.id))
        .cloned()
        .collect();

    for task in server {
        if !protected.contains(&task.id) {
            merged.push(task);
        } else if let Some(local_task) = local_by_id.get(&task.id) {
            merged.push((*local_task).clone());
        }
    }
    merged
}

/// 成功した変更の後のサイレントリロードをまとめる
///
/// `schedule` を呼ぶたびに待機中のタイマーを破棄して新しく開始する。
pub struct ReloadScheduler {
    store: Arc<TaskStore>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ReloadScheduler {
    pub fn new(store: Arc<TaskStore>, config: &SyncConfig) -> Self {
        Self {
            store,
            debounce: config.reload_debounce,
            pending: Mutex::new(None),
        }
    }

    pub fn schedule(&self) {
        let store = self.store.clone();
        let debounce = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Err(e) = store.silent_reload().await {
                log_with_context!(
                    tracing::Level::WARN,
                    "Scheduled silent reload failed",
                    "error" => e.to_string()
                );
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// 待機中のリロードを取り消す
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ReloadScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
