// task-sync/src/service/task_stats.rs

use crate::domain::{Task, TaskPriority, TaskStatus};
use crate::service::filter_engine::TimeView;
use chrono::NaiveDate;
use serde::Serialize;

/// 一覧の集計（ダッシュボードのカード表示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub canceled: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    /// 期限切れ（未完了かつ期限が今日より前）
    pub overdue: usize,
}

impl TaskStats {
    pub fn collect(tasks: &[Task], today: NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Canceled => stats.canceled += 1,
            }
            match task.priority {
                TaskPriority::High => stats.high_priority += 1,
                TaskPriority::Medium => stats.medium_priority += 1,
                TaskPriority::Low => stats.low_priority += 1,
            }
            if TimeView::Expired.matches(task, today) {
                stats.overdue += 1;
            }
            stats
        })
    }

    /// 完了率（0〜100、タスクがなければ0）
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}
