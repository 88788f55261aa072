//! Daily tasks: progress tracking and one-time reward claims.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{TASK_CLICKS, TASK_DAILY_LOGIN, TASK_STAY};

/// A progress-tracked objective paying `reward` once claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub reward: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u32,
    pub target: u32,
}

impl Task {
    #[must_use]
    pub fn new(id: &str, title: &str, reward: u64, target: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            reward,
            completed: false,
            progress: 0,
            target: target.max(1),
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        !self.completed && self.progress >= self.target
    }

    /// Progress as a percentage, capped at 100.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        (f64::from(self.progress) / f64::from(self.target.max(1)) * 100.0).min(100.0)
    }

    /// Restore `0 <= progress <= target` and `completed => progress >= target`.
    fn normalize(&mut self) {
        self.target = self.target.max(1);
        if self.completed {
            self.progress = self.target;
        } else {
            self.progress = self.progress.min(self.target);
        }
    }
}

/// Read-only projection of a task for the task panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub reward: u64,
    pub progress: u32,
    pub target: u32,
    pub percentage: f64,
    pub completed: bool,
    pub can_claim: bool,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            reward: task.reward,
            progress: task.progress,
            target: task.target,
            percentage: task.percentage(),
            completed: task.completed,
            can_claim: task.is_ready(),
        }
    }
}

/// The daily task set handed out on a fresh save or a new calendar day.
#[must_use]
pub fn default_tasks() -> Vec<Task> {
    vec![
        Task::new(TASK_DAILY_LOGIN, "每日登入", 50, 1),
        Task::new(TASK_STAY, "停留15秒", 30, 15),
        Task::new(TASK_CLICKS, "點擊100次", 100, 100),
    ]
}

/// Why a claim was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRefusal {
    UnknownTask,
    AlreadyClaimed,
    NotReady,
}

/// Tasks keyed by id, with display order kept separately.
///
/// Serializes as a plain array of tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Task>", into = "Vec<Task>")]
pub struct TaskLedger {
    order: Vec<String>,
    by_id: HashMap<String, Task>,
}

impl Default for TaskLedger {
    fn default() -> Self {
        Self::from(default_tasks())
    }
}

impl From<Vec<Task>> for TaskLedger {
    /// Later duplicates of an id are dropped.
    fn from(tasks: Vec<Task>) -> Self {
        let mut order = Vec::with_capacity(tasks.len());
        let mut by_id = HashMap::with_capacity(tasks.len());
        for mut task in tasks {
            if by_id.contains_key(&task.id) {
                continue;
            }
            task.normalize();
            order.push(task.id.clone());
            by_id.insert(task.id.clone(), task);
        }
        Self { order, by_id }
    }
}

impl From<TaskLedger> for Vec<Task> {
    fn from(mut ledger: TaskLedger) -> Self {
        ledger
            .order
            .iter()
            .filter_map(|id| ledger.by_id.remove(id))
            .collect()
    }
}

impl TaskLedger {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.by_id.get(id)
    }

    /// Tasks in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn views(&self) -> Vec<TaskView> {
        self.iter().map(TaskView::from).collect()
    }

    /// Add `increment` to an open task, capped at its target.
    ///
    /// Returns `false` (and changes nothing) for unknown or completed tasks.
    pub fn advance(&mut self, id: &str, increment: u32) -> bool {
        match self.by_id.get_mut(id) {
            Some(task) if !task.completed => {
                task.progress = task.progress.saturating_add(increment).min(task.target);
                true
            }
            _ => false,
        }
    }

    /// Raise an open task's progress to `value` (capped at target) if it is
    /// currently lower. Returns whether progress moved.
    pub fn raise_to(&mut self, id: &str, value: u32) -> bool {
        match self.by_id.get_mut(id) {
            Some(task) if !task.completed => {
                let next = value.min(task.target);
                if next > task.progress {
                    task.progress = next;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Mark a ready task as completed and return its reward.
    ///
    /// # Errors
    ///
    /// Returns the reason the task cannot be claimed; nothing is changed.
    pub fn claim(&mut self, id: &str) -> Result<u64, ClaimRefusal> {
        let task = self.by_id.get_mut(id).ok_or(ClaimRefusal::UnknownTask)?;
        if task.completed {
            return Err(ClaimRefusal::AlreadyClaimed);
        }
        if task.progress < task.target {
            return Err(ClaimRefusal::NotReady);
        }
        task.completed = true;
        Ok(task.reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(progress: u32, target: u32) -> TaskLedger {
        let mut task = Task::new("t", "Test", 40, target);
        task.progress = progress;
        TaskLedger::from(vec![task])
    }

    #[test]
    fn defaults_are_fresh_and_ordered() {
        let ledger = TaskLedger::default();
        let ids: Vec<_> = ledger.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["daily_login", "stay_15s", "click_100"]);
        assert!(ledger.iter().all(|t| t.progress == 0 && !t.completed));
    }

    #[test]
    fn advance_caps_at_target() {
        let mut ledger = ledger_with(8, 10);
        assert!(ledger.advance("t", 5));
        assert_eq!(ledger.get("t").unwrap().progress, 10);
        assert!(!ledger.advance("missing", 1));
    }

    #[test]
    fn claim_rules() {
        let mut ledger = ledger_with(8, 10);
        assert_eq!(ledger.claim("t"), Err(ClaimRefusal::NotReady));
        ledger.advance("t", 2);
        assert_eq!(ledger.claim("t"), Ok(40));
        assert_eq!(ledger.claim("t"), Err(ClaimRefusal::AlreadyClaimed));
        assert_eq!(ledger.claim("nope"), Err(ClaimRefusal::UnknownTask));
        assert!(!ledger.advance("t", 1));
    }

    #[test]
    fn raise_to_never_lowers() {
        let mut ledger = ledger_with(5, 15);
        assert!(!ledger.raise_to("t", 3));
        assert!(ledger.raise_to("t", 9));
        assert!(ledger.raise_to("t", 40));
        assert_eq!(ledger.get("t").unwrap().progress, 15);
    }

    #[test]
    fn deserialize_normalizes_and_drops_duplicates() {
        let json = r#"[
            {"id":"a","title":"A","reward":1,"completed":false,"progress":99,"target":10},
            {"id":"b","title":"B","reward":2,"completed":true,"progress":0,"target":3},
            {"id":"a","title":"A2","reward":5,"progress":0,"target":1}
        ]"#;
        let ledger: TaskLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get("a").unwrap().progress, 10);
        assert_eq!(ledger.get("a").unwrap().title, "A");
        assert_eq!(ledger.get("b").unwrap().progress, 3);
    }

    #[test]
    fn serializes_as_array_in_display_order() {
        let value = serde_json::to_value(TaskLedger::default()).unwrap();
        let ids: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["daily_login", "stay_15s", "click_100"]);
    }

    #[test]
    fn view_reports_percentage_and_claimability() {
        let ledger = ledger_with(5, 10);
        let view = &ledger.views()[0];
        assert!((view.percentage - 50.0).abs() < f64::EPSILON);
        assert!(!view.can_claim);
    }
}
