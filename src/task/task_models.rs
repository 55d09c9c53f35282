use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Patch;
use crate::timer::TimerUpdate;

/// Declaration order is sort order: high sorts first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Unknown values read as `None`; callers fall back to the default.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Category name; empty when the task has none.
    pub category: String,
    pub sub_category: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub time_spent: u64,
    pub timer_state: TimerState,
    pub created_at: DateTime<Utc>,
}

/// Fields of a task about to be written for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

/// A partial update. `category` is a name; it is resolved to an id before writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub category: Patch<String>,
    pub sub_category: Patch<Option<String>>,
    pub priority: Patch<Priority>,
    pub due_date: Patch<Option<NaiveDate>>,
    pub completed: Patch<bool>,
    pub completed_at: Patch<Option<DateTime<Utc>>>,
    pub time_spent: Patch<u64>,
    pub is_running: Patch<bool>,
    pub last_updated: Patch<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Sets `completed` and `completedAt` together.
    pub fn completion(completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed: Patch::Set(completed),
            completed_at: Patch::Set(completed.then_some(now)),
            ..Default::default()
        }
    }

    pub fn timer(time_spent: u64, is_running: bool, now: DateTime<Utc>) -> Self {
        Self {
            time_spent: Patch::Set(time_spent),
            is_running: Patch::Set(is_running),
            last_updated: Patch::Set(Some(now)),
            ..Default::default()
        }
    }

    pub fn touches_timer(&self) -> bool {
        !self.time_spent.is_keep() || !self.is_running.is_keep()
    }
}

/// Change notifications pushed to stream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    TaskUpserted { task: Task },
    TaskDeleted { id: i64 },
    TimerTick(TimerUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Percent of tasks completed, 0 when there are none.
    pub completion_rate: f64,
    pub total_time_spent: u64,
    pub average_time_per_task: f64,
    /// Active tasks per category name.
    pub active_by_category: BTreeMap<String, usize>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let total_time_spent: u64 = tasks.iter().map(|t| t.time_spent).sum();

        let mut active_by_category = BTreeMap::new();
        for task in tasks.iter().filter(|t| !t.completed && !t.category.is_empty()) {
            *active_by_category.entry(task.category.clone()).or_insert(0) += 1;
        }

        let (completion_rate, average_time_per_task) = if total > 0 {
            (
                completed as f64 / total as f64 * 100.0,
                total_time_spent as f64 / total as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total,
            completed,
            active: total - completed,
            completion_rate,
            total_time_spent,
            average_time_per_task,
            active_by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: i64, category: &str, completed: bool, time_spent: u64) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            description: String::new(),
            category: category.to_string(),
            sub_category: None,
            priority: Priority::Medium,
            due_date: None,
            completed,
            completed_at: None,
            time_spent,
            timer_state: TimerState::default(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_priority_display_and_parse() {
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(Priority::parse(" Low "), Some(Priority::Low));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::High < Priority::Medium && Priority::Medium < Priority::Low);
    }

    #[test]
    fn test_completion_patch_keeps_invariant() {
        let now = Utc::now();
        let done = TaskPatch::completion(true, now);
        assert_eq!(done.completed, Patch::Set(true));
        assert_eq!(done.completed_at, Patch::Set(Some(now)));

        let undone = TaskPatch::completion(false, now);
        assert_eq!(undone.completed_at, Patch::Set(None));
        assert!(!undone.touches_timer());
    }

    #[test]
    fn test_stats() {
        let tasks = vec![
            task(1, "Work", false, 60),
            task(2, "Work", true, 120),
            task(3, "Health", false, 0),
            task(4, "", false, 0),
        ];
        let stats = TaskStats::from_tasks(&tasks);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.completion_rate, 25.0);
        assert_eq!(stats.total_time_spent, 180);
        assert_eq!(stats.average_time_per_task, 45.0);
        assert_eq!(stats.active_by_category.get("Work"), Some(&1));
        assert_eq!(stats.active_by_category.get("Health"), Some(&1));
        assert_eq!(stats.active_by_category.len(), 2);
    }

    #[test]
    fn test_stats_empty() {
        let stats = TaskStats::from_tasks(&[]);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_time_per_task, 0.0);
    }

    #[test]
    fn test_event_serialization() {
        let event = TaskEvent::TaskDeleted { id: 4 };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "type": "task_deleted", "id": 4 })
        );
    }
}
