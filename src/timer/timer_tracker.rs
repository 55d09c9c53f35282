use serde::Serialize;
use utoipa::ToSchema;

use crate::task::Task;

/// What a tracker reports after every toggle and tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerUpdate {
    pub task_id: i64,
    pub elapsed_seconds: u64,
    pub is_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Stopped,
    Running,
}

/// Stopwatch for one task. Time only advances through [`TimerTracker::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerTracker {
    task_id: i64,
    elapsed_seconds: u64,
    status: TimerStatus,
}

impl TimerTracker {
    pub fn new(task_id: i64, elapsed_seconds: u64, is_running: bool) -> Self {
        Self {
            task_id,
            elapsed_seconds,
            status: if is_running {
                TimerStatus::Running
            } else {
                TimerStatus::Stopped
            },
        }
    }

    /// Seeded from the stored `timeSpent` and timer state.
    pub fn from_task(task: &Task) -> Self {
        Self::new(task.id, task.time_spent, task.timer_state.is_running)
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn update(&self) -> TimerUpdate {
        TimerUpdate {
            task_id: self.task_id,
            elapsed_seconds: self.elapsed_seconds,
            is_running: self.is_running(),
        }
    }

    /// Starts or stops. Accumulated seconds are kept either way.
    pub fn toggle(&mut self) -> TimerUpdate {
        self.status = match self.status {
            TimerStatus::Stopped => TimerStatus::Running,
            TimerStatus::Running => TimerStatus::Stopped,
        };
        self.update()
    }

    /// One second passed. `None` while stopped.
    pub fn tick(&mut self) -> Option<TimerUpdate> {
        if !self.is_running() {
            return None;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        Some(self.update())
    }

    /// Adopts values that changed outside the tracker.
    pub fn resync(&mut self, elapsed_seconds: u64, is_running: bool) {
        *self = Self::new(self.task_id, elapsed_seconds, is_running);
    }
}

/// `m:ss` under an hour, `h:mm:ss` from there on.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
