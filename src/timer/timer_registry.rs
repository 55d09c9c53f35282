use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::timer_tracker::{TimerTracker, TimerUpdate};
use crate::task::{Task, TaskEvent, TaskService};

const TICK: Duration = Duration::from_secs(1);

struct TimerEntry {
    tracker: TimerTracker,
    ticker: Option<JoinHandle<()>>,
}

impl TimerEntry {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for TimerEntry {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

type Timers = Arc<DashMap<i64, TimerEntry>>;

/// Live timers, one per task.
///
/// A running timer owns a tokio task that ticks its tracker once a second.
/// Every update goes to a single channel; [`TimerRegistry::spawn`] drains it
/// into the task store.
#[derive(Clone)]
pub struct TimerRegistry {
    timers: Timers,
    updates: mpsc::UnboundedSender<TimerUpdate>,
}

impl TimerRegistry {
    /// A registry whose updates are persisted through `tasks` and announced
    /// on `events`.
    pub fn spawn(tasks: TaskService, events: broadcast::Sender<TaskEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(persist_updates(rx, tasks, events));
        Self::with_sender(tx)
    }

    /// A registry that only hands its updates to `updates`.
    pub fn with_sender(updates: mpsc::UnboundedSender<TimerUpdate>) -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            updates,
        }
    }

    fn publish(&self, update: TimerUpdate) {
        if self.updates.send(update).is_err() {
            tracing::warn!("Timer update for task {} dropped, persister is gone", update.task_id);
        }
    }

    fn start_ticker(&self, task_id: i64) -> JoinHandle<()> {
        let timers: Weak<DashMap<i64, TimerEntry>> = Arc::downgrade(&self.timers);
        let updates = self.updates.clone();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                let Some(timers) = timers.upgrade() else {
                    break;
                };
                // Sent under the entry guard, so a toggle's update is queued
                // either before this tick or after it, never interleaved.
                let sent = match timers.get_mut(&task_id) {
                    Some(mut entry) => entry
                        .tracker
                        .tick()
                        .is_some_and(|update| updates.send(update).is_ok()),
                    None => false,
                };
                drop(timers);

                if !sent {
                    break;
                }
            }
        })
    }

    /// Starts or stops the task's timer, seeding it from the stored task the
    /// first time.
    pub fn toggle(&self, task: &Task) -> TimerUpdate {
        let update = {
            let mut entry = self
                .timers
                .entry(task.id)
                .or_insert_with(|| TimerEntry {
                    tracker: TimerTracker::from_task(task),
                    ticker: None,
                });
            let update = entry.tracker.toggle();
            entry.stop_ticker();
            if update.is_running {
                entry.ticker = Some(self.start_ticker(task.id));
            }
            self.publish(update);
            update
        };

        tracing::debug!(
            "Timer for task {} {} at {}s",
            task.id,
            if update.is_running { "started" } else { "stopped" },
            update.elapsed_seconds
        );
        update
    }

    /// Live state when a timer exists, otherwise the stored state.
    pub fn snapshot(&self, task: &Task) -> TimerUpdate {
        self.timers
            .get(&task.id)
            .map(|entry| entry.tracker.update())
            .unwrap_or_else(|| TimerTracker::from_task(task).update())
    }

    pub fn is_running(&self, task_id: i64) -> bool {
        self.timers
            .get(&task_id)
            .is_some_and(|entry| entry.tracker.is_running())
    }

    /// Adopts a task's stored time and timer state after it was edited
    /// directly, starting or stopping its ticker to match.
    pub fn resync(&self, task: &Task) {
        let running = task.timer_state.is_running;
        if !running && !self.timers.contains_key(&task.id) {
            return;
        }

        let mut entry = self.timers.entry(task.id).or_insert_with(|| TimerEntry {
            tracker: TimerTracker::from_task(task),
            ticker: None,
        });
        entry.tracker.resync(task.time_spent, running);
        if running && entry.ticker.is_none() {
            entry.ticker = Some(self.start_ticker(task.id));
        } else if !running {
            entry.stop_ticker();
        }
    }

    /// Restarts timers that were running when the process last stopped.
    pub fn resume_running(&self, tasks: &[Task]) -> usize {
        let mut resumed = 0;
        for task in tasks.iter().filter(|t| t.timer_state.is_running) {
            self.resync(task);
            resumed += 1;
        }
        resumed
    }

    /// Drops the task's timer without recording anything.
    pub fn remove(&self, task_id: i64) {
        self.timers.remove(&task_id);
    }

    /// Stops every ticker. Stored timer states are left as they are, so
    /// running timers resume on the next start.
    pub fn stop_all(&self) {
        self.timers.clear();
    }
}

async fn persist_updates(
    mut rx: mpsc::UnboundedReceiver<TimerUpdate>,
    tasks: TaskService,
    events: broadcast::Sender<TaskEvent>,
) {
    while let Some(update) = rx.recv().await {
        let result = tasks
            .record_timer(
                update.task_id,
                update.elapsed_seconds,
                update.is_running,
                Utc::now(),
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Failed to save timer for task {}: {}", update.task_id, e);
        }
        let _ = events.send(TaskEvent::TimerTick(update));
    }
    tracing::debug!("Timer persister stopped");
}
