use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::timer_tracker::{format_elapsed, TimerUpdate};
use crate::{error::Result, state::AppState};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub task_id: i64,
    pub elapsed_seconds: u64,
    pub is_running: bool,
    /// `m:ss`, or `h:mm:ss` from one hour
    pub display: String,
}

impl From<TimerUpdate> for TimerSnapshot {
    fn from(update: TimerUpdate) -> Self {
        Self {
            task_id: update.task_id,
            elapsed_seconds: update.elapsed_seconds,
            is_running: update.is_running,
            display: format_elapsed(update.elapsed_seconds),
        }
    }
}

/// Current timer state of a task
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/timer",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Timer state", body = TimerSnapshot),
        (status = 404, description = "Task not found")
    ),
    tag = "timer"
)]
pub async fn get_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>> {
    let task = state
        .task_service
        .get(id)
        .await
        .map_err(|e| e.on_load("task"))?;
    Ok(Json(state.timers.snapshot(&task).into()))
}

/// Start or stop a task's timer
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/timer/toggle",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Timer state after the toggle", body = TimerSnapshot),
        (status = 404, description = "Task not found")
    ),
    tag = "timer"
)]
pub async fn toggle_timer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TimerSnapshot>> {
    let task = state.task_service.get(id).await?;
    Ok(Json(state.timers.toggle(&task).into()))
}
