use axum::{
    routing::{get, patch, post},
    Router,
};

use super::task_handlers::{
    create_task, delete_task, get_task, list_tasks, task_rules, task_stats, task_stream,
    toggle_complete, update_task,
};
use crate::{
    state::AppState,
    timer::timer_handlers::{get_timer, toggle_timer},
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/stats", get(task_stats))
        .route("/stream", get(task_stream))
        .route(
            "/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/:id/complete", patch(toggle_complete))
        .route("/:id/recurrence", get(task_rules))
        .route("/:id/timer", get(get_timer))
        .route("/:id/timer/toggle", post(toggle_timer))
}
