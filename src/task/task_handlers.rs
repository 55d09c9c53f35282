use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::{Local, Utc};
use futures::stream::Stream;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use super::{
    task_dto::{BoardResponse, CreateTaskRequest, CreatedTask, UpdateTaskRequest},
    task_filter::TaskQuery,
    task_models::{Task, TaskEvent, TaskStats},
};
use crate::{dto::Deleted, error::Result, recurrence::RecurrenceRule, state::AppState};

fn announce(state: &AppState, task: &Task) {
    let _ = state.task_tx.send(TaskEvent::TaskUpserted { task: task.clone() });
}

/// Tasks, categories and statistics for the board view
#[utoipa::path(
    get,
    path = "/api/board",
    params(
        ("status" = Option<String>, Query, description = "all, active or completed"),
        ("category" = Option<String>, Query, description = "Exact category name"),
        ("search" = Option<String>, Query, description = "Matches title, description, category or due date")
    ),
    responses(
        (status = 200, description = "Board contents", body = BoardResponse),
        (status = 503, description = "Tasks or categories could not be loaded")
    ),
    tag = "board"
)]
pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<BoardResponse>> {
    let board = state
        .task_service
        .board(&query)
        .await
        .map_err(|e| e.on_load("board"))?;
    Ok(Json(board))
}

/// List tasks, filtered and sorted for display
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(
        ("status" = Option<String>, Query, description = "all, active or completed"),
        ("category" = Option<String>, Query, description = "Exact category name"),
        ("search" = Option<String>, Query, description = "Matches title, description, category or due date")
    ),
    responses(
        (status = 200, description = "Matching tasks", body = [Task]),
        (status = 503, description = "Tasks could not be loaded")
    ),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>> {
    let tasks = state
        .task_service
        .list(&query)
        .await
        .map_err(|e| e.on_load("tasks"))?;
    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/api/tasks/stats",
    responses(
        (status = 200, description = "Task statistics", body = TaskStats),
        (status = 503, description = "Tasks could not be loaded")
    ),
    tag = "tasks"
)]
pub async fn task_stats(State(state): State<AppState>) -> Result<Json<TaskStats>> {
    let stats = state
        .task_service
        .stats()
        .await
        .map_err(|e| e.on_load("tasks"))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Task>> {
    let task = state
        .task_service
        .get(id)
        .await
        .map_err(|e| e.on_load("task"))?;
    Ok(Json(task))
}

/// Create a task, with its recurrence pattern and rule when it repeats
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = CreatedTask),
        (status = 400, description = "Validation failed, errors keyed by field"),
        (status = 502, description = "The record store rejected a write")
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse> {
    let today = Local::now().date_naive();
    let created = state.task_service.create_from_form(payload, today).await?;

    announce(&state, &created.task);

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    payload.check().into_result()?;

    let patch = payload.into_patch(Utc::now());
    let touches_timer = patch.touches_timer();
    let task = state.task_service.update(id, patch).await?;
    if touches_timer {
        state.timers.resync(&task);
    }

    announce(&state, &task);

    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted", body = Deleted),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>> {
    state.task_service.delete(id).await?;
    state.timers.remove(id);

    let _ = state.task_tx.send(TaskEvent::TaskDeleted { id });

    Ok(Json(Deleted::new(id)))
}

/// Flip a task between active and completed
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}/complete",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task after the toggle", body = Task),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn toggle_complete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>> {
    let task = state.task_service.toggle_complete(id, Utc::now()).await?;

    announce(&state, &task);

    Ok(Json(task))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}/recurrence",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Recurrence rules for the task", body = [RecurrenceRule]),
        (status = 503, description = "Rules could not be loaded")
    ),
    tag = "recurrence"
)]
pub async fn task_rules(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<RecurrenceRule>>> {
    let rules = state
        .task_service
        .recurrence_rules(id)
        .await
        .map_err(|e| e.on_load("recurrence rules"))?;
    Ok(Json(rules))
}

/// Task changes and timer ticks as server-sent events
#[utoipa::path(
    get,
    path = "/api/tasks/stream",
    responses(
        (status = 200, description = "Event stream established")
    ),
    tag = "tasks"
)]
pub async fn task_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, std::convert::Infallible>>> {
    let rx = state.task_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let json = serde_json::to_string(&event).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagging subscribers skip what they missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
