use crate::{
    category::{self, routes::category_routes, Category, CreateCategoryRequest, UpdateCategoryRequest},
    dto::Deleted,
    recurrence::{
        self,
        routes::{pattern_routes, recurrence_routes, rule_routes},
        DayOfWeek, Frequency, RecurrencePlan, RecurrenceRequest, RecurrenceRule,
        RecurringTaskPattern, UpdatePatternRequest, UpdateRuleRequest, WeekOfMonth,
    },
    state::AppState,
    task::{
        self, routes::task_routes, BoardResponse, CreateTaskRequest, CreatedTask, Priority,
        StatusFilter, Task, TaskStats, TimerState, UpdateTaskRequest,
    },
    timer::{self, TimerSnapshot, TimerUpdate},
};
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        task::task_handlers::get_board,
        task::task_handlers::list_tasks,
        task::task_handlers::task_stats,
        task::task_handlers::task_stream,
        task::task_handlers::get_task,
        task::task_handlers::create_task,
        task::task_handlers::update_task,
        task::task_handlers::delete_task,
        task::task_handlers::toggle_complete,
        task::task_handlers::task_rules,
        timer::timer_handlers::get_timer,
        timer::timer_handlers::toggle_timer,
        category::category_handlers::list_categories,
        category::category_handlers::get_category,
        category::category_handlers::create_category,
        category::category_handlers::update_category,
        category::category_handlers::delete_category,
        recurrence::recurrence_handlers::validate_recurrence,
        recurrence::recurrence_handlers::list_patterns,
        recurrence::recurrence_handlers::get_pattern,
        recurrence::recurrence_handlers::update_pattern,
        recurrence::recurrence_handlers::delete_pattern,
        recurrence::recurrence_handlers::list_rules,
        recurrence::recurrence_handlers::get_rule,
        recurrence::recurrence_handlers::update_rule,
        recurrence::recurrence_handlers::delete_rule,
    ),
    components(
        schemas(
            Task,
            Priority,
            TimerState,
            TaskStats,
            StatusFilter,
            CreateTaskRequest,
            UpdateTaskRequest,
            CreatedTask,
            BoardResponse,
            Category,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            RecurringTaskPattern,
            RecurrenceRule,
            RecurrenceRequest,
            RecurrencePlan,
            UpdatePatternRequest,
            UpdateRuleRequest,
            Frequency,
            DayOfWeek,
            WeekOfMonth,
            TimerSnapshot,
            TimerUpdate,
            Deleted,
        )
    ),
    tags(
        (name = "board", description = "Combined board view"),
        (name = "tasks", description = "Task management endpoints"),
        (name = "timer", description = "Per-task time tracking"),
        (name = "categories", description = "Category endpoints"),
        (name = "recurrence", description = "Recurrence patterns and rules")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/board", get(task::task_handlers::get_board))
        .nest("/tasks", task_routes())
        .nest("/categories", category_routes())
        .nest("/recurring-patterns", pattern_routes())
        .nest("/recurrence-rules", rule_routes())
        .nest("/recurrence", recurrence_routes());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
