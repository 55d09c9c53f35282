pub mod routes;
pub mod task_dto;
pub mod task_filter;
pub mod task_handlers;
pub mod task_models;
pub mod task_record;
pub mod task_repository;
pub mod task_service;

pub use task_dto::{BoardResponse, CreateTaskRequest, CreatedTask, UpdateTaskRequest};
pub use task_filter::{filter_tasks, StatusFilter, TaskQuery};
pub use task_models::{NewTask, Priority, Task, TaskEvent, TaskPatch, TaskStats, TimerState};
pub use task_repository::TaskRepository;
pub use task_service::TaskService;
