use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::task_models::{NewTask, Priority, Task, TaskPatch, TaskStats, TimerState};
use crate::{
    category::Category,
    dto::{form_date, form_flag, form_text},
    error::FieldErrors,
    recurrence::{RecurrenceRequest, RecurrenceRule, RecurringTaskPattern},
    store::Patch,
};

/// The task creation form.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Title must be less than 100 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description must be less than 500 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please select a category"))]
    pub category: String,
    #[serde(default, deserialize_with = "form_text")]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "form_date")]
    #[schema(value_type = Option<String>, format = Date, example = "2024-06-01")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "form_flag")]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRequest>,
}

impl CreateTaskRequest {
    /// Form-level errors. Recurrence fields are checked separately.
    pub fn check(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };

        if self.title.trim().is_empty() {
            errors.insert("title", "Task title is required");
        }
        if self.due_date.is_some_and(|due| due < today) {
            errors.insert("dueDate", "Due date cannot be in the past");
        }
        errors
    }

    pub fn new_task(&self) -> NewTask {
        NewTask {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            category: self.category.clone(),
            sub_category: self.sub_category.clone(),
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

/// A partial edit; absent fields are left unchanged, `null` clears.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    /// Category name; an unknown name clears the reference.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub sub_category: Patch<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Priority>)]
    pub priority: Patch<Priority>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Patch<Option<NaiveDate>>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub completed: Patch<bool>,
    #[serde(default)]
    #[schema(value_type = Option<u64>)]
    pub time_spent: Patch<u64>,
    #[serde(default)]
    #[schema(value_type = Option<TimerState>)]
    pub timer_state: Patch<TimerState>,
}

impl UpdateTaskRequest {
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Some(title) = self.title.as_set() {
            if title.trim().is_empty() {
                errors.insert("title", "Task title is required");
            } else if title.chars().count() > 100 {
                errors.insert("title", "Title must be less than 100 characters");
            }
        }
        if self
            .description
            .as_set()
            .is_some_and(|d| d.chars().count() > 500)
        {
            errors.insert("description", "Description must be less than 500 characters");
        }
        errors
    }

    /// `completedAt` follows `completed`; a timer state write stamps `now`.
    pub fn into_patch(self, now: DateTime<Utc>) -> TaskPatch {
        let (is_running, last_updated) = match self.timer_state {
            Patch::Set(state) => (Patch::Set(state.is_running), Patch::Set(Some(now))),
            Patch::Keep => (Patch::Keep, Patch::Keep),
        };
        let completed_at = self.completed.as_set().map(|&c| c.then_some(now)).into();

        TaskPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            category: self.category,
            sub_category: self.sub_category.map(|s| s.filter(|s| !s.is_empty())),
            priority: self.priority,
            due_date: self.due_date,
            completed: self.completed,
            completed_at,
            time_spent: self.time_spent,
            is_running,
            last_updated,
        }
    }
}

/// A created task, with its recurrence records when it repeats.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<RecurringTaskPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RecurrenceRule>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub stats: TaskStats,
}
