//! Storage shape of the `task_c` table and its mapping to [`Task`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task_models::{NewTask, Priority, Task, TaskPatch, TimerState};
use crate::store::{
    dates::{format_date, format_timestamp, parse_date, parse_timestamp},
    schema::Lookup,
    Patch, Record,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(default)]
    pub title_c: Option<String>,
    #[serde(default)]
    pub description_c: Option<String>,
    #[serde(default)]
    pub category_c: Option<Lookup>,
    #[serde(default)]
    pub sub_category_c: Option<String>,
    #[serde(default)]
    pub priority_c: Option<String>,
    #[serde(default)]
    pub due_date_c: Option<String>,
    #[serde(default)]
    pub completed_c: Option<bool>,
    #[serde(default)]
    pub completed_at_c: Option<String>,
    #[serde(default)]
    pub time_spent_c: Option<u64>,
    #[serde(default)]
    pub timer_state_is_running_c: Option<bool>,
    #[serde(default)]
    pub timer_state_last_updated_c: Option<String>,
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let completed = record.completed_c.unwrap_or(false);
        Task {
            id: record.id,
            title: record.title_c.unwrap_or_default(),
            description: record.description_c.unwrap_or_default(),
            category: record.category_c.and_then(|c| c.name).unwrap_or_default(),
            sub_category: non_empty(record.sub_category_c),
            priority: record
                .priority_c
                .as_deref()
                .and_then(Priority::parse)
                .unwrap_or_default(),
            due_date: record.due_date_c.as_deref().and_then(parse_date),
            completed,
            completed_at: record
                .completed_at_c
                .as_deref()
                .and_then(parse_timestamp)
                .filter(|_| completed),
            time_spent: record.time_spent_c.unwrap_or(0),
            timer_state: TimerState {
                is_running: record.timer_state_is_running_c.unwrap_or(false),
                last_updated: record
                    .timer_state_last_updated_c
                    .as_deref()
                    .and_then(parse_timestamp),
            },
            created_at: record
                .created_on
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// The full read shape of a task. The category lookup carries only the name
/// since the domain object does not keep the category id.
impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id,
            title_c: Some(task.title.clone()),
            description_c: Some(task.description.clone()),
            category_c: (!task.category.is_empty()).then(|| Lookup {
                id: None,
                name: Some(task.category.clone()),
            }),
            sub_category_c: task.sub_category.clone(),
            priority_c: Some(task.priority.as_str().to_string()),
            due_date_c: task.due_date.map(format_date),
            completed_c: Some(task.completed),
            completed_at_c: task.completed_at.map(format_timestamp),
            time_spent_c: Some(task.time_spent),
            timer_state_is_running_c: Some(task.timer_state.is_running),
            timer_state_last_updated_c: task.timer_state.last_updated.map(format_timestamp),
            created_on: Some(format_timestamp(task.created_at)),
        }
    }
}

/// Write shape for a new task: lookup as a bare id, timer and completion reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTaskRecord {
    pub title_c: String,
    pub description_c: String,
    pub category_c: Option<i64>,
    pub sub_category_c: Option<String>,
    pub priority_c: &'static str,
    pub due_date_c: Option<String>,
    pub completed_c: bool,
    pub completed_at_c: Option<String>,
    pub time_spent_c: u64,
    pub timer_state_is_running_c: bool,
    pub timer_state_last_updated_c: Option<String>,
}

impl NewTaskRecord {
    pub fn new(task: &NewTask, category_id: Option<i64>) -> Self {
        NewTaskRecord {
            title_c: task.title.clone(),
            description_c: task.description.clone(),
            category_c: category_id,
            sub_category_c: task.sub_category.clone(),
            priority_c: task.priority.as_str(),
            due_date_c: task.due_date.map(format_date),
            completed_c: false,
            completed_at_c: None,
            time_spent_c: 0,
            timer_state_is_running_c: false,
            timer_state_last_updated_c: None,
        }
    }
}

/// Flattens a patch into the fields that change. `category_id` is the
/// already-resolved category reference.
pub fn patch_record(patch: TaskPatch, category_id: Patch<Option<i64>>) -> Record {
    let mut record = Record::new();
    patch.title.write(&mut record, "title_c");
    patch.description.write(&mut record, "description_c");
    category_id.write(&mut record, "category_c");
    patch.sub_category.write(&mut record, "sub_category_c");
    patch.priority.map(|p| p.as_str()).write(&mut record, "priority_c");
    patch
        .due_date
        .map(|d| d.map(format_date))
        .write(&mut record, "due_date_c");
    patch.completed.write(&mut record, "completed_c");
    patch
        .completed_at
        .map(|ts| ts.map(format_timestamp))
        .write(&mut record, "completed_at_c");
    patch.time_spent.write(&mut record, "time_spent_c");
    patch.is_running.write(&mut record, "timer_state_is_running_c");
    patch
        .last_updated
        .map(|ts| ts.map(format_timestamp))
        .write(&mut record, "timer_state_last_updated_c");
    record
}

/// Convenience for tests and callers holding raw store values.
pub fn task_from_value(value: Value) -> crate::store::StoreResult<Task> {
    crate::store::decode::<TaskRecord>(crate::store::schema::TASK_TABLE, value).map(Task::from)
}
