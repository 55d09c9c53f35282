use chrono::{DateTime, NaiveDate, Utc};

use super::task_dto::{BoardResponse, CreateTaskRequest, CreatedTask};
use super::task_filter::{filter_tasks, TaskQuery};
use super::task_models::{NewTask, Task, TaskPatch, TaskStats};
use super::task_repository::TaskRepository;
use crate::{
    category::CategoryService,
    error::{AppError, Result},
    recurrence::{RecurrenceRequest, RecurrenceService},
    store::{Patch, SharedStore},
};

/// Service layer for task business logic.
#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
    categories: CategoryService,
    recurrence: RecurrenceService,
}

impl TaskService {
    pub fn new(
        store: SharedStore,
        categories: CategoryService,
        recurrence: RecurrenceService,
    ) -> Self {
        Self {
            repo: TaskRepository::new(store),
            categories,
            recurrence,
        }
    }

    pub async fn all(&self) -> Result<Vec<Task>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let tasks = self.all().await?;
        Ok(filter_tasks(&tasks, query))
    }

    pub async fn get(&self, id: i64) -> Result<Task> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Tasks and categories are read concurrently.
    pub async fn board(&self, query: &TaskQuery) -> Result<BoardResponse> {
        let (tasks, categories) = tokio::try_join!(self.all(), self.categories.list())?;
        Ok(BoardResponse {
            stats: TaskStats::from_tasks(&tasks),
            tasks: filter_tasks(&tasks, query),
            categories,
        })
    }

    pub async fn stats(&self) -> Result<TaskStats> {
        let tasks = self.all().await?;
        Ok(TaskStats::from_tasks(&tasks))
    }

    async fn category_id(&self, name: &str) -> Result<Option<i64>> {
        let id = self.categories.resolve_id(name).await?;
        if id.is_none() && !name.is_empty() {
            tracing::warn!("Unknown category {:?}, storing the task without one", name);
        }
        Ok(id)
    }

    pub async fn create(&self, task: NewTask) -> Result<Task> {
        let category_id = self.category_id(&task.category).await?;
        let task = self.repo.create(&task, category_id).await?;
        tracing::info!("Created task #{} {:?}", task.id, task.title);
        Ok(task)
    }

    /// The task form: validates everything, then writes the task once, or
    /// pattern, task and rule in that order when it repeats.
    ///
    /// There is no rollback. A failure after the pattern is written leaves
    /// the earlier records in place; their ids are logged.
    pub async fn create_from_form(
        &self,
        form: CreateTaskRequest,
        today: NaiveDate,
    ) -> Result<CreatedTask> {
        let mut errors = form.check(today);
        let plan = if form.is_recurring {
            let recurrence = form.recurrence.clone().unwrap_or_else(RecurrenceRequest::default);
            match self.recurrence.validate(&recurrence, today) {
                Ok(plan) => Some(plan),
                Err(AppError::Validation(fields)) => {
                    errors.merge(fields);
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };
        errors.into_result()?;

        let new_task = form.new_task();
        let Some(plan) = plan else {
            let task = self.create(new_task).await?;
            return Ok(CreatedTask {
                task,
                pattern: None,
                rule: None,
            });
        };

        let pattern = self.recurrence.create_pattern(&plan, &new_task.title).await?;
        let task = match self.create(new_task).await {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(
                    "Creating a recurring task failed, pattern #{} is orphaned: {}",
                    pattern.id,
                    e
                );
                return Err(e);
            }
        };
        let rule = match self.recurrence.create_rule(&plan, &task, pattern.id).await {
            Ok(rule) => rule,
            Err(e) => {
                tracing::error!(
                    "Creating a recurrence rule failed, pattern #{} and task #{} are orphaned: {}",
                    pattern.id,
                    task.id,
                    e
                );
                return Err(e);
            }
        };

        Ok(CreatedTask {
            task,
            pattern: Some(pattern),
            rule: Some(rule),
        })
    }

    pub async fn update(&self, id: i64, mut patch: TaskPatch) -> Result<Task> {
        let category_id = match std::mem::take(&mut patch.category) {
            Patch::Set(name) => Patch::Set(self.category_id(&name).await?),
            Patch::Keep => Patch::Keep,
        };
        self.repo
            .update(id, patch, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Task not found".into()));
        }
        tracing::info!("Deleted task #{}", id);
        Ok(())
    }

    /// Flips `completed`, stamping or clearing `completedAt` with it.
    pub async fn toggle_complete(&self, id: i64, now: DateTime<Utc>) -> Result<Task> {
        let task = self.get(id).await?;
        self.update(id, TaskPatch::completion(!task.completed, now))
            .await
    }

    pub async fn record_timer(
        &self,
        id: i64,
        time_spent: u64,
        is_running: bool,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        self.update(id, TaskPatch::timer(time_spent, is_running, now))
            .await
    }

    pub async fn recurrence_rules(&self, id: i64) -> Result<Vec<crate::recurrence::RecurrenceRule>> {
        self.recurrence.rules_for_task(id).await
    }
}
