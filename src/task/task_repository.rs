use super::task_models::{NewTask, Task, TaskPatch};
use super::task_record::{patch_record, task_from_value, NewTaskRecord};
use crate::store::{
    encode,
    schema::{CREATED_ON, TASK_FIELDS, TASK_TABLE},
    FetchQuery, Patch, SharedStore, SortType, StoreError, StoreResult,
};

#[derive(Clone)]
pub struct TaskRepository {
    store: SharedStore,
}

impl TaskRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every task, newest first.
    pub async fn find_all(&self) -> StoreResult<Vec<Task>> {
        let query = FetchQuery::fields(TASK_FIELDS).order_by(CREATED_ON, SortType::Desc);
        let rows = self.store.fetch_records(TASK_TABLE, &query).await?;
        rows.into_iter().map(task_from_value).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let row = self.store.get_record(TASK_TABLE, TASK_FIELDS, id).await?;
        row.map(task_from_value).transpose()
    }

    pub async fn create(&self, task: &NewTask, category_id: Option<i64>) -> StoreResult<Task> {
        let record = encode(TASK_TABLE, &NewTaskRecord::new(task, category_id))?;
        let id = self.store.create_record(TASK_TABLE, record).await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::EmptyResult(format!("read back {TASK_TABLE} #{id}")))
    }

    /// `None` when no task has this id.
    pub async fn update(
        &self,
        id: i64,
        patch: TaskPatch,
        category_id: Patch<Option<i64>>,
    ) -> StoreResult<Option<Task>> {
        let record = patch_record(patch, category_id);
        if !self.store.update_record(TASK_TABLE, id, record).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.store.delete_record(TASK_TABLE, id).await
    }
}
