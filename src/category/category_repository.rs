use super::category_models::{Category, CategoryRecord, NewCategoryRecord};
use crate::store::{
    decode, encode,
    schema::{CATEGORY_FIELDS, CATEGORY_TABLE, NAME},
    Condition, FetchQuery, Record, SharedStore, SortType, StoreError, StoreResult,
};

fn category_from_value(value: serde_json::Value) -> StoreResult<Category> {
    decode::<CategoryRecord>(CATEGORY_TABLE, value).map(Category::from)
}

#[derive(Clone)]
pub struct CategoryRepository {
    store: SharedStore,
}

impl CategoryRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All categories by name.
    pub async fn find_all(&self) -> StoreResult<Vec<Category>> {
        let query = FetchQuery::fields(CATEGORY_FIELDS).order_by(NAME, SortType::Asc);
        let rows = self.store.fetch_records(CATEGORY_TABLE, &query).await?;
        rows.into_iter().map(category_from_value).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Category>> {
        let row = self.store.get_record(CATEGORY_TABLE, CATEGORY_FIELDS, id).await?;
        row.map(category_from_value).transpose()
    }

    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let query = FetchQuery::fields(CATEGORY_FIELDS).filter(Condition::exact_match(NAME, name));
        let rows = self.store.fetch_records(CATEGORY_TABLE, &query).await?;
        rows.into_iter().next().map(category_from_value).transpose()
    }

    pub async fn create(&self, category: &NewCategoryRecord) -> StoreResult<Category> {
        let record = encode(CATEGORY_TABLE, category)?;
        let id = self.store.create_record(CATEGORY_TABLE, record).await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::EmptyResult(format!("read back {CATEGORY_TABLE} #{id}")))
    }

    pub async fn update(&self, id: i64, record: Record) -> StoreResult<Option<Category>> {
        if !self.store.update_record(CATEGORY_TABLE, id, record).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.store.delete_record(CATEGORY_TABLE, id).await
    }
}
