use serde_json::Value;

use super::recurrence_models::{
    NewPatternRecord, NewRuleRecord, PatternRecord, RecurrenceRule, RecurringTaskPattern,
    RuleRecord,
};
use crate::store::{
    decode, encode,
    schema::{CREATED_ON, PATTERN_FIELDS, PATTERN_TABLE, RULE_FIELDS, RULE_TABLE},
    Condition, FetchQuery, Record, SharedStore, SortType, StoreError, StoreResult,
};

fn pattern_from_value(value: Value) -> StoreResult<RecurringTaskPattern> {
    decode::<PatternRecord>(PATTERN_TABLE, value).map(RecurringTaskPattern::from)
}

fn rule_from_value(value: Value) -> StoreResult<RecurrenceRule> {
    decode::<RuleRecord>(RULE_TABLE, value).map(RecurrenceRule::from)
}

#[derive(Clone)]
pub struct PatternRepository {
    store: SharedStore,
}

impl PatternRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> StoreResult<Vec<RecurringTaskPattern>> {
        let query = FetchQuery::fields(PATTERN_FIELDS).order_by(CREATED_ON, SortType::Desc);
        let rows = self.store.fetch_records(PATTERN_TABLE, &query).await?;
        rows.into_iter().map(pattern_from_value).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<RecurringTaskPattern>> {
        let row = self.store.get_record(PATTERN_TABLE, PATTERN_FIELDS, id).await?;
        row.map(pattern_from_value).transpose()
    }

    pub async fn create(&self, pattern: &NewPatternRecord) -> StoreResult<RecurringTaskPattern> {
        let id = self
            .store
            .create_record(PATTERN_TABLE, encode(PATTERN_TABLE, pattern)?)
            .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::EmptyResult(format!("read back {PATTERN_TABLE} #{id}")))
    }

    /// Rewrites every schedule column of the pattern.
    pub async fn update(
        &self,
        id: i64,
        pattern: &NewPatternRecord,
    ) -> StoreResult<Option<RecurringTaskPattern>> {
        let record = encode(PATTERN_TABLE, pattern)?;
        if !self.store.update_record(PATTERN_TABLE, id, record).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.store.delete_record(PATTERN_TABLE, id).await
    }
}

#[derive(Clone)]
pub struct RuleRepository {
    store: SharedStore,
}

impl RuleRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> StoreResult<Vec<RecurrenceRule>> {
        let query = FetchQuery::fields(RULE_FIELDS).order_by(CREATED_ON, SortType::Desc);
        let rows = self.store.fetch_records(RULE_TABLE, &query).await?;
        rows.into_iter().map(rule_from_value).collect()
    }

    pub async fn find_by_task(&self, task_id: i64) -> StoreResult<Vec<RecurrenceRule>> {
        let query = FetchQuery::fields(RULE_FIELDS)
            .filter(Condition::exact_match("task_c", task_id))
            .order_by(CREATED_ON, SortType::Desc);
        let rows = self.store.fetch_records(RULE_TABLE, &query).await?;
        rows.into_iter().map(rule_from_value).collect()
    }

    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<RecurrenceRule>> {
        let row = self.store.get_record(RULE_TABLE, RULE_FIELDS, id).await?;
        row.map(rule_from_value).transpose()
    }

    pub async fn create(&self, rule: &NewRuleRecord) -> StoreResult<RecurrenceRule> {
        let id = self
            .store
            .create_record(RULE_TABLE, encode(RULE_TABLE, rule)?)
            .await?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::EmptyResult(format!("read back {RULE_TABLE} #{id}")))
    }

    pub async fn update(&self, id: i64, record: Record) -> StoreResult<Option<RecurrenceRule>> {
        if !self.store.update_record(RULE_TABLE, id, record).await? {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.store.delete_record(RULE_TABLE, id).await
    }
}
