use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::schema::{self, LookupField, CATEGORY_TABLE, CREATED_ON, ID, LOOKUPS};
use super::{Condition, FetchQuery, Record, RecordStore, SortType, StoreResult};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

impl Table {
    fn insert(&mut self, mut record: Record) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        normalize_lookups(&mut record);
        record.insert(ID.to_string(), json!(id));
        record.insert(
            CREATED_ON.to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );
        self.rows.insert(id, record);
        id
    }
}

/// Record store that keeps every table in process memory.
///
/// Behaves like the remote service: it assigns `Id` and `CreatedOn`,
/// expands lookup fields to `{Id, <display>}` on read and accepts bare ids
/// on write.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<&'static str, Table>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with a starter set of categories, so an empty board is usable.
    pub fn with_default_categories() -> Self {
        let mut categories = Table::default();
        for (name, color, icon) in [
            ("Work", "#3B82F6", "Briefcase"),
            ("Personal", "#10B981", "User"),
            ("Health", "#EF4444", "Heart"),
            ("Learning", "#8B5CF6", "BookOpen"),
            ("Shopping", "#F59E0B", "ShoppingCart"),
        ] {
            let record = json!({ "Name": name, "color_c": color, "icon_c": icon });
            if let Value::Object(map) = record {
                categories.insert(map);
            }
        }

        let mut tables = HashMap::new();
        tables.insert(CATEGORY_TABLE, categories);
        Self {
            tables: Mutex::new(tables),
        }
    }
}

/// Lookup fields are stored as bare ids.
fn normalize_lookups(record: &mut Record) {
    for lookup in LOOKUPS {
        if let Some(Value::Object(obj)) = record.get(lookup.field) {
            let id = obj.get(ID).cloned().unwrap_or(Value::Null);
            record.insert(lookup.field.to_string(), id);
        }
    }
}

fn expand(tables: &HashMap<&'static str, Table>, table: &str, row: &Record) -> Record {
    let mut out = row.clone();
    for lookup in LOOKUPS.iter().filter(|l| l.table == table) {
        let expanded = row
            .get(lookup.field)
            .and_then(Value::as_i64)
            .map(|id| resolve(tables, lookup, id))
            .unwrap_or(Value::Null);
        out.insert(lookup.field.to_string(), expanded);
    }
    out
}

fn resolve(tables: &HashMap<&'static str, Table>, lookup: &LookupField, id: i64) -> Value {
    let target = tables.get(lookup.target).and_then(|t| t.rows.get(&id));
    match target {
        Some(row) => {
            let display = row.get(lookup.display).cloned().unwrap_or(Value::Null);
            let mut obj = Record::new();
            obj.insert(ID.to_string(), json!(id));
            obj.insert(lookup.display.to_string(), display);
            Value::Object(obj)
        }
        None => Value::Null,
    }
}

fn matches(table: &str, row: &Record, condition: &Condition) -> bool {
    let value = row.get(&condition.field_name).unwrap_or(&Value::Null);
    match schema::lookup(table, &condition.field_name) {
        Some(lookup) => match value {
            Value::Object(obj) => condition.values.iter().any(|wanted| {
                obj.get(ID) == Some(wanted) || obj.get(lookup.display) == Some(wanted)
            }),
            _ => false,
        },
        None => condition.values.iter().any(|wanted| wanted == value),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_records(
        &self,
        table: &'static str,
        query: &FetchQuery,
    ) -> StoreResult<Vec<Value>> {
        let tables = self.tables.lock().await;
        let Some(rows) = tables.get(table).map(|t| &t.rows) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<Record> = rows
            .values()
            .map(|row| expand(&tables, table, row))
            .filter(|row| query.conditions.iter().all(|c| matches(table, row, c)))
            .collect();

        if let Some(order) = &query.order_by {
            records.sort_by(|a, b| {
                let ord = compare(a.get(&order.field_name), b.get(&order.field_name));
                match order.sorttype {
                    SortType::Asc => ord,
                    SortType::Desc => ord.reverse(),
                }
            });
        }

        Ok(records.into_iter().map(Value::Object).collect())
    }

    async fn get_record(
        &self,
        table: &'static str,
        _fields: &[&'static str],
        id: i64,
    ) -> StoreResult<Option<Value>> {
        let tables = self.tables.lock().await;
        let row = tables.get(table).and_then(|t| t.rows.get(&id));
        Ok(row.map(|row| Value::Object(expand(&tables, table, row))))
    }

    async fn create_record(&self, table: &'static str, record: Record) -> StoreResult<i64> {
        let mut tables = self.tables.lock().await;
        let id = tables.entry(table).or_default().insert(record);
        tracing::debug!("memory store: created {} #{}", table, id);
        Ok(id)
    }

    async fn update_record(
        &self,
        table: &'static str,
        id: i64,
        mut record: Record,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let Some(row) = tables.get_mut(table).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(false);
        };

        normalize_lookups(&mut record);
        record.remove(ID);
        record.remove(CREATED_ON);
        row.extend(record);
        Ok(true)
    }

    async fn delete_record(&self, table: &'static str, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .get_mut(table)
            .map(|t| t.rows.remove(&id).is_some())
            .unwrap_or(false))
    }
}
