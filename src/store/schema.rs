//! Table and field names of the remote record store.

pub const TASK_TABLE: &str = "task_c";
pub const CATEGORY_TABLE: &str = "category_c";
pub const PATTERN_TABLE: &str = "recurring_task_pattern_c";
pub const RULE_TABLE: &str = "recurrence_rule_c";

pub const ID: &str = "Id";
pub const NAME: &str = "Name";
pub const CREATED_ON: &str = "CreatedOn";

pub const TASK_FIELDS: &[&str] = &[
    ID,
    "title_c",
    "description_c",
    "category_c",
    "sub_category_c",
    "priority_c",
    "due_date_c",
    "completed_c",
    "completed_at_c",
    "time_spent_c",
    "timer_state_is_running_c",
    "timer_state_last_updated_c",
    CREATED_ON,
];

pub const CATEGORY_FIELDS: &[&str] = &[ID, NAME, "color_c", "icon_c", "sub_category_c"];

pub const PATTERN_FIELDS: &[&str] = &[
    ID,
    NAME,
    "frequency_c",
    "interval_c",
    "day_of_week_c",
    "day_of_month_c",
    "week_of_month_c",
    "end_of_month_c",
    CREATED_ON,
];

pub const RULE_FIELDS: &[&str] = &[
    ID,
    NAME,
    "task_c",
    "start_date_c",
    "end_date_c",
    "recurring_task_pattern_c",
    CREATED_ON,
];

/// A reference field that the store expands to `{Id, <display>}` on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupField {
    pub table: &'static str,
    pub field: &'static str,
    pub target: &'static str,
    pub display: &'static str,
}

pub const LOOKUPS: &[LookupField] = &[
    LookupField {
        table: TASK_TABLE,
        field: "category_c",
        target: CATEGORY_TABLE,
        display: NAME,
    },
    LookupField {
        table: RULE_TABLE,
        field: "task_c",
        target: TASK_TABLE,
        display: "title_c",
    },
    LookupField {
        table: RULE_TABLE,
        field: "recurring_task_pattern_c",
        target: PATTERN_TABLE,
        display: NAME,
    },
];

pub fn lookup(table: &str, field: &str) -> Option<&'static LookupField> {
    LOOKUPS.iter().find(|l| l.table == table && l.field == field)
}

/// A lookup field as read back from the store, displayed by `Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Lookup {
    #[serde(rename = "Id", default)]
    pub id: Option<i64>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}
