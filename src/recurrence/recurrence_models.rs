use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::{form_flag, form_text};
use crate::store::{
    dates::{format_date, parse_date, parse_timestamp},
    schema::Lookup,
    Patch, Record,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

/// Case-insensitive parse by variant name, used for values typed into forms
/// or read from storage.
macro_rules! named_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant),)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(value))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

named_enum!(Frequency { Daily, Weekly, Monthly, Yearly });
named_enum!(DayOfWeek { Sunday, Monday, Tuesday, Wednesday, Thursday, Friday, Saturday });
named_enum!(WeekOfMonth { First, Second, Third, Fourth, Last });

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTaskPattern {
    pub id: i64,
    pub name: String,
    pub frequency: Frequency,
    pub interval: u32,
    pub day_of_week: Option<DayOfWeek>,
    pub day_of_month: Option<u8>,
    pub week_of_month: Option<WeekOfMonth>,
    pub end_of_month: bool,
    pub created_at: DateTime<Utc>,
}

/// Storage shape of the `recurring_task_pattern_c` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frequency_c: Option<String>,
    #[serde(default)]
    pub interval_c: Option<i64>,
    #[serde(default)]
    pub day_of_week_c: Option<String>,
    #[serde(default)]
    pub day_of_month_c: Option<i64>,
    #[serde(default)]
    pub week_of_month_c: Option<String>,
    #[serde(default)]
    pub end_of_month_c: Option<bool>,
    #[serde(rename = "CreatedOn", default)]
    pub created_on: Option<String>,
}

impl From<PatternRecord> for RecurringTaskPattern {
    fn from(record: PatternRecord) -> Self {
        RecurringTaskPattern {
            id: record.id,
            name: record.name.unwrap_or_default(),
            frequency: record
                .frequency_c
                .as_deref()
                .and_then(Frequency::parse)
                .unwrap_or_default(),
            interval: record
                .interval_c
                .and_then(|i| u32::try_from(i).ok())
                .filter(|&i| i > 0)
                .unwrap_or(1),
            day_of_week: record.day_of_week_c.as_deref().and_then(DayOfWeek::parse),
            day_of_month: record.day_of_month_c.and_then(|d| u8::try_from(d).ok()),
            week_of_month: record.week_of_month_c.as_deref().and_then(WeekOfMonth::parse),
            end_of_month: record.end_of_month_c.unwrap_or(false),
            created_at: record
                .created_on
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
        }
    }
}

/// Write shape for a new pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPatternRecord {
    #[serde(rename = "Name")]
    pub name: String,
    pub frequency_c: &'static str,
    pub interval_c: u32,
    pub day_of_week_c: Option<&'static str>,
    pub day_of_month_c: Option<u8>,
    pub week_of_month_c: Option<&'static str>,
    pub end_of_month_c: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub id: i64,
    pub name: String,
    pub task_id: Option<i64>,
    pub task_title: String,
    pub pattern_id: Option<i64>,
    pub pattern_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// The rule's task reference, displayed by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLookup {
    #[serde(rename = "Id", default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title_c: Option<String>,
}

/// Storage shape of the `recurrence_rule_c` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub task_c: Option<TaskLookup>,
    #[serde(default)]
    pub recurring_task_pattern_c: Option<Lookup>,
    #[serde(default)]
    pub start_date_c: Option<String>,
    #[serde(default)]
    pub end_date_c: Option<String>,
}

impl From<RuleRecord> for RecurrenceRule {
    fn from(record: RuleRecord) -> Self {
        let task = record.task_c.unwrap_or_default();
        let pattern = record.recurring_task_pattern_c.unwrap_or_default();
        RecurrenceRule {
            id: record.id,
            name: record.name.unwrap_or_default(),
            task_id: task.id,
            task_title: task.title_c.unwrap_or_default(),
            pattern_id: pattern.id,
            pattern_name: pattern.name.unwrap_or_default(),
            start_date: record.start_date_c.as_deref().and_then(parse_date),
            end_date: record.end_date_c.as_deref().and_then(parse_date),
        }
    }
}

/// Write shape for a new rule; references are bare ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRuleRecord {
    #[serde(rename = "Name")]
    pub name: String,
    pub task_c: i64,
    pub recurring_task_pattern_c: i64,
    pub start_date_c: String,
    pub end_date_c: Option<String>,
}

/// Recurrence section of the task form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRequest {
    #[serde(default, deserialize_with = "form_text")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    #[schema(value_type = Option<String>, example = "1")]
    pub interval: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    pub day_of_week: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    #[schema(value_type = Option<String>, example = "15")]
    pub day_of_month: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    pub week_of_month: Option<String>,
    #[serde(default, deserialize_with = "form_flag")]
    pub end_of_month: bool,
    #[serde(default, deserialize_with = "form_text")]
    #[schema(example = "2024-06-01")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "form_text")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatternRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<Frequency>)]
    pub frequency: Patch<Frequency>,
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub interval: Patch<u32>,
    #[serde(default)]
    #[schema(value_type = Option<DayOfWeek>)]
    pub day_of_week: Patch<Option<DayOfWeek>>,
    #[serde(default)]
    #[schema(value_type = Option<u8>)]
    pub day_of_month: Patch<Option<u8>>,
    #[serde(default)]
    #[schema(value_type = Option<WeekOfMonth>)]
    pub week_of_month: Patch<Option<WeekOfMonth>>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub end_of_month: Patch<bool>,
}

impl UpdatePatternRequest {
    /// Applies the edit in place. The result still has to pass
    /// `check_pattern` before it is stored.
    pub fn apply_to(self, pattern: &mut RecurringTaskPattern) {
        self.name.apply_to(&mut pattern.name);
        self.frequency.apply_to(&mut pattern.frequency);
        self.interval.apply_to(&mut pattern.interval);
        self.day_of_week.apply_to(&mut pattern.day_of_week);
        self.day_of_month.apply_to(&mut pattern.day_of_month);
        self.week_of_month.apply_to(&mut pattern.week_of_month);
        self.end_of_month.apply_to(&mut pattern.end_of_month);
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Patch<Option<NaiveDate>>,
}

impl UpdateRuleRequest {
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        self.name.write(&mut record, "Name");
        self.start_date.map(format_date).write(&mut record, "start_date_c");
        self.end_date
            .map(|d| d.map(format_date))
            .write(&mut record, "end_date_c");
        record
    }
}
