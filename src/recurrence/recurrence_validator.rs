//! Checks the recurrence section of the task form and turns it into a
//! schedule descriptor.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::recurrence_models::{
    DayOfWeek, Frequency, NewPatternRecord, NewRuleRecord, RecurrenceRequest,
    RecurringTaskPattern, WeekOfMonth,
};
use crate::error::FieldErrors;
use crate::store::dates::{format_date, parse_date};

pub const MIN_INTERVAL: i64 = 1;
pub const MAX_INTERVAL: i64 = 365;

/// Which day of the month a monthly schedule falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyPolicy {
    DayOfMonth(u8),
    WeekOfMonth(WeekOfMonth),
    EndOfMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "frequency")]
pub enum Schedule {
    Daily,
    Weekly {
        #[serde(rename = "dayOfWeek")]
        day_of_week: DayOfWeek,
    },
    Monthly {
        policy: MonthlyPolicy,
    },
    Yearly,
}

impl Schedule {
    pub fn frequency(&self) -> Frequency {
        match self {
            Schedule::Daily => Frequency::Daily,
            Schedule::Weekly { .. } => Frequency::Weekly,
            Schedule::Monthly { .. } => Frequency::Monthly,
            Schedule::Yearly => Frequency::Yearly,
        }
    }
}

/// A validated recurrence, ready to be stored as a pattern plus a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePlan {
    /// `{"frequency": "Weekly", "dayOfWeek": "Monday"}`,
    /// `{"frequency": "Monthly", "policy": {"dayOfMonth": 15}}`, ...
    #[schema(value_type = Object)]
    pub schedule: Schedule,
    pub interval: u32,
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
}

impl RecurrencePlan {
    pub fn pattern_record(&self, task_title: &str) -> NewPatternRecord {
        let frequency = self.schedule.frequency();
        schedule_record(format!("{frequency} - {task_title}"), self.schedule, self.interval)
    }

    pub fn rule_record(&self, task_id: i64, task_title: &str, pattern_id: i64) -> NewRuleRecord {
        NewRuleRecord {
            name: format!("Rule for {task_title}"),
            task_c: task_id,
            recurring_task_pattern_c: pattern_id,
            start_date_c: format_date(self.start_date),
            end_date_c: self.end_date.map(format_date),
        }
    }
}

/// Every schedule column of a pattern. Columns the frequency does not use
/// are written empty.
pub fn schedule_record(name: String, schedule: Schedule, interval: u32) -> NewPatternRecord {
    let (day_of_week, monthly) = match schedule {
        Schedule::Weekly { day_of_week } => (Some(day_of_week), None),
        Schedule::Monthly { policy } => (None, Some(policy)),
        Schedule::Daily | Schedule::Yearly => (None, None),
    };

    NewPatternRecord {
        name,
        frequency_c: schedule.frequency().as_str(),
        interval_c: interval,
        day_of_week_c: day_of_week.map(|d| d.as_str()),
        day_of_month_c: match monthly {
            Some(MonthlyPolicy::DayOfMonth(day)) => Some(day),
            _ => None,
        },
        week_of_month_c: match monthly {
            Some(MonthlyPolicy::WeekOfMonth(week)) => Some(week.as_str()),
            _ => None,
        },
        end_of_month_c: monthly == Some(MonthlyPolicy::EndOfMonth),
    }
}

const DAY_OF_WEEK_REQUIRED: &str = "Day of week is required for weekly recurrence";
const DAY_OF_MONTH_RANGE: &str = "Day of month must be between 1 and 31";

fn interval_message() -> String {
    format!("Interval must be between {MIN_INTERVAL} and {MAX_INTERVAL}")
}

/// `set` is how many of day of month, week of month and end of month are filled in.
fn check_policy_count(set: usize, errors: &mut FieldErrors) {
    match set {
        0 => errors.insert(
            "recurrenceMonthly",
            "Please specify day of month, week of month, or end of month",
        ),
        1 => {}
        _ => errors.insert(
            "recurrenceMonthly",
            "Choose only one of day of month, week of month, or end of month",
        ),
    }
}

/// Checks an edited pattern and returns the schedule it now describes.
///
/// Fields the frequency does not use are ignored; a weekly pattern may still
/// carry a stale day of month, which [`schedule_record`] then clears.
pub fn check_pattern(pattern: &RecurringTaskPattern) -> Result<Schedule, FieldErrors> {
    let mut errors = FieldErrors::new();

    if !(MIN_INTERVAL..=MAX_INTERVAL).contains(&i64::from(pattern.interval)) {
        errors.insert("recurrenceInterval", interval_message());
    }
    if pattern.day_of_month.is_some_and(|d| !(1..=31).contains(&d)) {
        errors.insert("recurrenceDayOfMonth", DAY_OF_MONTH_RANGE);
    }

    let schedule = match pattern.frequency {
        Frequency::Daily => Some(Schedule::Daily),
        Frequency::Yearly => Some(Schedule::Yearly),
        Frequency::Weekly => {
            if pattern.day_of_week.is_none() {
                errors.insert("recurrenceDayOfWeek", DAY_OF_WEEK_REQUIRED);
            }
            pattern
                .day_of_week
                .map(|day_of_week| Schedule::Weekly { day_of_week })
        }
        Frequency::Monthly => {
            let set = [
                pattern.day_of_month.is_some(),
                pattern.week_of_month.is_some(),
                pattern.end_of_month,
            ]
            .iter()
            .filter(|&&s| s)
            .count();
            check_policy_count(set, &mut errors);

            let policy = match (pattern.day_of_month, pattern.week_of_month) {
                (Some(day), _) => MonthlyPolicy::DayOfMonth(day),
                (_, Some(week)) => MonthlyPolicy::WeekOfMonth(week),
                _ => MonthlyPolicy::EndOfMonth,
            };
            Some(Schedule::Monthly { policy })
        }
    };

    match schedule {
        Some(schedule) if errors.is_empty() => Ok(schedule),
        _ => Err(errors),
    }
}

/// Field key, message.
fn check_interval(interval: Option<&str>) -> Result<u32, (&'static str, String)> {
    let parsed = match interval {
        None => Some(MIN_INTERVAL),
        Some(text) => text.parse::<i64>().ok(),
    };
    parsed
        .filter(|i| (MIN_INTERVAL..=MAX_INTERVAL).contains(i))
        .and_then(|i| u32::try_from(i).ok())
        .ok_or(("recurrenceInterval", interval_message()))
}

fn check_monthly(request: &RecurrenceRequest, errors: &mut FieldErrors) -> Option<MonthlyPolicy> {
    let set = [
        request.day_of_month.is_some(),
        request.week_of_month.is_some(),
        request.end_of_month,
    ]
    .iter()
    .filter(|&&s| s)
    .count();

    check_policy_count(set, errors);

    let day = request.day_of_month.as_deref().map(|text| {
        let day = text
            .parse::<u8>()
            .ok()
            .filter(|d| (1..=31).contains(d));
        if day.is_none() {
            errors.insert("recurrenceDayOfMonth", DAY_OF_MONTH_RANGE);
        }
        day
    });
    let week = request.week_of_month.as_deref().map(|text| {
        let week = WeekOfMonth::parse(text);
        if week.is_none() {
            errors.insert(
                "recurrenceWeekOfMonth",
                "Week of month must be First, Second, Third, Fourth, or Last",
            );
        }
        week
    });

    if set != 1 {
        return None;
    }
    match (day, week) {
        (Some(day), _) => day.map(MonthlyPolicy::DayOfMonth),
        (_, Some(week)) => week.map(MonthlyPolicy::WeekOfMonth),
        _ => Some(MonthlyPolicy::EndOfMonth),
    }
}

/// Validates a recurrence against `today` (date only).
///
/// Every failing rule is reported at once. Unparseable dates count as not
/// filled in; an unknown frequency reads as daily.
pub fn validate_recurrence(
    request: &RecurrenceRequest,
    today: NaiveDate,
) -> Result<RecurrencePlan, FieldErrors> {
    let mut errors = FieldErrors::new();

    let start_date = request.start_date.as_deref().and_then(parse_date);
    let end_date = request.end_date.as_deref().and_then(parse_date);
    match start_date {
        None => errors.insert("recurrenceStartDate", "Start date is required for recurring tasks"),
        Some(start) if start < today => {
            errors.insert("recurrenceStartDate", "Start date cannot be in the past")
        }
        Some(_) => {}
    }
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end <= start {
            errors.insert("recurrenceEndDate", "End date must be after start date");
        }
    }

    let interval = match check_interval(request.interval.as_deref()) {
        Ok(interval) => Some(interval),
        Err((key, message)) => {
            errors.insert(key, message);
            None
        }
    };

    let frequency = request
        .frequency
        .as_deref()
        .and_then(Frequency::parse)
        .unwrap_or_default();
    let schedule = match frequency {
        Frequency::Daily => Some(Schedule::Daily),
        Frequency::Yearly => Some(Schedule::Yearly),
        Frequency::Weekly => {
            let day = request.day_of_week.as_deref().and_then(DayOfWeek::parse);
            if day.is_none() {
                errors.insert("recurrenceDayOfWeek", DAY_OF_WEEK_REQUIRED);
            }
            day.map(|day_of_week| Schedule::Weekly { day_of_week })
        }
        Frequency::Monthly => {
            check_monthly(request, &mut errors).map(|policy| Schedule::Monthly { policy })
        }
    };

    match (errors.is_empty(), schedule, interval, start_date) {
        (true, Some(schedule), Some(interval), Some(start_date)) => Ok(RecurrencePlan {
            schedule,
            interval,
            start_date,
            end_date,
        }),
        _ => Err(errors),
    }
}
