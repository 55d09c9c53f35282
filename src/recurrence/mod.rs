pub mod recurrence_handlers;
pub mod recurrence_models;
pub mod recurrence_repository;
pub mod recurrence_service;
pub mod recurrence_validator;
pub mod routes;

pub use recurrence_models::{
    DayOfWeek, Frequency, RecurrenceRequest, RecurrenceRule, RecurringTaskPattern,
    UpdatePatternRequest, UpdateRuleRequest, WeekOfMonth,
};
pub use recurrence_service::RecurrenceService;
pub use recurrence_validator::{validate_recurrence, MonthlyPolicy, RecurrencePlan, Schedule};
