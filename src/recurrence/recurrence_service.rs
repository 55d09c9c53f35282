use chrono::NaiveDate;

use super::recurrence_models::{
    RecurrenceRequest, RecurrenceRule, RecurringTaskPattern, UpdatePatternRequest,
    UpdateRuleRequest,
};
use super::recurrence_repository::{PatternRepository, RuleRepository};
use super::recurrence_validator::{
    check_pattern, schedule_record, validate_recurrence, RecurrencePlan,
};
use crate::{
    error::{AppError, FieldErrors, Result},
    store::SharedStore,
    task::Task,
};

#[derive(Clone)]
pub struct RecurrenceService {
    patterns: PatternRepository,
    rules: RuleRepository,
}

impl RecurrenceService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            patterns: PatternRepository::new(store.clone()),
            rules: RuleRepository::new(store),
        }
    }

    pub fn validate(&self, request: &RecurrenceRequest, today: NaiveDate) -> Result<RecurrencePlan> {
        validate_recurrence(request, today).map_err(AppError::Validation)
    }

    pub async fn create_pattern(
        &self,
        plan: &RecurrencePlan,
        task_title: &str,
    ) -> Result<RecurringTaskPattern> {
        let pattern = self.patterns.create(&plan.pattern_record(task_title)).await?;
        tracing::debug!("Created recurrence pattern #{} {:?}", pattern.id, pattern.name);
        Ok(pattern)
    }

    pub async fn create_rule(
        &self,
        plan: &RecurrencePlan,
        task: &Task,
        pattern_id: i64,
    ) -> Result<RecurrenceRule> {
        let rule = self
            .rules
            .create(&plan.rule_record(task.id, &task.title, pattern_id))
            .await?;
        tracing::debug!("Created recurrence rule #{} for task #{}", rule.id, task.id);
        Ok(rule)
    }

    pub async fn list_patterns(&self) -> Result<Vec<RecurringTaskPattern>> {
        Ok(self.patterns.find_all().await?)
    }

    pub async fn get_pattern(&self, id: i64) -> Result<RecurringTaskPattern> {
        self.patterns
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recurring task pattern not found".into()))
    }

    /// The edit is applied to the stored pattern and the whole schedule is
    /// checked again; columns the new frequency does not use are cleared.
    pub async fn update_pattern(
        &self,
        id: i64,
        request: UpdatePatternRequest,
    ) -> Result<RecurringTaskPattern> {
        let mut pattern = self.get_pattern(id).await?;
        request.apply_to(&mut pattern);
        let schedule = check_pattern(&pattern).map_err(AppError::Validation)?;

        let record = schedule_record(pattern.name, schedule, pattern.interval);
        self.patterns
            .update(id, &record)
            .await?
            .ok_or_else(|| AppError::NotFound("Recurring task pattern not found".into()))
    }

    pub async fn delete_pattern(&self, id: i64) -> Result<()> {
        if !self.patterns.delete(id).await? {
            return Err(AppError::NotFound("Recurring task pattern not found".into()));
        }
        Ok(())
    }

    pub async fn list_rules(&self) -> Result<Vec<RecurrenceRule>> {
        Ok(self.rules.find_all().await?)
    }

    pub async fn rules_for_task(&self, task_id: i64) -> Result<Vec<RecurrenceRule>> {
        Ok(self.rules.find_by_task(task_id).await?)
    }

    pub async fn get_rule(&self, id: i64) -> Result<RecurrenceRule> {
        self.rules
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recurrence rule not found".into()))
    }

    /// The end date must stay after the start date, whichever of the two changes.
    pub async fn update_rule(&self, id: i64, request: UpdateRuleRequest) -> Result<RecurrenceRule> {
        if !request.start_date.is_keep() || !request.end_date.is_keep() {
            let current = self.get_rule(id).await?;
            let start = request.start_date.as_set().copied().or(current.start_date);
            let end = match request.end_date.as_set() {
                Some(end) => *end,
                None => current.end_date,
            };
            if let (Some(start), Some(end)) = (start, end) {
                if end <= start {
                    let mut errors = FieldErrors::new();
                    errors.insert("recurrenceEndDate", "End date must be after start date");
                    return Err(AppError::Validation(errors));
                }
            }
        }

        self.rules
            .update(id, request.into_record())
            .await?
            .ok_or_else(|| AppError::NotFound("Recurrence rule not found".into()))
    }

    pub async fn delete_rule(&self, id: i64) -> Result<()> {
        if !self.rules.delete(id).await? {
            return Err(AppError::NotFound("Recurrence rule not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::recurrence_models::{DayOfWeek, Frequency};
    use crate::recurrence::recurrence_validator::{MonthlyPolicy, Schedule};
    use crate::store::{schema::TASK_TABLE, MemoryRecordStore, Patch, RecordStore};
    use crate::task::{Priority, TimerState};
    use chrono::Utc;
    use std::sync::Arc;

    fn service() -> RecurrenceService {
        RecurrenceService::new(Arc::new(MemoryRecordStore::new()))
    }

    fn plan() -> RecurrencePlan {
        RecurrencePlan {
            schedule: Schedule::Weekly {
                day_of_week: DayOfWeek::Monday,
            },
            interval: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 30),
        }
    }

    fn task(id: i64) -> Task {
        Task {
            id,
            title: "Gym".to_string(),
            description: String::new(),
            category: String::new(),
            sub_category: None,
            priority: Priority::Medium,
            due_date: None,
            completed: false,
            completed_at: None,
            time_spent: 0,
            timer_state: TimerState::default(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_pattern_from_plan() {
        let service = service();
        let pattern = service.create_pattern(&plan(), "Gym").await.unwrap();
        assert_eq!(pattern.name, "Weekly - Gym");
        assert_eq!(pattern.frequency, Frequency::Weekly);
        assert_eq!(pattern.interval, 2);
        assert_eq!(pattern.day_of_week, Some(DayOfWeek::Monday));
        assert_eq!(service.get_pattern(pattern.id).await.unwrap(), pattern);
    }

    #[tokio::test]
    async fn test_pattern_update_checks_ranges() {
        let service = service();
        let pattern = service.create_pattern(&plan(), "Gym").await.unwrap();

        let bad = UpdatePatternRequest {
            interval: Patch::Set(400),
            day_of_month: Patch::Set(Some(0)),
            ..Default::default()
        };
        match service.update_pattern(pattern.id, bad).await {
            Err(AppError::Validation(fields)) => assert_eq!(fields.len(), 2),
            other => panic!("unexpected: {other:?}"),
        }

        let good = UpdatePatternRequest {
            interval: Patch::Set(3),
            ..Default::default()
        };
        let updated = service.update_pattern(pattern.id, good).await.unwrap();
        assert_eq!(updated.interval, 3);
        assert_eq!(updated.day_of_week, Some(DayOfWeek::Monday));
    }

    #[tokio::test]
    async fn test_frequency_change_needs_its_own_fields() {
        let service = service();
        let monthly = RecurrencePlan {
            schedule: Schedule::Monthly {
                policy: MonthlyPolicy::DayOfMonth(15),
            },
            ..plan()
        };
        let pattern = service.create_pattern(&monthly, "Rent").await.unwrap();

        let to_weekly = UpdatePatternRequest {
            frequency: Patch::Set(Frequency::Weekly),
            ..Default::default()
        };
        match service.update_pattern(pattern.id, to_weekly).await {
            Err(AppError::Validation(fields)) => {
                assert!(fields.contains("recurrenceDayOfWeek"))
            }
            other => panic!("unexpected: {other:?}"),
        }

        let two_policies = UpdatePatternRequest {
            frequency: Patch::Set(Frequency::Monthly),
            end_of_month: Patch::Set(true),
            ..Default::default()
        };
        match service.update_pattern(pattern.id, two_policies).await {
            Err(AppError::Validation(fields)) => assert!(fields.contains("recurrenceMonthly")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(service.get_pattern(pattern.id).await.unwrap(), pattern);

        let swap_policy = UpdatePatternRequest {
            day_of_month: Patch::Set(None),
            end_of_month: Patch::Set(true),
            ..Default::default()
        };
        let updated = service.update_pattern(pattern.id, swap_policy).await.unwrap();
        assert_eq!(updated.day_of_month, None);
        assert!(updated.end_of_month);

        let weekly = UpdatePatternRequest {
            frequency: Patch::Set(Frequency::Weekly),
            day_of_week: Patch::Set(Some(DayOfWeek::Tuesday)),
            ..Default::default()
        };
        let updated = service.update_pattern(pattern.id, weekly).await.unwrap();
        assert_eq!(updated.frequency, Frequency::Weekly);
        assert_eq!(updated.day_of_week, Some(DayOfWeek::Tuesday));
        assert!(!updated.end_of_month);
        assert_eq!(updated.name, "Monthly - Rent");
    }

    #[tokio::test]
    async fn test_rules_by_task() {
        let store = Arc::new(MemoryRecordStore::new());
        for title in ["Gym", "Swim"] {
            let record = serde_json::json!({ "title_c": title });
            if let serde_json::Value::Object(map) = record {
                store.create_record(TASK_TABLE, map).await.unwrap();
            }
        }
        let service = RecurrenceService::new(store);
        let pattern = service.create_pattern(&plan(), "Gym").await.unwrap();
        let rule = service.create_rule(&plan(), &task(1), pattern.id).await.unwrap();
        service.create_rule(&plan(), &task(2), pattern.id).await.unwrap();

        assert_eq!(rule.name, "Rule for Gym");
        assert_eq!(rule.task_id, Some(1));
        assert_eq!(rule.task_title, "Gym");
        assert_eq!(rule.pattern_id, Some(pattern.id));
        assert_eq!(rule.pattern_name, "Weekly - Gym");

        let for_task = service.rules_for_task(1).await.unwrap();
        assert_eq!(for_task.len(), 1);
        assert_eq!(for_task[0].id, rule.id);
        assert_eq!(service.list_rules().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rule_update_keeps_end_after_start() {
        let service = service();
        let rule = service.create_rule(&plan(), &task(4), 1).await.unwrap();

        let bad = UpdateRuleRequest {
            start_date: Patch::Set(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            ..Default::default()
        };
        assert!(matches!(
            service.update_rule(rule.id, bad).await,
            Err(AppError::Validation(_))
        ));

        let open_ended = UpdateRuleRequest {
            end_date: Patch::Set(None),
            ..Default::default()
        };
        let updated = service.update_rule(rule.id, open_ended).await.unwrap();
        assert_eq!(updated.end_date, None);

        service.delete_rule(rule.id).await.unwrap();
        assert!(matches!(
            service.get_rule(rule.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
