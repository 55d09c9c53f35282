use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use super::task_models::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    fn keeps(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub status: StatusFilter,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Renderings of a due date a search can hit, lower-cased:
/// `2024-06-01`, `june 2024`, `jun 1`, `saturday, june 1, 2024`.
fn date_renderings(date: NaiveDate) -> [String; 4] {
    [
        date.format("%Y-%m-%d").to_string(),
        date.format("%B %Y").to_string().to_lowercase(),
        date.format("%b %-d").to_string().to_lowercase(),
        date.format("%A, %B %-d, %Y").to_string().to_lowercase(),
    ]
}

fn matches_search(task: &Task, query: &str) -> bool {
    let text_matches = task.title.to_lowercase().contains(query)
        || task.description.to_lowercase().contains(query)
        || task.category.to_lowercase().contains(query);

    text_matches
        || task
            .due_date
            .map(|date| date_renderings(date).iter().any(|r| r.contains(query)))
            .unwrap_or(false)
}

/// Display order: open before done, then priority, then dated before
/// undated (earliest first), then newest first.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.cmp(&b.priority))
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Filters and orders a copy of `tasks`; the input is left untouched.
pub fn filter_tasks(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let search = query
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_lowercase);

    let mut filtered: Vec<Task> = tasks
        .iter()
        .filter(|task| query.status.keeps(task))
        .filter(|task| category.map_or(true, |c| task.category == c))
        .filter(|task| search.as_deref().map_or(true, |q| matches_search(task, q)))
        .cloned()
        .collect();

    filtered.sort_by(compare_tasks);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::task_models::{Priority, TimerState};
    use chrono::{DateTime, TimeZone, Utc};

    fn task(id: i64, title: &str, completed: bool, priority: Priority, due: Option<&str>) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            category: "Work".to_string(),
            sub_category: None,
            priority,
            due_date: due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            completed,
            completed_at: None,
            time_spent: 0,
            timer_state: TimerState::default(),
            created_at: created(id),
        }
    }

    fn created(id: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(id)
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_order() {
        let tasks = vec![
            task(1, "A", false, Priority::High, None),
            task(2, "B", false, Priority::Low, Some("2024-06-01")),
            task(3, "C", true, Priority::High, None),
        ];
        let out = filter_tasks(&tasks, &TaskQuery::default());
        assert_eq!(titles(&out), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_incomplete_always_first() {
        let tasks = vec![
            task(1, "done-high-dated", true, Priority::High, Some("2020-01-01")),
            task(2, "open-low", false, Priority::Low, None),
            task(3, "done-low", true, Priority::Low, None),
            task(4, "open-high", false, Priority::High, Some("2030-01-01")),
        ];
        let out = filter_tasks(&tasks, &TaskQuery::default());
        let first_done = out.iter().position(|t| t.completed).unwrap();
        assert!(out[..first_done].iter().all(|t| !t.completed));
        assert!(out[first_done..].iter().all(|t| t.completed));
    }

    #[test]
    fn test_dates_then_newest_first() {
        let tasks = vec![
            task(1, "old-undated", false, Priority::Medium, None),
            task(2, "later", false, Priority::Medium, Some("2024-07-01")),
            task(3, "sooner", false, Priority::Medium, Some("2024-06-01")),
            task(4, "new-undated", false, Priority::Medium, None),
        ];
        let out = filter_tasks(&tasks, &TaskQuery::default());
        assert_eq!(titles(&out), vec!["sooner", "later", "new-undated", "old-undated"]);
    }

    #[test]
    fn test_output_is_stable_subset() {
        let tasks = vec![
            task(1, "a", false, Priority::Low, None),
            task(2, "b", true, Priority::High, None),
            task(3, "c", false, Priority::Medium, Some("2024-02-02")),
        ];
        let snapshot = tasks.clone();
        let query = TaskQuery {
            status: StatusFilter::Active,
            ..Default::default()
        };

        let first = filter_tasks(&tasks, &query);
        let second = filter_tasks(&tasks, &query);
        assert_eq!(first, second);
        assert!(first.len() <= tasks.len());
        assert!(first.iter().all(|t| tasks.contains(t)));
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn test_status_filters() {
        let tasks = vec![
            task(1, "open", false, Priority::Medium, None),
            task(2, "done", true, Priority::Medium, None),
        ];
        let active = TaskQuery {
            status: StatusFilter::Active,
            ..Default::default()
        };
        let completed = TaskQuery {
            status: StatusFilter::Completed,
            ..Default::default()
        };
        assert_eq!(titles(&filter_tasks(&tasks, &active)), vec!["open"]);
        assert_eq!(titles(&filter_tasks(&tasks, &completed)), vec!["done"]);
    }

    #[test]
    fn test_category_exact_match() {
        let mut personal = task(2, "walk", false, Priority::Medium, None);
        personal.category = "Personal".to_string();
        let tasks = vec![task(1, "deploy", false, Priority::Medium, None), personal];

        let query = TaskQuery {
            category: Some("Personal".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&filter_tasks(&tasks, &query)), vec!["walk"]);

        let query = TaskQuery {
            category: Some("Pers".to_string()),
            ..Default::default()
        };
        assert!(filter_tasks(&tasks, &query).is_empty());

        let query = TaskQuery {
            category: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_tasks(&tasks, &query).len(), 2);
    }

    #[test]
    fn test_search_text_and_dates() {
        let mut described = task(1, "Groceries", false, Priority::Medium, None);
        described.description = "Milk and EGGS".to_string();
        let dated = task(2, "Dentist", false, Priority::Medium, Some("2024-06-01"));
        let tasks = vec![described, dated];

        let search = |q: &str| {
            let query = TaskQuery {
                search: Some(q.to_string()),
                ..Default::default()
            };
            titles(&filter_tasks(&tasks, &query))
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        assert_eq!(search("eggs"), vec!["Groceries"]);
        assert_eq!(search("work"), vec!["Dentist", "Groceries"]);
        assert_eq!(search("2024-06"), vec!["Dentist"]);
        assert_eq!(search("June 2024"), vec!["Dentist"]);
        assert_eq!(search("jun 1"), vec!["Dentist"]);
        assert_eq!(search("saturday"), vec!["Dentist"]);
        assert_eq!(search("   "), vec!["Dentist", "Groceries"]);
        assert!(search("dragon").is_empty());
        // priority is a filter of its own, not search text
        assert!(search("medium").is_empty());
    }
}
