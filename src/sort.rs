//! Presentation orderings for task lists

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::StoreError;
use crate::models::Task;

/// How a task list is ordered for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    TitleAsc,
    TitleDesc,
    /// Completed tasks first
    StatusCompleted,
    /// Incomplete tasks first
    StatusIncomplete,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "title-asc" => Ok(SortOrder::TitleAsc),
            "title-desc" => Ok(SortOrder::TitleDesc),
            "status-completed" => Ok(SortOrder::StatusCompleted),
            "status-incomplete" => Ok(SortOrder::StatusIncomplete),
            other => Err(StoreError::invalid(format!("unknown sort order '{}'", other))),
        }
    }
}

/// Ids are creation timestamps; anything unparsable sorts as 0.
fn id_key(task: &Task) -> i64 {
    task.id.parse().unwrap_or(0)
}

fn newest_first(a: &Task, b: &Task) -> Ordering {
    id_key(b).cmp(&id_key(a))
}

fn by_title(a: &Task, b: &Task) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// Sort `tasks` in place
pub fn sort_tasks(tasks: &mut [Task], order: SortOrder) {
    match order {
        SortOrder::Newest => tasks.sort_by(newest_first),
        SortOrder::Oldest => tasks.sort_by_key(id_key),
        SortOrder::TitleAsc => {
            tasks.sort_by(|a, b| by_title(a, b).then_with(|| newest_first(a, b)))
        }
        SortOrder::TitleDesc => {
            tasks.sort_by(|a, b| by_title(b, a).then_with(|| newest_first(a, b)))
        }
        SortOrder::StatusCompleted => {
            tasks.sort_by(|a, b| b.completed.cmp(&a.completed).then_with(|| newest_first(a, b)))
        }
        SortOrder::StatusIncomplete => {
            tasks.sort_by(|a, b| a.completed.cmp(&b.completed).then_with(|| newest_first(a, b)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(id: &str, title: &str, completed: bool) -> Task {
        let mut task = Task::new(id, title, "");
        task.completed = completed;
        task
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("10", "banana", false),
            task("30", "Apple", true),
            task("20", "cherry", true),
            task("40", "apple", false),
        ]
    }

    #[test]
    fn newest_and_oldest_use_numeric_ids() {
        let mut tasks = vec![
            task("9", "a", false),
            task("100", "b", false),
            task("20", "c", false),
        ];

        sort_tasks(&mut tasks, SortOrder::Newest);
        assert_eq!(ids(&tasks), vec!["100", "20", "9"]);

        sort_tasks(&mut tasks, SortOrder::Oldest);
        assert_eq!(ids(&tasks), vec!["9", "20", "100"]);
    }

    #[test]
    fn non_numeric_ids_sort_as_zero() {
        let mut tasks = vec![task("abc", "a", false), task("5", "b", false)];
        sort_tasks(&mut tasks, SortOrder::Oldest);
        assert_eq!(ids(&tasks), vec!["abc", "5"]);
    }

    #[test]
    fn title_orders_ignore_case() {
        let mut tasks = sample();

        sort_tasks(&mut tasks, SortOrder::TitleAsc);
        assert_eq!(ids(&tasks), vec!["30", "40", "10", "20"]);

        sort_tasks(&mut tasks, SortOrder::TitleDesc);
        assert_eq!(ids(&tasks), vec!["20", "10", "40", "30"]);
    }

    #[test]
    fn status_orders_break_ties_newest_first() {
        let mut tasks = sample();

        sort_tasks(&mut tasks, SortOrder::StatusCompleted);
        assert_eq!(ids(&tasks), vec!["30", "20", "40", "10"]);

        sort_tasks(&mut tasks, SortOrder::StatusIncomplete);
        assert_eq!(ids(&tasks), vec!["40", "10", "30", "20"]);
    }

    #[test]
    fn parse_sort_names() {
        assert_eq!("title-asc".parse::<SortOrder>(), Ok(SortOrder::TitleAsc));
        assert_eq!("status-incomplete".parse::<SortOrder>(), Ok(SortOrder::StatusIncomplete));
        assert!("random".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Newest);
    }
}
