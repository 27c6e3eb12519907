//! Task data models and their JSON wire format
//!
//! Field names on the wire are camelCase and timestamps are milliseconds
//! since the Unix epoch, matching what existing browser clients expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StoreError;

/// Whether a timing interval is currently open for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    /// An interval is open and began at `since`
    Running { since: DateTime<Utc> },
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            TimerState::Running { since } => Some(*since),
            TimerState::Stopped => None,
        }
    }
}

/// A task/todo item
///
/// `time_spent` holds the seconds accumulated by closed intervals only. The
/// open interval, if any, is folded in when it closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TaskRecord", try_from = "TaskRecord")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub time_spent: f64,
    pub timer: TimerState,
}

impl Task {
    /// A fresh task: not completed, no time tracked, timer stopped.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            completed: false,
            time_spent: 0.0,
            timer: TimerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn last_started(&self) -> Option<DateTime<Utc>> {
        self.timer.since()
    }
}

/// Flat wire representation of a [`Task`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub time_spent: f64,
    #[serde(default)]
    pub timer_running: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_started: Option<DateTime<Utc>>,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let timer_running = task.is_running();
        let last_started = task.last_started();
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            time_spent: task.time_spent,
            timer_running,
            last_started,
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = String;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let timer = match (record.timer_running, record.last_started) {
            (true, Some(since)) => TimerState::Running { since },
            (false, None) => TimerState::Stopped,
            (true, None) => {
                return Err("timerRunning is set but lastStarted is null".to_string());
            }
            (false, Some(_)) => {
                return Err("lastStarted is set but timerRunning is false".to_string());
            }
        };

        if record.completed && timer.is_running() {
            return Err("a completed task cannot have a running timer".to_string());
        }
        if record.time_spent.is_nan() || record.time_spent < 0.0 {
            return Err("timeSpent must be a non-negative number".to_string());
        }

        Ok(Self {
            id: record.id,
            title: record.title,
            description: record.description,
            completed: record.completed,
            time_spent: record.time_spent,
            timer,
        })
    }
}

/// Body of `POST /api/todos`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/todos/{id}`; both fields are required, description may be empty
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub description: String,
}

/// Body of `PATCH /api/todos/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

/// State-changing actions accepted by `PATCH /api/todos/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    ToggleComplete,
    ToggleTimer,
}

impl FromStr for TaskAction {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toggleComplete" => Ok(TaskAction::ToggleComplete),
            "toggleTimer" => Ok(TaskAction::ToggleTimer),
            other => Err(StoreError::invalid(format!("unknown action '{}'", other))),
        }
    }
}

/// Live elapsed time for a task, as served by `GET /api/todos/{id}/elapsed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElapsedTime {
    pub id: String,
    /// Seconds, including the open interval when the timer is running
    pub elapsed: f64,
    pub timer_running: bool,
}
