//! Elapsed-time accounting for tasks
//!
//! Every transition here is a pure function from the current task and a
//! wall-clock instant to the next task. The store decides when to commit.

use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};
use crate::models::{Task, TimerState};

/// Seconds between `since` and `now`, never negative.
pub fn elapsed_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - since).num_milliseconds().max(0);
    millis as f64 / 1000.0
}

impl Task {
    /// Flip `completed`.
    ///
    /// Completing a task with an open interval closes it first, so its time
    /// lands in `time_spent`. Uncompleting leaves the timer stopped.
    pub fn with_completion_toggled(&self, now: DateTime<Utc>) -> Task {
        let mut next = self.clone();
        if !self.completed {
            next.close_interval(now);
        }
        next.completed = !self.completed;
        next
    }

    /// Start a stopped timer or stop a running one.
    ///
    /// Completed tasks are rejected untouched.
    pub fn with_timer_toggled(&self, now: DateTime<Utc>) -> StoreResult<Task> {
        if self.completed {
            return Err(StoreError::invalid(format!(
                "cannot toggle the timer of completed task {}",
                self.id
            )));
        }

        let mut next = self.clone();
        match self.timer {
            TimerState::Running { .. } => next.close_interval(now),
            TimerState::Stopped => next.timer = TimerState::Running { since: now },
        }
        Ok(next)
    }

    /// Tracked seconds as of `now`, including the open interval.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> f64 {
        match self.timer {
            TimerState::Running { since } => self.time_spent + elapsed_seconds(since, now),
            TimerState::Stopped => self.time_spent,
        }
    }

    fn close_interval(&mut self, now: DateTime<Utc>) {
        if let TimerState::Running { since } = self.timer {
            self.time_spent += elapsed_seconds(since, now);
            self.timer = TimerState::Stopped;
        }
    }
}

/// Format seconds as `HH:MM:SS`. Fractions are dropped, negatives read as zero.
pub fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Format seconds as `MM:SS`; minutes grow past 59 rather than rolling over.
pub fn format_mmss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn start_then_stop_accumulates_gap() {
        let task = Task::new("1", "Draft outline", "");

        let running = task.with_timer_toggled(at(0)).unwrap();
        assert!(running.is_running());
        assert_eq!(running.last_started(), Some(at(0)));
        assert_eq!(running.time_spent, 0.0);

        let stopped = running.with_timer_toggled(at(5_000)).unwrap();
        assert!(!stopped.is_running());
        assert_eq!(stopped.last_started(), None);
        assert!(approx(stopped.time_spent, 5.0));
    }

    #[test]
    fn completing_while_running_folds_open_interval() {
        let mut task = Task::new("1", "Draft outline", "");
        task.time_spent = 5.0;
        let running = task.with_timer_toggled(at(10_000)).unwrap();

        let done = running.with_completion_toggled(at(13_000));
        assert!(done.completed);
        assert!(!done.is_running());
        assert_eq!(done.last_started(), None);
        assert!(approx(done.time_spent, 8.0));
    }

    #[test]
    fn completing_stopped_task_keeps_time() {
        let mut task = Task::new("1", "t", "");
        task.time_spent = 42.0;

        let done = task.with_completion_toggled(at(1_000));
        assert!(done.completed);
        assert_eq!(done.time_spent, 42.0);
    }

    #[test]
    fn uncompleting_has_no_timer_side_effect() {
        let mut task = Task::new("1", "t", "");
        task.completed = true;
        task.time_spent = 12.5;

        let reopened = task.with_completion_toggled(at(99_000));
        assert!(!reopened.completed);
        assert!(!reopened.is_running());
        assert_eq!(reopened.time_spent, 12.5);
    }

    #[test]
    fn toggle_timer_on_completed_task_is_rejected() {
        let mut task = Task::new("7", "t", "");
        task.completed = true;

        let err = task.with_timer_toggled(at(0)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
        assert!(task.completed);
        assert!(!task.is_running());
    }

    #[test]
    fn elapsed_at_includes_open_interval() {
        let mut task = Task::new("1", "t", "");
        task.time_spent = 10.0;
        assert!(approx(task.elapsed_at(at(60_000)), 10.0));

        task.timer = TimerState::Running { since: at(0) };
        assert!(approx(task.elapsed_at(at(2_500)), 12.5));
        // Stored total is untouched by reads
        assert_eq!(task.time_spent, 10.0);
    }

    #[test]
    fn clock_going_backwards_adds_nothing() {
        assert_eq!(elapsed_seconds(at(5_000), at(0)), 0.0);

        let running = Task::new("1", "t", "").with_timer_toggled(at(5_000)).unwrap();
        let stopped = running.with_timer_toggled(at(0)).unwrap();
        assert_eq!(stopped.time_spent, 0.0);
    }

    #[test]
    fn elapsed_keeps_millisecond_resolution() {
        let since = at(0);
        assert!(approx(elapsed_seconds(since, since + Duration::milliseconds(1_250)), 1.25));
    }

    #[test]
    fn format_hms_pads_fields() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(305.0), "00:05:05");
        assert_eq!(format_hms(1245.9), "00:20:45");
        assert_eq!(format_hms(3_723.0), "01:02:03");
        assert_eq!(format_hms(-4.0), "00:00:00");
        assert_eq!(format_hms(f64::NAN), "00:00:00");
    }

    #[test]
    fn format_mmss_pads_fields() {
        assert_eq!(format_mmss(25 * 60), "25:00");
        assert_eq!(format_mmss(61), "01:01");
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(100 * 60), "100:00");
    }
}
