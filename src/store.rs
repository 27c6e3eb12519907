//! In-memory task store
//!
//! Callers depend on [`TaskRepository`]; [`MemoryStore`] is the only backend.
//! Nothing survives a process restart.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::models::{ElapsedTime, Task};

/// Source of wall-clock time for the store
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Operations every task backend provides
pub trait TaskRepository: Send + Sync {
    /// All tasks, in no particular order
    fn list(&self) -> Vec<Task>;

    fn get(&self, id: &str) -> StoreResult<Task>;

    /// Create a task with a fresh id and default timer/completion fields
    fn create(&self, title: &str, description: &str) -> StoreResult<Task>;

    /// Replace title and description only
    fn update(&self, id: &str, title: &str, description: &str) -> StoreResult<Task>;

    /// Remove a task, reporting whether it existed
    fn delete(&self, id: &str) -> bool;

    fn toggle_completion(&self, id: &str) -> StoreResult<Task>;

    fn toggle_timer(&self, id: &str) -> StoreResult<Task>;

    /// Tracked time including the open interval, as of now
    fn elapsed(&self, id: &str) -> StoreResult<ElapsedTime>;
}

/// Thread-safe in-memory task store
///
/// The map lock is only taken for writing by create and delete. Each task
/// sits behind its own mutex, held for the whole read-compute-commit of a
/// mutation, so concurrent toggles of one task are serialized while
/// different tasks proceed in parallel.
pub struct MemoryStore<C = SystemClock> {
    tasks: RwLock<HashMap<String, Mutex<Task>>>,
    last_id: AtomicI64,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            last_id: AtomicI64::new(0),
            clock,
        }
    }

    /// Load the sample tasks shown on a fresh install
    pub fn seed_demo(&self) {
        let demo = [
            (
                "1",
                "Set up project structure",
                "Initialize the project and install dependencies.",
                true,
                305.0,
            ),
            (
                "2",
                "Create UI components",
                "Build reusable components for task items and forms.",
                true,
                1245.0,
            ),
            (
                "3",
                "Implement state management",
                "Keep task state in one place.",
                false,
                623.0,
            ),
            (
                "4",
                "Add dummy authentication",
                "Create a login page that redirects on success.",
                false,
                0.0,
            ),
        ];

        let mut map = self.write_map();
        for (id, title, description, completed, time_spent) in demo {
            let mut task = Task::new(id, title, description);
            task.completed = completed;
            task.time_spent = time_spent;
            map.insert(id.to_string(), Mutex::new(task));
        }
        tracing::debug!(count = map.len(), "Seeded demo tasks");
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    /// Millisecond timestamp id, bumped past the previous one on collision
    fn next_id(&self) -> String {
        let now = self.clock.now().timestamp_millis();
        let prev = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(prev + 1).to_string()
    }

    fn read_map(&self) -> RwLockReadGuard<'_, HashMap<String, Mutex<Task>>> {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> RwLockWriteGuard<'_, HashMap<String, Mutex<Task>>> {
        self.tasks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `transition` on the current task and commit the result.
    ///
    /// The next state is computed in full before it replaces the stored one,
    /// so an error leaves the task untouched.
    fn mutate<F>(&self, id: &str, transition: F) -> StoreResult<Task>
    where
        F: FnOnce(&Task, DateTime<Utc>) -> StoreResult<Task>,
    {
        let map = self.read_map();
        let slot = map.get(id).ok_or_else(|| StoreError::not_found(id))?;
        let mut task = lock(slot);

        let next = transition(&task, self.clock.now())?;
        *task = next.clone();
        Ok(next)
    }
}

fn lock(slot: &Mutex<Task>) -> MutexGuard<'_, Task> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_title(title: &str) -> StoreResult<()> {
    if title.trim().is_empty() {
        return Err(StoreError::invalid("title must not be empty"));
    }
    Ok(())
}

impl<C: Clock> TaskRepository for MemoryStore<C> {
    fn list(&self) -> Vec<Task> {
        self.read_map().values().map(|slot| lock(slot).clone()).collect()
    }

    fn get(&self, id: &str) -> StoreResult<Task> {
        self.read_map()
            .get(id)
            .map(|slot| lock(slot).clone())
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn create(&self, title: &str, description: &str) -> StoreResult<Task> {
        require_title(title)?;

        let mut map = self.write_map();
        let mut id = self.next_id();
        while map.contains_key(&id) {
            id = self.next_id();
        }

        let task = Task::new(id.clone(), title, description);
        map.insert(id, Mutex::new(task.clone()));
        Ok(task)
    }

    fn update(&self, id: &str, title: &str, description: &str) -> StoreResult<Task> {
        require_title(title)?;

        self.mutate(id, |task, _| {
            let mut next = task.clone();
            next.title = title.to_string();
            next.description = description.to_string();
            Ok(next)
        })
    }

    fn delete(&self, id: &str) -> bool {
        self.write_map().remove(id).is_some()
    }

    fn toggle_completion(&self, id: &str) -> StoreResult<Task> {
        self.mutate(id, |task, now| {
            let next = task.with_completion_toggled(now);
            if task.is_running() {
                tracing::debug!(
                    task_id = %id,
                    time_spent = next.time_spent,
                    "Closed running interval on completion"
                );
            }
            Ok(next)
        })
    }

    fn toggle_timer(&self, id: &str) -> StoreResult<Task> {
        self.mutate(id, |task, now| {
            let next = task.with_timer_toggled(now)?;
            tracing::debug!(
                task_id = %id,
                running = next.is_running(),
                time_spent = next.time_spent,
                "Timer toggled"
            );
            Ok(next)
        })
    }

    fn elapsed(&self, id: &str) -> StoreResult<ElapsedTime> {
        let map = self.read_map();
        let slot = map.get(id).ok_or_else(|| StoreError::not_found(id))?;
        let task = lock(slot);

        Ok(ElapsedTime {
            id: task.id.clone(),
            elapsed: task.elapsed_at(self.clock.now()),
            timer_running: task.is_running(),
        })
    }
}

/// Clock that only moves when told to
#[cfg(test)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    pub fn at_millis(millis: i64) -> Arc<Self> {
        use chrono::TimeZone;
        Arc::new(Self(Mutex::new(Utc.timestamp_millis_opt(millis).unwrap())))
    }

    pub fn advance_millis(&self, millis: i64) {
        let mut now = self.0.lock().unwrap();
        *now += chrono::Duration::milliseconds(millis);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
