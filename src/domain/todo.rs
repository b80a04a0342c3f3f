use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Minimum number of characters a task must have once trimmed.
pub const TASK_MIN_LEN: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creation payload. A missing `task` deserializes as empty so it is
/// rejected by validation rather than by the JSON decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub task: String,
}

/// Replacement values accepted by `Storage::update`.
///
/// `id` and `created_at` are not part of it: the store always keeps the
/// existing ones. `completed: None` leaves both `completed` and
/// `completed_at` untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub task: String,
    pub completed: Option<bool>,
}

/// Checks the task business rule and returns the trimmed task.
pub fn validate_task(task: &str) -> Result<String, StoreError> {
    let trimmed = task.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("task cannot be empty".into()));
    }
    if trimmed.chars().count() < TASK_MIN_LEN {
        return Err(StoreError::Validation(format!("task must be at least {TASK_MIN_LEN} characters long")));
    }
    Ok(trimmed.to_string())
}

impl Todo {
    /// A freshly created, not yet completed todo.
    pub fn new(id: TodoId, task: String, created_at: DateTime<Utc>) -> Self {
        Self { id, task, completed: false, created_at, completed_at: None }
    }

    /// Builds the record that replaces `self` after an update at `now`.
    ///
    /// `completed_at` is stamped on a false -> true transition, cleared on a
    /// true -> false transition and carried over otherwise.
    pub fn apply(&self, update: TodoUpdate, now: DateTime<Utc>) -> Todo {
        let (completed, completed_at) = match (update.completed, self.completed) {
            (None, _) => (self.completed, self.completed_at),
            (Some(true), false) => (true, Some(now)),
            (Some(false), true) => (false, None),
            (Some(same), _) => (same, self.completed_at),
        };
        Todo {
            id: self.id,
            task: update.task,
            completed,
            created_at: self.created_at,
            completed_at,
        }
    }
}
