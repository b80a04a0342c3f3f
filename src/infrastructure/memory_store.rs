use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    error::{StoreError, StoreResult},
    storage::Storage,
    todo::{validate_task, NewTodo, Todo, TodoId, TodoUpdate},
};

#[derive(Debug, Default)]
struct Inner {
    todos: BTreeMap<TodoId, Todo>,
    // Last id handed out. Survives deletions so ids are never reused.
    last_id: i64,
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Store pre-filled with two demo todos, the sequence starting after them.
    pub fn seeded() -> Self {
        let created_at = DateTime::from_timestamp_millis(1_582_272_023_877).unwrap_or_default();
        let completed_at = DateTime::from_timestamp_millis(1_633_618_943_877).unwrap_or_default();
        Self::with_todos(vec![
            Todo { id: TodoId(1), task: "Learn GO".into(), completed: true, created_at, completed_at: Some(completed_at) },
            Todo { id: TodoId(2), task: "Learn OpenAPI".into(), completed: false, created_at, completed_at: None },
        ])
    }

    /// Store holding `todos` as-is; the next created id follows the highest one.
    pub fn with_todos(todos: impl IntoIterator<Item = Todo>) -> Self {
        let todos: BTreeMap<TodoId, Todo> = todos.into_iter().map(|t| (t.id, t)).collect();
        let last_id = todos.keys().next_back().map_or(0, |id| id.0);
        Self { inner: Arc::new(RwLock::new(Inner { todos, last_id })) }
    }

    // A panic while holding the lock cannot leave a half-written record, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>> {
        let inner = self.read();
        Ok(inner.todos.values().skip(offset).take(limit).cloned().collect())
    }

    async fn get(&self, id: TodoId) -> StoreResult<Todo> {
        self.read().todos.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn get_max_id(&self) -> StoreResult<TodoId> {
        Ok(self.read().todos.keys().next_back().copied().unwrap_or_default())
    }

    async fn exist(&self, id: TodoId) -> bool {
        self.read().todos.contains_key(&id)
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.read().todos.len())
    }

    async fn create(&self, input: NewTodo) -> StoreResult<Todo> {
        let task = validate_task(&input.task)?;
        let mut inner = self.write();
        let id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Backend("todo id sequence exhausted".into()))?;
        inner.last_id = id;
        let todo = Todo::new(TodoId(id), task, Utc::now());
        inner.todos.insert(todo.id, todo.clone());
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, input: TodoUpdate) -> StoreResult<Todo> {
        let mut inner = self.write();
        let existing = inner.todos.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let task = validate_task(&input.task)?;
        let updated = existing.apply(TodoUpdate { task, ..input }, Utc::now());
        *existing = updated.clone();
        tracing::debug!(%id, completed = updated.completed, "todo updated");
        Ok(updated)
    }

    async fn delete(&self, id: TodoId) -> StoreResult<()> {
        match self.write().todos.remove(&id) {
            Some(_) => {
                tracing::debug!(%id, "todo deleted");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn close(&self) {
        self.write().todos.clear();
    }
}
