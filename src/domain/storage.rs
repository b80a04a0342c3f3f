use async_trait::async_trait;

use super::error::StoreResult;
use super::todo::{NewTodo, Todo, TodoId, TodoUpdate};

/// Persistence contract shared by every todo backend.
///
/// Every implementation enforces the same business rules: task validation on
/// create and update, ids allocated from a sequence that never goes back, and
/// `completed_at` derived from completion transitions.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Todos ordered by ascending id, skipping `offset` and capped at `limit`.
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>>;
    async fn get(&self, id: TodoId) -> StoreResult<Todo>;
    /// Highest id currently stored, 0 when empty. Not the next id to allocate.
    async fn get_max_id(&self) -> StoreResult<TodoId>;
    async fn exist(&self, id: TodoId) -> bool;
    async fn count(&self) -> StoreResult<usize>;
    async fn create(&self, input: NewTodo) -> StoreResult<Todo>;
    async fn update(&self, id: TodoId, input: TodoUpdate) -> StoreResult<Todo>;
    async fn delete(&self, id: TodoId) -> StoreResult<()>;
    /// Releases backend resources. Calling it twice is harmless.
    async fn close(&self);
}
