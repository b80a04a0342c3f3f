use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::StoreError;
use crate::domain::storage::Storage;
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoUpdate};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("path id {path} and body id {body} cannot differ")]
    IdMismatch { path: TodoId, body: TodoId },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Full replacement requested through the API. `id`, when given, must match
/// the path id; `completed` left out keeps the current completion state.
#[derive(Debug, Clone, Default)]
pub struct ReplaceTodo {
    pub id: Option<TodoId>,
    pub task: String,
    pub completed: Option<bool>,
}

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: NewTodo) -> ServiceResult<Todo>;
    async fn get(&self, id: TodoId) -> ServiceResult<Todo>;
    async fn list(&self, offset: usize, limit: usize) -> ServiceResult<Vec<Todo>>;
    async fn max_id(&self) -> ServiceResult<TodoId>;
    async fn update(&self, id: TodoId, input: ReplaceTodo) -> ServiceResult<Todo>;
    async fn delete(&self, id: TodoId) -> ServiceResult<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<S: Storage> {
    store: S,
}

impl<S: Storage> TodoServiceImpl<S> {
    pub fn new(store: S) -> Self { Self { store } }

    pub fn store(&self) -> &S { &self.store }
}

#[async_trait]
impl<S: Storage> TodoService for TodoServiceImpl<S> {
    async fn create(&self, input: NewTodo) -> ServiceResult<Todo> {
        let todo = self.store.create(input).await?;
        tracing::info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> ServiceResult<Todo> { Ok(self.store.get(id).await?) }

    async fn list(&self, offset: usize, limit: usize) -> ServiceResult<Vec<Todo>> {
        tracing::debug!(offset, limit, "listing todos");
        Ok(self.store.list(offset, limit).await?)
    }

    async fn max_id(&self) -> ServiceResult<TodoId> { Ok(self.store.get_max_id().await?) }

    async fn update(&self, id: TodoId, input: ReplaceTodo) -> ServiceResult<Todo> {
        if !self.store.exist(id).await {
            return Err(StoreError::NotFound(id).into());
        }
        if let Some(body) = input.id.filter(|body| *body != id) {
            return Err(ServiceError::IdMismatch { path: id, body });
        }
        let todo = self.store.update(id, TodoUpdate { task: input.task, completed: input.completed }).await?;
        tracing::info!(%id, completed = todo.completed, "updated todo");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> ServiceResult<()> {
        self.store.delete(id).await?;
        tracing::info!(%id, "deleted todo");
        Ok(())
    }
}
