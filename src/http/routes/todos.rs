use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use http::StatusCode;
use serde::Deserialize;

use crate::application::todo_service::{ReplaceTodo, TodoService};
use crate::domain::todo::{NewTodo, Todo, TodoId};
use crate::http::types::ApiError;

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/todos/maxid", get(max_id::<S>))
        .route("/todos/:id", get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize { DEFAULT_LIST_LIMIT }

async fn list_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(format!("GetTodos has invalid parameters [{e}]")))?;
    Ok(Json(state.service.list(params.offset, params.limit).await?))
}

async fn max_id<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<TodoId>, ApiError> {
    Ok(Json(state.service.max_id().await?))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(format!("CreateTodo has invalid format [{e}]")))?;
    let todo = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get(id).await?))
}

// Extra fields such as `created_at` or `completed_at` are ignored.
#[derive(Deserialize)]
struct UpdateBody {
    id: Option<TodoId>,
    #[serde(default)]
    task: String,
    completed: Option<bool>,
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = payload.map_err(|e| ApiError::bad_request(format!("UpdateTodo has invalid format [{e}]")))?;
    let updated = state
        .service
        .update(id, ReplaceTodo { id: body.id, task: body.task, completed: body.completed })
        .await?;
    Ok(Json(updated))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(s: &str) -> Result<TodoId, ApiError> {
    s.parse::<i64>().map(TodoId).map_err(|_| ApiError::bad_request(format!("invalid id: {s}")))
}
