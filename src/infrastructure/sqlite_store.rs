use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::{SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    error::{StoreError, StoreResult},
    storage::Storage,
    todo::{validate_task, NewTodo, Todo, TodoId, TodoUpdate},
};

const TODOS_LIST: &str = "SELECT id, task, completed, created_at, completed_at FROM todos ORDER BY id LIMIT ?1 OFFSET ?2";
const TODOS_GET: &str = "SELECT id, task, completed, created_at, completed_at FROM todos WHERE id = ?1";
const TODOS_EXIST: &str = "SELECT COUNT(*) FROM todos WHERE id = ?1";
const TODOS_COUNT: &str = "SELECT COUNT(*) FROM todos";
const TODOS_MAX_ID: &str = "SELECT COALESCE(MAX(id), 0) FROM todos";
const TODOS_CREATE: &str = "INSERT INTO todos (task, completed, created_at) VALUES (?1, 0, ?2)
     RETURNING id, task, completed, created_at, completed_at";
// Same transition rule as `Todo::apply`, in one statement so reading the
// previous completion state and writing the new one are atomic.
const TODOS_UPDATE: &str = "UPDATE todos SET
        task = ?1,
        completed = COALESCE(?2, completed),
        completed_at = CASE
            WHEN ?2 IS NULL THEN completed_at
            WHEN ?2 = 1 AND completed = 0 THEN ?3
            WHEN ?2 = 0 THEN NULL
            ELSE completed_at
        END
     WHERE id = ?4
     RETURNING id, task, completed, created_at, completed_at";
const TODOS_DELETE: &str = "DELETE FROM todos WHERE id = ?1";

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = if is_memory_url(database_url) {
            // Every connection to `:memory:` opens its own database, so keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            prepare_sqlite_file(database_url)?;
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;
        tracing::info!(url = database_url, "connected to sqlite");
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Creates the `todos` table when missing.
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn ensure_exists(&self, id: TodoId) -> StoreResult<()> {
        let count: i64 = sqlx::query_scalar(TODOS_EXIST)
            .bind(id.0)
            .fetch_one(&*self.pool)
            .await?;
        if count == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStore {
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query(TODOS_LIST)
            .bind(to_i64(limit))
            .bind(to_i64(offset))
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn get(&self, id: TodoId) -> StoreResult<Todo> {
        let row = sqlx::query(TODOS_GET)
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        match row {
            Some(row) => row_to_todo(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn get_max_id(&self) -> StoreResult<TodoId> {
        let max: i64 = sqlx::query_scalar(TODOS_MAX_ID)
            .fetch_one(&*self.pool)
            .await?;
        Ok(TodoId(max))
    }

    async fn exist(&self, id: TodoId) -> bool {
        let found = sqlx::query_scalar::<_, i64>(TODOS_EXIST)
            .bind(id.0)
            .fetch_one(&*self.pool)
            .await;
        match found {
            Ok(count) => count > 0,
            Err(err) => {
                tracing::warn!(%id, error = %err, "existence check failed");
                false
            }
        }
    }

    async fn count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar(TODOS_COUNT)
            .fetch_one(&*self.pool)
            .await?;
        usize::try_from(count).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn create(&self, input: NewTodo) -> StoreResult<Todo> {
        let task = validate_task(&input.task)?;
        let row = sqlx::query(TODOS_CREATE)
            .bind(&task)
            .bind(Utc::now())
            .fetch_one(&*self.pool)
            .await?;
        let todo = row_to_todo(&row)?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, input: TodoUpdate) -> StoreResult<Todo> {
        let task = match validate_task(&input.task) {
            Ok(task) => task,
            Err(err) => {
                // An unknown id wins over an invalid task.
                self.ensure_exists(id).await?;
                return Err(err);
            }
        };
        let row = sqlx::query(TODOS_UPDATE)
            .bind(&task)
            .bind(input.completed)
            .bind(Utc::now())
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        let Some(row) = row else { return Err(StoreError::NotFound(id)) };
        let todo = row_to_todo(&row)?;
        tracing::debug!(%id, completed = todo.completed, "todo updated");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> StoreResult<()> {
        let result = sqlx::query(TODOS_DELETE)
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(%id, "todo deleted");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_todo(row: &SqliteRow) -> StoreResult<Todo> {
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        task: row.try_get("task")?,
        completed: row.try_get("completed")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
    })
}

fn to_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Makes sure the database file and its parent directory exist so sqlite can open it.
fn prepare_sqlite_file(database_url: &str) -> StoreResult<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else { return Ok(()) };
    let path = path.split('?').next().unwrap_or(path);
    // On Windows, absolute paths may look like /C:/path; strip the leading slash
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    let p = Path::new(path);
    let io_err = |e: std::io::Error| StoreError::Backend(format!("cannot prepare {path}: {e}"));
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() { fs::create_dir_all(parent).map_err(io_err)?; }
    }
    if !p.exists() {
        OpenOptions::new().create(true).append(true).open(p).map_err(io_err)?;
    }
    Ok(())
}
