pub mod memory_store;
pub mod sqlite_store;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::config::Config;
use crate::domain::{
    error::StoreResult,
    storage::Storage,
    todo::{NewTodo, Todo, TodoId, TodoUpdate},
};
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDriver {
    Memory,
    Sqlite,
}

impl FromStr for StorageDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unsupported storage driver: {other}")),
        }
    }
}

impl fmt::Display for StorageDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Memory => "memory", Self::Sqlite => "sqlite" })
    }
}

/// Backend picked at startup from `DB_DRIVER`.
#[derive(Clone, Debug)]
pub enum TodoStore {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl TodoStore {
    fn backend(&self) -> &dyn Storage {
        match self {
            Self::Memory(store) => store,
            Self::Sqlite(store) => store,
        }
    }
}

/// Opens the store selected by `config`, creating the schema for sqlite.
pub async fn open_store(config: &Config) -> StoreResult<TodoStore> {
    let store = match config.driver {
        StorageDriver::Memory if config.memory_seed => TodoStore::Memory(MemoryStore::seeded()),
        StorageDriver::Memory => TodoStore::Memory(MemoryStore::new()),
        StorageDriver::Sqlite => {
            let store = SqliteStore::connect(&config.database_url).await?;
            store.init().await?;
            TodoStore::Sqlite(store)
        }
    };
    tracing::info!(driver = %config.driver, "storage ready");
    Ok(store)
}

#[async_trait]
impl Storage for TodoStore {
    async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Todo>> { self.backend().list(offset, limit).await }
    async fn get(&self, id: TodoId) -> StoreResult<Todo> { self.backend().get(id).await }
    async fn get_max_id(&self) -> StoreResult<TodoId> { self.backend().get_max_id().await }
    async fn exist(&self, id: TodoId) -> bool { self.backend().exist(id).await }
    async fn count(&self) -> StoreResult<usize> { self.backend().count().await }
    async fn create(&self, input: NewTodo) -> StoreResult<Todo> { self.backend().create(input).await }
    async fn update(&self, id: TodoId, input: TodoUpdate) -> StoreResult<Todo> { self.backend().update(id, input).await }
    async fn delete(&self, id: TodoId) -> StoreResult<()> { self.backend().delete(id).await }
    async fn close(&self) { self.backend().close().await }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names_parse_case_insensitively() {
        assert_eq!("memory".parse::<StorageDriver>(), Ok(StorageDriver::Memory));
        assert_eq!(" SQLite ".parse::<StorageDriver>(), Ok(StorageDriver::Sqlite));
        assert!("postgres".parse::<StorageDriver>().is_err());
    }

    #[tokio::test]
    async fn open_store_honours_seed_flag() {
        let seeded = open_store(&Config::default()).await.unwrap();
        assert_eq!(seeded.count().await.unwrap(), 2);

        let empty = open_store(&Config { memory_seed: false, ..Config::default() }).await.unwrap();
        assert_eq!(empty.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn open_store_creates_sqlite_schema() {
        let config = Config {
            driver: StorageDriver::Sqlite,
            database_url: "sqlite::memory:".into(),
            ..Config::default()
        };
        let store = open_store(&config).await.unwrap();
        assert!(matches!(store, TodoStore::Sqlite(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
