//! Behaviour every `Storage` backend must share, run against each of them.

use std::collections::BTreeSet;

use todos_api::domain::error::StoreError;
use todos_api::domain::storage::Storage;
use todos_api::domain::todo::{NewTodo, TodoId, TodoUpdate};
use todos_api::infrastructure::{MemoryStore, SqliteStore};

fn new_todo(task: &str) -> NewTodo { NewTodo { task: task.into() } }

fn update(task: &str, completed: Option<bool>) -> TodoUpdate { TodoUpdate { task: task.into(), completed } }

async fn sqlite_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.init().await.unwrap();
    store
}

async fn create_assigns_increasing_ids<S: Storage>(store: S) {
    let mut previous = store.get_max_id().await.unwrap();
    for task in ["Learn Linux", "Learn Rust", "Learn SQL!"] {
        let todo = store.create(new_todo(task)).await.unwrap();
        assert!(todo.id > previous);
        assert!(!todo.completed);
        assert_eq!(todo.completed_at, None);
        assert_eq!(todo.task, task);
        previous = todo.id;
    }
}

async fn create_rejects_short_tasks<S: Storage>(store: S) {
    store.create(new_todo("Learn Linux")).await.unwrap();
    for task in ["", "     ", "12345", " 1234 "] {
        let err = store.create(new_todo(task)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "{task:?} gave {err}");
    }
    assert_eq!(store.count().await.unwrap(), 1);
}

async fn delete_is_final<S: Storage>(store: S) {
    let todo = store.create(new_todo("Learn Linux")).await.unwrap();
    store.delete(todo.id).await.unwrap();
    assert!(!store.exist(todo.id).await);
    assert!(matches!(store.delete(todo.id).await, Err(StoreError::NotFound(id)) if id == todo.id));
    assert!(matches!(store.get(todo.id).await, Err(StoreError::NotFound(_))));
}

async fn ids_survive_deletion<S: Storage>(store: S) {
    let a = store.create(new_todo("first task")).await.unwrap();
    let b = store.create(new_todo("second task")).await.unwrap();
    store.delete(b.id).await.unwrap();
    assert_eq!(store.get_max_id().await.unwrap(), a.id);
    let c = store.create(new_todo("third task")).await.unwrap();
    assert!(c.id > b.id);
}

async fn completion_transitions<S: Storage>(store: S) {
    let todo = store.create(new_todo("Learn Linux")).await.unwrap();

    let done = store.update(todo.id, update("Learn Linux", Some(true))).await.unwrap();
    assert!(done.completed);
    assert!(done.completed_at.is_some());
    assert_eq!(done.created_at, todo.created_at);
    assert_eq!(done.id, todo.id);

    let kept = store.update(todo.id, update("Learn Linux again", None)).await.unwrap();
    assert!(kept.completed);
    assert_eq!(kept.completed_at, done.completed_at);
    assert_eq!(kept.task, "Learn Linux again");

    let again = store.update(todo.id, update("Learn Linux again", Some(true))).await.unwrap();
    assert_eq!(again.completed_at, done.completed_at);

    let reopened = store.update(todo.id, update("Learn Linux", Some(false))).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(store.get(todo.id).await.unwrap(), reopened);
}

async fn update_failures_leave_record_untouched<S: Storage>(store: S) {
    let todo = store.create(new_todo("Learn Linux")).await.unwrap();
    let err = store.update(todo.id, update("tiny", Some(true))).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.get(todo.id).await.unwrap(), todo);

    let missing = TodoId(todo.id.0 + 1000);
    let err = store.update(missing, update("Learn Linux", Some(true))).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));

    let err = store.update(missing, update("tiny", None)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

async fn list_is_sorted_and_paged<S: Storage>(store: S) {
    assert!(store.list(0, 100).await.unwrap().is_empty());

    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(store.create(new_todo(&format!("todo number {i}"))).await.unwrap().id);
    }
    store.delete(ids[1]).await.unwrap();
    store.delete(ids[4]).await.unwrap();

    let all: Vec<_> = store.list(0, 100).await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(all, vec![ids[0], ids[2], ids[3], ids[5]]);
    assert_eq!(store.count().await.unwrap(), 4);

    let page: Vec<_> = store.list(1, 2).await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(page, vec![ids[2], ids[3]]);
    assert!(store.list(10, 2).await.unwrap().is_empty());
    assert!(store.list(0, 0).await.unwrap().is_empty());
}

async fn concurrent_creates_do_not_collide<S: Storage + Clone>(store: S) {
    const K: usize = 32;
    let handles: Vec<_> = (0..K)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.create(new_todo(&format!("concurrent {i}"))).await })
        })
        .collect();
    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id.0);
    }
    assert_eq!(ids.len(), K);
    let first = *ids.first().unwrap();
    assert_eq!(ids, (first..first + K as i64).collect::<BTreeSet<_>>());
}

macro_rules! conformance {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use super::*;
            $(
                #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
                async fn $name() { super::$name(MemoryStore::new()).await }
            )*
        }

        mod sqlite {
            use super::*;
            $(
                #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
                async fn $name() { super::$name(sqlite_store().await).await }
            )*
        }
    };
}

conformance!(
    create_assigns_increasing_ids,
    create_rejects_short_tasks,
    delete_is_final,
    ids_survive_deletion,
    completion_transitions,
    update_failures_leave_record_untouched,
    list_is_sorted_and_paged,
    concurrent_creates_do_not_collide,
);

#[tokio::test]
async fn seeded_memory_scenario() {
    let store = MemoryStore::seeded();
    assert_eq!(store.get_max_id().await.unwrap(), TodoId(2));
    let first = store.get(TodoId(1)).await.unwrap();
    assert!(first.completed && first.completed_at.is_some());

    let created = store.create(new_todo("Learn Linux")).await.unwrap();
    assert_eq!(created.id, TodoId(3));
    let done = store.update(TodoId(3), update("Learn Linux", Some(true))).await.unwrap();
    assert!(done.completed_at.is_some());
    store.delete(TodoId(3)).await.unwrap();
    assert!(matches!(store.get(TodoId(3)).await, Err(StoreError::NotFound(TodoId(3)))));
}
