// Integration tests that exercise every Database trait method against the
// in-memory SQLite backend. The assertions live in `common/mod.rs`.

mod common;

use std::sync::Arc;

use daybook_db::Database;

async fn make_db() -> Arc<dyn Database> {
    Arc::new(daybook_db::SqliteDatabase::open_in_memory().unwrap())
}

#[tokio::test]
async fn user_accounts() {
    let db = make_db().await;
    common::test_user_accounts(&*db).await;
}

#[tokio::test]
async fn sessions() {
    let db = make_db().await;
    common::test_sessions(&*db).await;
}

#[tokio::test]
async fn task_crud() {
    let db = make_db().await;
    common::test_task_crud(&*db).await;
}

#[tokio::test]
async fn task_ownership() {
    let db = make_db().await;
    common::test_task_ownership(&*db).await;
}

#[tokio::test]
async fn toggle_completed() {
    let db = make_db().await;
    common::test_toggle_completed(&*db).await;
}
