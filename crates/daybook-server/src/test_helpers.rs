use std::sync::Arc;

use axum::Router;
use daybook_db::{Database, SqliteDatabase};
use tokio::net::TcpListener;

use crate::routes::{build_router, InnerAppState};

fn memory_db() -> Arc<dyn Database> {
    Arc::new(SqliteDatabase::open_in_memory().unwrap())
}

/// Build a test router over in-memory SQLite with no users.
pub fn test_router() -> (Router, Arc<dyn Database>) {
    let db = memory_db();
    let router = build_router(Arc::new(InnerAppState { db: db.clone() }));
    (router, db)
}

/// Build a test router with one registered user, returning (router, token).
pub async fn test_router_with_user() -> (Router, String) {
    let (router, db) = test_router();
    let user = crate::auth::create_user(&*db, "tester", "password123")
        .await
        .unwrap();
    let token = crate::auth::issue_token(&*db, &user.id).await.unwrap();
    (router, token)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub db: Arc<dyn Database>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let db = memory_db();
    let app = crate::app(db.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        db,
        _handle: handle,
    }
}
