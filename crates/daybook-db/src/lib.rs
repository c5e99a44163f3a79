pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_core::user::{Session, User};

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Database file. Falls back to `<data_dir>/daybook.db`.
    pub sqlite_path: Option<String>,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self {
            sqlite_path: std::env::var("DAYBOOK_DB").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Storage backend. Every task method is scoped to the owning user; a task
/// belonging to someone else is reported as `NotFound`.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Users --
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DbError>;
    async fn get_user(&self, id: &str) -> Result<User, DbError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
    async fn list_users(&self) -> Result<Vec<User>, DbError>;

    // -- Sessions --
    async fn create_session(&self, user_id: &str, token_hash: &str) -> Result<Session, DbError>;
    async fn find_session_by_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError>;
    async fn touch_session(&self, id: &str) -> Result<(), DbError>;
    async fn delete_session_by_hash(&self, token_hash: &str) -> Result<(), DbError>;
    async fn delete_sessions_for_user(&self, user_id: &str) -> Result<usize, DbError>;

    // -- Tasks --
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, DbError>;
    async fn get_task(&self, user_id: &str, id: &str) -> Result<Task, DbError>;
    async fn create_task(&self, user_id: &str, input: &CreateTask) -> Result<Task, DbError>;
    async fn update_task(
        &self,
        user_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError>;
    async fn delete_task(&self, user_id: &str, id: &str) -> Result<(), DbError>;
}

/// `$XDG_DATA_HOME/daybook`, or `~/.local/share/daybook`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("daybook")
}
