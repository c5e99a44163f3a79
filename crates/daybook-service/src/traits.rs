use async_trait::async_trait;
use daybook_core::hashtag::{recent_hashtags, HashtagUsage, RECENT_HASHTAG_LIMIT};
use daybook_core::stats::TaskStats;
use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_core::DaybookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("cannot reach server: {0}")]
    Connectivity(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DaybookError> for ServiceError {
    fn from(e: DaybookError) -> Self {
        match e {
            DaybookError::NotFound(msg) => ServiceError::NotFound(msg),
            DaybookError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
        }
    }
}

impl From<daybook_db::DbError> for ServiceError {
    fn from(e: daybook_db::DbError) -> Self {
        match e {
            daybook_db::DbError::NotFound(msg) => ServiceError::NotFound(msg),
            daybook_db::DbError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// Task operations for one authenticated user.
///
/// `LocalService` talks to the database directly and backs the HTTP server.
/// `HttpService` talks to a running daybook-server and backs the TUI.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: &str) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, ServiceError>;
    async fn delete_task(&self, id: &str) -> Result<(), ServiceError>;

    /// Aggregates at local wall-clock time.
    async fn stats(&self) -> Result<TaskStats, ServiceError> {
        let tasks = self.list_tasks().await?;
        Ok(TaskStats::compute(&tasks, daybook_core::local_now()))
    }

    async fn recent_hashtags(&self) -> Result<Vec<HashtagUsage>, ServiceError> {
        let tasks = self.list_tasks().await?;
        Ok(recent_hashtags(&tasks, RECENT_HASHTAG_LIMIT))
    }
}
