use std::sync::Arc;

use async_trait::async_trait;
use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_db::Database;

use crate::{ServiceError, TaskService};

/// Database-backed implementation scoped to a single user.
///
/// Inputs are validated and normalized here so every caller of the database
/// sees trimmed titles and clean hashtag lists.
#[derive(Clone)]
pub struct LocalService {
    db: Arc<dyn Database>,
    user_id: String,
}

impl LocalService {
    pub fn new(db: Arc<dyn Database>, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl TaskService for LocalService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.db.list_tasks(&self.user_id).await?)
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        Ok(self.db.get_task(&self.user_id, id).await?)
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        input.validate()?;
        let input = input.clone().normalized();
        let task = self.db.create_task(&self.user_id, &input).await?;
        tracing::debug!(user_id = %self.user_id, task_id = %task.id, "task created");
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, ServiceError> {
        update.validate()?;
        let update = update.clone().normalized();
        if update.is_empty() {
            return self.get_task(id).await;
        }
        Ok(self.db.update_task(&self.user_id, id, &update).await?)
    }

    async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        self.db.delete_task(&self.user_id, id).await?;
        tracing::debug!(user_id = %self.user_id, task_id = %id, "task deleted");
        Ok(())
    }
}
