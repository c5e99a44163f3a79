use daybook_core::task::{CreateTask, Task, UpdateTask};

use crate::{ServiceError, TaskService};

/// Client-side cache of the current user's tasks.
///
/// Every mutation goes to the backend first; the cached collection only
/// changes once the backend has confirmed. A failed call leaves it exactly
/// as it was.
pub struct TaskStore<S> {
    service: S,
    tasks: Vec<Task>,
    loaded: bool,
}

impl<S: TaskService> TaskStore<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            tasks: Vec::new(),
            loaded: false,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// False until the first successful load.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub async fn load(&mut self) -> Result<(), ServiceError> {
        self.tasks = self.service.list_tasks().await?;
        self.loaded = true;
        tracing::debug!(count = self.tasks.len(), "tasks loaded");
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<(), ServiceError> {
        self.load().await
    }

    /// Validate locally, create remotely, then append the stored task.
    pub async fn create(&mut self, input: CreateTask) -> Result<&Task, ServiceError> {
        input.validate()?;
        let input = input.normalized();
        let task = self.service.create_task(&input).await?;
        self.tasks.push(task);
        let last = self.tasks.len() - 1;
        Ok(&self.tasks[last])
    }

    pub async fn update(&mut self, id: &str, update: UpdateTask) -> Result<&Task, ServiceError> {
        update.validate()?;
        let update = update.normalized();
        let task = self.service.update_task(id, &update).await?;
        let idx = match self.tasks.iter().position(|t| t.id == task.id) {
            Some(idx) => {
                self.tasks[idx] = task;
                idx
            }
            None => {
                self.tasks.push(task);
                self.tasks.len() - 1
            }
        };
        Ok(&self.tasks[idx])
    }

    /// Flip the completion flag of a cached task.
    pub async fn toggle_completed(&mut self, id: &str) -> Result<&Task, ServiceError> {
        let completed = self
            .get(id)
            .map(|t| t.completed)
            .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))?;
        self.update(id, UpdateTask::completed(!completed)).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ServiceError> {
        self.service.delete_task(id).await?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }
}
