use daybook_core::hashtag::{recent_hashtags, HashtagUsage, RECENT_HASHTAG_LIMIT};
use daybook_core::stats::TaskStats;
use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_core::user::{Credentials, User};
use tokio::runtime::Runtime;

use crate::{HttpService, ServiceError, TaskStore};

/// Blocking wrapper around a `TaskStore` talking to the HTTP server.
///
/// Owns an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingTaskStore {
    inner: TaskStore<HttpService>,
    rt: Runtime,
}

impl BlockingTaskStore {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::from_service(HttpService::new(base_url))
    }

    pub fn with_token(base_url: &str, token: String) -> Result<Self, ServiceError> {
        Self::from_service(HttpService::with_token(base_url, token))
    }

    fn from_service(service: HttpService) -> Result<Self, ServiceError> {
        let rt = Runtime::new()
            .map_err(|e| ServiceError::Internal(format!("failed to create tokio runtime: {e}")))?;
        Ok(Self {
            inner: TaskStore::new(service),
            rt,
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.service().base_url()
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.service().health_check())
    }

    // -- Session --

    pub fn login(&mut self, credentials: &Credentials) -> Result<User, ServiceError> {
        self.rt
            .block_on(self.inner.service_mut().login(credentials))
    }

    pub fn register(&mut self, credentials: &Credentials) -> Result<User, ServiceError> {
        self.rt
            .block_on(self.inner.service_mut().register(credentials))
    }

    pub fn logout(&mut self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.service_mut().logout())
    }

    pub fn me(&self) -> Result<User, ServiceError> {
        self.rt.block_on(self.inner.service().me())
    }

    pub fn has_token(&self) -> bool {
        self.inner.service().token().is_some()
    }

    // -- Store delegates --

    pub fn list(&self) -> &[Task] {
        self.inner.list()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.inner.get(id)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    pub fn load(&mut self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.load())
    }

    pub fn refresh(&mut self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.refresh())
    }

    pub fn create(&mut self, input: CreateTask) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.create(input))
            .map(Task::clone)
    }

    pub fn update(&mut self, id: &str, update: UpdateTask) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.update(id, update))
            .map(Task::clone)
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.toggle_completed(id))
            .map(Task::clone)
    }

    pub fn delete(&mut self, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.delete(id))
    }

    // -- Derived views over the cached collection --

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(self.inner.list(), daybook_core::local_now())
    }

    pub fn recent_hashtags(&self) -> Vec<HashtagUsage> {
        recent_hashtags(self.inner.list(), RECENT_HASHTAG_LIMIT)
    }
}
