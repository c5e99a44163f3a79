use async_trait::async_trait;
use daybook_core::hashtag::HashtagUsage;
use daybook_core::stats::TaskStats;
use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_core::user::{AuthResponse, Credentials, User};
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::{ServiceError, TaskService};

/// Async HTTP client implementation of TaskService.
/// Connects to a running daybook-server.
#[derive(Clone)]
pub struct HttpService {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            token: None,
        }
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        let mut svc = Self::new(base_url);
        svc.token = Some(token);
        svc
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        self.with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Connectivity(e.to_string()))
    }

    /// Check if the server is reachable.
    /// Health endpoint is NOT authenticated.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Connectivity(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Connectivity(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    /// Log in and keep the issued token for subsequent requests.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<User, ServiceError> {
        let auth: AuthResponse = self.post_json("/api/auth/login", credentials).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Create an account and keep the issued token.
    pub async fn register(&mut self, credentials: &Credentials) -> Result<User, ServiceError> {
        let auth: AuthResponse = self.post_json("/api/auth/register", credentials).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Revoke the current token on the server and forget it locally.
    pub async fn logout(&mut self) -> Result<(), ServiceError> {
        let builder = self.client.post(format!("{}/api/auth/logout", self.base_url));
        let resp = self.send(builder).await?;
        self.token = None;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }

    pub async fn me(&self) -> Result<User, ServiceError> {
        self.get_json("/api/auth/me").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self.send(builder).await?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self.send(builder).await?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self.send(builder).await?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self.send(builder).await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);
    error_for_status(status, msg)
}

fn error_for_status(status: StatusCode, msg: String) -> ServiceError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::InvalidInput(msg)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(msg),
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::CONFLICT => ServiceError::Conflict(msg),
        _ => ServiceError::Internal(format!("{status}: {msg}")),
    }
}

#[async_trait]
impl TaskService for HttpService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.get_json("/api/tasks").await
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.get_json(&format!("/api/tasks/{id}")).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.post_json("/api/tasks", input).await
    }

    async fn update_task(&self, id: &str, update: &UpdateTask) -> Result<Task, ServiceError> {
        self.put_json(&format!("/api/tasks/{id}"), update).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/tasks/{id}")).await
    }

    async fn stats(&self) -> Result<TaskStats, ServiceError> {
        self.get_json("/api/tasks/stats").await
    }

    async fn recent_hashtags(&self) -> Result<Vec<HashtagUsage>, ServiceError> {
        self.get_json("/api/tasks/hashtags").await
    }
}
