use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use daybook_core::hashtag::HashtagUsage;
use daybook_core::stats::TaskStats;
use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_service::TaskService;

use super::{to_error, ApiError, AppState};
use crate::auth::CurrentUser;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/stats", get(stats))
        .route("/api/tasks/hashtags", get(hashtags))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Task>>, ApiError> {
    state
        .service_for(&current)
        .list_tasks()
        .await
        .map(Json)
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    state
        .service_for(&current)
        .get_task(&id)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    state
        .service_for(&current)
        .create_task(&input)
        .await
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Task>, ApiError> {
    state
        .service_for(&current)
        .update_task(&id, &input)
        .await
        .map(Json)
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .service_for(&current)
        .delete_task(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<TaskStats>, ApiError> {
    state
        .service_for(&current)
        .stats()
        .await
        .map(Json)
        .map_err(to_error)
}

async fn hashtags(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<HashtagUsage>>, ApiError> {
    state
        .service_for(&current)
        .recent_hashtags()
        .await
        .map(Json)
        .map_err(to_error)
}
