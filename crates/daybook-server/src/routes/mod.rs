pub mod auth;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::{http::StatusCode, middleware, Json, Router};
use daybook_db::Database;
use daybook_service::{LocalService, ServiceError};
use serde_json::{json, Value};

use crate::auth::{auth_middleware, CurrentUser};

pub struct InnerAppState {
    pub db: Arc<dyn Database>,
}

pub type AppState = Arc<InnerAppState>;

impl InnerAppState {
    /// Task service scoped to the authenticated caller.
    pub fn service_for(&self, current: &CurrentUser) -> LocalService {
        LocalService::new(self.db.clone(), current.user.id.clone())
    }
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(health::routes())
        .merge(auth::public_routes());

    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(tasks::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public.merge(protected).with_state(state)
}

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Connectivity(_) | ServiceError::Internal(_) => {
            tracing::error!(error = %e, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}
