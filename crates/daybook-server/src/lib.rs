pub mod auth;
mod routes;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use daybook_db::Database;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::{build_router, AppState, InnerAppState};

/// Router with request tracing and permissive CORS.
pub fn app(db: Arc<dyn Database>) -> Router {
    build_router(Arc::new(InnerAppState { db }))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn serve(listener: TcpListener, db: Arc<dyn Database>) -> Result<()> {
    axum::serve(listener, app(db)).await?;
    Ok(())
}
