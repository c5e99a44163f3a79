use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use daybook_core::user::{AuthResponse, Credentials, User};
use daybook_service::ServiceError;

use super::{to_error, ApiError, AppState};
use crate::auth::{self, CurrentUser};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    auth::validate_credentials(&creds.username, &creds.password)
        .map_err(|msg| to_error(ServiceError::InvalidInput(msg)))?;

    let user = auth::create_user(&*state.db, &creds.username, &creds.password)
        .await
        .map_err(|e| to_error(e.into()))?;
    let token = auth::issue_token(&*state.db, &user.id)
        .await
        .map_err(|e| to_error(e.into()))?;
    tracing::info!(username = %user.username, "user registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = auth::authenticate(&*state.db, &creds.username, &creds.password)
        .await
        .map_err(|e| to_error(e.into()))?
        .ok_or_else(|| {
            tracing::info!(username = %creds.username.trim(), "failed login");
            to_error(ServiceError::Unauthorized(
                "invalid username or password".into(),
            ))
        })?;
    let token = auth::issue_token(&*state.db, &user.id)
        .await
        .map_err(|e| to_error(e.into()))?;

    Ok(Json(AuthResponse { token, user }))
}

async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .delete_session_by_hash(&current.token_hash)
        .await
        .map_err(|e| to_error(e.into()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.user)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_helpers::test_router;

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_then_login() {
        let (app, _db) = test_router();
        let creds = json!({ "username": "ada", "password": "password123" });

        let resp = app
            .clone()
            .oneshot(post_json("/api/auth/register", creds.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert!(body["token"].as_str().unwrap().starts_with("dbk_"));
        assert_eq!(body["user"]["username"], "ada");
        assert!(body["user"].get("password_hash").is_none());

        let resp = app
            .oneshot(post_json("/api/auth/login", creds))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn register_validates_and_rejects_duplicates() {
        let (app, _db) = test_router();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "username": "ada", "password": "short" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let creds = json!({ "username": "ada", "password": "password123" });
        let resp = app
            .clone()
            .oneshot(post_json("/api/auth/register", creds.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app
            .oneshot(post_json("/api/auth/register", creds))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn login_with_bad_password_is_unauthorized() {
        let (app, db) = test_router();
        crate::auth::create_user(&*db, "ada", "password123")
            .await
            .unwrap();

        let resp = app
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "username": "ada", "password": "password999" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let (app, db) = test_router();
        let user = crate::auth::create_user(&*db, "ada", "password123")
            .await
            .unwrap();
        let token = crate::auth::issue_token(&*db, &user.id).await.unwrap();

        let authed = |method: &str, uri: &str| {
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };

        let resp = app.clone().oneshot(authed("GET", "/api/auth/me")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["username"], "ada");

        let resp = app
            .clone()
            .oneshot(authed("POST", "/api/auth/logout"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app.oneshot(authed("GET", "/api/auth/me")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
