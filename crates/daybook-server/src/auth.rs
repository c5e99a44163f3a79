use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};

use daybook_core::user::User;
use daybook_db::{Database, DbError};

use crate::routes::AppState;

pub const MIN_PASSWORD_LEN: usize = 8;

/// The authenticated caller, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session_id: String,
    pub token_hash: String,
}

/// SHA-256 hash a raw token, returning the hex-encoded digest.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new bearer token: `dbk_` + 43 chars of base62 random bytes.
pub fn generate_token() -> String {
    use rand::Rng;
    const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let random_part: String = (0..43)
        .map(|_| {
            let idx = rng.gen_range(0..BASE62.len());
            BASE62[idx] as char
        })
        .collect();
    format!("dbk_{random_part}")
}

/// Argon2id hash in PHC string form.
pub fn hash_password(password: &str) -> Result<String, DbError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Reject an empty username or a password shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_credentials(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("username must not be empty".into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    Ok(())
}

/// Create a user with a freshly hashed password.
pub async fn create_user(
    db: &dyn Database,
    username: &str,
    password: &str,
) -> Result<User, DbError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DbError::Internal(e.to_string()))??;
    db.create_user(username.trim(), &hash).await
}

/// Check a username/password pair. `None` covers both an unknown user and a
/// wrong password.
pub async fn authenticate(
    db: &dyn Database,
    username: &str,
    password: &str,
) -> Result<Option<User>, DbError> {
    let Some(user) = db.get_user_by_username(username.trim()).await? else {
        return Ok(None);
    };
    let password = password.to_string();
    let hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?;
    Ok(ok.then_some(user))
}

/// Issue a bearer token for `user_id`. Only its digest is stored.
pub async fn issue_token(db: &dyn Database, user_id: &str) -> Result<String, DbError> {
    let token = generate_token();
    db.create_session(user_id, &sha256_hex(&token)).await?;
    Ok(token)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid token" })),
    )
        .into_response()
}

/// Axum middleware that requires `Authorization: Bearer <token>` naming a live
/// session and exposes the caller as a [`CurrentUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized();
    };
    let token_hash = sha256_hex(token);

    let session = match state.db.find_session_by_hash(&token_hash).await {
        Ok(Some(session)) => session,
        Ok(None) => return unauthorized(),
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            return unauthorized();
        }
    };
    let user = match state.db.get_user(&session.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, session_id = %session.id, "session without user");
            return unauthorized();
        }
    };

    // Fire-and-forget: update last_used_at
    let db = state.db.clone();
    let session_id = session.id.clone();
    tokio::spawn(async move {
        if let Err(e) = db.touch_session(&session_id).await {
            tracing::debug!(error = %e, "failed to touch session");
        }
    });

    request.extensions_mut().insert(CurrentUser {
        user,
        session_id: session.id,
        token_hash,
    });
    next.run(request).await
}
