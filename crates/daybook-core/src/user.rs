use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Login and registration body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// A bearer token issued at login. Only the SHA-256 digest is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: "u1".into(),
            username: "ada".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.username, "ada");
        assert!(back.password_hash.is_empty());
    }
}
