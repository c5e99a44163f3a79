use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use daybook_core::user::User;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_user_sync(&self, username: &str, password_hash: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO users (id, username, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, username, password_hash, now],
            )
            .map_err(|e| match super::super::map_sqlite_err(e) {
                DbError::Conflict(_) => DbError::Conflict(format!("username {username} is taken")),
                other => other,
            })?;
            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .to_db()
        })
    }

    pub fn get_user_sync(&self, id: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], row_to_user)
                .map_err(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("user {id}")),
                    other => DbError::Internal(other.to_string()),
                })
        })
    }

    pub fn get_user_by_username_sync(&self, username: &str) -> Result<Option<User>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
            .to_db()
        })
    }

    pub fn list_users_sync(&self) -> Result<Vec<User>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM users ORDER BY username")
                .to_db()?;
            let users = stmt
                .query_map([], row_to_user)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(users)
        })
    }
}
