use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use daybook_core::user::Session;

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        token_hash: row.get("token_hash")?,
        created_at: row.get("created_at")?,
        last_used_at: row.get("last_used_at")?,
    })
}

impl SqliteDatabase {
    pub fn create_session_sync(&self, user_id: &str, token_hash: &str) -> Result<Session, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO sessions (id, user_id, token_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, token_hash, now],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM sessions WHERE id = ?1",
                params![id],
                row_to_session,
            )
            .to_db()
        })
    }

    pub fn find_session_by_hash_sync(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                row_to_session,
            )
            .optional()
            .to_db()
        })
    }

    pub fn touch_session_sync(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
                params![Utc::now(), id],
            )
            .to_db()?;
            Ok(())
        })
    }

    pub fn delete_session_by_hash_sync(&self, token_hash: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM sessions WHERE token_hash = ?1",
                    params![token_hash],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound("session".into()));
            }
            Ok(())
        })
    }

    pub fn delete_sessions_for_user_sync(&self, user_id: &str) -> Result<usize, DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])
                .to_db()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{DbError, SqliteDatabase};

    #[test]
    fn session_lifecycle() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let user = db.create_user_sync("ada", "h").unwrap();

        let session = db.create_session_sync(&user.id, "digest-1").unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(session.last_used_at.is_none());

        let found = db.find_session_by_hash_sync("digest-1").unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert!(db.find_session_by_hash_sync("other").unwrap().is_none());

        db.touch_session_sync(&session.id).unwrap();
        let touched = db.find_session_by_hash_sync("digest-1").unwrap().unwrap();
        assert!(touched.last_used_at.is_some());

        db.delete_session_by_hash_sync("digest-1").unwrap();
        assert!(db.find_session_by_hash_sync("digest-1").unwrap().is_none());
        assert!(matches!(
            db.delete_session_by_hash_sync("digest-1"),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn revoke_all_sessions_for_user() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let ada = db.create_user_sync("ada", "h").unwrap();
        let bob = db.create_user_sync("bob", "h").unwrap();
        db.create_session_sync(&ada.id, "a1").unwrap();
        db.create_session_sync(&ada.id, "a2").unwrap();
        db.create_session_sync(&bob.id, "b1").unwrap();

        assert_eq!(db.delete_sessions_for_user_sync(&ada.id).unwrap(), 2);
        assert!(db.find_session_by_hash_sync("a1").unwrap().is_none());
        assert!(db.find_session_by_hash_sync("b1").unwrap().is_some());
    }

    #[test]
    fn session_requires_existing_user() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(db.create_session_sync("ghost", "x").is_err());
    }
}
