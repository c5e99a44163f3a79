pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use daybook_core::task::{CreateTask, Task, UpdateTask};
use daybook_core::user::{Session, User};

use crate::{Database, DbConfig, DbError};

/// Converts `rusqlite::Result<T>` into `Result<T, DbError>` so query code can
/// write `.to_db()?`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("daybook.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        tracing::debug!(path = %path.display(), "opened sqlite database");
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }

    /// Run a synchronous query on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&SqliteDatabase) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}

/// Unique-constraint violations become `Conflict`; everything else is
/// `Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Conflict(e.to_string())
        }
        other => DbError::Internal(other.to_string()),
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Users --
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, DbError> {
        let username = username.to_string();
        let password_hash = password_hash.to_string();
        self.blocking(move |db| db.create_user_sync(&username, &password_hash))
            .await
    }
    async fn get_user(&self, id: &str) -> Result<User, DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.get_user_sync(&id)).await
    }
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let username = username.to_string();
        self.blocking(move |db| db.get_user_by_username_sync(&username))
            .await
    }
    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.blocking(|db| db.list_users_sync()).await
    }

    // -- Sessions --
    async fn create_session(&self, user_id: &str, token_hash: &str) -> Result<Session, DbError> {
        let user_id = user_id.to_string();
        let token_hash = token_hash.to_string();
        self.blocking(move |db| db.create_session_sync(&user_id, &token_hash))
            .await
    }
    async fn find_session_by_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
        let token_hash = token_hash.to_string();
        self.blocking(move |db| db.find_session_by_hash_sync(&token_hash))
            .await
    }
    async fn touch_session(&self, id: &str) -> Result<(), DbError> {
        let id = id.to_string();
        self.blocking(move |db| db.touch_session_sync(&id)).await
    }
    async fn delete_session_by_hash(&self, token_hash: &str) -> Result<(), DbError> {
        let token_hash = token_hash.to_string();
        self.blocking(move |db| db.delete_session_by_hash_sync(&token_hash))
            .await
    }
    async fn delete_sessions_for_user(&self, user_id: &str) -> Result<usize, DbError> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.delete_sessions_for_user_sync(&user_id))
            .await
    }

    // -- Tasks --
    async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, DbError> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.list_tasks_sync(&user_id)).await
    }
    async fn get_task(&self, user_id: &str, id: &str) -> Result<Task, DbError> {
        let user_id = user_id.to_string();
        let id = id.to_string();
        self.blocking(move |db| db.get_task_sync(&user_id, &id)).await
    }
    async fn create_task(&self, user_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        let user_id = user_id.to_string();
        let input = input.clone();
        self.blocking(move |db| db.create_task_sync(&user_id, &input))
            .await
    }
    async fn update_task(
        &self,
        user_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        let user_id = user_id.to_string();
        let id = id.to_string();
        let update = update.clone();
        self.blocking(move |db| db.update_task_sync(&user_id, &id, &update))
            .await
    }
    async fn delete_task(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        let user_id = user_id.to_string();
        let id = id.to_string();
        self.blocking(move |db| db.delete_task_sync(&user_id, &id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_runs_migrations() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('users', 'sessions', 'tasks')",
                    [],
                    |row| row.get(0),
                )
                .to_db()?;
            assert_eq!(count, 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn open_path_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        assert!(!db_path.exists());

        let _db = SqliteDatabase::open_path(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn open_with_config_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested/dir/daybook.db");
        let config = DbConfig {
            sqlite_path: Some(db_path.to_string_lossy().into_owned()),
        };
        SqliteDatabase::open(&config).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn reopening_keeps_data() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("daybook.db");
        {
            let db = SqliteDatabase::open_path(&db_path).unwrap();
            db.create_user_sync("ada", "hash").unwrap();
        }
        let db = SqliteDatabase::open_path(&db_path).unwrap();
        assert_eq!(db.list_users_sync().unwrap().len(), 1);
    }
}
