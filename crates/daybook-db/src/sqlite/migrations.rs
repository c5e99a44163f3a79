use rusqlite::Connection;

use super::SqliteResultExt;
use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .to_db()?;

    if current_version < 1 {
        // v1: users, sessions, tasks
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                 id            TEXT PRIMARY KEY,
                 username      TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 created_at    TEXT NOT NULL
             );

             CREATE TABLE IF NOT EXISTS sessions (
                 id           TEXT PRIMARY KEY,
                 user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 token_hash   TEXT NOT NULL UNIQUE,
                 created_at   TEXT NOT NULL,
                 last_used_at TEXT
             );
             CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

             CREATE TABLE IF NOT EXISTS tasks (
                 id          TEXT PRIMARY KEY,
                 user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 title       TEXT NOT NULL,
                 description TEXT,
                 date        TEXT NOT NULL,
                 time        TEXT,
                 completed   INTEGER NOT NULL DEFAULT 0,
                 icon        TEXT,
                 hashtags    TEXT NOT NULL DEFAULT '[]',
                 priority    TEXT NOT NULL DEFAULT 'medium'
                                 CHECK(priority IN ('low', 'medium', 'high')),
                 created_at  TEXT NOT NULL,
                 updated_at  TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_tasks_user_date ON tasks(user_id, date);",
        )
        .to_db()?;

        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
            [],
        )
        .to_db()?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}
