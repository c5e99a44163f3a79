use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Row};

use daybook_core::task::{CreateTask, Priority, Task, UpdateTask};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let priority_str: String = row.get("priority")?;
    let hashtags_json: String = row.get("hashtags")?;
    let hashtags = serde_json::from_str(&hashtags_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
    })?;
    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        time: row.get("time")?,
        completed: row.get("completed")?,
        icon: row.get("icon")?,
        hashtags,
        priority: Priority::parse_str(&priority_str).unwrap_or_default(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn hashtags_to_json(tags: &[String]) -> Result<String, DbError> {
    serde_json::to_string(tags).map_err(|e| DbError::Internal(e.to_string()))
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound(format!("task {id}"))
}

impl SqliteDatabase {
    pub fn create_task_sync(&self, user_id: &str, input: &CreateTask) -> Result<Task, DbError> {
        let hashtags = hashtags_to_json(&input.hashtags)?;
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO tasks (
                    id, user_id, title, description, date, time, completed,
                    icon, hashtags, priority, created_at, updated_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id,
                    user_id,
                    input.title,
                    input.description,
                    input.date,
                    input.time,
                    input.icon,
                    hashtags,
                    input.priority.as_str(),
                    now,
                    now,
                ],
            )
            .to_db()?;

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }

    pub fn get_task_sync(&self, user_id: &str, id: &str) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_task,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => not_found(id),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    /// All of one user's tasks, by date, then time of day, then creation.
    pub fn list_tasks_sync(&self, user_id: &str) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM tasks WHERE user_id = ?1
                     ORDER BY date ASC, time ASC, created_at ASC",
                )
                .to_db()?;
            let tasks = stmt
                .query_map(params![user_id], row_to_task)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(tasks)
        })
    }

    pub fn update_task_sync(
        &self,
        user_id: &str,
        id: &str,
        update: &UpdateTask,
    ) -> Result<Task, DbError> {
        let hashtags = update
            .hashtags
            .as_deref()
            .map(hashtags_to_json)
            .transpose()?;
        self.with_conn(|conn| {
            let now = Utc::now();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now)];

            if let Some(ref title) = update.title {
                param_values.push(Box::new(title.clone()));
                sets.push(format!("title = ?{}", param_values.len()));
            }
            if let Some(ref description) = update.description {
                param_values.push(Box::new(description.clone()));
                sets.push(format!("description = ?{}", param_values.len()));
            }
            if let Some(date) = update.date {
                param_values.push(Box::new(date));
                sets.push(format!("date = ?{}", param_values.len()));
            }
            if let Some(ref time) = update.time {
                param_values.push(Box::new(time.clone()));
                sets.push(format!("time = ?{}", param_values.len()));
            }
            if let Some(completed) = update.completed {
                param_values.push(Box::new(completed));
                sets.push(format!("completed = ?{}", param_values.len()));
            }
            if let Some(ref icon) = update.icon {
                param_values.push(Box::new(icon.clone()));
                sets.push(format!("icon = ?{}", param_values.len()));
            }
            if let Some(hashtags) = hashtags {
                param_values.push(Box::new(hashtags));
                sets.push(format!("hashtags = ?{}", param_values.len()));
            }
            if let Some(priority) = update.priority {
                param_values.push(Box::new(priority.as_str().to_string()));
                sets.push(format!("priority = ?{}", param_values.len()));
            }

            param_values.push(Box::new(id.to_string()));
            let id_idx = param_values.len();
            param_values.push(Box::new(user_id.to_string()));
            let user_idx = param_values.len();

            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ?{id_idx} AND user_id = ?{user_idx}",
                sets.join(", ")
            );
            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();
            let changed = conn.execute(&sql, params_ref.as_slice()).to_db()?;
            if changed == 0 {
                return Err(not_found(id));
            }

            conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
                .to_db()
        })
    }

    pub fn delete_task_sync(&self, user_id: &str, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })
    }
}
