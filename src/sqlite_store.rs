//! SQLite-backed [`TaskStore`] implementation.
//!
//! Maps each [`TaskStore`] operation onto the `tasks`, `comments`, and
//! `users` tables created by [`migrate`](crate::migrate).

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use taskai_core::models::{Comment, NewTask, Task, TaskInput, TaskUpdate, User};
use taskai_core::store::TaskStore;

use crate::config::Config;
use crate::db;

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, progress, created_at, updated_at";

/// SQLite implementation of the [`TaskStore`] trait.
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect using `[db]` settings. The schema must already exist
    /// (`taskai init`).
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Convert a `tasks` row, failing on NULLs in required columns rather than
/// substituting defaults.
fn row_to_task(row: &SqliteRow, index: usize) -> Result<Task> {
    let input = TaskInput {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        priority: row.try_get("priority")?,
        status: row.try_get("status")?,
        progress: row.try_get("progress")?,
    };
    let mut task = input.into_task(index)?;
    task.created_at = row.try_get("created_at")?;
    task.updated_at = row.try_get("updated_at")?;
    Ok(task)
}

fn row_to_comment(row: &SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        task_id: row.try_get("task_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn create_task(&self, new: &NewTask) -> Result<Task> {
        new.validate()?;
        let ts = now();
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, priority, status, progress,
                               created_at, updated_at, is_deleted)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.priority)
        .bind(new.status.as_str())
        .bind(new.progress)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            status: new.status.clone(),
            progress: new.progress,
            created_at: ts,
            updated_at: ts,
        })
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM tasks WHERE id = ? AND is_deleted = 0",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_task(&r, 0)).transpose()
    }

    async fn list_tasks(&self, include_deleted: bool) -> Result<Vec<Task>> {
        let sql = if include_deleted {
            format!("SELECT {} FROM tasks ORDER BY id ASC", TASK_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM tasks WHERE is_deleted = 0 ORDER BY id ASC",
                TASK_COLUMNS
            )
        };
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .enumerate()
            .map(|(i, row)| row_to_task(row, i))
            .collect()
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        update.validate()?;
        let Some(mut task) = self.get_task(id).await? else {
            return Ok(None);
        };
        update.apply_to(&mut task);
        task.updated_at = now();

        sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, priority = ?, status = ?, progress = ?,
                updated_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status.as_str())
        .bind(task.progress)
        .bind(task.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE tasks SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0")
                .bind(now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_user(&self, username: &str, email: &str) -> Result<User> {
        let exists: bool =
            sqlx::query_scalar("SELECT COUNT(*) > 0 FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            bail!("user already exists: {} <{}>", username, email);
        }

        let ts = now();
        let result = sqlx::query("INSERT INTO users (username, email, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(email)
            .bind(ts)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: ts,
        })
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, username, email, created_at FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn add_comment(
        &self,
        task_id: i64,
        author_id: Option<i64>,
        content: &str,
    ) -> Result<Comment> {
        if content.trim().is_empty() {
            bail!("comment content must not be empty");
        }
        if self.get_task(task_id).await?.is_none() {
            bail!("task not found: {}", task_id);
        }
        if let Some(author) = author_id {
            let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM users WHERE id = ?")
                .bind(author)
                .fetch_one(&self.pool)
                .await?;
            if !exists {
                bail!("user not found: {}", author);
            }
        }

        let ts = now();
        let result = sqlx::query(
            "INSERT INTO comments (task_id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            task_id,
            author_id,
            content: content.to_string(),
            created_at: ts,
        })
    }

    async fn list_comments(&self, task_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, task_id, author_id, content, created_at FROM comments WHERE task_id = ? ORDER BY id ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_comment).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;
    use taskai_core::models::TaskStatus;

    async fn memory_store() -> SqliteTaskStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        SqliteTaskStore::new(pool)
    }

    fn new_task(title: &str, status: TaskStatus) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: "desc".to_string(),
            priority: 2,
            status,
            progress: 0,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let store = memory_store().await;
        let created = store
            .create_task(&new_task("Write docs", TaskStatus::InProgress))
            .await
            .unwrap();

        let fetched = store.get_task(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() {
        let store = memory_store().await;
        let t = store
            .create_task(&new_task("Ship", TaskStatus::Pending))
            .await
            .unwrap();

        let update = TaskUpdate {
            progress: Some(60),
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        let updated = store.update_task(t.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.progress, 60);
        assert_eq!(updated.title, "Ship");

        assert!(store.delete_task(t.id).await.unwrap());
        assert!(!store.delete_task(t.id).await.unwrap());
        assert!(store.get_task(t.id).await.unwrap().is_none());
        assert!(store.update_task(t.id, &update).await.unwrap().is_none());
        assert!(store.list_tasks(false).await.unwrap().is_empty());
        assert_eq!(store.list_tasks(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_status_preserved() {
        let store = memory_store().await;
        let t = store
            .create_task(&new_task("Review", TaskStatus::Other("Blocked".into())))
            .await
            .unwrap();
        let fetched = store.get_task(t.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Other("Blocked".into()));
    }

    #[tokio::test]
    async fn test_comments_with_author() {
        let store = memory_store().await;
        let t = store
            .create_task(&new_task("Ship", TaskStatus::Pending))
            .await
            .unwrap();
        let user = store.create_user("raka", "raka@example.com").await.unwrap();

        store.add_comment(t.id, Some(user.id), "first").await.unwrap();
        store.add_comment(t.id, None, "second").await.unwrap();
        assert!(store.add_comment(t.id, Some(user.id + 10), "x").await.is_err());
        assert!(store.add_comment(t.id + 10, None, "x").await.is_err());

        let comments = store.list_comments(t.id).await.unwrap();
        let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(comments[0].author_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let store = memory_store().await;
        store.create_user("raka", "raka@example.com").await.unwrap();
        let err = store
            .create_user("raka", "other@example.com")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
