//! In-memory [`TaskStore`] implementation for testing.
//!
//! Uses `Vec`s behind a single `std::sync::RwLock`. Ids are assigned
//! sequentially from 1, like SQLite's `INTEGER PRIMARY KEY`.

use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{Comment, NewTask, Task, TaskUpdate, User};

use super::TaskStore;

struct StoredTask {
    task: Task,
    deleted: bool,
}

#[derive(Default)]
struct Inner {
    tasks: Vec<StoredTask>,
    users: Vec<User>,
    comments: Vec<Comment>,
}

/// In-memory store for tests and embedding in other tools.
pub struct InMemoryTaskStore {
    inner: RwLock<Inner>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(&self, new: &NewTask) -> Result<Task> {
        new.validate()?;
        let mut inner = self.inner.write().unwrap();
        let ts = now();
        let task = Task {
            id: inner.tasks.len() as i64 + 1,
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            status: new.status.clone(),
            progress: new.progress,
            created_at: ts,
            updated_at: ts,
        };
        inner.tasks.push(StoredTask {
            task: task.clone(),
            deleted: false,
        });
        Ok(task)
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .tasks
            .iter()
            .find(|st| st.task.id == id && !st.deleted)
            .map(|st| st.task.clone()))
    }

    async fn list_tasks(&self, include_deleted: bool) -> Result<Vec<Task>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .tasks
            .iter()
            .filter(|st| include_deleted || !st.deleted)
            .map(|st| st.task.clone())
            .collect())
    }

    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        update.validate()?;
        let mut inner = self.inner.write().unwrap();
        let Some(stored) = inner
            .tasks
            .iter_mut()
            .find(|st| st.task.id == id && !st.deleted)
        else {
            return Ok(None);
        };
        update.apply_to(&mut stored.task);
        stored.task.updated_at = now();
        Ok(Some(stored.task.clone()))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner
            .tasks
            .iter_mut()
            .find(|st| st.task.id == id && !st.deleted)
        {
            Some(stored) => {
                stored.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_user(&self, username: &str, email: &str) -> Result<User> {
        let mut inner = self.inner.write().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.username == username || u.email == email)
        {
            bail!("user already exists: {} <{}>", username, email);
        }
        let user = User {
            id: inner.users.len() as i64 + 1,
            username: username.to_string(),
            email: email.to_string(),
            created_at: now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.read().unwrap().users.clone())
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
        let mut inner = self.inner.write().unwrap();
        if !inner
            .tasks
            .iter()
            .any(|st| st.task.id == task_id && !st.deleted)
        {
            bail!("task not found: {}", task_id);
        }
        if let Some(author) = author_id {
            if !inner.users.iter().any(|u| u.id == author) {
                bail!("user not found: {}", author);
            }
        }
        let comment = Comment {
            id: inner.comments.len() as i64 + 1,
            task_id,
            author_id,
            content: content.to_string(),
            created_at: now(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, task_id: i64) -> Result<Vec<Comment>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    fn new_task(title: &str, priority: i64) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: String::new(),
            priority,
            status: TaskStatus::Pending,
            progress: 0,
        }
    }

    #[tokio::test]
    async fn test_soft_delete_hides_task() {
        let store = InMemoryTaskStore::new();
        let a = store.create_task(&new_task("a", 1)).await.unwrap();
        let b = store.create_task(&new_task("b", 2)).await.unwrap();

        assert!(store.delete_task(a.id).await.unwrap());
        assert!(!store.delete_task(a.id).await.unwrap());

        let live = store.list_tasks(false).await.unwrap();
        assert_eq!(live.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);
        assert_eq!(store.list_tasks(true).await.unwrap().len(), 2);
        assert!(store.get_task(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let store = InMemoryTaskStore::new();
        let update = TaskUpdate {
            progress: Some(10),
            ..Default::default()
        };
        assert!(store.update_task(42, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_task_rejected() {
        let store = InMemoryTaskStore::new();
        assert!(store.create_task(&new_task("", 1)).await.is_err());
        assert!(store.list_tasks(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comments_require_live_task_and_author() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(&new_task("a", 1)).await.unwrap();
        let user = store.create_user("dina", "dina@example.com").await.unwrap();

        store.add_comment(task.id, Some(user.id), "looks good").await.unwrap();
        assert!(store.add_comment(task.id, Some(99), "who?").await.is_err());
        assert!(store.add_comment(task.id, None, "  ").await.is_err());

        store.delete_task(task.id).await.unwrap();
        assert!(store.add_comment(task.id, None, "late").await.is_err());
        assert_eq!(store.list_comments(task.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = InMemoryTaskStore::new();
        store.create_user("dina", "dina@example.com").await.unwrap();
        assert!(store.create_user("dina", "other@example.com").await.is_err());
    }
}
