//! Storage abstraction for TaskAI.
//!
//! The [`TaskStore`] trait defines the task, comment, and user operations
//! the application needs, enabling pluggable backends (SQLite, in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Comment, NewTask, Task, TaskUpdate, User};

/// Abstract storage backend for tasks, comments, and users.
///
/// Deletion is soft: a deleted task keeps its row but is hidden from
/// [`get_task`](TaskStore::get_task), from updates, from comments, and from
/// [`list_tasks`](TaskStore::list_tasks) unless `include_deleted` is set.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create_task`](TaskStore::create_task) | Insert a validated task |
/// | [`get_task`](TaskStore::get_task) | Fetch a live task by id |
/// | [`list_tasks`](TaskStore::list_tasks) | All tasks ordered by id |
/// | [`update_task`](TaskStore::update_task) | Partial update, refreshes `updated_at` |
/// | [`delete_task`](TaskStore::delete_task) | Soft delete |
/// | [`create_user`](TaskStore::create_user) | Register a comment author |
/// | [`list_users`](TaskStore::list_users) | All users ordered by id |
/// | [`add_comment`](TaskStore::add_comment) | Comment on a live task |
/// | [`list_comments`](TaskStore::list_comments) | Comments of a task, oldest first |
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Validate and insert a task, returning it with its assigned id.
    async fn create_task(&self, new: &NewTask) -> Result<Task>;

    /// Fetch a task by id; `None` if missing or soft-deleted.
    async fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// List tasks ordered by id.
    async fn list_tasks(&self, include_deleted: bool) -> Result<Vec<Task>>;

    /// Apply a validated partial update; `None` if missing or soft-deleted.
    async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>>;

    /// Soft-delete a task. Returns `false` if it was missing or already deleted.
    async fn delete_task(&self, id: i64) -> Result<bool>;

    /// Create a user. Username and email must be unique.
    async fn create_user(&self, username: &str, email: &str) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Add a comment to a live task. Fails if the task is missing or
    /// deleted, if the author does not exist, or if `content` is blank.
    async fn add_comment(&self, task_id: i64, author_id: Option<i64>, content: &str)
        -> Result<Comment>;

    async fn list_comments(&self, task_id: i64) -> Result<Vec<Comment>>;
}
