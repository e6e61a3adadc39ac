//! Task commands: `taskai task add | list | get | update | delete`.
//!
//! Each command opens the SQLite store, performs one operation through the
//! [`TaskStore`] trait, and prints the result to stdout.

use anyhow::{bail, Result};
use serde::Serialize;

use taskai_core::models::{Comment, NewTask, Task, TaskStatus, TaskUpdate};
use taskai_core::store::TaskStore;

use crate::comments::comment_line;
use crate::config::Config;
use crate::sqlite_store::SqliteTaskStore;

pub(crate) fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// One-line summary used by `list` and `recommend`.
pub(crate) fn task_line(task: &Task) -> String {
    format!(
        "[#{}] {} (priority {}, {}, {}%)",
        task.id, task.title, task.priority, task.status, task.progress
    )
}

pub async fn run_task_add(config: &Config, new: NewTask) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let task = store.create_task(&new).await?;
    tracing::info!(id = task.id, "task created");
    println!("Created task {}", task.id);
    Ok(())
}

pub async fn run_task_list(config: &Config, include_deleted: bool, json: bool) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let tasks = store.list_tasks(include_deleted).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in &tasks {
        println!("{}", task_line(task));
    }
    Ok(())
}

#[derive(Serialize)]
struct TaskDetail {
    #[serde(flatten)]
    task: Task,
    comments: Vec<Comment>,
}

pub async fn run_task_get(config: &Config, id: i64, json: bool) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let Some(task) = store.get_task(id).await? else {
        bail!("task not found: {}", id);
    };
    let comments = store.list_comments(id).await?;

    if json {
        let detail = TaskDetail { task, comments };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("--- Task ---");
    println!("id:          {}", task.id);
    println!("title:       {}", task.title);
    println!("priority:    {}", task.priority);
    println!("status:      {}", task.status);
    println!("progress:    {}%", task.progress);
    println!("created_at:  {}", format_ts_iso(task.created_at));
    println!("updated_at:  {}", format_ts_iso(task.updated_at));
    println!();
    println!("{}", task.description);

    if !comments.is_empty() {
        println!();
        println!("--- Comments ({}) ---", comments.len());
        for c in &comments {
            println!("{}", comment_line(c));
        }
    }
    Ok(())
}

pub async fn run_task_update(config: &Config, id: i64, update: TaskUpdate) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    match store.update_task(id, &update).await? {
        Some(task) => {
            println!("Updated {}", task_line(&task));
            Ok(())
        }
        None => bail!("task not found: {}", id),
    }
}

pub async fn run_task_delete(config: &Config, id: i64) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    if !store.delete_task(id).await? {
        bail!("task not found: {}", id);
    }
    println!("Deleted task {}", id);
    Ok(())
}

/// Parse a `--status` argument, warning on values the scorer does not know.
pub fn parse_status_arg(s: &str) -> TaskStatus {
    let status = TaskStatus::parse(s);
    if let TaskStatus::Other(raw) = &status {
        tracing::warn!(status = %raw, "non-standard status; it will score as 0.5");
    }
    status
}
