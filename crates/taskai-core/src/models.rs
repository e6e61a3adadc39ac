//! Core data models for tasks, comments, and users.
//!
//! [`Task`] is the record the scorer reads. [`TaskInput`] is the loosely
//! typed form tasks take when they arrive from JSON; converting it is where
//! missing fields are caught.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rank::RankError;

/// Workflow state of a task.
///
/// Unknown values are kept verbatim in [`TaskStatus::Other`] so that a
/// stored status is never rewritten by a round trip through this type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl TaskStatus {
    /// Parse a status name. Case-insensitive; never fails.
    ///
    /// ```rust
    /// use taskai_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse("in progress"), TaskStatus::InProgress);
    /// assert_eq!(TaskStatus::parse("Blocked"), TaskStatus::Other("Blocked".into()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "in progress" | "inprogress" | "in_progress" | "in-progress" => TaskStatus::InProgress,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A unit of work, as read by the recommendation scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Storage identity; `0` for tasks that never touched storage.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Lower number means more urgent. Expected to be `>= 1`.
    pub priority: i64,
    pub status: TaskStatus,
    /// Completion percentage, expected in `0..=100`.
    pub progress: i64,
    /// Unix seconds; `0` when unknown.
    #[serde(default)]
    pub created_at: i64,
    /// Unix seconds; `0` when unknown.
    #[serde(default)]
    pub updated_at: i64,
}

/// A task record as it arrives from an untyped source (JSON files, rows).
///
/// `title`, `description`, and `priority` are required. `status` and
/// `progress` fall back to `Pending` and `0`, the same defaults the
/// `tasks` table applies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
}

impl TaskInput {
    /// Convert into a [`Task`], failing on the first missing required field.
    ///
    /// `index` is the record's position in its batch and is carried into
    /// the error so the caller can point at the offending record.
    pub fn into_task(self, index: usize) -> Result<Task, RankError> {
        let missing = |field: &str| RankError::MalformedTask {
            index,
            reason: format!("missing required field `{}`", field),
        };

        let title = self.title.ok_or_else(|| missing("title"))?;
        let description = self.description.ok_or_else(|| missing("description"))?;
        let priority = self.priority.ok_or_else(|| missing("priority"))?;

        Ok(Task {
            id: self.id.unwrap_or(0),
            title,
            description,
            priority,
            status: self
                .status
                .map(TaskStatus::from)
                .unwrap_or(TaskStatus::Pending),
            progress: self.progress.unwrap_or(0),
            created_at: 0,
            updated_at: 0,
        })
    }
}

/// Parse a JSON array of task records into tasks.
///
/// Any record missing a required field fails the whole batch.
pub fn tasks_from_json(json: &str) -> Result<Vec<Task>, RankError> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| RankError::MalformedTask {
            index: 0,
            reason: format!("invalid task JSON: {}", e),
        })?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let input: TaskInput =
                serde_json::from_value(record).map_err(|e| RankError::MalformedTask {
                    index: i,
                    reason: e.to_string(),
                })?;
            input.into_task(i)
        })
        .collect()
}

/// Fields for creating a task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: i64,
    pub status: TaskStatus,
    pub progress: i64,
}

impl NewTask {
    /// Check field ranges before the task reaches storage.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_title(&self.title)?;
        validate_priority(self.priority)?;
        validate_progress(self.progress)
    }
}

fn validate_title(title: &str) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("title must not be empty");
    }
    Ok(())
}

fn validate_priority(priority: i64) -> anyhow::Result<()> {
    if priority < 1 {
        anyhow::bail!("priority must be >= 1 (got {})", priority);
    }
    Ok(())
}

fn validate_progress(progress: i64) -> anyhow::Result<()> {
    if !(0..=100).contains(&progress) {
        anyhow::bail!("progress must be in 0..=100 (got {})", progress);
    }
    Ok(())
}

/// A partial task update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<TaskStatus>,
    pub progress: Option<i64>,
}

impl TaskUpdate {
    /// Same range checks as [`NewTask::validate`], for the fields present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.is_empty() {
            anyhow::bail!("nothing to update");
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        if let Some(progress) = self.progress {
            validate_progress(progress)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.progress.is_none()
    }

    /// Apply this update to `task` in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
        if let Some(progress) = self.progress {
            task.progress = progress;
        }
    }
}

/// A comment attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    pub author_id: Option<i64>,
    pub content: String,
    pub created_at: i64,
}

/// A user who can author comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: i64,
}
