//! Comment commands: `taskai comment add | list`.

use anyhow::Result;

use taskai_core::models::Comment;
use taskai_core::store::TaskStore;

use crate::config::Config;
use crate::sqlite_store::SqliteTaskStore;
use crate::tasks::format_ts_iso;

pub async fn run_comment_add(
    config: &Config,
    task_id: i64,
    content: &str,
    author_id: Option<i64>,
) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let comment = store.add_comment(task_id, author_id, content).await?;
    println!("Added comment {} to task {}", comment.id, task_id);
    Ok(())
}

pub async fn run_comment_list(config: &Config, task_id: i64) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let comments = store.list_comments(task_id).await?;
    if comments.is_empty() {
        println!("No comments.");
    }
    for c in &comments {
        println!("{}  {}", c.id, comment_line(c));
    }
    Ok(())
}

pub(crate) fn comment_line(c: &Comment) -> String {
    let author = c
        .author_id
        .map(|a| format!("user {}", a))
        .unwrap_or_else(|| "anonymous".to_string());
    format!("[{}] {}: {}", format_ts_iso(c.created_at), author, c.content)
}
