//! User commands: `taskai user add | list`.

use anyhow::Result;

use taskai_core::store::TaskStore;

use crate::config::Config;
use crate::sqlite_store::SqliteTaskStore;

pub async fn run_user_add(config: &Config, username: &str, email: &str) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let user = store.create_user(username, email).await?;
    println!("Created user {} ({})", user.id, user.username);
    Ok(())
}

pub async fn run_user_list(config: &Config) -> Result<()> {
    let store = SqliteTaskStore::open(config).await?;
    let users = store.list_users().await?;
    if users.is_empty() {
        println!("No users.");
    }
    for u in &users {
        println!("{}  {} <{}>", u.id, u.username, u.email);
    }
    Ok(())
}
