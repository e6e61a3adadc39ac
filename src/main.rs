//! # TaskAI CLI (`taskai`)
//!
//! ## Usage
//!
//! ```bash
//! taskai --config ./config/taskai.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `taskai init` | Create the SQLite database and tables |
//! | `taskai task add/list/get/update/delete` | Manage tasks (delete is soft) |
//! | `taskai user add/list` | Manage comment authors |
//! | `taskai comment add/list` | Comment on tasks |
//! | `taskai recommend` | Rank open tasks for a mode |
//! | `taskai rank-file <tasks.json>` | Rank tasks from a JSON file without the database |
//!
//! ## Examples
//!
//! ```bash
//! taskai init
//! taskai task add --title "Submit laporan proyek" --description "Deadline hari ini" --priority 1
//! taskai task update 1 --status "In Progress" --progress 50
//! taskai recommend --mode progress --explain
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use taskai::models::{NewTask, TaskUpdate};
use taskai::recommend::OutputOptions;
use taskai::{comments, config, migrate, recommend, tasks, users};

/// TaskAI: a local-first task manager with embedding-assisted recommendations.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "taskai",
    about = "TaskAI: a local-first task manager with embedding-assisted recommendations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/taskai.toml")]
    config: PathBuf,

    /// Enable debug logging on stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the users, tasks, and comments
    /// tables. Safe to run repeatedly.
    Init,

    /// Create, inspect, update, and delete tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage users (comment authors).
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Comment on tasks.
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Rank open tasks.
    ///
    /// Loads every non-deleted task and orders it by the scorer for the
    /// chosen mode. Requires an embedding provider unless there are no tasks.
    Recommend {
        #[command(flatten)]
        rank: RankArgs,
    },

    /// Rank tasks from a JSON file without touching the database.
    ///
    /// The file holds an array of objects with `title`, `description`,
    /// `priority` (required) and optional `status`, `progress`, `id`.
    RankFile {
        /// Path to the JSON task file.
        path: PathBuf,

        #[command(flatten)]
        rank: RankArgs,
    },
}

#[derive(clap::Args)]
struct RankArgs {
    /// Ranking mode: `urgent`, `daily`, `progress`, or `impact`.
    /// Unknown values fall back to `urgent`. Defaults to `[ranking].default_mode`.
    #[arg(long)]
    mode: Option<String>,

    /// Show at most this many tasks.
    #[arg(long)]
    limit: Option<usize>,

    /// Print the per-signal score breakdown.
    #[arg(long)]
    explain: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Override `[ranking].timeout_secs` for this call (>= 1).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

impl RankArgs {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            limit: self.limit,
            explain: self.explain,
            json: self.json,
        }
    }
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a task.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Lower is more urgent; must be >= 1.
        #[arg(long, default_value_t = 1)]
        priority: i64,
        /// `Pending`, `In Progress`, `Completed`, or any custom label.
        #[arg(long, default_value = "Pending")]
        status: String,
        /// Completion percentage, 0-100.
        #[arg(long, default_value_t = 0)]
        progress: i64,
    },
    /// List tasks.
    List {
        /// Include soft-deleted tasks.
        #[arg(long)]
        include_deleted: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show a task with its comments.
    Get {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Update selected fields of a task.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
    },
    /// Soft-delete a task.
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user.
    Add { username: String, email: String },
    /// List users.
    List,
}

#[derive(Subcommand)]
enum CommentAction {
    /// Add a comment to a task.
    Add {
        task_id: i64,
        content: String,
        /// Author user id.
        #[arg(long)]
        author: Option<i64>,
    },
    /// List a task's comments.
    List { task_id: i64 },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Task { action } => match action {
            TaskAction::Add {
                title,
                description,
                priority,
                status,
                progress,
            } => {
                let new = NewTask {
                    title,
                    description,
                    priority,
                    status: tasks::parse_status_arg(&status),
                    progress,
                };
                tasks::run_task_add(&cfg, new).await?;
            }
            TaskAction::List {
                include_deleted,
                json,
            } => {
                tasks::run_task_list(&cfg, include_deleted, json).await?;
            }
            TaskAction::Get { id, json } => {
                tasks::run_task_get(&cfg, id, json).await?;
            }
            TaskAction::Update {
                id,
                title,
                description,
                priority,
                status,
                progress,
            } => {
                let update = TaskUpdate {
                    title,
                    description,
                    priority,
                    status: status.as_deref().map(tasks::parse_status_arg),
                    progress,
                };
                tasks::run_task_update(&cfg, id, update).await?;
            }
            TaskAction::Delete { id } => {
                tasks::run_task_delete(&cfg, id).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Add { username, email } => {
                users::run_user_add(&cfg, &username, &email).await?;
            }
            UserAction::List => {
                users::run_user_list(&cfg).await?;
            }
        },
        Commands::Comment { action } => match action {
            CommentAction::Add {
                task_id,
                content,
                author,
            } => {
                comments::run_comment_add(&cfg, task_id, &content, author).await?;
            }
            CommentAction::List { task_id } => {
                comments::run_comment_list(&cfg, task_id).await?;
            }
        },
        Commands::Recommend { rank } => {
            recommend::run_recommend(&cfg, rank.mode.as_deref(), rank.timeout_secs, rank.output())
                .await?;
        }
        Commands::RankFile { path, rank } => {
            recommend::run_rank_file(
                &cfg,
                &path,
                rank.mode.as_deref(),
                rank.timeout_secs,
                rank.output(),
            )
            .await?;
        }
    }

    Ok(())
}
