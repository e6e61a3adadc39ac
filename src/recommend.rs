//! Task recommendations: `taskai recommend` and `taskai rank-file`.
//!
//! Loads the open (non-deleted) tasks, builds the encoders once for the
//! call, and runs the core scorer under a timeout covering the whole batch.
//! A timeout or provider failure fails the command with no partial output.

use anyhow::{Context, Result};
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use taskai_core::embedding::Encoders;
use taskai_core::mode::Mode;
use taskai_core::models::{tasks_from_json, Task};
use taskai_core::rank::{score_tasks, Signals};
use taskai_core::store::TaskStore;

use crate::config::Config;
use crate::embedding::create_encoders;
use crate::sqlite_store::SqliteTaskStore;
use crate::tasks::task_line;

/// A ranked task with its score breakdown, detached from the input slice.
#[derive(Debug, Clone, Serialize)]
pub struct RankedTask {
    #[serde(flatten)]
    pub task: Task,
    pub score: f64,
    pub signals: Signals,
}

/// Output options shared by `recommend` and `rank-file`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub limit: Option<usize>,
    pub explain: bool,
    pub json: bool,
}

/// Run `fut` under `timeout`, turning expiry into an error.
async fn with_timeout<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("recommendation timed out after {:?}", timeout),
    }
}

/// Score `tasks` for `mode`, best first.
pub async fn rank_with_timeout(
    tasks: &[Task],
    mode: Mode,
    encoders: &Encoders,
    timeout: Duration,
) -> Result<Vec<RankedTask>> {
    with_timeout(timeout, async {
        let scored = score_tasks(tasks, mode, encoders)
            .await
            .context("ranking failed")?;
        Ok(scored
            .into_iter()
            .map(|s| RankedTask {
                task: s.task.clone(),
                score: s.final_score,
                signals: s.signals,
            })
            .collect())
    })
    .await
}

/// Rank every open task in `store`.
pub async fn recommend_tasks<S: TaskStore + ?Sized>(
    store: &S,
    mode: Mode,
    encoders: &Encoders,
    timeout: Duration,
) -> Result<Vec<RankedTask>> {
    let tasks = store.list_tasks(false).await?;
    tracing::info!(mode = %mode, tasks = tasks.len(), "ranking open tasks");
    rank_with_timeout(&tasks, mode, encoders, timeout).await
}

/// Resolve the mode for a command: `--mode` if given, else the configured
/// default. Unknown names fall back to urgent.
pub fn resolve_mode(config: &Config, mode_arg: Option<&str>) -> Mode {
    Mode::resolve(mode_arg.unwrap_or(&config.ranking.default_mode))
}

fn resolve_timeout(config: &Config, timeout_secs: Option<u64>) -> Result<Duration> {
    let secs = timeout_secs.unwrap_or(config.ranking.timeout_secs);
    if secs == 0 {
        anyhow::bail!("timeout_secs must be > 0");
    }
    Ok(Duration::from_secs(secs))
}

pub async fn run_recommend(
    config: &Config,
    mode_arg: Option<&str>,
    timeout_secs: Option<u64>,
    output: OutputOptions,
) -> Result<()> {
    let mode = resolve_mode(config, mode_arg);
    let store = SqliteTaskStore::open(config).await?;
    let encoders = create_encoders(&config.embedding)?;

    let ranked = recommend_tasks(
        &store,
        mode,
        &encoders,
        resolve_timeout(config, timeout_secs)?,
    )
    .await?;

    print_ranked(&ranked, mode, output)
}

pub async fn run_rank_file(
    config: &Config,
    path: &Path,
    mode_arg: Option<&str>,
    timeout_secs: Option<u64>,
    output: OutputOptions,
) -> Result<()> {
    let mode = resolve_mode(config, mode_arg);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file: {}", path.display()))?;
    let tasks = tasks_from_json(&content)?;
    let encoders = create_encoders(&config.embedding)?;

    let ranked =
        rank_with_timeout(&tasks, mode, &encoders, resolve_timeout(config, timeout_secs)?).await?;

    print_ranked(&ranked, mode, output)
}

fn print_ranked(ranked: &[RankedTask], mode: Mode, output: OutputOptions) -> Result<()> {
    print!("{}", render_ranked(ranked, mode, output)?);
    Ok(())
}

/// Render ranked tasks as text or JSON, honoring `--limit` and `--explain`.
fn render_ranked(ranked: &[RankedTask], mode: Mode, output: OutputOptions) -> Result<String> {
    let shown = &ranked[..output.limit.unwrap_or(ranked.len()).min(ranked.len())];

    if output.json {
        let json = if output.explain {
            serde_json::to_string_pretty(shown)?
        } else {
            let tasks: Vec<&Task> = shown.iter().map(|r| &r.task).collect();
            serde_json::to_string_pretty(&tasks)?
        };
        return Ok(format!("{}\n", json));
    }

    if ranked.is_empty() {
        return Ok("No open tasks to rank.\n".to_string());
    }

    let mut out = format!(
        "Recommended tasks (mode: {}, showing {} of {}):\n",
        mode,
        shown.len(),
        ranked.len()
    );
    for (i, r) in shown.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, task_line(&r.task)));
        if output.explain {
            let s = &r.signals;
            out.push_str(&format!(
                "    score={:.4}  text={:.3} difficulty={:.3} impact={:.3} priority={:.3} keyword={:.1} status={:.1} progress={:.2}\n",
                r.score, s.text, s.difficulty, s.impact, s.priority, s.keyword, s.status, s.progress
            ));
        }
    }
    Ok(out)
}
