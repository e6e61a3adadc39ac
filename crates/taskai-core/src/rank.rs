//! Task recommendation scorer.
//!
//! Ranks tasks by a weighted sum of seven signals. The weights and the
//! reference phrase come from the [`Mode`]'s [`ModeProfile`](crate::mode::ModeProfile).
//!
//! # Signals
//!
//! | Signal | Value |
//! |--------|-------|
//! | `text` | sim(title, mode reference) using the general encoder |
//! | `difficulty` | sim(description, "difficult task") using the difficulty encoder |
//! | `impact` | sim(title, "high impact" / "low impact") using the impact encoder |
//! | `priority` | `1 / (priority + 0.1)` |
//! | `keyword` | number of urgency keywords found in title or description |
//! | `status` | Pending 1.0, In Progress 0.7, Completed 0.3, other 0.5 |
//! | `progress` | `(100 - progress) / 100` |
//!
//! # Algorithm
//!
//! 1. Embed every title (general, impact) and description (difficulty)
//!    together with the reference phrase, one batch per encoder.
//! 2. Compute all seven signals per task.
//! 3. `final_score = Σ weight × signal`.
//! 4. Stable sort by `final_score` descending.
//!
//! Any provider error fails the whole call; there are no partial rankings.

use serde::Serialize;
use thiserror::Error;

use crate::embedding::{cosine_similarity, EncoderPurpose, Encoders};
use crate::mode::{Mode, WeightVector};
use crate::models::{Task, TaskStatus};

/// Urgency keywords matched case-insensitively as substrings.
pub const KEYWORDS: [&str; 7] = [
    "bug", "error", "urgent", "segera", "deadline", "hari ini", "besok",
];

/// Phrase descriptions are compared against for the difficulty signal.
pub const DIFFICULTY_REFERENCE: &str = "difficult task";

/// Errors produced while ranking.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("{purpose} embedding provider failed")]
    Provider {
        purpose: EncoderPurpose,
        #[source]
        source: anyhow::Error,
    },
    #[error("{purpose} embedding provider returned {got} vectors for {expected} inputs")]
    ProviderShape {
        purpose: EncoderPurpose,
        expected: usize,
        got: usize,
    },
    #[error("{purpose} embedding provider returned a {got}-dim vector, expected {expected}")]
    ProviderDims {
        purpose: EncoderPurpose,
        expected: usize,
        got: usize,
    },
    #[error("malformed task at index {index}: {reason}")]
    MalformedTask { index: usize, reason: String },
}

/// Per-task signal values, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Signals {
    pub text: f64,
    pub difficulty: f64,
    pub impact: f64,
    pub priority: f64,
    pub keyword: f64,
    pub status: f64,
    pub progress: f64,
}

impl Signals {
    /// Weighted sum of all signals.
    pub fn weighted(&self, w: &WeightVector) -> f64 {
        self.text * w.text
            + self.difficulty * w.difficulty
            + self.impact * w.impact
            + self.priority * w.priority
            + self.keyword * w.keyword
            + self.status * w.status
            + self.progress * w.progress
    }
}

/// A task paired with its score for the duration of one ranking call.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTask<'a> {
    pub task: &'a Task,
    pub signals: Signals,
    pub final_score: f64,
}

/// `1 / (priority + 0.1)`.
///
/// Strictly decreasing in `priority` for `priority >= 0`; priority `0`
/// gives `10.0`. Negative priorities are not valid input: any integer
/// priority `<= -1` yields a negative weight.
pub fn priority_weight(priority: i64) -> f64 {
    1.0 / (priority as f64 + 0.1)
}

/// Count of [`KEYWORDS`] present in either the title or the description.
///
/// Each keyword counts at most once regardless of how often it appears.
///
/// ```rust
/// use taskai_core::rank::keyword_bonus;
///
/// assert_eq!(keyword_bonus("URGENT Bug fix", ""), 2.0);
/// assert_eq!(keyword_bonus("Plan meeting", "agenda"), 0.0);
/// ```
pub fn keyword_bonus(title: &str, description: &str) -> f64 {
    let title = title.to_lowercase();
    let description = description.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|kw| title.contains(*kw) || description.contains(*kw))
        .count() as f64
}

pub fn status_score(status: &TaskStatus) -> f64 {
    match status {
        TaskStatus::Pending => 1.0,
        TaskStatus::InProgress => 0.7,
        TaskStatus::Completed => 0.3,
        TaskStatus::Other(_) => 0.5,
    }
}

/// Remaining work as a fraction: `1.0` at 0%, `0.0` at 100%.
pub fn progress_score(progress: i64) -> f64 {
    (100.0 - progress as f64) / 100.0
}

/// Embed `reference` and `texts` in one batch and return the similarity of
/// each text to the reference.
async fn similarities_to(
    encoders: &Encoders,
    purpose: EncoderPurpose,
    reference: &str,
    texts: impl Iterator<Item = &str>,
) -> Result<Vec<f64>, RankError> {
    let mut batch = vec![reference.to_string()];
    batch.extend(texts.map(str::to_string));

    let vectors = encoders
        .get(purpose)
        .embed(&batch)
        .await
        .map_err(|source| RankError::Provider { purpose, source })?;

    if vectors.len() != batch.len() {
        return Err(RankError::ProviderShape {
            purpose,
            expected: batch.len(),
            got: vectors.len(),
        });
    }

    // Every vector must share the reference's non-zero dimension.
    let (reference_vec, text_vecs) = vectors.split_at(1);
    let reference_vec = &reference_vec[0];
    let dims = reference_vec.len();
    if let Some(bad) = vectors.iter().find(|v| v.is_empty() || v.len() != dims) {
        return Err(RankError::ProviderDims {
            purpose,
            expected: dims,
            got: bad.len(),
        });
    }

    Ok(text_vecs
        .iter()
        .map(|v| cosine_similarity(v, reference_vec) as f64)
        .collect())
}

/// Score and sort tasks, keeping the per-signal breakdown.
///
/// Results are sorted by `final_score` descending; ties keep input order.
/// An empty slice returns immediately without calling any provider.
pub async fn score_tasks<'a>(
    tasks: &'a [Task],
    mode: Mode,
    encoders: &Encoders,
) -> Result<Vec<ScoredTask<'a>>, RankError> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let profile = mode.profile();
    let titles = || tasks.iter().map(|t| t.title.as_str());
    let descriptions = tasks.iter().map(|t| t.description.as_str());

    let text = similarities_to(encoders, EncoderPurpose::General, profile.reference, titles()).await?;
    let difficulty = similarities_to(
        encoders,
        EncoderPurpose::Difficulty,
        DIFFICULTY_REFERENCE,
        descriptions,
    )
    .await?;
    let impact = similarities_to(
        encoders,
        EncoderPurpose::Impact,
        mode.impact_reference(),
        titles(),
    )
    .await?;

    let mut scored: Vec<ScoredTask<'a>> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let signals = Signals {
                text: text[i],
                difficulty: difficulty[i],
                impact: impact[i],
                priority: priority_weight(task.priority),
                keyword: keyword_bonus(&task.title, &task.description),
                status: status_score(&task.status),
                progress: progress_score(task.progress),
            };
            ScoredTask {
                task,
                signals,
                final_score: signals.weighted(&profile.weights),
            }
        })
        .collect();

    // `sort_by` is stable, so equal scores keep their input order.
    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    tracing::debug!(mode = %mode, tasks = scored.len(), "ranked tasks");

    Ok(scored)
}

/// Rank tasks for `mode`, returning them best-first.
///
/// Scores are discarded; use [`score_tasks`] to inspect them.
pub async fn rank(tasks: &[Task], mode: Mode, encoders: &Encoders) -> Result<Vec<Task>, RankError> {
    let scored = score_tasks(tasks, mode, encoders).await?;
    Ok(scored.into_iter().map(|s| s.task.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingProvider;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Same vector for every text, so every similarity is exactly 1.0.
    struct ConstantProvider {
        calls: AtomicUsize,
    }

    impl ConstantProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for ConstantProvider {
        fn model_name(&self) -> &str {
            "constant"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// Letter-frequency vectors: deterministic, text-dependent similarities.
    struct LetterProvider;

    #[async_trait]
    impl EmbeddingProvider for LetterProvider {
        fn model_name(&self) -> &str {
            "letters"
        }
        fn dims(&self) -> usize {
            26
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0f32; 26];
                    for c in t.to_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                        v[(c - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn model_name(&self) -> &str {
            "failing"
        }
        fn dims(&self) -> usize {
            0
        }
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            bail!("model unreachable")
        }
    }

    struct TruncatingProvider;

    #[async_trait]
    impl EmbeddingProvider for TruncatingProvider {
        fn model_name(&self) -> &str {
            "truncating"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
        }
    }

    /// 2-dim vector for the reference phrase, 3-dim for everything else.
    struct RaggedProvider;

    #[async_trait]
    impl EmbeddingProvider for RaggedProvider {
        fn model_name(&self) -> &str {
            "ragged"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, _)| if i == 0 { vec![1.0, 0.0] } else { vec![1.0, 0.0, 0.0] })
                .collect())
        }
    }

    struct EmptyVectorProvider;

    #[async_trait]
    impl EmbeddingProvider for EmptyVectorProvider {
        fn model_name(&self) -> &str {
            "empty"
        }
        fn dims(&self) -> usize {
            0
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| Vec::new()).collect())
        }
    }

    fn task(id: i64, title: &str, priority: i64, status: TaskStatus, progress: i64) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority,
            status,
            progress,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn scenario() -> Vec<Task> {
        vec![
            task(1, "Fix urgent bug", 1, TaskStatus::Pending, 0),
            task(2, "Plan meeting", 3, TaskStatus::Completed, 100),
            task(3, "Deadline today", 1, TaskStatus::InProgress, 50),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_priority_weight_offset() {
        assert!((priority_weight(0) - 10.0).abs() < 1e-12);
        assert!((priority_weight(1) - 1.0 / 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_priority_weight_monotonic() {
        for p in 0..50 {
            assert!(priority_weight(p) > priority_weight(p + 1));
        }
    }

    #[test]
    fn test_progress_score_bounds() {
        assert_eq!(progress_score(0), 1.0);
        assert_eq!(progress_score(100), 0.0);
        assert_eq!(progress_score(50), 0.5);
    }

    #[test]
    fn test_progress_score_extreme_values() {
        assert!(progress_score(i64::MIN) > 0.0);
        assert!(progress_score(i64::MAX) < 0.0);
        assert!(progress_score(i64::MIN).is_finite());
    }

    #[tokio::test]
    async fn test_extreme_progress_from_json_ranks() {
        let tasks = crate::models::tasks_from_json(
            r#"[{"title": "Odd", "description": "", "priority": 1, "progress": -9223372036854775808}]"#,
        )
        .unwrap();
        let encoders = Encoders::uniform(ConstantProvider::new());

        let scored = score_tasks(&tasks, Mode::Progress, &encoders).await.unwrap();
        assert!(scored[0].final_score.is_finite());
    }

    #[test]
    fn test_keyword_bonus() {
        assert_eq!(keyword_bonus("Plan meeting", "discuss roadmap"), 0.0);
        assert_eq!(keyword_bonus("URGENT Bug fix", ""), 2.0);
        // Counted once even when present in both fields.
        assert_eq!(keyword_bonus("bug", "another bug"), 1.0);
        assert_eq!(keyword_bonus("Laporan", "kirim BESOK, Hari Ini rapat"), 2.0);
        assert_eq!(keyword_bonus("", "Error 500 di login"), 1.0);
    }

    #[test]
    fn test_status_score() {
        assert_eq!(status_score(&TaskStatus::Pending), 1.0);
        assert_eq!(status_score(&TaskStatus::InProgress), 0.7);
        assert_eq!(status_score(&TaskStatus::Completed), 0.3);
        assert_eq!(status_score(&TaskStatus::Other("Blocked".into())), 0.5);
    }

    #[tokio::test]
    async fn test_scenario_pinned_scores() {
        let tasks = scenario();
        let encoders = Encoders::uniform(ConstantProvider::new());

        let scored = score_tasks(&tasks, Mode::Urgent, &encoders).await.unwrap();
        let order: Vec<i64> = scored.iter().map(|s| s.task.id).collect();
        assert_eq!(order, vec![1, 3, 2]);

        // 0.4*1 + 0.3/1.1 + 0.3*2 + 0.2*1.0 + 0.2*1.0
        let a = 0.4 + 0.3 / 1.1 + 0.6 + 0.2 + 0.2;
        // 0.4*1 + 0.3/1.1 + 0.3*1 + 0.2*0.7 + 0.2*0.5
        let c = 0.4 + 0.3 / 1.1 + 0.3 + 0.14 + 0.1;
        // 0.4*1 + 0.3/3.1 + 0 + 0.2*0.3 + 0
        let b = 0.4 + 0.3 / 3.1 + 0.06;

        assert!((scored[0].final_score - a).abs() < 1e-9, "{}", scored[0].final_score);
        assert!((scored[1].final_score - c).abs() < 1e-9, "{}", scored[1].final_score);
        assert!((scored[2].final_score - b).abs() < 1e-9, "{}", scored[2].final_score);
        assert_eq!(scored[0].signals.keyword, 2.0);
    }

    #[tokio::test]
    async fn test_rank_returns_permutation() {
        let tasks = vec![
            task(1, "Update API docs", 2, TaskStatus::Pending, 0),
            task(2, "Fix bug in backend", 1, TaskStatus::InProgress, 75),
            task(3, "Team sync", 2, TaskStatus::Pending, 0),
            task(4, "Submit report", 1, TaskStatus::Completed, 100),
            task(5, "Design review", 3, TaskStatus::Other("Blocked".into()), 10),
        ];
        let encoders = Encoders::uniform(Arc::new(LetterProvider));

        let ranked = rank(&tasks, Mode::Daily, &encoders).await.unwrap();
        let mut got = ids(&ranked);
        got.sort();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_rank_deterministic() {
        let tasks = scenario();
        let encoders = Encoders::uniform(Arc::new(LetterProvider));

        for mode in Mode::ALL {
            let first = rank(&tasks, mode, &encoders).await.unwrap();
            let second = rank(&tasks, mode, &encoders).await.unwrap();
            assert_eq!(ids(&first), ids(&second), "mode {}", mode);
        }
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let tasks = vec![
            task(7, "Same", 2, TaskStatus::Pending, 10),
            task(3, "Same", 2, TaskStatus::Pending, 10),
            task(5, "Same", 2, TaskStatus::Pending, 10),
        ];
        let encoders = Encoders::uniform(ConstantProvider::new());

        let ranked = rank(&tasks, Mode::Progress, &encoders).await.unwrap();
        assert_eq!(ids(&ranked), vec![7, 3, 5]);
    }

    #[tokio::test]
    async fn test_each_encoder_called_once() {
        let general = ConstantProvider::new();
        let difficulty = ConstantProvider::new();
        let impact = ConstantProvider::new();
        let encoders = Encoders::new(general.clone(), difficulty.clone(), impact.clone());

        let tasks = scenario();
        rank(&tasks, Mode::Impact, &encoders).await.unwrap();

        assert_eq!(general.calls.load(Ordering::SeqCst), 1);
        assert_eq!(difficulty.calls.load(Ordering::SeqCst), 1);
        assert_eq!(impact.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let provider = ConstantProvider::new();
        let encoders = Encoders::uniform(provider.clone());

        let ranked = rank(&[], Mode::Urgent, &encoders).await.unwrap();
        assert!(ranked.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_fails_batch() {
        let encoders = Encoders::new(
            ConstantProvider::new(),
            Arc::new(FailingProvider),
            ConstantProvider::new(),
        );

        let err = rank(&scenario(), Mode::Urgent, &encoders).await.unwrap_err();
        match err {
            RankError::Provider { purpose, .. } => assert_eq!(purpose, EncoderPurpose::Difficulty),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_provider_response_rejected() {
        let encoders = Encoders::uniform(Arc::new(TruncatingProvider));

        let err = rank(&scenario(), Mode::Urgent, &encoders).await.unwrap_err();
        assert!(matches!(
            err,
            RankError::ProviderShape {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_mixed_dimension_vectors_rejected() {
        let encoders = Encoders::uniform(Arc::new(RaggedProvider));

        let err = rank(&scenario(), Mode::Urgent, &encoders).await.unwrap_err();
        match err {
            RankError::ProviderDims {
                purpose,
                expected,
                got,
            } => {
                assert_eq!(purpose, EncoderPurpose::General);
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_vectors_rejected() {
        let encoders = Encoders::uniform(Arc::new(EmptyVectorProvider));

        let err = rank(&scenario(), Mode::Daily, &encoders).await.unwrap_err();
        assert!(matches!(err, RankError::ProviderDims { got: 0, .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_provider_error_message_not_repeated() {
        let encoders = Encoders::uniform(Arc::new(FailingProvider));

        let err = rank(&scenario(), Mode::Urgent, &encoders).await.unwrap_err();
        assert_eq!(err.to_string(), "general embedding provider failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "model unreachable");
    }

    #[tokio::test]
    async fn test_zero_priority_does_not_panic() {
        let tasks = vec![
            task(1, "Zero", 0, TaskStatus::Pending, 0),
            task(2, "One", 1, TaskStatus::Pending, 0),
        ];
        let encoders = Encoders::uniform(ConstantProvider::new());

        let scored = score_tasks(&tasks, Mode::Urgent, &encoders).await.unwrap();
        assert_eq!(scored[0].task.id, 1);
        assert!((scored[0].signals.priority - 10.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_impact_mode_uses_impact_signal() {
        let tasks = scenario();
        let encoders = Encoders::uniform(ConstantProvider::new());

        let scored = score_tasks(&tasks, Mode::Impact, &encoders).await.unwrap();
        for s in &scored {
            assert_eq!(s.signals.impact, 1.0);
            let expected = s.signals.weighted(&Mode::Impact.profile().weights);
            assert_eq!(s.final_score, expected);
        }
    }
}
