//! Embedding provider trait and similarity.
//!
//! Defines the [`EmbeddingProvider`] trait that all embedding backends
//! implement, the [`Encoders`] bundle the scorer consumes, and
//! [`cosine_similarity`].
//!
//! Concrete provider implementations (OpenAI, Ollama, fastembed) live in
//! the `taskai` app crate.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Implementations are created by the application once per ranking call
/// and passed to the scorer through [`Encoders`]. Creating a provider may
/// be expensive (model download, weights load); `embed` should reuse
/// whatever the first call set up.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// What an encoder is used for during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPurpose {
    /// Title vs. mode reference phrase.
    General,
    /// Description vs. "difficult task".
    Difficulty,
    /// Title vs. "high impact" / "low impact".
    Impact,
}

impl fmt::Display for EncoderPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncoderPurpose::General => "general",
            EncoderPurpose::Difficulty => "difficulty",
            EncoderPurpose::Impact => "impact",
        })
    }
}

/// The three encoders the scorer uses, keyed by purpose.
///
/// Each may be backed by a different model, so similarities produced by one
/// are not comparable with another's.
#[derive(Clone)]
pub struct Encoders {
    pub general: Arc<dyn EmbeddingProvider>,
    pub difficulty: Arc<dyn EmbeddingProvider>,
    pub impact: Arc<dyn EmbeddingProvider>,
}

impl Encoders {
    pub fn new(
        general: Arc<dyn EmbeddingProvider>,
        difficulty: Arc<dyn EmbeddingProvider>,
        impact: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            general,
            difficulty,
            impact,
        }
    }

    /// Use one provider for every purpose.
    pub fn uniform(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            general: provider.clone(),
            difficulty: provider.clone(),
            impact: provider,
        }
    }

    pub fn get(&self, purpose: EncoderPurpose) -> &dyn EmbeddingProvider {
        match purpose {
            EncoderPurpose::General => self.general.as_ref(),
            EncoderPurpose::Difficulty => self.difficulty.as_ref(),
            EncoderPurpose::Impact => self.impact.as_ref(),
        }
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or
/// zero-magnitude vectors.
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    (dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_purpose_display() {
        assert_eq!(EncoderPurpose::Difficulty.to_string(), "difficulty");
    }
}
