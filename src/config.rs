//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/taskai.sqlite"
//!
//! [embedding]
//! provider = "local"            # disabled | openai | ollama | local
//! model = "all-minilm-l6-v2"
//!
//! [embedding.difficulty]        # optional, defaults to [embedding]
//! provider = "local"
//! model = "bge-small-en-v1.5"
//!
//! [ranking]
//! default_mode = "urgent"
//! timeout_secs = 60
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use taskai_core::embedding::EncoderPurpose;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Embedding settings: the general encoder, plus optional per-purpose
/// overrides for the difficulty and impact encoders.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EmbeddingConfig {
    #[serde(flatten)]
    pub general: EncoderConfig,
    #[serde(default)]
    pub difficulty: Option<EncoderConfig>,
    #[serde(default)]
    pub impact: Option<EncoderConfig>,
}

impl EmbeddingConfig {
    /// Settings for `purpose`, falling back to the general encoder.
    pub fn for_purpose(&self, purpose: EncoderPurpose) -> &EncoderConfig {
        match purpose {
            EncoderPurpose::General => &self.general,
            EncoderPurpose::Difficulty => self.difficulty.as_ref().unwrap_or(&self.general),
            EncoderPurpose::Impact => self.impact.as_ref().unwrap_or(&self.general),
        }
    }
}

/// Settings for one embedding provider instance.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EncoderConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    /// Mode used when `recommend` is called without `--mode`.
    #[serde(default = "default_mode")]
    pub default_mode: String,
    /// Upper bound for one whole recommendation batch.
    #[serde(default = "default_ranking_timeout")]
    pub timeout_secs: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            timeout_secs: default_ranking_timeout(),
        }
    }
}

fn default_mode() -> String {
    "urgent".to_string()
}
fn default_ranking_timeout() -> u64 {
    60
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ranking.timeout_secs == 0 {
        bail!("ranking.timeout_secs must be > 0");
    }

    for purpose in [
        EncoderPurpose::General,
        EncoderPurpose::Difficulty,
        EncoderPurpose::Impact,
    ] {
        validate_encoder(purpose, config.embedding.for_purpose(purpose))?;
    }

    Ok(config)
}

fn validate_encoder(purpose: EncoderPurpose, enc: &EncoderConfig) -> Result<()> {
    let section = match purpose {
        EncoderPurpose::General => "embedding".to_string(),
        other => format!("embedding.{}", other),
    };

    match enc.provider.as_str() {
        "disabled" | "local" => {}
        "openai" | "ollama" => {
            if enc.model.is_none() {
                bail!(
                    "{}.model must be specified when provider is '{}'",
                    section,
                    enc.provider
                );
            }
            if enc.dims.is_none() || enc.dims == Some(0) {
                bail!(
                    "{}.dims must be > 0 when provider is '{}'",
                    section,
                    enc.provider
                );
            }
        }
        other => bail!(
            "Unknown embedding provider in [{}]: '{}'. Must be disabled, openai, ollama, or local.",
            section,
            other
        ),
    }

    if enc.batch_size == 0 {
        bail!("{}.batch_size must be > 0", section);
    }

    Ok(())
}
