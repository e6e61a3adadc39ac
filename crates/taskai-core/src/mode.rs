//! Ranking modes and their scoring profiles.
//!
//! A [`Mode`] selects a reference phrase (what the task title is compared
//! against) and a [`WeightVector`] (how the seven signals are combined).
//!
//! | Mode | Reference phrase |
//! |------|------------------|
//! | `urgent` | "tasks with an urgent deadline" |
//! | `daily` | "daily tasks" |
//! | `progress` | "tasks nearly complete that need finishing" |
//! | `impact` | "tasks with high impact" |
//!
//! The weight vectors are not normalized: `urgent` sums to 1.4.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Named ranking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Urgent,
    Daily,
    Progress,
    Impact,
}

/// Per-signal weights. A weight of `0.0` drops the signal from the sum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeightVector {
    pub text: f64,
    pub difficulty: f64,
    pub impact: f64,
    pub priority: f64,
    pub keyword: f64,
    pub status: f64,
    pub progress: f64,
}

#[cfg(test)]
impl WeightVector {
    fn total(&self) -> f64 {
        self.text
            + self.difficulty
            + self.impact
            + self.priority
            + self.keyword
            + self.status
            + self.progress
    }
}

/// Reference phrase and weights for one mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub reference: &'static str,
    pub weights: WeightVector,
}

const URGENT: ModeProfile = ModeProfile {
    reference: "tasks with an urgent deadline",
    weights: WeightVector {
        text: 0.4,
        difficulty: 0.0,
        impact: 0.0,
        priority: 0.3,
        keyword: 0.3,
        status: 0.2,
        progress: 0.2,
    },
};

const DAILY: ModeProfile = ModeProfile {
    reference: "daily tasks",
    weights: WeightVector {
        text: 0.3,
        difficulty: 0.3,
        impact: 0.0,
        priority: 0.2,
        keyword: 0.0,
        status: 0.2,
        progress: 0.1,
    },
};

const PROGRESS: ModeProfile = ModeProfile {
    reference: "tasks nearly complete that need finishing",
    weights: WeightVector {
        text: 0.2,
        difficulty: 0.0,
        impact: 0.0,
        priority: 0.2,
        keyword: 0.0,
        status: 0.3,
        progress: 0.5,
    },
};

const IMPACT: ModeProfile = ModeProfile {
    reference: "tasks with high impact",
    weights: WeightVector {
        text: 0.3,
        difficulty: 0.0,
        impact: 0.4,
        priority: 0.2,
        keyword: 0.0,
        status: 0.2,
        progress: 0.1,
    },
};

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Urgent, Mode::Daily, Mode::Progress, Mode::Impact];

    /// Resolve a user-supplied mode name, falling back to [`Mode::Urgent`].
    ///
    /// This is the one place where unknown names are tolerated; everything
    /// past this boundary works with the enum.
    ///
    /// ```rust
    /// use taskai_core::mode::Mode;
    ///
    /// assert_eq!(Mode::resolve("impact"), Mode::Impact);
    /// assert_eq!(Mode::resolve("foo"), Mode::Urgent);
    /// ```
    pub fn resolve(name: &str) -> Mode {
        match name.parse() {
            Ok(mode) => mode,
            Err(_) => {
                tracing::debug!(mode = name, "unknown ranking mode, using urgent");
                Mode::Urgent
            }
        }
    }

    pub fn profile(self) -> &'static ModeProfile {
        match self {
            Mode::Urgent => &URGENT,
            Mode::Daily => &DAILY,
            Mode::Progress => &PROGRESS,
            Mode::Impact => &IMPACT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Urgent => "urgent",
            Mode::Daily => "daily",
            Mode::Progress => "progress",
            Mode::Impact => "impact",
        }
    }

    /// Phrase the impact encoder compares titles against.
    pub fn impact_reference(self) -> &'static str {
        if self == Mode::Impact {
            "high impact"
        } else {
            "low impact"
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Ok(Mode::Urgent),
            "daily" => Ok(Mode::Daily),
            "progress" => Ok(Mode::Progress),
            "impact" => Ok(Mode::Impact),
            other => Err(format!(
                "Unknown ranking mode: '{}'. Use urgent, daily, progress, or impact.",
                other
            )),
        }
    }
}
