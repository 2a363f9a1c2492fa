//! Consensus classification over evaluator support signals.
//!
//! Unweighted and order-independent: only the number of supporting
//! evaluators `k` out of `n` matters. Five bands:
//!
//! | Band               | Condition        |
//! |--------------------|------------------|
//! | `STRONG_SUPPORT`   | `k == n`         |
//! | `MODERATE_SUPPORT` | `n/2 < k < n`    |
//! | `DIVIDED`          | `2k == n`        |
//! | `WEAK_SUPPORT`     | `0 < k < n/2`    |
//! | `STRONG_OPPOSITION`| `k == 0`         |
//!
//! With four evaluators this is 4/3/2/1/0. For other sizes the bands are
//! split at the exact midpoint; `DIVIDED` only exists for even `n`. When
//! `n == 1` or `n == 2` the unanimous bands take precedence (`k == n` and
//! `k == 0` are checked first).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CouncilError;
use crate::normalize::EvaluatorOutcome;
use crate::Result;

/// Ordinal agreement level, weakest support first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsensusLevel {
    /// Every evaluator opposes.
    StrongOpposition,
    /// A minority supports.
    WeakSupport,
    /// Exactly half support.
    Divided,
    /// A majority, but not all, supports.
    ModerateSupport,
    /// Every evaluator supports.
    StrongSupport,
}

impl ConsensusLevel {
    /// Classifies `k` supporters out of `n` evaluators.
    ///
    /// Returns `None` when `n == 0` or `k > n`.
    pub fn classify(k: usize, n: usize) -> Option<Self> {
        if n == 0 || k > n {
            return None;
        }
        let level = if k == n {
            Self::StrongSupport
        } else if k == 0 {
            Self::StrongOpposition
        } else if 2 * k == n {
            Self::Divided
        } else if 2 * k > n {
            Self::ModerateSupport
        } else {
            Self::WeakSupport
        };
        Some(level)
    }

    /// Stable identifier, e.g. `STRONG_SUPPORT`.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::StrongOpposition => "STRONG_OPPOSITION",
            Self::WeakSupport => "WEAK_SUPPORT",
            Self::Divided => "DIVIDED",
            Self::ModerateSupport => "MODERATE_SUPPORT",
            Self::StrongSupport => "STRONG_SUPPORT",
        }
    }

    /// Human-readable description.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::StrongOpposition => "every perspective opposes the action",
            Self::WeakSupport => "most perspectives oppose the action",
            Self::Divided => "no clear consensus",
            Self::ModerateSupport => "a majority supports the action, with dissent",
            Self::StrongSupport => "every perspective supports the action",
        }
    }
}

impl fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier(), self.describe())
    }
}

/// Support counts across all evaluators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportTally {
    /// Evaluators supporting the action.
    pub supporting: usize,
    /// Evaluators opposing it, degraded ones included.
    pub opposing: usize,
    /// Evaluators that fell back to a neutral verdict.
    pub degraded: usize,
    /// Total evaluators.
    pub total: usize,
}

impl SupportTally {
    /// Counts a support vector.
    pub fn from_supports(supports: &[bool]) -> Self {
        let supporting = supports.iter().filter(|s| **s).count();
        Self {
            supporting,
            opposing: supports.len() - supporting,
            degraded: 0,
            total: supports.len(),
        }
    }

    /// Counts evaluator outcomes.
    pub fn from_outcomes(outcomes: &BTreeMap<String, EvaluatorOutcome>) -> Self {
        let supports: Vec<bool> = outcomes.values().map(EvaluatorOutcome::supports).collect();
        Self {
            degraded: outcomes.values().filter(|o| o.raw.is_degraded()).count(),
            ..Self::from_supports(&supports)
        }
    }

    /// Fraction of evaluators supporting the action.
    pub fn support_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.supporting as f64 / self.total as f64
        }
    }

    /// Classifies the tally.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::ConsensusFailure`] for an empty tally.
    pub fn level(&self) -> Result<ConsensusLevel> {
        ConsensusLevel::classify(self.supporting, self.total).ok_or_else(|| {
            CouncilError::ConsensusFailure("no evaluator verdicts to aggregate".to_string())
        })
    }
}

impl fmt::Display for SupportTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} supporting", self.supporting, self.total)?;
        if self.degraded > 0 {
            write!(f, " ({} degraded)", self.degraded)?;
        }
        Ok(())
    }
}

/// Classifies a support vector.
pub fn classify(supports: &[bool]) -> Result<ConsensusLevel> {
    SupportTally::from_supports(supports).level()
}
