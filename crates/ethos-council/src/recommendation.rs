//! Recommendation synthesis.
//!
//! A fixed decision table over the consensus level and the risk flags,
//! evaluated top to bottom, first match wins:
//!
//! | # | Condition                         | Outcome                |
//! |---|-----------------------------------|------------------------|
//! | 1 | `STRONG_SUPPORT` and no flags     | `RECOMMENDED`          |
//! | 2 | `STRONG_OPPOSITION`               | `NOT_RECOMMENDED`      |
//! | 3 | any flag                          | `PROCEED_WITH_CAUTION` |
//! | 4 | `DIVIDED`                         | `GENUINE_DILEMMA`      |
//! | 5 | otherwise                         | `CONTEXTUAL_DECISION`  |
//!
//! Flags override a moderate or weak consensus but never strong opposition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusLevel;
use crate::risk::RiskFlag;

/// Final guidance for a human or upstream controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// All perspectives agree and nothing looks risky.
    Recommended,
    /// All perspectives oppose.
    NotRecommended,
    /// Risk flags were raised.
    ProceedWithCaution {
        /// Number of flags raised.
        flag_count: usize,
    },
    /// Perspectives are split evenly; deliberation is needed.
    GenuineDilemma,
    /// Partial agreement; the decision depends on context.
    ContextualDecision,
}

impl Recommendation {
    /// Applies the decision table.
    pub fn synthesize(level: ConsensusLevel, flags: &[RiskFlag]) -> Self {
        match level {
            ConsensusLevel::StrongSupport if flags.is_empty() => Self::Recommended,
            ConsensusLevel::StrongOpposition => Self::NotRecommended,
            _ if !flags.is_empty() => Self::ProceedWithCaution {
                flag_count: flags.len(),
            },
            ConsensusLevel::Divided => Self::GenuineDilemma,
            _ => Self::ContextualDecision,
        }
    }

    /// Stable identifier, e.g. `PROCEED_WITH_CAUTION`.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Recommended => "RECOMMENDED",
            Self::NotRecommended => "NOT_RECOMMENDED",
            Self::ProceedWithCaution { .. } => "PROCEED_WITH_CAUTION",
            Self::GenuineDilemma => "GENUINE_DILEMMA",
            Self::ContextualDecision => "CONTEXTUAL_DECISION",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recommended => write!(f, "RECOMMENDED: strong consensus and no significant risks"),
            Self::NotRecommended => write!(f, "NOT RECOMMENDED: consensus against the action"),
            Self::ProceedWithCaution { flag_count } => write!(
                f,
                "PROCEED WITH CAUTION: {} risk factor(s) identified",
                flag_count
            ),
            Self::GenuineDilemma => write!(f, "GENUINE DILEMMA: requires deeper deliberation"),
            Self::ContextualDecision => write!(f, "CONTEXTUAL DECISION: weigh the specific factors"),
        }
    }
}

/// Shorthand for [`Recommendation::synthesize`].
pub fn synthesize(level: ConsensusLevel, flags: &[RiskFlag]) -> Recommendation {
    Recommendation::synthesize(level, flags)
}
