//! Verdict normalization.
//!
//! Reduces each framework-specific verdict to a support bit and a one-line
//! summary. The raw verdict travels alongside so nothing is lost.

use serde::{Deserialize, Serialize};

use crate::evaluator::Verdict;

/// Common view of any verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedVerdict {
    /// Whether the evaluator supports the action.
    pub supports: bool,
    /// Framework label followed by the rationale.
    pub summary: String,
}

/// One evaluator's contribution to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorOutcome {
    /// Evaluator display name.
    pub evaluator: String,
    /// Description of the evaluator's value framework.
    pub framework: String,
    /// Normalized view used for consensus.
    pub normalized: NormalizedVerdict,
    /// Full verdict for audit.
    pub raw: Verdict,
}

impl EvaluatorOutcome {
    /// Normalizes `raw` and bundles it with the evaluator's identity.
    pub fn new(evaluator: impl Into<String>, framework: impl Into<String>, raw: Verdict) -> Self {
        Self {
            evaluator: evaluator.into(),
            framework: framework.into(),
            normalized: normalize(&raw),
            raw,
        }
    }

    /// Shortcut for `normalized.supports`.
    pub fn supports(&self) -> bool {
        self.normalized.supports
    }
}

/// Maps a verdict to `(supports, summary)`.
pub fn normalize(verdict: &Verdict) -> NormalizedVerdict {
    NormalizedVerdict {
        supports: verdict.supports(),
        summary: verdict.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::VerdictKind;

    #[test]
    fn test_normalize_utility() {
        let v = Verdict::new(
            VerdictKind::Utility { raw: 0.41, adjusted: 0.328 },
            "Maximizes aggregate wellbeing",
        );
        let n = normalize(&v);
        assert!(n.supports);
        assert_eq!(n.summary, "Positive: Maximizes aggregate wellbeing");
    }

    #[test]
    fn test_normalize_degraded() {
        let n = normalize(&Verdict::degraded("timeout"));
        assert!(!n.supports);
        assert_eq!(n.summary, "Degraded: timeout");
    }

    #[test]
    fn test_outcome_keeps_raw() {
        let raw = Verdict::scored(-0.2, false, "custom");
        let outcome = EvaluatorOutcome::new("Custom", "Custom framework", raw.clone());
        assert_eq!(outcome.raw, raw);
        assert!(!outcome.supports());
        assert_eq!(outcome.evaluator, "Custom");
    }
}
