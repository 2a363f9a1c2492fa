//! Evaluator framework for multi-perspective action assessment.
//!
//! Defines the [`Evaluator`] trait and the [`Verdict`] it returns. Each
//! framework keeps its own verdict shape ([`VerdictKind`]); all of them
//! reduce to a single `supports` signal for consensus.

pub mod frameworks;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Action, EvaluationContext};

/// A rule that was broken without an applicable exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Rule name.
    pub rule: String,
    /// Rule weight subtracted from the score.
    pub weight: f64,
    /// Why breaking this rule matters.
    pub explanation: String,
}

/// A trait found expressed, or its vice found expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitFinding {
    /// Trait name.
    pub name: String,
    /// Absolute expression degree.
    pub degree: f64,
    /// Trait description, or the vice shown for violations.
    pub description: String,
}

/// Sub-scores of the relational evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareBreakdown {
    /// Does the action strengthen or damage existing relationships?
    pub relationships: f64,
    /// Does the action protect those who are vulnerable?
    pub vulnerable: f64,
    /// Does the action show attentive care?
    pub attentiveness: f64,
    /// Does the agent take appropriate responsibility?
    pub responsibility: f64,
    /// Unweighted mean of the four sub-scores.
    pub score: f64,
    /// Score the mean must exceed to support the action.
    pub threshold: f64,
}

/// Framework-specific verdict payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum VerdictKind {
    /// Signed aggregate utility.
    Utility {
        /// Weighted sum before the uncertainty discount.
        raw: f64,
        /// Utility after the uncertainty discount.
        adjusted: f64,
    },
    /// Rule permissibility.
    Deontic {
        /// 1.0 minus violation weights, floored at -1.0.
        score: f64,
        /// Unexcepted violations in registry order.
        violations: Vec<RuleViolation>,
        /// Whether the maxim could be willed as universal law.
        universalizable: bool,
    },
    /// Trait tally.
    Character {
        /// Traits expressed.
        expressed: Vec<TraitFinding>,
        /// Traits whose vice was expressed.
        violated: Vec<TraitFinding>,
        /// Reflective question for the agent.
        advice: String,
    },
    /// Relational composite index.
    Care(CareBreakdown),
    /// Generic score for evaluators outside the reference four.
    Scored {
        /// Evaluator-defined score.
        score: f64,
        /// Whether the evaluator supports the action.
        supports: bool,
    },
    /// Neutral fallback after an internal failure.
    Degraded {
        /// What failed.
        reason: String,
    },
}

/// Machine-readable reduction of a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Numeric score, if the shape has one.
    pub score: Option<f64>,
    /// Named flags (violated rules, expressed or violated traits).
    pub flags: Vec<String>,
}

/// A verdict returned by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Framework-specific payload.
    pub kind: VerdictKind,
    /// Explanation for audit.
    pub rationale: String,
}

impl Verdict {
    /// Creates a verdict.
    pub fn new(kind: VerdictKind, rationale: impl Into<String>) -> Self {
        Self {
            kind,
            rationale: rationale.into(),
        }
    }

    /// Creates a generic scored verdict.
    pub fn scored(score: f64, supports: bool, rationale: impl Into<String>) -> Self {
        Self::new(VerdictKind::Scored { score, supports }, rationale)
    }

    /// Creates a neutral verdict tagged as degraded.
    pub fn degraded(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let rationale = format!("degraded: {}", reason);
        Self::new(VerdictKind::Degraded { reason }, rationale)
    }

    /// Whether the evaluator supports the action.
    pub fn supports(&self) -> bool {
        match &self.kind {
            VerdictKind::Utility { adjusted, .. } => *adjusted > 0.0,
            VerdictKind::Deontic { violations, .. } => violations.is_empty(),
            VerdictKind::Character {
                expressed, violated, ..
            } => expressed.len() > violated.len(),
            VerdictKind::Care(care) => care.score > care.threshold,
            VerdictKind::Scored { supports, .. } => *supports,
            VerdictKind::Degraded { .. } => false,
        }
    }

    /// Returns true if this verdict is a degraded fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self.kind, VerdictKind::Degraded { .. })
    }

    /// Score and flags for machine consumers.
    pub fn signal(&self) -> Signal {
        match &self.kind {
            VerdictKind::Utility { adjusted, .. } => Signal {
                score: Some(*adjusted),
                flags: Vec::new(),
            },
            VerdictKind::Deontic {
                score, violations, ..
            } => Signal {
                score: Some(*score),
                flags: violations.iter().map(|v| v.rule.clone()).collect(),
            },
            VerdictKind::Character {
                expressed, violated, ..
            } => Signal {
                score: Some(expressed.len() as f64 - violated.len() as f64),
                flags: expressed
                    .iter()
                    .map(|t| format!("expressed:{}", t.name))
                    .chain(violated.iter().map(|t| format!("violated:{}", t.name)))
                    .collect(),
            },
            VerdictKind::Care(care) => Signal {
                score: Some(care.score),
                flags: Vec::new(),
            },
            VerdictKind::Scored { score, .. } => Signal {
                score: Some(*score),
                flags: Vec::new(),
            },
            VerdictKind::Degraded { .. } => Signal {
                score: Some(0.0),
                flags: Vec::new(),
            },
        }
    }

    /// Short verdict word in the framework's own vocabulary.
    pub fn label(&self) -> &'static str {
        let supports = self.supports();
        match (&self.kind, supports) {
            (VerdictKind::Utility { .. }, true) => "Positive",
            (VerdictKind::Utility { .. }, false) => "Negative",
            (VerdictKind::Deontic { .. }, true) => "Permissible",
            (VerdictKind::Deontic { .. }, false) => "Prohibited",
            (VerdictKind::Character { .. }, true) => "Virtuous",
            (VerdictKind::Character { .. }, false) => "Vicious",
            (VerdictKind::Care(_), true) => "Caring",
            (VerdictKind::Care(_), false) => "Careless",
            (VerdictKind::Scored { .. }, true) => "Supports",
            (VerdictKind::Scored { .. }, false) => "Opposes",
            (VerdictKind::Degraded { .. }, _) => "Degraded",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            VerdictKind::Degraded { reason } => write!(f, "{}: {}", self.label(), reason),
            _ => write!(f, "{}: {}", self.label(), self.rationale),
        }
    }
}

/// Trait for value-framework evaluators.
///
/// Implementations must be pure: the same action and context always
/// produce the same verdict, and no state carries over between calls.
/// Internal failures must come back as [`Verdict::degraded`], never as
/// a panic.
///
/// # Implementors
///
/// - [`frameworks::Consequentialist`]: aggregate utility
/// - [`frameworks::Deontologist`]: weighted rules with exceptions
/// - [`frameworks::VirtueEthicist`]: trait expression tally
/// - [`frameworks::CareEthicist`]: relational composite
pub trait Evaluator: Send + Sync {
    /// Returns the name of this evaluator.
    fn name(&self) -> &str;

    /// Returns a description of this evaluator's value framework.
    fn framework(&self) -> &str;

    /// Evaluates `action` in `context`.
    fn evaluate(&self, action: &Action, context: &EvaluationContext<'_>) -> Verdict;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn care(score: f64) -> Verdict {
        Verdict::new(
            VerdictKind::Care(CareBreakdown {
                relationships: score,
                vulnerable: score,
                attentiveness: score,
                responsibility: score,
                score,
                threshold: 0.5,
            }),
            "test",
        )
    }

    #[test]
    fn test_utility_supports_only_when_positive() {
        let pos = Verdict::new(VerdictKind::Utility { raw: 0.2, adjusted: 0.1 }, "");
        let zero = Verdict::new(VerdictKind::Utility { raw: 0.0, adjusted: 0.0 }, "");
        assert!(pos.supports());
        assert!(!zero.supports());
        assert_eq!(pos.label(), "Positive");
    }

    #[test]
    fn test_deontic_supports_without_violations() {
        let clean = Verdict::new(
            VerdictKind::Deontic {
                score: 1.0,
                violations: vec![],
                universalizable: true,
            },
            "",
        );
        let broken = Verdict::new(
            VerdictKind::Deontic {
                score: 0.2,
                violations: vec![RuleViolation {
                    rule: "do_not_lie".to_string(),
                    weight: 0.8,
                    explanation: "".to_string(),
                }],
                universalizable: true,
            },
            "",
        );
        assert!(clean.supports());
        assert!(!broken.supports());
        assert_eq!(broken.signal().flags, vec!["do_not_lie".to_string()]);
    }

    #[test]
    fn test_character_tie_does_not_support() {
        let finding = |n: &str| TraitFinding {
            name: n.to_string(),
            degree: 0.6,
            description: String::new(),
        };
        let tie = Verdict::new(
            VerdictKind::Character {
                expressed: vec![finding("courage")],
                violated: vec![finding("honesty")],
                advice: String::new(),
            },
            "",
        );
        assert!(!tie.supports());
        assert_eq!(
            tie.signal().flags,
            vec!["expressed:courage".to_string(), "violated:honesty".to_string()]
        );
    }

    #[test]
    fn test_care_threshold_is_strict() {
        assert!(!care(0.5).supports());
        assert!(care(0.51).supports());
    }

    #[test]
    fn test_degraded_is_neutral() {
        let v = Verdict::degraded("classifier timeout");
        assert!(!v.supports());
        assert!(v.is_degraded());
        assert_eq!(v.signal().score, Some(0.0));
        assert!(v.signal().flags.is_empty());
        assert!(v.rationale.starts_with("degraded:"));
    }

    #[test]
    fn test_display_includes_label() {
        let v = Verdict::scored(0.9, true, "custom check passed");
        assert_eq!(v.to_string(), "Supports: custom check passed");
    }

    #[test]
    fn test_verdict_serialization_is_tagged() {
        let v = Verdict::new(VerdictKind::Utility { raw: 0.5, adjusted: 0.4 }, "ok");
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains(r#""shape":"utility""#));
        let back: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
