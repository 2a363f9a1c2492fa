//! Evaluation report.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consensus::{ConsensusLevel, SupportTally};
use crate::normalize::EvaluatorOutcome;
use crate::recommendation::Recommendation;
use crate::risk::RiskFlag;
use crate::Result;

/// Result of one council evaluation.
///
/// Built fresh for every call and never mutated afterwards. All maps are
/// ordered by evaluator id, so two evaluations of the same inputs serialize
/// to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Name of the evaluated action.
    pub action: String,
    /// Uncertainty of the evaluated action.
    pub uncertainty: f64,
    /// Outcome per evaluator id.
    pub per_evaluator: BTreeMap<String, EvaluatorOutcome>,
    /// Support counts.
    pub tally: SupportTally,
    /// Agreement level across evaluators.
    pub consensus_level: ConsensusLevel,
    /// Flags in detection order.
    pub risk_flags: Vec<RiskFlag>,
    /// Synthesized guidance.
    pub recommendation: Recommendation,
}

impl EvaluationReport {
    /// Looks up one evaluator's outcome.
    pub fn outcome(&self, evaluator_id: &str) -> Option<&EvaluatorOutcome> {
        self.per_evaluator.get(evaluator_id)
    }

    /// Whether the given evaluator supports the action.
    pub fn supports(&self, evaluator_id: &str) -> Option<bool> {
        self.outcome(evaluator_id).map(EvaluatorOutcome::supports)
    }

    /// Ids of evaluators that degraded to neutral.
    pub fn degraded(&self) -> Vec<&str> {
        self.per_evaluator
            .iter()
            .filter(|(_, o)| o.raw.is_degraded())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Identifiers of the raised flags, in order.
    pub fn flag_ids(&self) -> Vec<&'static str> {
        self.risk_flags.iter().map(RiskFlag::identifier).collect()
    }

    /// Returns true if any flag with the given identifier was raised.
    pub fn has_flag(&self, identifier: &str) -> bool {
        self.risk_flags.iter().any(|f| f.identifier() == identifier)
    }

    /// Hex SHA-256 of the report's JSON serialization.
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(self)?);
        Ok(hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect())
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Action: {}", self.action)?;
        for (id, outcome) in &self.per_evaluator {
            writeln!(f, "  [{}] {}", id, outcome.normalized.summary)?;
        }
        writeln!(f, "Consensus: {} ({})", self.consensus_level, self.tally)?;
        if self.risk_flags.is_empty() {
            writeln!(f, "Risk flags: none")?;
        } else {
            let flags: Vec<String> = self.risk_flags.iter().map(ToString::to_string).collect();
            writeln!(f, "Risk flags: {}", flags.join(", "))?;
        }
        write!(f, "Recommendation: {}", self.recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Verdict;

    fn report() -> EvaluationReport {
        let mut per_evaluator = BTreeMap::new();
        per_evaluator.insert(
            "a".to_string(),
            EvaluatorOutcome::new("A", "first", Verdict::scored(0.4, true, "good")),
        );
        per_evaluator.insert(
            "b".to_string(),
            EvaluatorOutcome::new("B", "second", Verdict::degraded("timeout")),
        );
        let tally = SupportTally::from_outcomes(&per_evaluator);
        let consensus_level = tally.level().unwrap();
        let risk_flags = vec![RiskFlag::LowReversibility];
        let recommendation = Recommendation::synthesize(consensus_level, &risk_flags);
        EvaluationReport {
            action: "test".to_string(),
            uncertainty: 0.1,
            per_evaluator,
            tally,
            consensus_level,
            risk_flags,
            recommendation,
        }
    }

    #[test]
    fn test_accessors() {
        let r = report();
        assert_eq!(r.supports("a"), Some(true));
        assert_eq!(r.supports("b"), Some(false));
        assert_eq!(r.supports("missing"), None);
        assert_eq!(r.degraded(), vec!["b"]);
        assert_eq!(r.tally.degraded, 1);
        assert_eq!(r.consensus_level, ConsensusLevel::Divided);
        assert!(r.has_flag("LOW_REVERSIBILITY"));
        assert_eq!(r.flag_ids(), vec!["LOW_REVERSIBILITY"]);
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let r = report();
        let fp = r.fingerprint().unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, r.clone().fingerprint().unwrap());

        let mut other = r;
        other.uncertainty = 0.2;
        assert_ne!(other.fingerprint().unwrap(), fp);
    }

    #[test]
    fn test_display() {
        let text = report().to_string();
        assert!(text.contains("Action: test"));
        assert!(text.contains("[b] Degraded: timeout"));
        assert!(text.contains("1/2 supporting (1 degraded)"));
        assert!(text.ends_with("PROCEED WITH CAUTION: 1 risk factor(s) identified"));
    }

    #[test]
    fn test_report_json_roundtrip() {
        let r = report();
        let json = serde_json::to_string(&r).unwrap();
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
