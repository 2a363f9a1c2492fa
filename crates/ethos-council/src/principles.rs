//! Meta-ethical principles for deciding under moral uncertainty.
//!
//! Guidance only. Nothing in the council consults these; the CLI prints
//! them next to a report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Principle for acting when the frameworks disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaPrinciple {
    /// Recognize the limits of moral knowledge.
    Humility,
    /// Under uncertainty, avoid irreversible harm.
    Precaution,
    /// Make the reasoning visible.
    Transparency,
    /// Weigh several perspectives.
    Pluralism,
    /// Revise with new evidence.
    Learning,
    /// Ask those affected.
    Consultation,
    /// Let caution scale with the stakes.
    Proportionality,
}

impl MetaPrinciple {
    /// Every principle, in presentation order.
    pub const ALL: [MetaPrinciple; 7] = [
        MetaPrinciple::Humility,
        MetaPrinciple::Precaution,
        MetaPrinciple::Transparency,
        MetaPrinciple::Pluralism,
        MetaPrinciple::Learning,
        MetaPrinciple::Consultation,
        MetaPrinciple::Proportionality,
    ];

    /// Short name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Humility => "humility",
            Self::Precaution => "precaution",
            Self::Transparency => "transparency",
            Self::Pluralism => "pluralism",
            Self::Learning => "learning",
            Self::Consultation => "consultation",
            Self::Proportionality => "proportionality",
        }
    }

    /// One-sentence guidance.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Humility => "Recognize the limits of your moral knowledge.",
            Self::Precaution => "When uncertain, avoid irreversible harm.",
            Self::Transparency => "Make your reasoning explicit and open to scrutiny.",
            Self::Pluralism => "Consider multiple ethical perspectives before deciding.",
            Self::Learning => "Be willing to revise your position given new evidence.",
            Self::Consultation => "Seek the views of those who will be affected.",
            Self::Proportionality => "Scale caution to the magnitude of what is at stake.",
        }
    }
}

impl fmt::Display for MetaPrinciple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.guidance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_principles_distinct() {
        let names: std::collections::BTreeSet<_> =
            MetaPrinciple::ALL.iter().map(MetaPrinciple::name).collect();
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            MetaPrinciple::Precaution.to_string(),
            "precaution: When uncertain, avoid irreversible harm."
        );
    }

    #[test]
    fn test_serde_name_matches() {
        for p in MetaPrinciple::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.name()));
        }
    }
}
