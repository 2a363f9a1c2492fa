//! Configuration types for the council.
//!
//! Every threshold and registry the evaluators and the risk detector
//! use lives here. Values are immutable once handed to a council.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CouncilError;
use crate::evaluator::frameworks::{default_rules, default_traits, Rule, Trait};
use crate::Result;

/// Configuration for a [`Council`](crate::Council).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    /// Consequentialist settings.
    pub utility: UtilityConfig,

    /// Rule registry for the deontologist.
    pub rules: RuleConfig,

    /// Trait registry and thresholds for the virtue ethicist.
    pub character: CharacterConfig,

    /// Care ethicist settings.
    pub care: CareConfig,

    /// Risk flag thresholds and patterns.
    pub risk: RiskConfig,

    /// Execution settings for the concurrent path.
    pub execution: ExecutionConfig,
}

impl CouncilConfig {
    /// Parses and validates a JSON document.
    ///
    /// Missing sections fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        self.utility.validate()?;
        self.rules.validate()?;
        self.character.validate()?;
        self.care.validate()?;
        self.risk.validate()?;
        self.execution.validate()
    }
}

/// Consequentialist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityConfig {
    /// Fraction of utility lost at full uncertainty.
    pub uncertainty_discount: f64,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            uncertainty_discount: 0.5,
        }
    }
}

impl UtilityConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        unit("utility.uncertainty_discount", self.uncertainty_discount)
    }
}

/// Deontologist rule registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Rules in evaluation order.
    pub registry: Vec<Rule>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            registry: default_rules(),
        }
    }
}

impl RuleConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        unique_names("rule", self.registry.iter().map(|r| r.name.as_str()))?;
        self.registry.iter().try_for_each(Rule::validate)
    }
}

/// Virtue ethicist trait registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Traits in evaluation order.
    pub traits: Vec<Trait>,

    /// Degree above which a trait counts as expressed.
    pub expressed_threshold: f64,

    /// Degree below which a trait counts as violated.
    pub violated_threshold: f64,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            traits: default_traits(),
            expressed_threshold: 0.5,
            violated_threshold: -0.5,
        }
    }
}

impl CharacterConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        unique_names("trait", self.traits.iter().map(|t| t.name.as_str()))?;
        self.traits.iter().try_for_each(Trait::validate)?;
        signed("character.expressed_threshold", self.expressed_threshold)?;
        signed("character.violated_threshold", self.violated_threshold)?;
        if self.violated_threshold >= self.expressed_threshold {
            return Err(CouncilError::Configuration(format!(
                "character.violated_threshold ({}) must be below expressed_threshold ({})",
                self.violated_threshold, self.expressed_threshold
            )));
        }
        Ok(())
    }
}

/// Care ethicist configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareConfig {
    /// Composite score the action must exceed to be supported.
    pub support_threshold: f64,

    /// Relationship sub-score with no relationship information.
    pub relationship_baseline: f64,

    /// Responsibility sub-score with no responsibility signal.
    pub responsibility_baseline: f64,

    /// Vulnerability sub-score when any vulnerable party is harmed.
    pub vulnerable_harmed_score: f64,

    /// Vulnerability sub-score when vulnerable parties are only helped.
    pub vulnerable_helped_score: f64,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            support_threshold: 0.5,
            relationship_baseline: 0.7,
            responsibility_baseline: 0.6,
            vulnerable_harmed_score: -0.5,
            vulnerable_helped_score: 0.8,
        }
    }
}

impl CareConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        signed("care.support_threshold", self.support_threshold)?;
        signed("care.relationship_baseline", self.relationship_baseline)?;
        signed("care.responsibility_baseline", self.responsibility_baseline)?;
        signed("care.vulnerable_harmed_score", self.vulnerable_harmed_score)?;
        signed("care.vulnerable_helped_score", self.vulnerable_helped_score)?;
        if self.vulnerable_harmed_score >= 0.0 {
            return Err(CouncilError::Configuration(
                "care.vulnerable_harmed_score must be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Risk detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Reversibility strictly below this raises `LOW_REVERSIBILITY`.
    pub low_reversibility_below: f64,

    /// Uncertainty strictly above this raises `HIGH_UNCERTAINTY`.
    pub high_uncertainty_above: f64,

    /// Classifier checks that raise `PROBLEMATIC_PATTERN`.
    pub patterns: Vec<String>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            low_reversibility_below: 0.3,
            high_uncertainty_above: 0.7,
            patterns: ["eliminate", "force", "manipulate", "deceive", "conceal"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl RiskConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        unit("risk.low_reversibility_below", self.low_reversibility_below)?;
        unit("risk.high_uncertainty_above", self.high_uncertainty_above)?;
        if self.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(CouncilError::Configuration(
                "risk.patterns contains an empty check name".to_string(),
            ));
        }
        Ok(())
    }
}

/// Concurrent execution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Per-evaluator time budget; a breach degrades that evaluator.
    pub evaluator_timeout_ms: Option<u64>,
}

impl ExecutionConfig {
    fn validate(&self) -> Result<()> {
        if self.evaluator_timeout_ms == Some(0) {
            return Err(CouncilError::Configuration(
                "execution.evaluator_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn unit(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CouncilError::Configuration(format!(
            "{} is {}, expected [0, 1]",
            field, value
        )))
    }
}

fn signed(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CouncilError::Configuration(format!(
            "{} is {}, expected [-1, 1]",
            field, value
        )))
    }
}

fn unique_names<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CouncilError::Configuration(format!(
                "duplicate {} '{}'",
                what, name
            )));
        }
    }
    Ok(())
}
