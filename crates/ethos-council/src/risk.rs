//! Risk-flag detector.
//!
//! Looks only at the action itself, never at evaluator verdicts. Three
//! independent flags are checked in a fixed order and every applicable one
//! is emitted:
//!
//! 1. `LOW_REVERSIBILITY`: reversibility below the configured floor
//! 2. `HIGH_UNCERTAINTY`: uncertainty above the configured ceiling
//! 3. `PROBLEMATIC_PATTERN`: the classifier raises any concerning pattern
//!
//! A classifier failure on a pattern counts as raised. The marker is
//! suffixed with `(unverified)` so the report shows it was not confirmed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{require_known, KeywordClassifier, PatternClassifier};
use crate::config::RiskConfig;
use crate::model::Action;
use crate::Result;

/// Warning derived from intrinsic action properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    /// The action is hard or impossible to undo.
    LowReversibility,
    /// The outcome of the action is poorly predicted.
    HighUncertainty,
    /// The description matches concerning action patterns.
    ProblematicPattern {
        /// Pattern checks that were raised, in configuration order.
        markers: Vec<String>,
    },
}

impl RiskFlag {
    /// Stable identifier, e.g. `LOW_REVERSIBILITY`.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::LowReversibility => "LOW_REVERSIBILITY",
            Self::HighUncertainty => "HIGH_UNCERTAINTY",
            Self::ProblematicPattern { .. } => "PROBLEMATIC_PATTERN",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProblematicPattern { markers } => {
                write!(f, "{} ({})", self.identifier(), markers.join(", "))
            }
            _ => f.write_str(self.identifier()),
        }
    }
}

/// Detects risk flags for an action.
#[derive(Clone)]
pub struct RiskDetector {
    config: RiskConfig,
    classifier: Arc<dyn PatternClassifier>,
}

impl fmt::Debug for RiskDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RiskDetector {
    fn default() -> Self {
        Self::new(Arc::new(KeywordClassifier::new()))
    }
}

impl RiskDetector {
    /// Creates a detector with default thresholds and patterns.
    pub fn new(classifier: Arc<dyn PatternClassifier>) -> Self {
        Self {
            config: RiskConfig::default(),
            classifier,
        }
    }

    /// Creates a detector from validated configuration.
    pub fn from_config(config: &RiskConfig, classifier: Arc<dyn PatternClassifier>) -> Result<Self> {
        config.validate()?;
        require_known(classifier.as_ref(), "risk pattern", config.patterns.iter().map(String::as_str))?;
        Ok(Self {
            config: config.clone(),
            classifier,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Emits every applicable flag in detection order.
    pub fn detect(&self, action: &Action) -> Vec<RiskFlag> {
        let mut flags = Vec::new();

        if action.reversibility < self.config.low_reversibility_below {
            flags.push(RiskFlag::LowReversibility);
        }
        if action.uncertainty > self.config.high_uncertainty_above {
            flags.push(RiskFlag::HighUncertainty);
        }

        let markers = self.raised_patterns(action);
        if !markers.is_empty() {
            flags.push(RiskFlag::ProblematicPattern { markers });
        }

        for flag in &flags {
            debug!("Action '{}' flagged: {}", action.name, flag);
        }
        flags
    }

    fn raised_patterns(&self, action: &Action) -> Vec<String> {
        self.config
            .patterns
            .iter()
            .filter_map(|pattern| {
                match self.classifier.raised(&action.description, pattern) {
                    Ok(true) => Some(pattern.clone()),
                    Ok(false) => None,
                    Err(e) => {
                        warn!(
                            "Pattern check '{}' failed for action '{}': {}",
                            pattern, action.name, e
                        );
                        Some(format!("{} (unverified)", pattern))
                    }
                }
            })
            .collect()
    }
}
