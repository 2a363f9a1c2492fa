//! The reference frameworks: Consequentialist, Deontologist,
//! VirtueEthicist and CareEthicist.
//!
//! Four conflicting value systems. None of them is trusted alone; the
//! council reports where they agree and where they do not.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CareBreakdown, Evaluator, RuleViolation, TraitFinding, Verdict, VerdictKind};
use crate::classifier::{require_known, PatternClassifier};
use crate::config::{CareConfig, CharacterConfig, RuleConfig, UtilityConfig};
use crate::error::CouncilError;
use crate::model::{Action, Circumstances, EvaluationContext, Stakeholder};
use crate::Result;

/// Check the deontologist asks about universalizability.
pub const UNIVERSALIZABLE_CHECK: &str = "universalizable";

/// Check the care ethicist asks about attentive care.
pub const CARE_CHECK: &str = "care";

/// Check the care ethicist asks about assumed responsibility.
pub const RESPONSIBILITY_CHECK: &str = "responsibility";

/// Consequence key counting vulnerable parties helped.
pub const VULNERABLE_HELPED: &str = "vulnerable_helped";

/// Consequence key counting vulnerable parties harmed.
pub const VULNERABLE_HARMED: &str = "vulnerable_harmed";

/// Reflective question attached to every character verdict.
pub const VIRTUE_ADVICE: &str = "Ask yourself: does this action reflect wisdom, justice and \
    compassion? Does it bring you closer to the kind of agent you want to be?";

/// Turns an internal failure into a neutral verdict.
fn or_degraded(evaluator: &str, result: Result<Verdict>) -> Verdict {
    result.unwrap_or_else(|e| {
        debug!("{} fell back to a neutral verdict: {}", evaluator, e);
        Verdict::degraded(e.to_string())
    })
}

/// Rejects classifier answers outside [-1, 1] as incomplete signals.
fn checked_degree(classifier: &dyn PatternClassifier, description: &str, check: &str) -> Result<f64> {
    let degree = classifier.degree(description, check)?;
    if degree.is_finite() && (-1.0..=1.0).contains(&degree) {
        Ok(degree)
    } else {
        Err(CouncilError::Classifier(format!(
            "check '{}' returned {}, expected [-1, 1]",
            check, degree
        )))
    }
}

// ============================================================================
// Consequentialist
// ============================================================================

/// Outcome-based evaluator.
///
/// Sums predicted impact over stakeholders, weighted by each stakeholder's
/// capacity to flourish and moral weight, then discounts the total by the
/// action's uncertainty:
///
/// ```text
/// raw      = Σ impact(s) · flourishing(s) · weight(s)
/// adjusted = raw · (1 - uncertainty · discount)
/// ```
///
/// Stakeholders with no predicted impact contribute nothing.
#[derive(Debug, Clone)]
pub struct Consequentialist {
    uncertainty_discount: f64,
}

impl Default for Consequentialist {
    fn default() -> Self {
        Self::new()
    }
}

impl Consequentialist {
    /// Creates a Consequentialist with the default discount of 0.5.
    pub fn new() -> Self {
        Self {
            uncertainty_discount: UtilityConfig::default().uncertainty_discount,
        }
    }

    /// Creates a Consequentialist from configuration.
    pub fn from_config(config: &UtilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            uncertainty_discount: config.uncertainty_discount,
        })
    }

    /// Returns `(raw, adjusted)` utility.
    pub fn utility(&self, action: &Action, stakeholders: &[Stakeholder]) -> (f64, f64) {
        let raw: f64 = stakeholders
            .iter()
            .map(|s| action.impact_on(&s.name) * s.flourishing_capacity * s.moral_weight)
            .sum();
        let adjusted = raw * (1.0 - action.uncertainty * self.uncertainty_discount);
        (raw, adjusted)
    }

    /// Picks the action with the highest adjusted utility.
    ///
    /// Ties go to the earlier action. Returns `None` for an empty slice.
    pub fn choose_best<'a>(
        &self,
        actions: &'a [Action],
        stakeholders: &[Stakeholder],
    ) -> Option<(&'a Action, f64)> {
        let mut best: Option<(&'a Action, f64)> = None;
        for action in actions {
            let (_, adjusted) = self.utility(action, stakeholders);
            if best.map_or(true, |(_, top)| adjusted > top) {
                best = Some((action, adjusted));
            }
        }
        best
    }

    fn assess(&self, action: &Action, context: &EvaluationContext<'_>) -> Result<Verdict> {
        let (raw, adjusted) = self.utility(action, context.stakeholders);
        if !adjusted.is_finite() {
            return Err(CouncilError::InvalidInput(format!(
                "utility overflowed to {}",
                adjusted
            )));
        }

        let rationale = if adjusted > 0.0 {
            "Maximizes aggregate wellbeing"
        } else if adjusted < 0.0 {
            "Reduces net wellbeing"
        } else {
            "No net change in wellbeing predicted"
        };

        Ok(Verdict::new(
            VerdictKind::Utility { raw, adjusted },
            format!("{} (utility {:.3})", rationale, adjusted),
        ))
    }
}

impl Evaluator for Consequentialist {
    fn name(&self) -> &str {
        "Consequentialist"
    }

    fn framework(&self) -> &str {
        "Utilitarian consequentialism - maximize aggregate wellbeing"
    }

    fn evaluate(&self, action: &Action, context: &EvaluationContext<'_>) -> Verdict {
        or_degraded(self.name(), self.assess(action, context))
    }
}

// ============================================================================
// Deontologist
// ============================================================================

/// A rule in the deontological registry.
///
/// The classifier check with the rule's name decides whether an action
/// breaks the rule. Any circumstance tag listed in `exceptions` excuses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Name of the rule, also the classifier check.
    pub name: String,
    /// Weight in (0, 1].
    pub weight: f64,
    /// Circumstance tags that excuse a violation.
    #[serde(default)]
    pub exceptions: Vec<String>,
    /// Why breaking this rule matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Rule {
    /// Creates a rule with no exceptions.
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            exceptions: Vec::new(),
            explanation: None,
        }
    }

    /// Adds an excusing circumstance.
    pub fn with_exception(mut self, tag: impl Into<String>) -> Self {
        self.exceptions.push(tag.into());
        self
    }

    /// Sets the explanation.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Explanation, or a generic one.
    pub fn explain(&self) -> String {
        self.explanation
            .clone()
            .unwrap_or_else(|| format!("Violation of {}", self.name))
    }

    /// Checks name and weight.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CouncilError::Configuration(
                "rule name must not be empty".to_string(),
            ));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 || self.weight > 1.0 {
            return Err(CouncilError::Configuration(format!(
                "rule '{}' weight {} outside (0, 1]",
                self.name, self.weight
            )));
        }
        Ok(())
    }
}

/// Returns the reference rule registry.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new("do_not_kill", 1.0)
            .with_exception("self_defense")
            .with_explanation("Violates the sanctity of life"),
        Rule::new("do_not_lie", 0.8)
            .with_exception("protect_innocent")
            .with_explanation("Breaks the duty of honesty"),
        Rule::new("do_not_steal", 0.7).with_exception("extreme_necessity"),
        Rule::new("keep_promises", 0.75)
            .with_exception("immoral_promise")
            .with_explanation("Breaks interpersonal trust"),
        Rule::new("do_not_manipulate", 0.9)
            .with_explanation("Fails to respect the autonomy of others"),
        Rule::new("respect_autonomy", 0.95).with_exception("extreme_self_harm"),
        Rule::new("do_not_cause_suffering", 0.85).with_exception("greater_good"),
    ]
}

/// Rule-based evaluator.
///
/// Starts from a score of 1.0 and subtracts the weight of every rule the
/// action breaks without an applicable exception, floored at -1.0. The
/// action is permissible only with zero unexcepted violations.
pub struct Deontologist {
    rules: Vec<Rule>,
    classifier: Arc<dyn PatternClassifier>,
}

impl Deontologist {
    /// Creates a Deontologist with the reference rules.
    pub fn new(classifier: Arc<dyn PatternClassifier>) -> Self {
        Self {
            rules: default_rules(),
            classifier,
        }
    }

    /// Creates a Deontologist with custom rules.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::Configuration`] for a malformed rule or one
    /// the classifier has no check for.
    pub fn with_rules(rules: Vec<Rule>, classifier: Arc<dyn PatternClassifier>) -> Result<Self> {
        let config = RuleConfig { registry: rules };
        config.validate()?;
        require_known(classifier.as_ref(), "rule", config.registry.iter().map(|r| r.name.as_str()))?;
        Ok(Self {
            rules: config.registry,
            classifier,
        })
    }

    /// Returns the rule registry.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Universalization test: could everyone act on this maxim?
    ///
    /// Without any signal the maxim is taken as universalizable.
    pub fn categorical_imperative(&self, action: &Action) -> Result<bool> {
        let degree = checked_degree(self.classifier.as_ref(), &action.description, UNIVERSALIZABLE_CHECK)?;
        Ok(degree >= 0.0)
    }

    fn assess(&self, action: &Action, circumstances: &Circumstances) -> Result<Verdict> {
        let mut violations = Vec::new();
        let mut score = 1.0;

        for rule in &self.rules {
            let broken = checked_degree(self.classifier.as_ref(), &action.description, &rule.name)? > 0.0;
            if broken && !circumstances.excuses(&rule.exceptions) {
                violations.push(RuleViolation {
                    rule: rule.name.clone(),
                    weight: rule.weight,
                    explanation: rule.explain(),
                });
                score -= rule.weight;
            }
        }

        let universalizable = self.categorical_imperative(action)?;

        let rationale = if violations.is_empty() {
            "Permissible under rule-based principles".to_string()
        } else {
            let names: Vec<&str> = violations.iter().map(|v| v.rule.as_str()).collect();
            format!("Problematic: violates {}", names.join(", "))
        };

        Ok(Verdict::new(
            VerdictKind::Deontic {
                score: f64::max(score, -1.0),
                violations,
                universalizable,
            },
            rationale,
        ))
    }
}

impl Evaluator for Deontologist {
    fn name(&self) -> &str {
        "Deontologist"
    }

    fn framework(&self) -> &str {
        "Kantian deontology - duties that hold regardless of outcomes"
    }

    fn evaluate(&self, action: &Action, context: &EvaluationContext<'_>) -> Verdict {
        or_degraded(self.name(), self.assess(action, context.circumstances))
    }
}

// ============================================================================
// VirtueEthicist
// ============================================================================

/// A character trait in the virtue registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    /// Name of the trait, also the classifier check.
    pub name: String,
    /// What the trait is.
    pub description: String,
    /// The vice or vices opposing it.
    pub opposite: String,
    /// Relative importance, non-negative.
    pub importance: f64,
}

impl Trait {
    /// Creates a trait.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        opposite: impl Into<String>,
        importance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            opposite: opposite.into(),
            importance,
        }
    }

    /// Checks name and importance.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CouncilError::Configuration(
                "trait name must not be empty".to_string(),
            ));
        }
        if !self.importance.is_finite() || self.importance < 0.0 {
            return Err(CouncilError::Configuration(format!(
                "trait '{}' importance {} must be finite and non-negative",
                self.name, self.importance
            )));
        }
        Ok(())
    }
}

/// Returns the reference trait registry.
pub fn default_traits() -> Vec<Trait> {
    vec![
        Trait::new("practical_wisdom", "Prudent judgment in concrete situations", "imprudence/cunning", 1.0),
        Trait::new("courage", "Facing danger appropriately", "cowardice/recklessness", 0.8),
        Trait::new("temperance", "Moderation in pleasures", "indulgence/insensibility", 0.7),
        Trait::new("justice", "Giving each their due", "injustice", 0.95),
        Trait::new("generosity", "Giving appropriately", "stinginess/waste", 0.6),
        Trait::new("honesty", "Truth in word and deed", "dishonesty", 0.9),
        Trait::new("compassion", "Empathy and care for others", "cruelty/indifference", 0.85),
    ]
}

/// Deficiency, virtue and excess for one kind of situation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenMean {
    /// The vice of too little.
    pub deficiency: String,
    /// The virtuous mean.
    pub virtue: String,
    /// The vice of too much.
    pub excess: String,
}

/// Looks up the golden mean for a situation.
///
/// Known situations: `confront_danger`, `give_resources`, `pleasure`.
/// Anything else gets a generic answer.
pub fn golden_mean(situation: &str) -> GoldenMean {
    let (deficiency, virtue, excess) = match situation {
        "confront_danger" => (
            "Cowardice (always flee)",
            "Courage (confront when appropriate)",
            "Recklessness (needless risk)",
        ),
        "give_resources" => (
            "Stinginess (never share)",
            "Generosity (give appropriately)",
            "Waste (give inappropriately)",
        ),
        "pleasure" => (
            "Insensibility (never enjoy)",
            "Temperance (enjoy moderately)",
            "Indulgence (hedonism)",
        ),
        _ => (
            "Deficiency",
            "Seek the virtuous mean between deficiency and excess",
            "Excess",
        ),
    };
    GoldenMean {
        deficiency: deficiency.to_string(),
        virtue: virtue.to_string(),
        excess: excess.to_string(),
    }
}

/// Character-based evaluator.
///
/// Asks the classifier how strongly the action expresses each trait.
/// Degrees above the expressed threshold count as expressed, below the
/// violated threshold as violated. The action cultivates character when
/// more traits are expressed than violated.
pub struct VirtueEthicist {
    traits: Vec<Trait>,
    expressed_threshold: f64,
    violated_threshold: f64,
    classifier: Arc<dyn PatternClassifier>,
}

impl VirtueEthicist {
    /// Creates a VirtueEthicist with the reference traits.
    pub fn new(classifier: Arc<dyn PatternClassifier>) -> Self {
        let defaults = CharacterConfig::default();
        Self {
            traits: defaults.traits,
            expressed_threshold: defaults.expressed_threshold,
            violated_threshold: defaults.violated_threshold,
            classifier,
        }
    }

    /// Creates a VirtueEthicist from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::Configuration`] for a malformed registry,
    /// a trait without a classifier check, or inverted thresholds.
    pub fn from_config(config: &CharacterConfig, classifier: Arc<dyn PatternClassifier>) -> Result<Self> {
        config.validate()?;
        require_known(classifier.as_ref(), "trait", config.traits.iter().map(|t| t.name.as_str()))?;
        Ok(Self {
            traits: config.traits.clone(),
            expressed_threshold: config.expressed_threshold,
            violated_threshold: config.violated_threshold,
            classifier,
        })
    }

    /// Returns the trait registry.
    pub fn traits(&self) -> &[Trait] {
        &self.traits
    }

    fn assess(&self, action: &Action) -> Result<Verdict> {
        let mut expressed = Vec::new();
        let mut violated = Vec::new();

        for t in &self.traits {
            let degree = checked_degree(self.classifier.as_ref(), &action.description, &t.name)?;
            if degree > self.expressed_threshold {
                expressed.push(TraitFinding {
                    name: t.name.clone(),
                    degree,
                    description: t.description.clone(),
                });
            } else if degree < self.violated_threshold {
                violated.push(TraitFinding {
                    name: t.name.clone(),
                    degree: degree.abs(),
                    description: format!("Expresses {}", t.opposite),
                });
            }
        }

        let rationale = match (expressed.is_empty(), violated.is_empty()) {
            (true, true) => "No trait clearly expressed".to_string(),
            _ => {
                let shown: Vec<&str> = expressed.iter().map(|t| t.name.as_str()).collect();
                let lost: Vec<&str> = violated.iter().map(|t| t.name.as_str()).collect();
                format!(
                    "Expresses [{}]; violates [{}]",
                    shown.join(", "),
                    lost.join(", ")
                )
            }
        };

        Ok(Verdict::new(
            VerdictKind::Character {
                expressed,
                violated,
                advice: VIRTUE_ADVICE.to_string(),
            },
            rationale,
        ))
    }
}

impl Evaluator for VirtueEthicist {
    fn name(&self) -> &str {
        "VirtueEthicist"
    }

    fn framework(&self) -> &str {
        "Aristotelian virtue ethics - what would a person of good character do"
    }

    fn evaluate(&self, action: &Action, _context: &EvaluationContext<'_>) -> Verdict {
        or_degraded(self.name(), self.assess(action))
    }
}

// ============================================================================
// CareEthicist
// ============================================================================

/// Relational evaluator.
///
/// Averages four sub-scores, each in [-1, 1]:
///
/// - relationship preservation: baseline plus the mean predicted impact on
///   everyone in the relationship graph
/// - vulnerable protection: harm to any vulnerable party dominates any help
/// - attentiveness: classifier check `care`
/// - responsibility: baseline plus classifier check `responsibility`
///
/// The action is caring when the mean exceeds the support threshold.
pub struct CareEthicist {
    config: CareConfig,
    classifier: Arc<dyn PatternClassifier>,
}

impl CareEthicist {
    /// Creates a CareEthicist with default settings.
    pub fn new(classifier: Arc<dyn PatternClassifier>) -> Self {
        Self {
            config: CareConfig::default(),
            classifier,
        }
    }

    /// Creates a CareEthicist from configuration.
    pub fn from_config(config: &CareConfig, classifier: Arc<dyn PatternClassifier>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            classifier,
        })
    }

    fn relationships(&self, action: &Action, circumstances: &Circumstances) -> f64 {
        let connected: BTreeSet<&str> = circumstances
            .relationships
            .iter()
            .flat_map(|(from, to)| std::iter::once(from.as_str()).chain(to.iter().map(String::as_str)))
            .collect();
        let impacts: Vec<f64> = connected
            .iter()
            .filter_map(|name| action.predicted_consequences.get(*name).copied())
            .collect();
        if impacts.is_empty() {
            return self.config.relationship_baseline;
        }
        let mean = impacts.iter().sum::<f64>() / impacts.len() as f64;
        (self.config.relationship_baseline + mean).clamp(-1.0, 1.0)
    }

    fn vulnerable(&self, action: &Action, circumstances: &Circumstances) -> f64 {
        let impacts: Vec<f64> = circumstances
            .vulnerable
            .iter()
            .filter_map(|name| action.predicted_consequences.get(name).copied())
            .collect();
        let harmed = action.impact_on(VULNERABLE_HARMED) > 0.0 || impacts.iter().any(|i| *i < 0.0);
        let helped = action.impact_on(VULNERABLE_HELPED) > 0.0 || impacts.iter().any(|i| *i > 0.0);

        if harmed {
            self.config.vulnerable_harmed_score
        } else if helped {
            self.config.vulnerable_helped_score
        } else {
            0.0
        }
    }

    fn assess(&self, action: &Action, circumstances: &Circumstances) -> Result<Verdict> {
        let classifier = self.classifier.as_ref();
        let relationships = self.relationships(action, circumstances);
        let vulnerable = self.vulnerable(action, circumstances);
        let attentiveness = checked_degree(classifier, &action.description, CARE_CHECK)?;
        let responsibility = (self.config.responsibility_baseline
            + checked_degree(classifier, &action.description, RESPONSIBILITY_CHECK)?)
        .clamp(-1.0, 1.0);

        let score = (relationships + vulnerable + attentiveness + responsibility) / 4.0;
        let breakdown = CareBreakdown {
            relationships,
            vulnerable,
            attentiveness,
            responsibility,
            score,
            threshold: self.config.support_threshold,
        };

        let rationale = if vulnerable < 0.0 {
            format!("Harms vulnerable parties (care {:.3})", score)
        } else if score > self.config.support_threshold {
            format!("Attends to relationships and the vulnerable (care {:.3})", score)
        } else {
            format!("Insufficient attention to care (care {:.3})", score)
        };

        Ok(Verdict::new(VerdictKind::Care(breakdown), rationale))
    }
}

impl Evaluator for CareEthicist {
    fn name(&self) -> &str {
        "CareEthicist"
    }

    fn framework(&self) -> &str {
        "Ethics of care - relationships, interdependence, responsibility to the vulnerable"
    }

    fn evaluate(&self, action: &Action, context: &EvaluationContext<'_>) -> Verdict {
        or_degraded(self.name(), self.assess(action, context.circumstances))
    }
}
