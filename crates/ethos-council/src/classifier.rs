//! Pattern classifier collaborator.
//!
//! Evaluators and the risk detector never inspect action text themselves;
//! they ask a [`PatternClassifier`] for the degree to which a description
//! matches a named check ("do_not_lie", "compassion", "conceal", ...).
//!
//! [`KeywordClassifier`] is the reference implementation. It is a crude
//! marker matcher and is meant to be swapped for something better.

use std::collections::BTreeMap;

use regex::RegexSet;

use crate::error::CouncilError;
use crate::Result;

/// Degree contributed by each matched marker.
pub const MARKER_STEP: f64 = 0.3;

/// Answers named checks against an action description.
pub trait PatternClassifier: Send + Sync {
    /// Degree in [-1.0, 1.0] to which `description` matches `check`.
    ///
    /// Positive means the check's quality is present, negative means its
    /// opposite is present. Unknown checks should return 0.0.
    fn degree(&self, description: &str, check: &str) -> Result<f64>;

    /// Whether `check` names something this classifier can answer.
    ///
    /// Registries are validated against this at setup, so a rule, trait or
    /// risk pattern without a predicate is a configuration error.
    fn knows(&self, _check: &str) -> bool {
        true
    }

    /// Boolean view of [`degree`](Self::degree).
    fn raised(&self, description: &str, check: &str) -> Result<bool> {
        Ok(self.degree(description, check)? > 0.0)
    }
}

/// Positive and negative markers for a single check.
#[derive(Debug, Clone)]
struct MarkerSet {
    positive: RegexSet,
    negative: RegexSet,
}

impl MarkerSet {
    fn compile(check: &str, positive: &[&str], negative: &[&str]) -> Result<Self> {
        Ok(Self {
            positive: compile_markers(check, positive)?,
            negative: compile_markers(check, negative)?,
        })
    }

    fn degree(&self, description: &str) -> f64 {
        let hits = self.positive.matches(description).iter().count() as f64;
        let misses = self.negative.matches(description).iter().count() as f64;
        ((hits - misses) * MARKER_STEP).clamp(-1.0, 1.0)
    }
}

/// Markers match whole words, case-insensitively. `|` separates forms of
/// one marker and `*` stands for any word tail, so `"protect*"` covers
/// "protection" while `"care|caring"` leaves "careless" alone.
fn compile_markers(check: &str, markers: &[&str]) -> Result<RegexSet> {
    let mut patterns = Vec::with_capacity(markers.len());
    for marker in markers {
        let forms: Vec<&str> = marker.split('|').map(str::trim).collect();
        if forms.iter().any(|f| f.trim_matches('*').trim().is_empty()) {
            return Err(CouncilError::Configuration(format!(
                "check '{}' has a blank marker {:?}",
                check, marker
            )));
        }
        let alternatives: Vec<String> = forms.iter().map(|f| marker_form(f)).collect();
        patterns.push(format!(r"(?i)\b(?:{})\b", alternatives.join("|")));
    }
    RegexSet::new(patterns).map_err(|e| CouncilError::Configuration(format!("check '{}': {}", check, e)))
}

fn marker_form(form: &str) -> String {
    form.split('*').map(regex::escape).collect::<Vec<_>>().join(r"\w*")
}

/// Fails on the first name `classifier` has no check for.
pub(crate) fn require_known<'a>(
    classifier: &dyn PatternClassifier,
    what: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    match names.into_iter().find(|name| !classifier.knows(name)) {
        Some(name) => Err(CouncilError::Configuration(format!(
            "{} '{}' has no classifier check",
            what, name
        ))),
        None => Ok(()),
    }
}

/// Keyword-based classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    checks: BTreeMap<String, MarkerSet>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    /// Creates a classifier loaded with the reference markers.
    pub fn new() -> Self {
        let mut classifier = Self::empty();
        for (check, positive, negative) in DEFAULT_MARKERS {
            // Reference markers are escaped literals and always compile.
            let markers = MarkerSet::compile(check, positive, negative)
                .expect("reference markers are valid");
            classifier.checks.insert((*check).to_string(), markers);
        }
        classifier
    }

    /// Creates a classifier that knows no checks.
    pub fn empty() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Adds or replaces the markers for `check`.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::Configuration`] for an empty check name or
    /// a blank marker.
    pub fn with_markers(mut self, check: &str, positive: &[&str], negative: &[&str]) -> Result<Self> {
        if check.trim().is_empty() {
            return Err(CouncilError::Configuration(
                "check name must not be empty".to_string(),
            ));
        }
        let markers = MarkerSet::compile(check, positive, negative)?;
        self.checks.insert(check.to_string(), markers);
        Ok(self)
    }

    /// Names of all known checks, sorted.
    pub fn checks(&self) -> Vec<&str> {
        self.checks.keys().map(String::as_str).collect()
    }
}

impl PatternClassifier for KeywordClassifier {
    fn degree(&self, description: &str, check: &str) -> Result<f64> {
        Ok(self
            .checks
            .get(check)
            .map(|markers| markers.degree(description))
            .unwrap_or(0.0))
    }

    fn knows(&self, check: &str) -> bool {
        self.checks.contains_key(check)
    }
}

type MarkerTable = &'static [(&'static str, &'static [&'static str], &'static [&'static str])];

/// (check, positive markers, negative markers)
const DEFAULT_MARKERS: MarkerTable = &[
    // Rule violations
    ("do_not_kill", &["kill|kills|killed|killing", "end life|end * life", "caus* death"], &[]),
    ("do_not_lie", &["lie|lies|lied|lying", "deceiv*|deceit*", "falsif*"], &[]),
    ("do_not_steal", &["steal|steals|stealing|stole|stolen", "theft|thefts", "embezzl*", "rob|robs|robbed|robbing"], &[]),
    (
        "keep_promises",
        &["break* promise*|break* * promise*|broke promise*|broke * promise*|broken promise*", "renege*", "betray*"],
        &[],
    ),
    ("do_not_manipulate", &["manipulat*", "coerc*", "force|forces|forced|forcing"], &[]),
    (
        "respect_autonomy",
        &["without consent|without * consent", "against * will", "overrid* * choice*|overrid* * consent", "paternalis*"],
        &[],
    ),
    (
        "do_not_cause_suffering",
        &["tortur*", "torment*", "inflict* pain|inflict* suffering|caus* pain|caus* suffering", "cruel|cruelty|cruelly"],
        &[],
    ),
    // Character traits
    (
        "practical_wisdom",
        &["consider*", "analy*", "prudent*|prudence", "reflect*"],
        &["reckless*", "impulsiv*"],
    ),
    ("courage", &["confront*", "defend*", "risk|risks|risked|risking"], &["flee|flees|fled|fleeing", "evad*|evasion"]),
    ("temperance", &["moderat*", "restrain*|restraint", "temperate|temperance"], &["excess*", "indulg*|overindulg*", "binge*"]),
    ("justice", &["fair|fairly|fairness", "equal*"], &["discriminat*", "exploit*"]),
    (
        "generosity",
        &["generous*|generosity", "donat*", "give|gives|gave|giving", "share|shares|shared|sharing"],
        &["hoard*", "stingy|stinginess", "greed*"],
    ),
    (
        "honesty",
        &["truth*", "transparen*", "honest*", "clear|clearly"],
        &["lie|lies|lied|lying", "deceiv*|deceit*", "conceal*", "falsif*"],
    ),
    (
        "compassion",
        &["help|helps|helped|helping|helpful", "care|cares|cared|caring", "reliev*", "protect*"],
        &["cruel|cruelty|cruelly", "hurt|hurts|hurting", "abandon*"],
    ),
    // Care ethicist sub-scores
    ("care", &["protect*", "care|cares|cared|caring", "support*", "accompan*", "nurtur*"], &[]),
    (
        "responsibility",
        &["responsib*", "accountab*", "take ownership|takes ownership|taking ownership"],
        &["shirk*", "neglect*"],
    ),
    // Concerning patterns
    ("eliminate", &["eliminat*"], &[]),
    ("force", &["force|forces|forced|forcing"], &[]),
    ("manipulate", &["manipulat*"], &[]),
    ("deceive", &["deceiv*"], &[]),
    ("conceal", &["conceal*", "hide|hides|hid|hidden|hiding"], &[]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskConfig;
    use crate::evaluator::frameworks::{default_rules, default_traits};

    #[test]
    fn test_unknown_check_is_neutral() {
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.degree("anything at all", "no_such_check").unwrap(), 0.0);
    }

    #[test]
    fn test_single_marker_degree() {
        let classifier = KeywordClassifier::new();
        let degree = classifier.degree("Help the users", "compassion").unwrap();
        assert!((degree - MARKER_STEP).abs() < 1e-9);
    }

    #[test]
    fn test_markers_accumulate_and_clamp() {
        let classifier = KeywordClassifier::new();
        let degree = classifier
            .degree("Help, care for, relieve and protect everyone", "compassion")
            .unwrap();
        assert!((degree - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_markers() {
        let classifier = KeywordClassifier::new();
        let degree = classifier
            .degree("Conceal the report and lie about it", "honesty")
            .unwrap();
        assert!(degree < -0.5);
    }

    #[test]
    fn test_case_insensitive_and_word_tail() {
        let classifier = KeywordClassifier::new();
        assert!(classifier.raised("MANIPULATING the vote", "manipulate").unwrap());
        assert!(classifier.raised("Protection for all", "care").unwrap());
    }

    #[test]
    fn test_word_start_anchor() {
        let classifier = KeywordClassifier::new();
        // "skill" contains "kill" but not at a word start.
        assert!(!classifier.raised("Improve skill levels", "do_not_kill").unwrap());
    }

    #[test]
    fn test_whole_word_forms() {
        let classifier = KeywordClassifier::new();
        assert!(!classifier.raised("Careless handling of a career", "care").unwrap());
        assert!(!classifier.raised("Leave the helpless", "compassion").unwrap());
        assert!(classifier.raised("Caring for the sick", "care").unwrap());
        // Several forms of one marker still count once.
        let degree = classifier.degree("Help, helping and helped", "compassion").unwrap();
        assert!((degree - MARKER_STEP).abs() < 1e-9);
    }

    #[test]
    fn test_inner_wildcard() {
        let classifier = KeywordClassifier::new();
        assert!(classifier.raised("Steal the funds and break our promise", "keep_promises").unwrap());
        assert!(classifier.raised("Steal the funds and break our promise", "do_not_steal").unwrap());
        assert!(classifier.raised("Treat them against their will", "respect_autonomy").unwrap());
        assert!(!classifier.raised("Keep the promise", "keep_promises").unwrap());
    }

    #[test]
    fn test_every_reference_check_is_known() {
        let classifier = KeywordClassifier::new();
        let rules = default_rules();
        let traits = default_traits();
        let names = rules
            .iter()
            .map(|r| r.name.as_str())
            .chain(traits.iter().map(|t| t.name.as_str()))
            .chain(["care", "responsibility"]);
        for name in names {
            assert!(classifier.knows(name), "{} has no markers", name);
        }
        for pattern in &RiskConfig::default().patterns {
            assert!(classifier.knows(pattern), "{} has no markers", pattern);
        }
        assert!(!classifier.knows("no_spam"));
    }

    #[test]
    fn test_require_known() {
        let classifier = KeywordClassifier::new();
        assert!(require_known(&classifier, "rule", ["do_not_kill", "do_not_steal"]).is_ok());
        let err = require_known(&classifier, "rule", ["do_not_kill", "no_spam"]).unwrap_err();
        assert!(matches!(err, CouncilError::Configuration(_)));
        assert!(err.to_string().contains("rule 'no_spam'"));
    }

    #[test]
    fn test_with_markers_custom_check() {
        let classifier = KeywordClassifier::empty()
            .with_markers("universalizable", &["everyone could"], &["only we"])
            .unwrap();
        assert!(classifier.raised("A rule everyone could follow", "universalizable").unwrap());
        assert_eq!(classifier.checks(), vec!["universalizable"]);
    }

    #[test]
    fn test_with_markers_rejects_blank() {
        let err = KeywordClassifier::empty()
            .with_markers("x", &["ok", "  "], &[])
            .unwrap_err();
        assert!(KeywordClassifier::empty().with_markers("x", &["a|*"], &[]).is_err());
        assert!(matches!(err, CouncilError::Configuration(_)));
        assert!(KeywordClassifier::empty().with_markers("", &["a"], &[]).is_err());
    }
}
