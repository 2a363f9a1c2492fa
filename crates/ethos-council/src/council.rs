//! Council facade: registration, evaluation and synthesis.
//!
//! The main entry point. Runs every registered evaluator, normalizes their
//! verdicts, classifies consensus, detects risk flags and synthesizes a
//! recommendation into an [`EvaluationReport`].

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::classifier::{KeywordClassifier, PatternClassifier};
use crate::config::CouncilConfig;
use crate::consensus::SupportTally;
use crate::error::CouncilError;
use crate::evaluator::frameworks::{CareEthicist, Consequentialist, Deontologist, VirtueEthicist};
use crate::evaluator::{Evaluator, Verdict, VerdictKind};
use crate::model::{Action, Circumstances, EvaluationContext, Stakeholder};
use crate::normalize::EvaluatorOutcome;
use crate::recommendation::Recommendation;
use crate::report::EvaluationReport;
use crate::risk::RiskDetector;
use crate::Result;

/// Registry id of the reference consequentialist.
pub const CONSEQUENTIALIST_ID: &str = "consequentialist";
/// Registry id of the reference deontologist.
pub const DEONTOLOGICAL_ID: &str = "deontological";
/// Registry id of the reference virtue ethicist.
pub const VIRTUE_ID: &str = "virtue";
/// Registry id of the reference care ethicist.
pub const CARE_ID: &str = "care";

/// The ethics council.
///
/// Holds an open registry of evaluators keyed by id. Evaluators are
/// visited in id order, so the report never depends on registration order.
///
/// # Example
///
/// ```rust
/// use ethos_council::{Action, Circumstances, Council, Stakeholder};
///
/// let council = Council::new().unwrap();
/// let action = Action::new("publish", "Publish the audit results")
///     .with_consequence("users", 0.6)
///     .with_reversibility(0.9);
/// let stakeholders = vec![Stakeholder::new("users", "human", 0.8, 0.8, 1.0)];
///
/// let report = council
///     .evaluate(&action, &stakeholders, &Circumstances::new())
///     .unwrap();
/// println!("{}", report.recommendation);
/// ```
pub struct Council {
    /// Evaluators by id.
    evaluators: BTreeMap<String, Arc<dyn Evaluator>>,
    /// Intrinsic-risk detector.
    risk: RiskDetector,
    /// Validated configuration.
    config: CouncilConfig,
}

impl fmt::Debug for Council {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Council")
            .field("evaluators", &self.evaluator_ids())
            .field("risk", &self.risk)
            .finish_non_exhaustive()
    }
}

impl Council {
    /// Creates a council with the four reference evaluators and default
    /// configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(CouncilConfig::default())
    }

    /// Creates a council with the four reference evaluators and the
    /// keyword classifier.
    pub fn from_config(config: CouncilConfig) -> Result<Self> {
        Self::from_config_with_classifier(config, Arc::new(KeywordClassifier::new()))
    }

    /// Creates a council with the four reference evaluators sharing
    /// `classifier`.
    pub fn from_config_with_classifier(
        config: CouncilConfig,
        classifier: Arc<dyn PatternClassifier>,
    ) -> Result<Self> {
        let consequentialist = Consequentialist::from_config(&config.utility)?;
        let deontologist = Deontologist::with_rules(config.rules.registry.clone(), Arc::clone(&classifier))?;
        let virtue = VirtueEthicist::from_config(&config.character, Arc::clone(&classifier))?;
        let care = CareEthicist::from_config(&config.care, Arc::clone(&classifier))?;

        let mut council = Self::empty(config, classifier)?;
        council.register(CONSEQUENTIALIST_ID, consequentialist)?;
        council.register(DEONTOLOGICAL_ID, deontologist)?;
        council.register(VIRTUE_ID, virtue)?;
        council.register(CARE_ID, care)?;
        Ok(council)
    }

    /// Creates a council with no evaluators.
    ///
    /// The risk detector still uses `config.risk` and `classifier`.
    pub fn empty(config: CouncilConfig, classifier: Arc<dyn PatternClassifier>) -> Result<Self> {
        config.validate()?;
        let risk = RiskDetector::from_config(&config.risk, classifier)?;
        Ok(Self {
            evaluators: BTreeMap::new(),
            risk,
            config,
        })
    }

    /// Registers an evaluator under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::Configuration`] if `id` is empty or taken.
    pub fn register<E: Evaluator + 'static>(&mut self, id: impl Into<String>, evaluator: E) -> Result<()> {
        self.register_shared(id, Arc::new(evaluator))
    }

    /// Registers an evaluator that is shared with other owners.
    pub fn register_shared(&mut self, id: impl Into<String>, evaluator: Arc<dyn Evaluator>) -> Result<()> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CouncilError::Configuration(
                "evaluator id must not be empty".to_string(),
            ));
        }
        if self.evaluators.contains_key(&id) {
            return Err(CouncilError::Configuration(format!(
                "evaluator '{}' is already registered",
                id
            )));
        }
        debug!("Registered evaluator '{}' ({})", id, evaluator.name());
        self.evaluators.insert(id, evaluator);
        Ok(())
    }

    /// Evaluates one action.
    ///
    /// # Process
    ///
    /// 1. Reject out-of-range input
    /// 2. Run every evaluator in id order; a panic degrades that evaluator
    /// 3. Classify consensus over the support vector
    /// 4. Detect risk flags from the action alone
    /// 5. Synthesize the recommendation
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::InvalidInput`] for out-of-range input and
    /// [`CouncilError::Configuration`] when no evaluator is registered.
    /// Evaluator failures never surface here.
    pub fn evaluate(
        &self,
        action: &Action,
        stakeholders: &[Stakeholder],
        circumstances: &Circumstances,
    ) -> Result<EvaluationReport> {
        self.check_inputs(action, stakeholders)?;
        let context = EvaluationContext::new(stakeholders, circumstances);

        let per_evaluator = self
            .evaluators
            .iter()
            .map(|(id, evaluator)| {
                let verdict = panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(action, &context)))
                    .unwrap_or_else(|payload| Verdict::degraded(panic_reason(payload.as_ref())));
                (id.clone(), outcome(id, evaluator.as_ref(), verdict))
            })
            .collect();

        self.assemble(action, per_evaluator)
    }

    /// Evaluates one action with every evaluator on the blocking pool.
    ///
    /// Produces the same report as [`evaluate`](Self::evaluate). When
    /// `execution.evaluator_timeout_ms` is set, evaluators still running at
    /// the deadline are degraded; their tasks are detached, not cancelled.
    pub async fn evaluate_concurrent(
        &self,
        action: &Action,
        stakeholders: &[Stakeholder],
        circumstances: &Circumstances,
    ) -> Result<EvaluationReport> {
        self.check_inputs(action, stakeholders)?;

        let shared_action = Arc::new(action.clone());
        let shared_stakeholders: Arc<[Stakeholder]> = Arc::from(stakeholders);
        let shared_circumstances = Arc::new(circumstances.clone());

        let handles: Vec<_> = self
            .evaluators
            .iter()
            .map(|(id, evaluator)| {
                let evaluator = Arc::clone(evaluator);
                let action = Arc::clone(&shared_action);
                let stakeholders = Arc::clone(&shared_stakeholders);
                let circumstances = Arc::clone(&shared_circumstances);
                let handle = tokio::task::spawn_blocking(move || {
                    let context = EvaluationContext::new(&stakeholders, &circumstances);
                    evaluator.evaluate(&action, &context)
                });
                (id.clone(), handle)
            })
            .collect();

        let deadline = self
            .config
            .execution
            .evaluator_timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let mut per_evaluator = BTreeMap::new();
        for (id, handle) in handles {
            let joined = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        let verdict = Verdict::degraded("timed out");
                        per_evaluator.insert(id.clone(), outcome(&id, self.evaluators[&id].as_ref(), verdict));
                        continue;
                    }
                },
                None => handle.await,
            };
            let verdict = joined.unwrap_or_else(|e| Verdict::degraded(join_failure(e)));
            let evaluator = self.evaluators[&id].as_ref();
            per_evaluator.insert(id.clone(), outcome(&id, evaluator, verdict));
        }

        self.assemble(action, per_evaluator)
    }

    /// Evaluates candidate actions in input order.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::InvalidInput`] if two actions share a name,
    /// or the first error any single evaluation returns.
    pub fn evaluate_all(
        &self,
        actions: &[Action],
        stakeholders: &[Stakeholder],
        circumstances: &Circumstances,
    ) -> Result<Vec<EvaluationReport>> {
        unique_actions(actions)?;
        actions
            .iter()
            .map(|action| self.evaluate(action, stakeholders, circumstances))
            .collect()
    }

    /// Concurrent counterpart of [`evaluate_all`](Self::evaluate_all).
    ///
    /// Actions run one after another; each one's evaluators run on the
    /// blocking pool as in [`evaluate_concurrent`](Self::evaluate_concurrent).
    pub async fn evaluate_all_concurrent(
        &self,
        actions: &[Action],
        stakeholders: &[Stakeholder],
        circumstances: &Circumstances,
    ) -> Result<Vec<EvaluationReport>> {
        unique_actions(actions)?;
        let mut reports = Vec::with_capacity(actions.len());
        for action in actions {
            reports.push(self.evaluate_concurrent(action, stakeholders, circumstances).await?);
        }
        Ok(reports)
    }

    /// Returns the number of registered evaluators.
    pub fn evaluator_count(&self) -> usize {
        self.evaluators.len()
    }

    /// Returns the registered ids in evaluation order.
    pub fn evaluator_ids(&self) -> Vec<&str> {
        self.evaluators.keys().map(String::as_str).collect()
    }

    /// Returns the configuration the council was built with.
    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Returns the risk detector.
    pub fn risk_detector(&self) -> &RiskDetector {
        &self.risk
    }

    fn check_inputs(&self, action: &Action, stakeholders: &[Stakeholder]) -> Result<()> {
        if self.evaluators.is_empty() {
            return Err(CouncilError::Configuration(
                "no evaluators registered".to_string(),
            ));
        }

        let mut names = BTreeSet::new();
        let checked = action.validate().and_then(|_| {
            stakeholders.iter().try_for_each(|s| {
                s.validate()?;
                if names.insert(s.name.as_str()) {
                    Ok(())
                } else {
                    Err(CouncilError::InvalidInput(format!(
                        "stakeholder '{}' appears more than once",
                        s.name
                    )))
                }
            })
        });
        if let Err(ref e) = checked {
            warn!("Rejected input for action '{}': {}", action.name, e);
        }
        checked
    }

    fn assemble(
        &self,
        action: &Action,
        per_evaluator: BTreeMap<String, EvaluatorOutcome>,
    ) -> Result<EvaluationReport> {
        let tally = SupportTally::from_outcomes(&per_evaluator);
        let consensus_level = tally.level()?;
        let risk_flags = self.risk.detect(action);
        let recommendation = Recommendation::synthesize(consensus_level, &risk_flags);

        info!(
            "Evaluated '{}': {} ({}), {} risk flag(s), {}",
            action.name,
            consensus_level.identifier(),
            tally,
            risk_flags.len(),
            recommendation.identifier()
        );

        Ok(EvaluationReport {
            action: action.name.clone(),
            uncertainty: action.uncertainty,
            per_evaluator,
            tally,
            consensus_level,
            risk_flags,
            recommendation,
        })
    }
}

fn unique_actions(actions: &[Action]) -> Result<()> {
    let mut names = BTreeSet::new();
    match actions.iter().find(|a| !names.insert(a.name.as_str())) {
        Some(dup) => {
            warn!("Rejected batch: action '{}' appears more than once", dup.name);
            Err(CouncilError::InvalidInput(format!(
                "action name '{}' appears more than once",
                dup.name
            )))
        }
        None => Ok(()),
    }
}

fn outcome(id: &str, evaluator: &dyn Evaluator, verdict: Verdict) -> EvaluatorOutcome {
    match degradation(id, &verdict) {
        Some(err) => warn!("{}", err),
        None => debug!("Evaluator '{}' verdict: {}", id, verdict),
    }
    EvaluatorOutcome::new(evaluator.name(), evaluator.framework(), verdict)
}

/// Degradation record keyed by registry id, whichever path degraded.
fn degradation(id: &str, verdict: &Verdict) -> Option<CouncilError> {
    match &verdict.kind {
        VerdictKind::Degraded { reason } => Some(CouncilError::EvaluatorDegraded {
            evaluator: id.to_string(),
            reason: reason.clone(),
        }),
        _ => None,
    }
}

/// Same text on both paths; `JoinError`'s own Display carries a task id.
fn join_failure(error: JoinError) -> String {
    if error.is_panic() {
        panic_reason(error.into_panic().as_ref())
    } else {
        "cancelled".to_string()
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    format!("panicked: {}", panic_message(payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
