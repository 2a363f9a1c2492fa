//! # Ethos Council
//!
//! Multi-framework ethical evaluation with consensus and risk synthesis.
//! Decision support, not a decision-maker: the council reports where value
//! systems agree and where they do not, and leaves the choice to a human
//! or an upstream controller.
//!
//! ## Overview
//!
//! A proposed [`Action`] is scored by several independent [`Evaluator`]s,
//! each holding a different, conflicting value framework. Their verdicts
//! have different shapes (a signed utility, a list of broken rules, a
//! trait tally, a composite care index). Each one reduces to a single
//! `supports` bit; the council counts the bits, classifies the agreement
//! into a [`ConsensusLevel`], checks the action for intrinsic
//! [`RiskFlag`]s and synthesizes a [`Recommendation`].
//!
//! ### Reference evaluators
//! - **Consequentialist**: weighted aggregate wellbeing, discounted by uncertainty
//! - **Deontologist**: weighted rules with situational exceptions
//! - **VirtueEthicist**: traits expressed versus vices expressed
//! - **CareEthicist**: relationships, the vulnerable, attentiveness, responsibility
//!
//! Any other [`Evaluator`] can be registered next to or instead of these.
//!
//! ### Failure model
//! Bad input and bad configuration are rejected up front. Once evaluation
//! starts nothing escapes: an evaluator whose collaborator fails, panics,
//! or runs out of time degrades to a neutral verdict and the report is
//! still produced.
//!
//! ## Architecture
//!
//! ```text
//!  Action + Stakeholders + Circumstances
//!                   │
//!     ┌─────────────┼─────────────┬─────────────┐
//!     ▼             ▼             ▼             ▼
//! ┌────────┐   ┌─────────┐   ┌─────────┐   ┌────────┐
//! │Utility │   │  Rules  │   │ Virtue  │   │  Care  │   PatternClassifier
//! └───┬────┘   └────┬────┘   └────┬────┘   └───┬────┘   (keyword markers)
//!     └─────────────┴──────┬──────┴────────────┘
//!                          ▼
//!                   ┌────────────┐
//!                   │ NORMALIZE  │  supports + summary
//!                   └─────┬──────┘
//!                         ▼
//!                   ┌────────────┐      ┌────────────┐
//!                   │ CONSENSUS  │      │ RISK FLAGS │ ◄── Action only
//!                   └─────┬──────┘      └─────┬──────┘
//!                         └─────────┬─────────┘
//!                                   ▼
//!                          ┌────────────────┐
//!                          │ RECOMMENDATION │
//!                          └────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ethos_council::{Action, Circumstances, Council, Stakeholder};
//!
//! let council = Council::new()?;
//! let action = Action::new("disclose", "Publish full details of the vulnerability")
//!     .with_consequence("users", 0.7)
//!     .with_consequence("company", -0.5)
//!     .with_uncertainty(0.4)
//!     .with_reversibility(0.0);
//! let stakeholders = vec![
//!     Stakeholder::new("users", "human", 0.8, 0.8, 1.0),
//!     Stakeholder::new("company", "organization", 0.3, 0.5, 0.6),
//! ];
//!
//! let report = council.evaluate(&action, &stakeholders, &Circumstances::new())?;
//! assert!(report.has_flag("LOW_REVERSIBILITY"));
//! # Ok::<(), ethos_council::CouncilError>(())
//! ```
//!
//! ## References
//!
//! - [Consequentialism](https://plato.stanford.edu/entries/consequentialism/) - Stanford Encyclopedia of Philosophy
//! - [Deontological Ethics](https://plato.stanford.edu/entries/ethics-deontological/) - Stanford Encyclopedia of Philosophy
//! - [Virtue Ethics](https://plato.stanford.edu/entries/ethics-virtue/) - Stanford Encyclopedia of Philosophy
//! - [Feminist Ethics: care](https://plato.stanford.edu/entries/feminism-ethics/) - Stanford Encyclopedia of Philosophy

pub mod classifier;
pub mod config;
pub mod consensus;
pub mod council;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod normalize;
pub mod principles;
pub mod recommendation;
pub mod report;
pub mod risk;

pub use classifier::{KeywordClassifier, PatternClassifier};
pub use config::CouncilConfig;
pub use consensus::{ConsensusLevel, SupportTally};
pub use council::Council;
pub use error::CouncilError;
pub use evaluator::frameworks::{CareEthicist, Consequentialist, Deontologist, VirtueEthicist};
pub use evaluator::{Evaluator, Verdict, VerdictKind};
pub use model::{Action, Circumstances, EvaluationContext, Stakeholder};
pub use normalize::{EvaluatorOutcome, NormalizedVerdict};
pub use principles::MetaPrinciple;
pub use recommendation::Recommendation;
pub use report::EvaluationReport;
pub use risk::{RiskDetector, RiskFlag};

/// Result type for council operations.
pub type Result<T> = std::result::Result<T, CouncilError>;
