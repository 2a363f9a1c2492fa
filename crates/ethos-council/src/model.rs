//! Action, stakeholder and circumstance model.
//!
//! Plain data owned by the caller. The council only borrows these values
//! and never mutates them. Numeric fields are checked by `validate()`;
//! out-of-range values are rejected, never clamped.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CouncilError;
use crate::Result;

/// A candidate decision under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier, unique within one evaluation session.
    pub name: String,
    /// Free-text summary, read only by classifier collaborators.
    pub description: String,
    /// Predicted impact per stakeholder name, each in [-1.0, 1.0].
    #[serde(default)]
    pub predicted_consequences: BTreeMap<String, f64>,
    /// 0.0 = fully predictable, 1.0 = unknown outcome.
    #[serde(default)]
    pub uncertainty: f64,
    /// 0.0 = permanent, 1.0 = fully undoable.
    #[serde(default = "fully_reversible")]
    pub reversibility: f64,
}

fn fully_reversible() -> f64 {
    1.0
}

impl Action {
    /// Creates a predictable, fully reversible action with no predicted impact.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            predicted_consequences: BTreeMap::new(),
            uncertainty: 0.0,
            reversibility: 1.0,
        }
    }

    /// Adds a predicted impact on one stakeholder.
    pub fn with_consequence(mut self, stakeholder: impl Into<String>, impact: f64) -> Self {
        self.predicted_consequences.insert(stakeholder.into(), impact);
        self
    }

    /// Sets the outcome uncertainty.
    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    /// Sets the reversibility.
    pub fn with_reversibility(mut self, reversibility: f64) -> Self {
        self.reversibility = reversibility;
        self
    }

    /// Predicted impact on `stakeholder`, 0.0 when none was predicted.
    pub fn impact_on(&self, stakeholder: &str) -> f64 {
        self.predicted_consequences
            .get(stakeholder)
            .copied()
            .unwrap_or(0.0)
    }

    /// Checks every bounded field.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::InvalidInput`] for an empty name, a
    /// non-finite value, or a value outside its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CouncilError::InvalidInput(
                "action name must not be empty".to_string(),
            ));
        }
        check_unit("uncertainty", &self.name, self.uncertainty)?;
        check_unit("reversibility", &self.name, self.reversibility)?;
        for (stakeholder, impact) in &self.predicted_consequences {
            if !impact.is_finite() || !(-1.0..=1.0).contains(impact) {
                return Err(CouncilError::InvalidInput(format!(
                    "action '{}': impact on '{}' is {}, expected [-1, 1]",
                    self.name, stakeholder, impact
                )));
            }
        }
        Ok(())
    }
}

/// An entity affected by an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    /// Key used to look up impact in `predicted_consequences`.
    pub name: String,
    /// Open tag: "human", "organization", "ecosystem", ...
    pub kind: String,
    /// In [0.0, 1.0].
    pub suffering_capacity: f64,
    /// In [0.0, 1.0].
    pub flourishing_capacity: f64,
    /// Non-negative, unbounded.
    pub moral_weight: f64,
}

impl Stakeholder {
    /// Creates a stakeholder.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        suffering_capacity: f64,
        flourishing_capacity: f64,
        moral_weight: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            suffering_capacity,
            flourishing_capacity,
            moral_weight,
        }
    }

    /// Checks capacities and weight.
    ///
    /// # Errors
    ///
    /// Returns [`CouncilError::InvalidInput`] for a capacity outside
    /// [0, 1] or a negative or non-finite weight.
    pub fn validate(&self) -> Result<()> {
        check_unit("suffering_capacity", &self.name, self.suffering_capacity)?;
        check_unit("flourishing_capacity", &self.name, self.flourishing_capacity)?;
        if !self.moral_weight.is_finite() || self.moral_weight < 0.0 {
            return Err(CouncilError::InvalidInput(format!(
                "'{}': moral_weight is {}, expected a finite non-negative value",
                self.name, self.moral_weight
            )));
        }
        Ok(())
    }
}

fn check_unit(field: &str, owner: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CouncilError::InvalidInput(format!(
            "'{}': {} is {}, expected [0, 1]",
            owner, field, value
        )))
    }
}

/// Situational facts that accompany an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circumstances {
    /// Circumstance tags, matched against rule exceptions.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Who is connected with whom.
    #[serde(default)]
    pub relationships: BTreeMap<String, Vec<String>>,
    /// Stakeholder names considered vulnerable.
    #[serde(default)]
    pub vulnerable: BTreeSet<String>,
}

impl Circumstances {
    /// Creates empty circumstances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a circumstance tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Records a relationship edge from `from` to `to`.
    pub fn with_relationship(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.relationships
            .entry(from.into())
            .or_default()
            .push(to.into());
        self
    }

    /// Marks a stakeholder as vulnerable.
    pub fn with_vulnerable(mut self, stakeholder: impl Into<String>) -> Self {
        self.vulnerable.insert(stakeholder.into());
        self
    }

    /// Returns true if any tag is in `exceptions`.
    pub fn excuses(&self, exceptions: &[String]) -> bool {
        exceptions.iter().any(|e| self.tags.contains(e))
    }
}

/// Everything an evaluator may look at besides the action itself.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Affected stakeholders.
    pub stakeholders: &'a [Stakeholder],
    /// Circumstance tags, relationship graph, vulnerable parties.
    pub circumstances: &'a Circumstances,
}

impl<'a> EvaluationContext<'a> {
    /// Bundles stakeholders and circumstances.
    pub fn new(stakeholders: &'a [Stakeholder], circumstances: &'a Circumstances) -> Self {
        Self {
            stakeholders,
            circumstances,
        }
    }
}
