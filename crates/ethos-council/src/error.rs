//! Error types for the ethics council.
//!
//! Setup problems (duplicate evaluators, malformed registries) and bad
//! input are fatal. Evaluator failures are not: they are folded into a
//! degraded verdict and the evaluation still completes.

use thiserror::Error;

/// Errors that can occur during council operations.
#[derive(Debug, Error)]
pub enum CouncilError {
    /// Council or registry setup is invalid. Fatal at setup time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An Action or Stakeholder field lies outside its documented bounds.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An evaluator could not produce a full verdict and fell back to neutral.
    #[error("Evaluator '{evaluator}' degraded: {reason}")]
    EvaluatorDegraded {
        /// Registry id of the degraded evaluator.
        evaluator: String,
        /// What went wrong.
        reason: String,
    },

    /// Consensus could not be computed.
    #[error("Consensus failure: {0}")]
    ConsensusFailure(String),

    /// The pattern classifier collaborator failed.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Reading a configuration or scenario file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration or scenario document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = CouncilError::Configuration("duplicate evaluator 'care'".to_string());
        assert!(err.to_string().contains("duplicate evaluator"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = CouncilError::InvalidInput("uncertainty 1.5 outside [0, 1]".to_string());
        assert!(err.to_string().contains("uncertainty 1.5"));
    }

    #[test]
    fn test_degraded_display() {
        let err = CouncilError::EvaluatorDegraded {
            evaluator: "character".to_string(),
            reason: "classifier offline".to_string(),
        };
        assert!(err.to_string().contains("character"));
        assert!(err.to_string().contains("classifier offline"));
    }

    #[test]
    fn test_consensus_failure_display() {
        let err = CouncilError::ConsensusFailure("no votes".to_string());
        assert!(err.to_string().contains("no votes"));
    }

    #[test]
    fn test_serialization_from() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: CouncilError = parse.unwrap_err().into();
        assert!(matches!(err, CouncilError::Serialization(_)));
    }
}
