//! # End-to-End Scenario Tests
//!
//! Full council evaluations with the reference evaluators and the keyword
//! classifier.
//!
//! ## Scenarios Covered
//!
//! 1. **Disclosure Dilemma**: public disclosure of a security flaw
//! 2. **Consensus Bands**: one scenario per consensus level
//! 3. **Rule Exceptions**: circumstances that excuse a violation
//! 4. **Configuration**: councils built from JSON files

use std::io::Write;

use ethos_council::{
    Action, Circumstances, ConsensusLevel, Consequentialist, Council, CouncilConfig, CouncilError,
    Recommendation, RiskFlag, Stakeholder, VerdictKind,
};

fn disclosure_stakeholders() -> Vec<Stakeholder> {
    vec![
        Stakeholder::new("users", "human", 0.8, 0.8, 1.0),
        Stakeholder::new("company", "organization", 0.3, 0.5, 0.6),
        Stakeholder::new("attackers", "human", 0.5, 0.3, 0.2),
    ]
}

fn public_disclosure() -> Action {
    Action::new(
        "public_disclosure",
        "Publish full details of the vulnerability to alert everyone",
    )
    .with_consequence("users", 0.7)
    .with_consequence("company", -0.5)
    .with_uncertainty(0.4)
    .with_reversibility(0.0)
}

fn private_report() -> Action {
    Action::new("private_report", "Report the vulnerability privately to the company")
        .with_consequence("users", 0.4)
        .with_consequence("attackers", 0.2)
        .with_consequence("company", 0.6)
        .with_uncertainty(0.5)
        .with_reversibility(0.3)
}

fn stay_silent() -> Action {
    Action::new("stay_silent", "Say nothing and wait")
        .with_consequence("users", -0.8)
        .with_consequence("company", 0.1)
        .with_uncertainty(0.2)
        .with_reversibility(0.8)
}

fn security_crisis() -> Circumstances {
    Circumstances::new().with_tag("crisis_security")
}

// =============================================================================
// DISCLOSURE DILEMMA
// =============================================================================

#[test]
fn test_scenario_public_disclosure() {
    let council = Council::new().unwrap();
    let report = council
        .evaluate(&public_disclosure(), &disclosure_stakeholders(), &security_crisis())
        .unwrap();

    assert_eq!(report.risk_flags, vec![RiskFlag::LowReversibility]);
    assert!(!report.has_flag("HIGH_UNCERTAINTY"));

    // 0.7 * 0.8 * 1.0 - 0.5 * 0.5 * 0.6 = 0.41, discounted by 1 - 0.4 * 0.5
    let utility = &report.outcome("consequentialist").unwrap().raw;
    match utility.kind {
        VerdictKind::Utility { raw, adjusted } => {
            assert!((raw - 0.41).abs() < 1e-9);
            assert!((adjusted - 0.328).abs() < 1e-9);
        }
        ref other => panic!("unexpected verdict shape {:?}", other),
    }

    assert_eq!(report.supports("consequentialist"), Some(true));
    assert_eq!(report.supports("deontological"), Some(true));
    assert_eq!(report.supports("virtue"), Some(false));
    assert_eq!(report.supports("care"), Some(false));
    assert_eq!(report.consensus_level, ConsensusLevel::Divided);
    assert_eq!(
        report.recommendation,
        Recommendation::ProceedWithCaution { flag_count: 1 }
    );
}

#[test]
fn test_scenario_all_three_options() {
    let council = Council::new().unwrap();
    let actions = vec![public_disclosure(), private_report(), stay_silent()];
    let reports = council
        .evaluate_all(&actions, &disclosure_stakeholders(), &security_crisis())
        .unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].action, "public_disclosure");

    // Reversibility 0.3 is not below the 0.3 floor.
    assert!(reports[1].risk_flags.is_empty());

    let silent = &reports[2];
    assert_eq!(silent.supports("consequentialist"), Some(false));
}

#[test]
fn test_scenario_best_option_by_utility() {
    let actions = vec![public_disclosure(), private_report(), stay_silent()];
    let (best, utility) = Consequentialist::new()
        .choose_best(&actions, &disclosure_stakeholders())
        .unwrap();

    assert_eq!(best.name, "private_report");
    assert!((utility - 0.384).abs() < 1e-9);
}

// =============================================================================
// CONSENSUS BANDS
// =============================================================================

#[test]
fn test_scenario_strong_support() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("patients", "human", 0.9, 0.9, 1.0)];
    let circumstances = Circumstances::new().with_vulnerable("patients");
    let action = Action::new(
        "careful_treatment",
        "Carefully consider and analyze options, honestly and transparently help \
         and protect the patients, support and care for them",
    )
    .with_consequence("patients", 0.8)
    .with_uncertainty(0.2)
    .with_reversibility(0.9);

    let report = council.evaluate(&action, &stakeholders, &circumstances).unwrap();

    assert_eq!(report.tally.supporting, 4);
    assert_eq!(report.consensus_level, ConsensusLevel::StrongSupport);
    assert!(report.risk_flags.is_empty());
    assert_eq!(report.recommendation, Recommendation::Recommended);
}

#[test]
fn test_scenario_moderate_support() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("users", "human", 0.8, 0.8, 1.0)];
    let action = Action::new("ship_fix", "Help and protect the users by shipping the fix")
        .with_consequence("users", 0.6);

    let report = council
        .evaluate(&action, &stakeholders, &Circumstances::new())
        .unwrap();

    assert_eq!(report.supports("care"), Some(false));
    assert_eq!(report.consensus_level, ConsensusLevel::ModerateSupport);
    assert_eq!(report.recommendation, Recommendation::ContextualDecision);
}

#[test]
fn test_scenario_divided_without_flags() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("shareholders", "human", 0.3, 0.5, 0.6)];
    let action = Action::new("quarterly_report", "Publish the quarterly report")
        .with_consequence("shareholders", 0.5);

    let report = council
        .evaluate(&action, &stakeholders, &Circumstances::new())
        .unwrap();

    assert_eq!(report.tally.supporting, 2);
    assert_eq!(report.consensus_level, ConsensusLevel::Divided);
    assert_eq!(report.recommendation, Recommendation::GenuineDilemma);
}

#[test]
fn test_scenario_weak_support() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("island", "ecosystem", 0.5, 0.9, 1.0)];
    let action = Action::new("cull_rats", "Kill the invasive rats to help the island")
        .with_consequence("island", 0.8);

    let report = council
        .evaluate(&action, &stakeholders, &Circumstances::new())
        .unwrap();

    assert_eq!(report.supports("consequentialist"), Some(true));
    assert_eq!(report.supports("deontological"), Some(false));
    assert_eq!(report.consensus_level, ConsensusLevel::WeakSupport);
    assert_eq!(report.recommendation, Recommendation::ContextualDecision);
}

#[test]
fn test_scenario_strong_opposition() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("flock", "animal", 0.7, 0.6, 0.5)];
    let action = Action::new("cull_flock", "Kill the infected flock")
        .with_consequence("flock", -0.6)
        .with_uncertainty(0.1)
        .with_reversibility(0.5);

    let report = council
        .evaluate(&action, &stakeholders, &Circumstances::new())
        .unwrap();

    assert_eq!(report.tally.supporting, 0);
    assert_eq!(report.consensus_level, ConsensusLevel::StrongOpposition);
    assert!(report.risk_flags.is_empty());
    assert_eq!(report.recommendation, Recommendation::NotRecommended);
}

#[test]
fn test_scenario_strong_opposition_ignores_flags() {
    let council = Council::new().unwrap();
    let stakeholders = vec![Stakeholder::new("flock", "animal", 0.7, 0.6, 0.5)];
    let action = Action::new("cull_flock", "Kill and eliminate the infected flock")
        .with_consequence("flock", -0.6)
        .with_uncertainty(0.9)
        .with_reversibility(0.0);

    let report = council
        .evaluate(&action, &stakeholders, &Circumstances::new())
        .unwrap();

    assert_eq!(
        report.flag_ids(),
        vec!["LOW_REVERSIBILITY", "HIGH_UNCERTAINTY", "PROBLEMATIC_PATTERN"]
    );
    assert_eq!(report.recommendation, Recommendation::NotRecommended);
}

// =============================================================================
// RULE EXCEPTIONS
// =============================================================================

#[test]
fn test_scenario_self_defense_excuses_killing() {
    let council = Council::new().unwrap();
    let action = Action::new("defend", "Kill the intruder");

    let plain = council.evaluate(&action, &[], &Circumstances::new()).unwrap();
    assert_eq!(plain.supports("deontological"), Some(false));

    let excused = council
        .evaluate(&action, &[], &Circumstances::new().with_tag("self_defense"))
        .unwrap();
    assert_eq!(excused.supports("deontological"), Some(true));
}

#[test]
fn test_scenario_theft_and_broken_promise() {
    let council = Council::new().unwrap();
    let action = Action::new("abscond", "Steal the funds and break our promise");

    let report = council.evaluate(&action, &[], &Circumstances::new()).unwrap();
    assert_eq!(report.supports("deontological"), Some(false));
    assert!(report.outcome("deontological").unwrap().raw.rationale.contains("do_not_steal, keep_promises"));

    let excused = council
        .evaluate(
            &action,
            &[],
            &Circumstances::new()
                .with_tag("extreme_necessity")
                .with_tag("immoral_promise"),
        )
        .unwrap();
    assert_eq!(excused.supports("deontological"), Some(true));
}

#[test]
fn test_scenario_deceptive_action_is_flagged() {
    let council = Council::new().unwrap();
    let action = Action::new("spin", "Deceive the regulator and conceal the logs");

    let report = council.evaluate(&action, &[], &Circumstances::new()).unwrap();

    assert_eq!(report.supports("deontological"), Some(false));
    assert_eq!(
        report.risk_flags,
        vec![RiskFlag::ProblematicPattern {
            markers: vec!["deceive".to_string(), "conceal".to_string()]
        }]
    );
    assert_eq!(
        report.recommendation,
        Recommendation::NotRecommended,
        "{}",
        report
    );
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_scenario_config_file_changes_thresholds() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"risk": {{"low_reversibility_below": 0.0}}, "care": {{"support_threshold": 0.3}}}}"#
    )
    .unwrap();
    let config = CouncilConfig::from_file(file.path()).unwrap();
    let council = Council::from_config(config).unwrap();

    let report = council
        .evaluate(&public_disclosure(), &disclosure_stakeholders(), &security_crisis())
        .unwrap();

    // Care 0.325 now clears the lowered threshold; reversibility 0.0 is no
    // longer below the floor.
    assert_eq!(report.supports("care"), Some(true));
    assert!(report.risk_flags.is_empty());
    assert_eq!(report.consensus_level, ConsensusLevel::ModerateSupport);
    assert_eq!(report.recommendation, Recommendation::ContextualDecision);
}

#[test]
fn test_scenario_malformed_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"rules": {{"registry": [{{"name": "", "weight": 0.5}}]}}}}"#).unwrap();
    let err = CouncilConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, CouncilError::Configuration(_)));
}

#[test]
fn test_scenario_rule_without_check_rejected() {
    let config =
        CouncilConfig::from_json(r#"{"rules": {"registry": [{"name": "no_spam", "weight": 0.4}]}}"#).unwrap();
    let err = Council::from_config(config).unwrap_err();
    assert!(matches!(err, CouncilError::Configuration(_)));
    assert!(err.to_string().contains("no_spam"));
}
