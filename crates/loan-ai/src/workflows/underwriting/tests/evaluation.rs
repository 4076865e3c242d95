use super::common::*;
use crate::workflows::underwriting::domain::EmploymentStability;
use crate::workflows::underwriting::evaluation::{
    ConfigurationError, Decision, PolicyConfig, RuleName, Severity, UnderwritingEngine,
};
use crate::workflows::underwriting::ApplicationId;

fn evaluate(application: &crate::workflows::underwriting::LoanApplication) -> crate::workflows::underwriting::UnderwritingResult {
    engine()
        .evaluate(&ApplicationId("loan-test".to_string()), application, as_of())
        .expect("evaluation succeeds")
}

fn severity_of(
    result: &crate::workflows::underwriting::UnderwritingResult,
    rule: RuleName,
) -> Severity {
    result
        .violations
        .iter()
        .find(|violation| violation.rule == rule)
        .map(|violation| violation.severity)
        .expect("rule record present")
}

#[test]
fn every_rule_is_recorded_even_when_clean() {
    let result = evaluate(&application());

    let rules: Vec<RuleName> = result
        .violations
        .iter()
        .map(|violation| violation.rule)
        .collect();
    assert_eq!(
        rules,
        vec![
            RuleName::DtiMax,
            RuleName::CreditMin,
            RuleName::LtvMax,
            RuleName::EmploymentMin,
            RuleName::CollectionsMax,
            RuleName::RepoBankruptcy,
        ]
    );
    assert!(result
        .violations
        .iter()
        .all(|violation| violation.severity == Severity::None));
    assert_eq!(result.tally.total(), 0);
}

#[test]
fn dti_boundaries_map_to_the_documented_bands() {
    // Payments against $10,000 income; lower band edges inclusive, so a
    // value sitting exactly on an edge stays in the lower band.
    let cases = [
        (4_000.0, Severity::None, Decision::AutoApprove), // 40.00%
        (4_001.0, Severity::None, Decision::HumanReview), // 40.01% warning band
        (4_300.0, Severity::None, Decision::HumanReview), // 43.00% still warning
        (4_301.0, Severity::Minor, Decision::EscalationRequired), // 43.01%
        (4_800.0, Severity::Moderate, Decision::EscalationRequired), // 48.00%
        (4_801.0, Severity::Major, Decision::AutoDeny),   // 48.01%
    ];

    for (payment, expected_severity, expected_decision) in cases {
        let result = evaluate(&application_with_payment(payment));
        assert_eq!(
            severity_of(&result, RuleName::DtiMax),
            expected_severity,
            "payment {payment}"
        );
        assert_eq!(result.decision, expected_decision, "payment {payment}");
    }
}

#[test]
fn credit_boundaries_map_to_the_documented_bands() {
    let cases = [
        (700, Severity::None, Decision::AutoApprove),
        (699, Severity::None, Decision::HumanReview),
        (660, Severity::None, Decision::HumanReview),
        (659, Severity::None, Decision::EscalationRequired),
        (620, Severity::None, Decision::EscalationRequired),
        (619, Severity::Minor, Decision::AutoDeny),
        (600, Severity::Moderate, Decision::AutoDeny),
        (599, Severity::Major, Decision::AutoDeny),
    ];

    for (score, expected_severity, expected_decision) in cases {
        let result = evaluate(&application_with_credit(score));
        assert_eq!(
            severity_of(&result, RuleName::CreditMin),
            expected_severity,
            "score {score}"
        );
        assert_eq!(result.decision, expected_decision, "score {score}");
    }
}

#[test]
fn credit_band_labels_follow_the_policy_table() {
    let result = evaluate(&application_with_credit(635));
    let record = result
        .violations
        .iter()
        .find(|violation| violation.rule == RuleName::CreditMin)
        .expect("credit record present");
    assert!(record.description.contains("fair"));

    let result = evaluate(&application_with_credit(592));
    let record = result
        .violations
        .iter()
        .find(|violation| violation.rule == RuleName::CreditMin)
        .expect("credit record present");
    assert!(record.description.contains("critical"));
    assert!(record.description.contains("below the 620 floor"));
}

#[test]
fn ltv_breach_severity_scales_with_points_over_the_limit() {
    // Vehicle age 4 in the fixture, so the limit is 100%.
    let cases = [
        (9_800.0, Severity::None, Decision::AutoApprove),
        (10_400.0, Severity::Minor, Decision::EscalationRequired),
        (10_800.0, Severity::Moderate, Decision::EscalationRequired),
        (11_200.0, Severity::Major, Decision::AutoDeny),
    ];

    for (amount, expected_severity, expected_decision) in cases {
        let result = evaluate(&application_with_ltv(amount));
        assert_eq!(
            severity_of(&result, RuleName::LtvMax),
            expected_severity,
            "amount {amount}"
        );
        assert_eq!(result.decision, expected_decision, "amount {amount}");
    }
}

#[test]
fn ltv_limits_tighten_with_vehicle_age() {
    let engine = engine();
    let config = engine.config();
    assert_eq!(config.ltv_max_for_age(0), 1.20);
    assert_eq!(config.ltv_max_for_age(1), 1.10);
    assert_eq!(config.ltv_max_for_age(3), 1.10);
    assert_eq!(config.ltv_max_for_age(4), 1.00);
    assert_eq!(config.ltv_max_for_age(6), 1.00);
    assert_eq!(config.ltv_max_for_age(7), 0.90);
    assert_eq!(config.ltv_max_for_age(12), 0.90);
}

#[test]
fn short_tenure_is_minor_unless_employment_is_unstable() {
    let mut short_tenure = application();
    short_tenure.income.years_employed = 1.5;
    let result = evaluate(&short_tenure);
    assert_eq!(severity_of(&result, RuleName::EmploymentMin), Severity::Minor);
    assert_eq!(result.decision, Decision::HumanReview);

    short_tenure.income.employment_stability = EmploymentStability::Unstable;
    let result = evaluate(&short_tenure);
    assert_eq!(
        severity_of(&result, RuleName::EmploymentMin),
        Severity::Moderate
    );
    assert_eq!(result.decision, Decision::EscalationRequired);
}

#[test]
fn collections_over_the_cap_are_major() {
    let mut application = application();
    application.credit.collections_count = 2;
    application.credit.collections_amount = Some(6_200.0);

    let result = evaluate(&application);
    assert_eq!(
        severity_of(&result, RuleName::CollectionsMax),
        Severity::Major
    );
    assert_eq!(result.decision, Decision::AutoDeny);
}

#[test]
fn collections_within_the_cap_are_minor() {
    let mut application = application();
    application.credit.collections_count = 1;
    application.credit.collections_amount = Some(1_200.0);

    let result = evaluate(&application);
    assert_eq!(
        severity_of(&result, RuleName::CollectionsMax),
        Severity::Minor
    );
    assert_eq!(result.decision, Decision::HumanReview);
}

#[test]
fn unreported_collections_balance_still_flags_the_accounts() {
    let mut application = application();
    application.credit.collections_count = 3;
    application.credit.collections_amount = None;

    let result = evaluate(&application);
    let record = result
        .violations
        .iter()
        .find(|violation| violation.rule == RuleName::CollectionsMax)
        .expect("collections record present");
    assert_eq!(record.severity, Severity::Minor);
    assert!(record.description.contains("balance unreported"));
}

#[test]
fn repossession_or_bankruptcy_is_always_major() {
    let mut repossession = application();
    repossession.credit.recent_repossession = true;
    let result = evaluate(&repossession);
    assert_eq!(
        severity_of(&result, RuleName::RepoBankruptcy),
        Severity::Major
    );
    assert_eq!(result.decision, Decision::AutoDeny);

    let mut bankrupt = application();
    bankrupt.credit.bankruptcy = true;
    let result = evaluate(&bankrupt);
    assert_eq!(
        severity_of(&result, RuleName::RepoBankruptcy),
        Severity::Major
    );
    assert_eq!(result.decision, Decision::AutoDeny);
}

#[test]
fn broken_policy_tables_fail_engine_construction() {
    let mut config = policy();
    config.dti_violation_bands.clear();
    assert!(matches!(
        UnderwritingEngine::new(config),
        Err(ConfigurationError::DtiBands)
    ));

    let mut config = policy();
    config.credit_bands.clear();
    assert!(matches!(
        UnderwritingEngine::new(config),
        Err(ConfigurationError::CreditBands)
    ));

    let mut config = policy();
    config.depreciation_schedule.new_vehicle.clear();
    assert!(matches!(
        UnderwritingEngine::new(config),
        Err(ConfigurationError::DepreciationSchedule)
    ));

    let mut config = policy();
    config.max_total_violations_before_deny = 0;
    assert!(matches!(
        UnderwritingEngine::new(config),
        Err(ConfigurationError::ViolationCap)
    ));
}

#[test]
fn policy_round_trips_through_json() {
    let policy = policy();
    let json = serde_json::to_string(&policy).expect("policy serializes");
    let restored: PolicyConfig = serde_json::from_str(&json).expect("policy deserializes");
    assert_eq!(policy, restored);
}

#[test]
fn negative_equity_with_unstable_employment_escalates() {
    let mut application = application();
    application.vehicle.negative_equity = 2_500.0;
    application.income.employment_stability = EmploymentStability::Unstable;

    let result = evaluate(&application);
    assert_eq!(result.decision, Decision::EscalationRequired);
    assert!(result.rationale.contains("negative equity"));

    // Negative equity alone, with stable employment, stays clean.
    let mut stable = super::common::application();
    stable.vehicle.negative_equity = 2_500.0;
    let result = evaluate(&stable);
    assert_eq!(result.decision, Decision::AutoApprove);
}
