use serde::{Deserialize, Serialize};

use super::config::PolicyConfig;
use super::rules::{RiskSignals, ViolationTally};

/// The four routing outcomes, ordered from least to most restrictive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Decision {
    AutoApprove,
    HumanReview,
    EscalationRequired,
    AutoDeny,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::AutoApprove => "AUTO_APPROVE",
            Decision::HumanReview => "HUMAN_REVIEW",
            Decision::EscalationRequired => "ESCALATION_REQUIRED",
            Decision::AutoDeny => "AUTO_DENY",
        }
    }

    /// Approval authority is a total function of the outcome. No randomness
    /// anywhere in routing; identical inputs always produce identical output.
    pub const fn approval_authority(self) -> ApprovalAuthority {
        match self {
            Decision::AutoApprove => ApprovalAuthority::System,
            Decision::HumanReview => ApprovalAuthority::SeniorUnderwriter,
            Decision::EscalationRequired => ApprovalAuthority::RegionalDirector,
            Decision::AutoDeny => ApprovalAuthority::SystemDeny,
        }
    }
}

/// Organizational role required to act on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalAuthority {
    System,
    SeniorUnderwriter,
    RegionalDirector,
    SystemDeny,
}

impl ApprovalAuthority {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalAuthority::System => "System",
            ApprovalAuthority::SeniorUnderwriter => "Senior Underwriter",
            ApprovalAuthority::RegionalDirector => "Regional Director",
            ApprovalAuthority::SystemDeny => "System (deny)",
        }
    }
}

/// Aggregate the tally and raw signals into an outcome, top tier first. The
/// first tier with at least one matching condition wins, and every matching
/// condition within that tier becomes part of the rationale.
pub(crate) fn decide(
    tally: &ViolationTally,
    signals: &RiskSignals,
    config: &PolicyConfig,
) -> (Decision, Vec<String>) {
    let mut reasons = Vec::new();

    if tally.major > 0 {
        reasons.push(format!("{} major violation(s)", tally.major));
    }
    if tally.total() >= config.max_total_violations_before_deny {
        reasons.push(format!(
            "{} total violations reaches the automatic denial cap of {}",
            tally.total(),
            config.max_total_violations_before_deny
        ));
    }
    if signals.credit_score < config.credit_deny_floor {
        reasons.push(format!(
            "credit score {} below the {} floor",
            signals.credit_score, config.credit_deny_floor
        ));
    }
    if signals.dti > config.dti_exception_max() {
        reasons.push(format!(
            "DTI {:.1}% beyond the {:.0}% exception ceiling",
            signals.dti * 100.0,
            config.dti_exception_max() * 100.0
        ));
    }
    if signals.derogatory_event {
        reasons.push("recent repossession or bankruptcy on file".to_string());
    }
    if !reasons.is_empty() {
        return (Decision::AutoDeny, reasons);
    }

    if tally.moderate >= 1 {
        reasons.push(format!("{} moderate violation(s)", tally.moderate));
    }
    if tally.minor >= 2 {
        reasons.push(format!("{} minor violations", tally.minor));
    }
    if (config.credit_deny_floor..=config.credit_escalation_max).contains(&signals.credit_score) {
        reasons.push(format!(
            "credit score {} in the {}-{} escalation band",
            signals.credit_score, config.credit_deny_floor, config.credit_escalation_max
        ));
    }
    if signals.dti > config.dti_warning_max && signals.dti <= config.dti_exception_max() {
        reasons.push(format!(
            "DTI {:.1}% requires an underwriting exception",
            signals.dti * 100.0
        ));
    }
    if signals.ltv_points_over > 0.0 {
        reasons.push(format!(
            "LTV {:.1} points over the age-based limit",
            signals.ltv_points_over
        ));
    }
    if signals.negative_equity > 0.0 && signals.unstable_employment {
        reasons.push(format!(
            "negative equity ${:.2} combined with unstable employment",
            signals.negative_equity
        ));
    }
    if !reasons.is_empty() {
        return (Decision::EscalationRequired, reasons);
    }

    if tally.minor >= 1 {
        reasons.push(format!("{} minor violation(s)", tally.minor));
    }
    if ((config.credit_escalation_max + 1)..=config.credit_review_max)
        .contains(&signals.credit_score)
    {
        reasons.push(format!(
            "credit score {} below the {} preferred minimum",
            signals.credit_score,
            config.credit_review_max + 1
        ));
    }
    if signals.dti > config.dti_target_max && signals.dti <= config.dti_warning_max {
        reasons.push(format!(
            "DTI {:.1}% in the {:.0}%-{:.0}% warning band",
            signals.dti * 100.0,
            config.dti_target_max * 100.0,
            config.dti_warning_max * 100.0
        ));
    }
    if !reasons.is_empty() {
        return (Decision::HumanReview, reasons);
    }

    (
        Decision::AutoApprove,
        vec!["all policy checks passed with credit, DTI, and collateral within target".to_string()],
    )
}
