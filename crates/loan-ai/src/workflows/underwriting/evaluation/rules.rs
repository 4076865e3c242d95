use serde::{Deserialize, Serialize};

use super::config::PolicyConfig;
use super::metrics::RiskMetrics;
use crate::workflows::underwriting::domain::{
    CreditRecord, EmploymentStability, IncomeRecord, VehicleRecord,
};

/// Severity ladder for a policy check. `None` records document that a rule
/// was evaluated and passed; only the other three count toward denial caps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
        }
    }

    pub const fn is_violation(self) -> bool {
        !matches!(self, Severity::None)
    }
}

/// Fixed rule identifiers, in evaluation (and report) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleName {
    DtiMax,
    CreditMin,
    LtvMax,
    EmploymentMin,
    CollectionsMax,
    RepoBankruptcy,
}

impl RuleName {
    pub const fn label(self) -> &'static str {
        match self {
            RuleName::DtiMax => "DTI_MAX",
            RuleName::CreditMin => "CREDIT_MIN",
            RuleName::LtvMax => "LTV_MAX",
            RuleName::EmploymentMin => "EMPLOYMENT_MIN",
            RuleName::CollectionsMax => "COLLECTIONS_MAX",
            RuleName::RepoBankruptcy => "REPO_BANKRUPTCY",
        }
    }
}

/// One audit record per rule per evaluation, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: RuleName,
    pub severity: Severity,
    pub threshold: f64,
    pub actual: f64,
    pub description: String,
}

/// Violation counts by severity, excluding `none` records. Aggregation is a
/// total function of the violation list so routing never re-derives it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationTally {
    pub minor: usize,
    pub moderate: usize,
    pub major: usize,
}

impl ViolationTally {
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut tally = Self::default();
        for violation in violations {
            match violation.severity {
                Severity::None => {}
                Severity::Minor => tally.minor += 1,
                Severity::Moderate => tally.moderate += 1,
                Severity::Major => tally.major += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.minor + self.moderate + self.major
    }
}

/// Raw inputs the decision router consults beyond the tally itself.
pub(crate) struct RiskSignals {
    pub dti: f64,
    pub credit_score: u16,
    /// Percentage points over the age-based LTV limit; zero when within it.
    pub ltv_points_over: f64,
    pub derogatory_event: bool,
    pub negative_equity: f64,
    pub unstable_employment: bool,
}

pub(crate) fn detect(
    metrics: &RiskMetrics,
    credit: &CreditRecord,
    vehicle: &VehicleRecord,
    vehicle_age: u32,
    income: &IncomeRecord,
    config: &PolicyConfig,
) -> (Vec<Violation>, RiskSignals) {
    let mut violations = Vec::with_capacity(6);

    let dti_pct = metrics.dti * 100.0;
    let dti_severity = config.dti_severity(metrics.dti);
    let dti_description = if metrics.dti <= config.dti_target_max {
        format!(
            "DTI {dti_pct:.1}% within the {:.0}% target",
            config.dti_target_max * 100.0
        )
    } else if metrics.dti <= config.dti_warning_max {
        format!(
            "DTI {dti_pct:.1}% in the warning band ({:.0}%-{:.0}%)",
            config.dti_target_max * 100.0,
            config.dti_warning_max * 100.0
        )
    } else {
        format!(
            "DTI {dti_pct:.1}% exceeds the {:.0}% maximum",
            config.dti_warning_max * 100.0
        )
    };
    violations.push(Violation {
        rule: RuleName::DtiMax,
        severity: dti_severity,
        threshold: config.dti_warning_max,
        actual: metrics.dti,
        description: dti_description,
    });

    let band = config.credit_band(credit.score);
    let credit_description = if credit.score < config.credit_deny_floor {
        format!(
            "credit score {} rated {}, below the {} floor",
            credit.score, band.label, config.credit_deny_floor
        )
    } else {
        format!("credit score {} rated {}", credit.score, band.label)
    };
    violations.push(Violation {
        rule: RuleName::CreditMin,
        severity: band.severity,
        threshold: f64::from(config.credit_deny_floor),
        actual: f64::from(credit.score),
        description: credit_description,
    });

    let ltv_max = config.ltv_max_for_age(vehicle_age);
    let ltv_points_over = ((metrics.ltv - ltv_max) * 100.0).max(0.0);
    let ltv_severity = if ltv_points_over <= 0.0 {
        Severity::None
    } else if ltv_points_over <= config.ltv_minor_margin * 100.0 {
        Severity::Minor
    } else if ltv_points_over <= config.ltv_moderate_margin * 100.0 {
        Severity::Moderate
    } else {
        Severity::Major
    };
    let ltv_description = if ltv_severity.is_violation() {
        format!(
            "LTV {:.1}% exceeds the {:.0}% limit for a {vehicle_age}-year-old vehicle by {ltv_points_over:.1} points",
            metrics.ltv * 100.0,
            ltv_max * 100.0
        )
    } else {
        format!(
            "LTV {:.1}% within the {:.0}% limit for a {vehicle_age}-year-old vehicle",
            metrics.ltv * 100.0,
            ltv_max * 100.0
        )
    };
    violations.push(Violation {
        rule: RuleName::LtvMax,
        severity: ltv_severity,
        threshold: ltv_max,
        actual: metrics.ltv,
        description: ltv_description,
    });

    let unstable = income.employment_stability == EmploymentStability::Unstable;
    let employment_severity = if income.years_employed >= config.employment_min_years {
        Severity::None
    } else if unstable {
        Severity::Moderate
    } else {
        Severity::Minor
    };
    let employment_description = match employment_severity {
        Severity::None => format!(
            "employment tenure {:.1} years meets the {:.1}-year minimum",
            income.years_employed, config.employment_min_years
        ),
        Severity::Moderate => format!(
            "employment tenure {:.1} years below the {:.1}-year minimum with unstable employment",
            income.years_employed, config.employment_min_years
        ),
        _ => format!(
            "employment tenure {:.1} years below the {:.1}-year minimum",
            income.years_employed, config.employment_min_years
        ),
    };
    violations.push(Violation {
        rule: RuleName::EmploymentMin,
        severity: employment_severity,
        threshold: config.employment_min_years,
        actual: income.years_employed,
        description: employment_description,
    });

    let (collections_severity, collections_actual, collections_description) =
        match (credit.collections_count, credit.collections_amount) {
            (0, _) => (
                Severity::None,
                0.0,
                "no open collection accounts".to_string(),
            ),
            (count, Some(amount)) if amount > config.collections_cap => (
                Severity::Major,
                amount,
                format!(
                    "{count} collection account(s) totaling ${amount:.2}, over the ${:.2} cap",
                    config.collections_cap
                ),
            ),
            (count, Some(amount)) => (
                Severity::Minor,
                amount,
                format!(
                    "{count} collection account(s) totaling ${amount:.2}, within the ${:.2} cap",
                    config.collections_cap
                ),
            ),
            (count, None) => (
                Severity::Minor,
                f64::from(count),
                format!("{count} collection account(s) on file, balance unreported"),
            ),
        };
    violations.push(Violation {
        rule: RuleName::CollectionsMax,
        severity: collections_severity,
        threshold: config.collections_cap,
        actual: collections_actual,
        description: collections_description,
    });

    let derogatory_event = credit.recent_repossession || credit.bankruptcy;
    let derogatory_count = u32::from(credit.recent_repossession) + u32::from(credit.bankruptcy);
    let derogatory_description = match (credit.recent_repossession, credit.bankruptcy) {
        (true, true) => "recent repossession and bankruptcy on file".to_string(),
        (true, false) => "recent repossession on file".to_string(),
        (false, true) => "bankruptcy on file".to_string(),
        (false, false) => "no repossession or bankruptcy on file".to_string(),
    };
    violations.push(Violation {
        rule: RuleName::RepoBankruptcy,
        severity: if derogatory_event {
            Severity::Major
        } else {
            Severity::None
        },
        threshold: 0.0,
        actual: f64::from(derogatory_count),
        description: derogatory_description,
    });

    let signals = RiskSignals {
        dti: metrics.dti,
        credit_score: credit.score,
        ltv_points_over,
        derogatory_event,
        negative_equity: vehicle.negative_equity,
        unstable_employment: unstable,
    };

    (violations, signals)
}
