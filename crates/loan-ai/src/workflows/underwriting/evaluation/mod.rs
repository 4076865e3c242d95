mod config;
mod metrics;
mod policy;
mod rules;

pub use config::{
    ConfigurationError, CreditBand, DepreciationSchedule, LtvAgeBracket, PolicyConfig,
    SeverityBand,
};
pub use metrics::{InvalidInputError, RiskMetrics};
pub use policy::{ApprovalAuthority, Decision};
pub use rules::{RuleName, Severity, Violation, ViolationTally};

use chrono::{Datelike, NaiveDate};

use super::domain::{ApplicationId, LoanApplication};
use super::report::{self, UnderwritingResult};

/// Stateless decision engine applying one validated policy to applications.
/// Every operation is a pure, synchronous function over immutable inputs;
/// concurrent callers need no coordination.
pub struct UnderwritingEngine {
    config: PolicyConfig,
}

impl UnderwritingEngine {
    /// Validate the policy once; a structurally broken policy never reaches
    /// an evaluation.
    pub fn new(config: PolicyConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Surface the input-domain check on its own so intake can fail fast
    /// before a record is stored.
    pub fn validate_application(
        &self,
        application: &LoanApplication,
    ) -> Result<(), InvalidInputError> {
        metrics::validate(application)
    }

    /// Compute DTI, LTV, the proposed payment, and the depreciation forecast
    /// for one application. `as_of` anchors the vehicle-age derivation.
    pub fn compute_metrics(
        &self,
        application: &LoanApplication,
        as_of: NaiveDate,
    ) -> Result<RiskMetrics, InvalidInputError> {
        let vehicle_age = application.vehicle.age_years(as_of.year());
        metrics::compute(application, &self.config, vehicle_age)
    }

    /// Run the full pipeline: metrics, violation detection, routing, report
    /// assembly. Identical inputs always yield an identical result.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
        application: &LoanApplication,
        as_of: NaiveDate,
    ) -> Result<UnderwritingResult, InvalidInputError> {
        let vehicle_age = application.vehicle.age_years(as_of.year());
        let risk_metrics = metrics::compute(application, &self.config, vehicle_age)?;

        let (violations, signals) = rules::detect(
            &risk_metrics,
            &application.credit,
            &application.vehicle,
            vehicle_age,
            &application.income,
            &self.config,
        );

        let tally = ViolationTally::from_violations(&violations);
        let (decision, reasons) = policy::decide(&tally, &signals, &self.config);

        Ok(report::assemble(
            application_id.clone(),
            application,
            as_of,
            risk_metrics,
            violations,
            decision,
            &reasons,
        ))
    }
}
