use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantIdentity, ApplicationId, LoanApplication};
use super::evaluation::{
    ApprovalAuthority, Decision, RiskMetrics, Severity, Violation, ViolationTally,
};

/// The complete outcome of one evaluation: constructed once, never mutated,
/// owned by the caller afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingResult {
    pub application_id: ApplicationId,
    pub applicant: ApplicantIdentity,
    pub decided_as_of: NaiveDate,
    pub metrics: RiskMetrics,
    pub violations: Vec<Violation>,
    pub tally: ViolationTally,
    pub decision: Decision,
    pub approval_authority: ApprovalAuthority,
    pub rationale: String,
}

pub(crate) fn assemble(
    application_id: ApplicationId,
    application: &LoanApplication,
    as_of: NaiveDate,
    metrics: RiskMetrics,
    violations: Vec<Violation>,
    decision: Decision,
    reasons: &[String],
) -> UnderwritingResult {
    let tally = ViolationTally::from_violations(&violations);
    UnderwritingResult {
        application_id,
        applicant: application.applicant.clone(),
        decided_as_of: as_of,
        metrics,
        violations,
        tally,
        decision,
        approval_authority: decision.approval_authority(),
        rationale: reasons.join("; "),
    }
}

/// Render the underwriting decision document handed to the persistence
/// collaborator. Output is a pure function of the result and application, so
/// re-rendering the same evaluation is byte-identical.
pub fn render_markdown(result: &UnderwritingResult, application: &LoanApplication) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Underwriting Decision: {}\n**Date:** {}\n**Decision:** {}\n**Approval Authority:** {}\n\n",
        result.applicant.name,
        result.decided_as_of,
        result.decision.label(),
        result.approval_authority.label()
    ));

    out.push_str("## Applicant Profile\n");
    out.push_str(&format!("- **Name:** {}\n", result.applicant.name));
    out.push_str(&format!("- **Address:** {}\n", result.applicant.address));
    out.push_str(&format!("- **Credit Score:** {}\n", application.credit.score));
    out.push_str(&format!(
        "- **Monthly Income:** ${:.2}\n",
        application.income.monthly_gross_income
    ));
    out.push_str(&format!(
        "- **Employment:** {}, {:.1} years ({})\n\n",
        application.income.employer,
        application.income.years_employed,
        application.income.employment_stability.label()
    ));

    out.push_str("## Financial Analysis\n### Debt-to-Income Ratio\n");
    out.push_str(&format!(
        "- Existing Monthly Debt: ${:.2}\n",
        application.credit.monthly_debts
    ));
    out.push_str(&format!(
        "- Proposed Payment: ${:.2}\n",
        result.metrics.proposed_payment
    ));
    out.push_str(&format!(
        "- Gross Monthly Income: ${:.2}\n",
        application.income.monthly_gross_income
    ));
    out.push_str(&format!("- **DTI: {:.1}%**\n\n", result.metrics.dti * 100.0));

    out.push_str("### Loan-to-Value Ratio\n");
    out.push_str(&format!("- Loan Amount: ${:.2}\n", application.loan.amount));
    out.push_str(&format!(
        "- Vehicle Value: ${:.2}\n",
        application.vehicle.vehicle_value
    ));
    out.push_str(&format!("- **LTV: {:.1}%**\n\n", result.metrics.ltv * 100.0));

    out.push_str("## Policy Compliance\n");
    for violation in &result.violations {
        let marker = match violation.severity {
            Severity::None => "pass",
            severity => severity.label(),
        };
        out.push_str(&format!(
            "- [{marker}] {}: {}\n",
            violation.rule.label(),
            violation.description
        ));
    }
    out.push_str(&format!(
        "\nViolations by severity: {} minor, {} moderate, {} major ({} total)\n\n",
        result.tally.minor,
        result.tally.moderate,
        result.tally.major,
        result.tally.total()
    ));

    out.push_str("## Vehicle Details\n");
    out.push_str(&format!(
        "- {} {} {} ({})\n",
        application.vehicle.year,
        application.vehicle.make,
        application.vehicle.model,
        application.vehicle.vehicle_type.label()
    ));
    out.push_str(&format!(
        "- Purchase Price: ${:.2}\n",
        application.vehicle.purchase_price
    ));
    out.push_str(&format!(
        "- Estimated Value at Loan Maturity: ${:.2}\n\n",
        result.metrics.projected_value_at_maturity
    ));

    out.push_str("## Recommendation\n");
    out.push_str(&format!(
        "**{}** ({})\n\n{}\n",
        result.decision.label(),
        result.approval_authority.label(),
        result.rationale
    ));

    out
}
