use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identity fields carried through to the underwriting report. None of them
/// participate in any calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantIdentity {
    pub name: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
}

/// Income and employment snapshot produced by the upstream extraction layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub monthly_gross_income: f64,
    pub employer: String,
    pub years_employed: f64,
    pub employment_stability: EmploymentStability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStability {
    Stable,
    Unstable,
}

impl EmploymentStability {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentStability::Stable => "stable",
            EmploymentStability::Unstable => "unstable",
        }
    }
}

/// Credit bureau snapshot. `collections_amount` is the aggregate balance in
/// collections when the extraction layer could read it from the report;
/// `collections_count` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    pub score: u16,
    pub monthly_debts: f64,
    pub collections_count: u32,
    #[serde(default)]
    pub collections_amount: Option<f64>,
    pub recent_repossession: bool,
    pub bankruptcy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    New,
    Used,
}

impl VehicleType {
    pub const fn label(self) -> &'static str {
        match self {
            VehicleType::New => "new",
            VehicleType::Used => "used",
        }
    }
}

/// Collateral description. `negative_equity` is the amount still owed beyond
/// the value of a trade-in rolled into this loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub purchase_price: f64,
    pub vehicle_value: f64,
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub negative_equity: f64,
}

impl VehicleRecord {
    /// Vehicle age relative to the decision year, floored at zero so a
    /// next-model-year purchase does not go negative.
    pub fn age_years(&self, as_of_year: i32) -> u32 {
        (as_of_year - self.year).max(0) as u32
    }
}

/// Requested financing terms. The proposed monthly payment is optional; when
/// absent the engine derives it by fixed-rate amortization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: f64,
    pub term_months: u32,
    pub down_payment: f64,
    #[serde(default)]
    pub proposed_monthly_payment: Option<f64>,
}

/// The composite input contract: one fully-typed application as produced by
/// the upstream document-extraction collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub applicant: ApplicantIdentity,
    pub income: IncomeRecord,
    pub credit: CreditRecord,
    pub vehicle: VehicleRecord,
    pub loan: LoanRequest,
}

/// High level status tracked throughout the underwriting workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Submitted,
    Approved,
    InReview,
    Escalated,
    Denied,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Escalated => "escalated",
            ApplicationStatus::Denied => "denied",
        }
    }
}
