//! Auto-loan application intake, risk evaluation, and decision routing.
//!
//! The decision engine itself is pure and synchronous: structured applicant
//! data in, a deterministic `UnderwritingResult` out. Everything with a side
//! effect (storage, notifications, HTTP) sits behind the repository and
//! alert-publisher seams so the engine can be audited in isolation.

pub mod domain;
pub mod evaluation;
pub mod import;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantIdentity, ApplicationId, ApplicationStatus, CreditRecord, EmploymentStability,
    IncomeRecord, LoanApplication, LoanRequest, VehicleRecord, VehicleType,
};
pub use evaluation::{
    ApprovalAuthority, ConfigurationError, CreditBand, Decision, DepreciationSchedule,
    InvalidInputError, LtvAgeBracket, PolicyConfig, RiskMetrics, RuleName, Severity, SeverityBand,
    UnderwritingEngine, Violation, ViolationTally,
};
pub use import::{BatchImportError, BatchImporter};
pub use report::{render_markdown, UnderwritingResult};
pub use repository::{
    AlertError, AlertPublisher, ApplicationRecord, ApplicationRepository, ApplicationStatusView,
    InMemoryRepository, RepositoryError, ReviewAlert,
};
pub use router::application_router;
pub use service::{ServiceError, UnderwritingService};
