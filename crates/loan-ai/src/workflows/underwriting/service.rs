use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use super::domain::{ApplicationId, ApplicationStatus, LoanApplication};
use super::evaluation::{
    ConfigurationError, Decision, InvalidInputError, PolicyConfig, UnderwritingEngine,
};
use super::report::UnderwritingResult;
use super::repository::{
    AlertError, AlertPublisher, ApplicationRecord, ApplicationRepository, RepositoryError,
    ReviewAlert,
};

/// Service composing the intake validation, repository, notification hook,
/// and decision engine.
pub struct UnderwritingService<R, A> {
    repository: Arc<R>,
    alerts: Arc<A>,
    engine: Arc<UnderwritingEngine>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("loan-{id:06}"))
}

impl<R, A> UnderwritingService<R, A>
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        alerts: Arc<A>,
        config: PolicyConfig,
    ) -> Result<Self, ConfigurationError> {
        let engine = Arc::new(UnderwritingEngine::new(config)?);
        Ok(Self {
            repository,
            alerts,
            engine,
        })
    }

    pub fn engine(&self) -> &UnderwritingEngine {
        &self.engine
    }

    /// Store a new application after fail-fast input validation. Nothing is
    /// persisted for an application the engine could not evaluate.
    pub fn submit(
        &self,
        application: LoanApplication,
    ) -> Result<ApplicationRecord, ServiceError> {
        self.engine.validate_application(&application)?;

        let record = ApplicationRecord {
            id: next_application_id(),
            application,
            status: ApplicationStatus::Submitted,
            result: None,
        };

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Evaluate a stored application and persist the outcome. Routes a
    /// reviewer alert whenever the decision needs a human.
    pub fn evaluate(
        &self,
        application_id: &ApplicationId,
        as_of: NaiveDate,
    ) -> Result<UnderwritingResult, ServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let result = self
            .engine
            .evaluate(application_id, &record.application, as_of)?;

        record.status = match result.decision {
            Decision::AutoApprove => ApplicationStatus::Approved,
            Decision::HumanReview => ApplicationStatus::InReview,
            Decision::EscalationRequired => ApplicationStatus::Escalated,
            Decision::AutoDeny => ApplicationStatus::Denied,
        };
        record.result = Some(result.clone());

        self.repository.update(record)?;

        if let Some(template) = review_template(result.decision) {
            let mut details = BTreeMap::new();
            details.insert("decision".to_string(), result.decision.label().to_string());
            details.insert(
                "approval_authority".to_string(),
                result.approval_authority.label().to_string(),
            );
            details.insert("rationale".to_string(), result.rationale.clone());
            self.alerts.publish(ReviewAlert {
                template: template.to_string(),
                application_id: result.application_id.clone(),
                details,
            })?;
        }

        Ok(result)
    }

    /// Fetch an application and current status for API responses.
    pub fn get(&self, application_id: &ApplicationId) -> Result<ApplicationRecord, ServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

fn review_template(decision: Decision) -> Option<&'static str> {
    match decision {
        Decision::HumanReview => Some("senior_underwriter_review"),
        Decision::EscalationRequired => Some("regional_director_escalation"),
        Decision::AutoApprove | Decision::AutoDeny => None,
    }
}

/// Error raised by the underwriting service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Input(#[from] InvalidInputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}
