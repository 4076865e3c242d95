use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::underwriting::domain::{
    ApplicantIdentity, CreditRecord, EmploymentStability, IncomeRecord, LoanApplication,
    LoanRequest, VehicleRecord, VehicleType,
};
use crate::workflows::underwriting::evaluation::{PolicyConfig, UnderwritingEngine};
use crate::workflows::underwriting::repository::{
    AlertError, AlertPublisher, ApplicationRecord, ApplicationRepository, InMemoryRepository,
    RepositoryError, ReviewAlert,
};
use crate::workflows::underwriting::{application_router, UnderwritingService};

pub(super) fn policy() -> PolicyConfig {
    PolicyConfig::standard()
}

pub(super) fn engine() -> UnderwritingEngine {
    UnderwritingEngine::new(policy()).expect("standard policy is valid")
}

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid date")
}

/// Strong applicant that clears every check: the auto-approve baseline.
pub(super) fn application() -> LoanApplication {
    LoanApplication {
        applicant: ApplicantIdentity {
            name: "Sarah Chen".to_string(),
            address: "12 Bridge St, Des Moines, IA".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1991, 4, 2).expect("valid date"),
        },
        income: IncomeRecord {
            monthly_gross_income: 7200.0,
            employer: "Meridian Labs".to_string(),
            years_employed: 5.5,
            employment_stability: EmploymentStability::Stable,
        },
        credit: CreditRecord {
            score: 742,
            monthly_debts: 850.0,
            collections_count: 0,
            collections_amount: None,
            recent_repossession: false,
            bankruptcy: false,
        },
        vehicle: VehicleRecord {
            year: 2024,
            make: "Honda".to_string(),
            model: "Accord".to_string(),
            purchase_price: 34_000.0,
            vehicle_value: 32_000.0,
            vehicle_type: VehicleType::New,
            negative_equity: 0.0,
        },
        loan: LoanRequest {
            amount: 24_000.0,
            term_months: 60,
            down_payment: 10_000.0,
            proposed_monthly_payment: Some(475.0),
        },
    }
}

/// Fix income at an even $10,000 so a supplied payment maps exactly onto the
/// intended DTI percentage.
pub(super) fn application_with_payment(payment: f64) -> LoanApplication {
    let mut application = application();
    application.income.monthly_gross_income = 10_000.0;
    application.credit.monthly_debts = 0.0;
    application.loan.proposed_monthly_payment = Some(payment);
    application
}

pub(super) fn application_with_credit(score: u16) -> LoanApplication {
    let mut application = application();
    application.credit.score = score;
    application
}

/// Vehicle year 2022 is four years old at the fixture date, so the 100% LTV
/// bracket applies and `amount / 10_000` reads directly as the ratio.
pub(super) fn application_with_ltv(amount: f64) -> LoanApplication {
    let mut application = application();
    application.vehicle.year = 2022;
    application.vehicle.vehicle_type = VehicleType::Used;
    application.vehicle.vehicle_value = 10_000.0;
    application.vehicle.purchase_price = 12_000.0;
    application.loan.amount = amount;
    application
}

pub(super) fn build_service() -> (
    UnderwritingService<InMemoryRepository, MemoryAlerts>,
    Arc<InMemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(InMemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = UnderwritingService::new(repository.clone(), alerts.clone(), policy())
        .expect("standard policy is valid");
    (service, repository, alerts)
}

pub(super) fn service_router(
    service: UnderwritingService<InMemoryRepository, MemoryAlerts>,
) -> axum::Router {
    application_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<ReviewAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<ReviewAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: ReviewAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(
        &self,
        _id: &crate::workflows::underwriting::ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &crate::workflows::underwriting::ApplicationId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
