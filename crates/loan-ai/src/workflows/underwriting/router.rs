use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus, LoanApplication};
use super::repository::{AlertPublisher, ApplicationRepository, RepositoryError};
use super::service::{ServiceError, UnderwritingService};

/// Router builder exposing HTTP endpoints for intake, evaluation, and status.
pub fn application_router<R, A>(service: Arc<UnderwritingService<R, A>>) -> Router
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/underwriting/applications",
            post(submit_handler::<R, A>),
        )
        .route(
            "/api/v1/underwriting/applications/:application_id/evaluate",
            post(evaluate_handler::<R, A>),
        )
        .route(
            "/api/v1/underwriting/applications/:application_id",
            get(status_handler::<R, A>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EvaluateRequest {
    /// Decision date anchoring vehicle-age derivation; defaults to today.
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<Arc<UnderwritingService<R, A>>>,
    axum::Json(application): axum::Json<LoanApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.submit(application) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(ServiceError::Input(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(ServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "application already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn evaluate_handler<R, A>(
    State(service): State<Arc<UnderwritingService<R, A>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = ApplicationId(application_id);
    let as_of = request.as_of.unwrap_or_else(|| Local::now().date_naive());

    match service.evaluate(&id, as_of) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(ServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "application not found",
                "application_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(ServiceError::Input(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<R, A>(
    State(service): State<Arc<UnderwritingService<R, A>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(ServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "application_id": id.0,
                "status": ApplicationStatus::Submitted.label(),
                "decision_rationale": "pending evaluation",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
