use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use loan_ai::error::AppError;
use loan_ai::workflows::underwriting::{
    application_router, AlertPublisher, ApplicationId, ApplicationRepository, BatchImporter,
    PolicyConfig, UnderwritingEngine, UnderwritingService,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchUnderwriteRequest {
    /// Applicant roster as CSV text, one application per row.
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchUnderwriteResponse {
    pub(crate) as_of: NaiveDate,
    pub(crate) total: usize,
    pub(crate) decisions: Vec<BatchDecisionEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchDecisionEntry {
    pub(crate) application_id: String,
    pub(crate) applicant_name: String,
    pub(crate) decision: &'static str,
    pub(crate) approval_authority: &'static str,
    pub(crate) dti: f64,
    pub(crate) ltv: f64,
    pub(crate) rationale: String,
}

pub(crate) fn with_application_routes<R, A>(
    service: Arc<UnderwritingService<R, A>>,
) -> axum::Router
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    application_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/underwriting/batch",
            axum::routing::post(batch_underwrite_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless roster underwriting under the published standard policy. Each
/// row is evaluated independently; nothing is persisted.
pub(crate) async fn batch_underwrite_endpoint(
    Json(payload): Json<BatchUnderwriteRequest>,
) -> Result<Json<BatchUnderwriteResponse>, AppError> {
    let BatchUnderwriteRequest { csv, as_of } = payload;

    let applications = BatchImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let engine = UnderwritingEngine::new(PolicyConfig::standard())?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    let mut decisions = Vec::with_capacity(applications.len());
    for (index, application) in applications.iter().enumerate() {
        let application_id = ApplicationId(format!("batch-{:04}", index + 1));
        let result = engine.evaluate(&application_id, application, as_of)?;
        decisions.push(BatchDecisionEntry {
            application_id: application_id.0,
            applicant_name: result.applicant.name.clone(),
            decision: result.decision.label(),
            approval_authority: result.approval_authority.label(),
            dti: result.metrics.dti,
            ltv: result.metrics.ltv,
            rationale: result.rationale,
        });
    }

    Ok(Json(BatchUnderwriteResponse {
        as_of,
        total: decisions.len(),
        decisions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;

    const HEADER: &str = "applicant_name,address,date_of_birth,monthly_gross_income,employer,years_employed,employment_stability,credit_score,monthly_debts,collections_count,collections_amount,recent_repossession,bankruptcy,vehicle_year,vehicle_make,vehicle_model,vehicle_type,purchase_price,vehicle_value,negative_equity,loan_amount,term_months,down_payment,proposed_monthly_payment";

    #[tokio::test]
    async fn batch_endpoint_decides_each_row() {
        let csv = format!(
            "{HEADER}\n\
Sarah Chen,12 Bridge St,1991-04-02,7200,Meridian Labs,5.5,stable,742,850,0,,false,false,2024,Honda,Accord,new,34000,32000,0,24000,60,10000,475\n\
Jennifer Lopez,9 Ash Ct,1988-11-19,3900,Harbor Cafe,0.8,unstable,590,1450,3,6200,true,false,2018,Ford,Escape,used,16500,14000,2500,15500,72,500,395\n"
        );
        let request = BatchUnderwriteRequest {
            csv,
            as_of: Some(crate::infra::parse_date("2026-08-01").expect("valid date")),
        };

        let Json(body) = batch_underwrite_endpoint(Json(request))
            .await
            .expect("batch evaluates");

        assert_eq!(body.total, 2);
        assert_eq!(body.decisions[0].decision, "AUTO_APPROVE");
        assert_eq!(body.decisions[0].approval_authority, "System");
        assert_eq!(body.decisions[1].decision, "AUTO_DENY");
        assert_eq!(body.decisions[1].approval_authority, "System (deny)");
    }

    #[tokio::test]
    async fn batch_endpoint_rejects_malformed_csv() {
        let request = BatchUnderwriteRequest {
            csv: format!("{HEADER}\nBroken Row,only,three\n"),
            as_of: None,
        };

        let error = batch_underwrite_endpoint(Json(request))
            .await
            .expect_err("expected import failure");
        assert!(matches!(error, AppError::Import(_)));
    }
}
