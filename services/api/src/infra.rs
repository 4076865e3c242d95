use chrono::NaiveDate;
use loan_ai::config::AppConfig;
use loan_ai::error::AppError;
use loan_ai::workflows::underwriting::{AlertError, AlertPublisher, PolicyConfig, ReviewAlert};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Default notification hook: reviewer hand-offs land in the service log
/// until a real queue or mail adapter is wired in.
#[derive(Default, Clone)]
pub(crate) struct TracingAlertPublisher;

impl AlertPublisher for TracingAlertPublisher {
    fn publish(&self, alert: ReviewAlert) -> Result<(), AlertError> {
        info!(
            template = %alert.template,
            application_id = %alert.application_id.0,
            "reviewer notification"
        );
        Ok(())
    }
}

/// Resolve the underwriting policy for this process: the published standard
/// policy, or the versioned JSON file named by `APP_POLICY_PATH`.
pub(crate) fn load_policy(config: &AppConfig) -> Result<PolicyConfig, AppError> {
    match &config.policy_path {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            let policy: PolicyConfig = serde_json::from_reader(file)?;
            Ok(policy)
        }
        None => Ok(PolicyConfig::standard()),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
