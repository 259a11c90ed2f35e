use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::warn;

use super::payload::MetricPayload;
use crate::config::MetricsConfig;

pub const SERIES_PATH: &str = "/api/v2/series";

/// Outbound seam for metric submission.
pub trait MetricsGateway: Debug {
    fn submit(&self, payload: &MetricPayload) -> Result<(), SubmitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("metrics intake unreachable: {0}")]
    Transport(String),
    #[error("metrics intake rejected payload with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("metrics runtime unavailable: {0}")]
    Runtime(String),
}

/// Blocking wrapper around an async `reqwest` client posting to the Datadog
/// v2 series intake.
pub struct DatadogClient {
    http: reqwest::Client,
    runtime: Arc<Runtime>,
    series_url: String,
    api_key: Option<String>,
    app_key: Option<String>,
}

impl DatadogClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        app_key: Option<String>,
        runtime: Arc<Runtime>,
    ) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| SubmitError::Runtime(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            series_url: format!("{}{SERIES_PATH}", base_url.trim_end_matches('/')),
            api_key,
            app_key,
        })
    }

    pub fn from_config(config: &MetricsConfig, runtime: Arc<Runtime>) -> Result<Self, SubmitError> {
        if config.api_key.is_none() || config.app_key.is_none() {
            warn!("DATADOG_API_KEY or DATADOG_APP_KEY missing; submissions will be refused");
        }
        Self::new(
            &config.intake_base_url(),
            config.api_key.clone(),
            config.app_key.clone(),
            runtime,
        )
    }

    pub fn series_url(&self) -> &str {
        &self.series_url
    }
}

impl Debug for DatadogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatadogClient")
            .field("series_url", &self.series_url)
            .finish_non_exhaustive()
    }
}

impl MetricsGateway for DatadogClient {
    fn submit(&self, payload: &MetricPayload) -> Result<(), SubmitError> {
        let mut request = self.http.post(&self.series_url).json(payload);
        if let Some(key) = &self.api_key {
            request = request.header("DD-API-KEY", key);
        }
        if let Some(key) = &self.app_key {
            request = request.header("DD-APPLICATION-KEY", key);
        }

        self.runtime.block_on(async {
            let response = request
                .send()
                .await
                .map_err(|err| SubmitError::Transport(err.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }

            let body = response.text().await.unwrap_or_default();
            Err(SubmitError::Rejected {
                status: status.as_u16(),
                body,
            })
        })
    }
}
