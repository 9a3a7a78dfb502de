//! Score client for the sustainability relay.
//!
//! `POST {relay}/get_score` with the product record as JSON; the reply is a
//! [`ScoreReport`]. No retries happen here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{EcoError, Result};
use crate::product::ProductRecord;
use crate::score::ScoreReport;

/// Anything that can turn a product record into scores
pub trait ScoreSource {
    fn request_scores(&self, record: &ProductRecord) -> Result<ScoreReport>;
}

/// Error body the relay sends with 4xx/5xx responses
#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Liveness reply from `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Blocking HTTP client for the relay
pub struct RelayClient {
    base_url: String,
    agent: ureq::Agent,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.relay_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the relay's liveness endpoint
    pub fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let mut response = self.agent.get(&url).call().map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(network_error)?;

        if !(200..300).contains(&status) {
            return Err(server_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| EcoError::Parse(e.to_string()))
    }
}

impl ScoreSource for RelayClient {
    fn request_scores(&self, record: &ProductRecord) -> Result<ScoreReport> {
        let url = format!("{}/get_score", self.base_url);
        tracing::info!(url = %url, title = %record.product_title, "requesting sustainability scores");

        let mut response = self
            .agent
            .post(&url)
            .send_json(record)
            .map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(network_error)?;

        if !(200..300).contains(&status) {
            let err = server_error(status, &body);
            tracing::error!(status, error = %err, "relay rejected request");
            return Err(err);
        }

        let report = ScoreReport::from_json(&body).inspect_err(|e| {
            tracing::error!(error = %e, "relay response was not a score report");
        })?;
        tracing::debug!(categories = report.len(), "scores received");
        Ok(report)
    }
}

fn network_error(e: ureq::Error) -> EcoError {
    match e {
        ureq::Error::Timeout(t) => EcoError::Network(format!("request timed out ({:?})", t)),
        other => EcoError::Network(other.to_string()),
    }
}

fn server_error(status: u16, body: &str) -> EcoError {
    let message = serde_json::from_str::<RelayErrorBody>(body)
        .ok()
        .and_then(|b| match (b.error, b.message) {
            (Some(error), Some(message)) => Some(format!("{}: {}", error, message)),
            (error, message) => error.or(message),
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    EcoError::Server { status, message }
}
