//! HTTP client for the external ledger gateway.

use async_trait::async_trait;
use serde_json::json;

use credhub_core::config::LedgerConfig;
use credhub_core::error::AppError;
use credhub_core::result::AppResult;
use credhub_core::traits::{LedgerGateway, SubjectStatus, TxReceipt};

/// Reaches the ledger over HTTP with a per-request timeout.
///
/// A timed-out or unreachable call maps to `LedgerUnreachable` and is
/// retryable; a rejection from the ledger itself maps to `LedgerError`.
#[derive(Debug, Clone)]
pub struct HttpLedgerGateway {
    client: reqwest::Client,
    base_url: String,
    gas_limit: u64,
}

impl HttpLedgerGateway {
    /// Creates a gateway client from ledger configuration.
    pub fn new(config: &LedgerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build ledger client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            gas_limit: config.gas_limit,
        })
    }

    fn map_transport_error(err: reqwest::Error) -> AppError {
        if err.is_timeout() || err.is_connect() {
            AppError::ledger_unreachable(format!("Ledger unreachable: {err}"))
        } else {
            AppError::ledger(format!("Ledger request failed: {err}"))
        }
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    async fn subject_status(&self, subject_id: &str) -> AppResult<SubjectStatus> {
        let url = format!("{}/subjects/{subject_id}/status", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(AppError::ledger(format!(
                "Ledger status query failed with HTTP {}",
                response.status()
            )));
        }

        response
            .json::<SubjectStatus>()
            .await
            .map_err(|e| AppError::ledger(format!("Malformed ledger status response: {e}")))
    }

    async fn expire_subject(&self, subject_id: &str) -> AppResult<TxReceipt> {
        let url = format!("{}/subjects/{subject_id}/expire", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "gasLimit": self.gas_limit }))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(AppError::ledger(format!(
                "Ledger expire transition failed with HTTP {}",
                response.status()
            )));
        }

        response
            .json::<TxReceipt>()
            .await
            .map_err(|e| AppError::ledger(format!("Malformed ledger receipt: {e}")))
    }
}
