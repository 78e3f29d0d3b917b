//! Stripe Transfers API client.

use super::{TransferError, TransferProvider, TransferReceipt};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Transfer provider backed by the Stripe Transfers API.
///
/// Constructed once at startup with credentials from configuration; no
/// ambient global client state. The HTTP client carries a bounded request
/// timeout, so a hung provider call surfaces as [`TransferError::Timeout`].
#[derive(Debug, Clone)]
pub struct StripeTransferProvider {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeTransferProvider {
    /// Create a new provider client.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        base_url: String,
        secret_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            secret_key,
        })
    }
}

#[async_trait]
impl TransferProvider for StripeTransferProvider {
    async fn create_transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
    ) -> Result<TransferReceipt, TransferError> {
        debug!(
            "Creating transfer: amount_minor={}, currency={}, destination={}",
            amount_minor, currency, destination
        );

        let url = format!("{}/v1/transfers", self.base_url);
        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("destination", destination.to_string()),
        ];

        // Single attempt only: a retry here could double-pay.
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransferError::Timeout
                } else {
                    TransferError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransferError::Parse(e.to_string()))?;

        if !status.is_success() {
            // Stripe error bodies carry {"error": {"message": ...}}.
            if let Some(message) = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
            {
                return Err(TransferError::Api(message.to_string()));
            }
            return Err(TransferError::Http {
                status: status.as_u16(),
                message: body.to_string(),
            });
        }

        let transfer_id = body
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| TransferError::Parse("transfer response missing id".to_string()))?
            .to_string();

        debug!("Transfer created: {}", transfer_id);
        Ok(TransferReceipt { transfer_id })
    }
}
