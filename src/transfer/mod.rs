//! Funds-transfer provider abstraction for issuing payouts.

use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod stripe;

pub use mock::MockTransferProvider;
pub use stripe::StripeTransferProvider;

/// A successful transfer, identified by the provider's transfer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Provider-issued identifier for the transfer.
    pub transfer_id: String,
}

/// External funds-transfer collaborator.
///
/// Implementations must apply a bounded timeout to the underlying network
/// call; a timeout is reported as a failure. The pipeline never retries a
/// transfer, so implementations must not retry internally either: a
/// transfer attempt is made at most once per invocation.
#[async_trait]
pub trait TransferProvider: Send + Sync + fmt::Debug {
    /// Issue a transfer to an external account.
    ///
    /// # Arguments
    /// * `amount_minor` - Amount in the currency's minor units (cents)
    /// * `currency` - Lowercase ISO currency code (e.g., "aud")
    /// * `destination` - Destination account reference
    async fn create_transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
    ) -> Result<TransferReceipt, TransferError>;
}

/// Error type for transfer operations.
#[derive(Debug, Clone)]
pub enum TransferError {
    /// Network error (connection refused, DNS failure)
    Network(String),
    /// The bounded call timeout elapsed; the transfer may still have landed
    /// and is reconciled manually
    Timeout,
    /// HTTP error from the provider (5xx, unexpected status)
    Http { status: u16, message: String },
    /// Provider rejected the transfer (auth, insufficient balance,
    /// invalid destination)
    Api(String),
    /// Malformed provider response
    Parse(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Network(msg) => write!(f, "Network error: {}", msg),
            TransferError::Timeout => write!(f, "Transfer request timed out"),
            TransferError::Http { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            TransferError::Api(msg) => write!(f, "{}", msg),
            TransferError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for TransferError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_display() {
        let err = TransferError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = TransferError::Http {
            status: 500,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 500: Server error");

        let err = TransferError::Api("Insufficient funds in Stripe account".to_string());
        assert_eq!(err.to_string(), "Insufficient funds in Stripe account");

        let err = TransferError::Timeout;
        assert_eq!(err.to_string(), "Transfer request timed out");
    }
}
