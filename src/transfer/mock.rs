//! Mock transfer provider for testing without network calls.

use super::{TransferError, TransferProvider, TransferReceipt};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Arguments of one recorded `create_transfer` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransfer {
    pub amount_minor: i64,
    pub currency: String,
    pub destination: String,
}

/// Mock transfer provider that returns a configured outcome and records
/// every call, so tests can assert the at-most-once transfer property.
#[derive(Debug, Clone, Default)]
pub struct MockTransferProvider {
    outcome: Option<Result<String, String>>,
    calls: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<RecordedTransfer>>>,
}

impl MockTransferProvider {
    /// Create a mock that succeeds with transfer id "tr_mock".
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with the given transfer id.
    pub fn with_transfer_id(mut self, transfer_id: &str) -> Self {
        self.outcome = Some(Ok(transfer_id.to_string()));
        self
    }

    /// Fail every call with an API error carrying the given message.
    pub fn with_error(mut self, message: &str) -> Self {
        self.outcome = Some(Err(message.to_string()));
        self
    }

    /// Number of `create_transfer` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All recorded call arguments, in order.
    pub fn recorded(&self) -> Vec<RecordedTransfer> {
        self.recorded.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl TransferProvider for MockTransferProvider {
    async fn create_transfer(
        &self,
        amount_minor: i64,
        currency: &str,
        destination: &str,
    ) -> Result<TransferReceipt, TransferError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded
            .lock()
            .expect("mock lock poisoned")
            .push(RecordedTransfer {
                amount_minor,
                currency: currency.to_string(),
                destination: destination.to_string(),
            });

        match &self.outcome {
            Some(Ok(transfer_id)) => Ok(TransferReceipt {
                transfer_id: transfer_id.clone(),
            }),
            Some(Err(message)) => Err(TransferError::Api(message.clone())),
            None => Ok(TransferReceipt {
                transfer_id: "tr_mock".to_string(),
            }),
        }
    }
}
