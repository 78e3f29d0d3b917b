//! Approval-triggered payout pipeline.
//!
//! Reacts to `(before, after)` snapshots of a withdrawal request delivered
//! by an external change watcher. Delivery is at-least-once and possibly
//! out-of-order for rapid successive edits, so the idempotency guards here
//! are load-bearing: the pipeline issues at most one transfer, one status
//! mutation, and one ledger append per approval edge.

use crate::db::Repository;
use crate::domain::{
    EntryStatus, EntryType, LedgerEntry, TimeMs, WithdrawRequest, WithdrawStatus,
};
use crate::notify::{Notification, NotificationDispatcher, NotificationPriority};
use crate::transfer::TransferProvider;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Reason recorded when a request fails field validation.
const VALIDATION_REASON: &str = "Missing userId, amount, or stripeAccountId";

/// True iff this update is the activation edge: `approve_payout` flipped
/// from falsy to truthy. Every other transition (unchanged, true→true,
/// true→false) is a no-op for the pipeline.
pub fn approval_edge(before: &WithdrawRequest, after: &WithdrawRequest) -> bool {
    !before.approve_payout && after.approve_payout
}

/// What an invocation did, observable by the trigger boundary and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PayoutOutcome {
    /// Not an activation edge, or the request is already terminal.
    Ignored,
    /// The request was already paid (or a duplicate invocation won the
    /// race); nothing was done.
    AlreadyPaid,
    /// The request was marked failed with the recorded reason.
    Failed { reason: String },
    /// Transfer issued and committed.
    Paid { transfer_id: String },
}

/// Errors surfaced to the invoking infrastructure.
///
/// Everything else (validation failures, provider rejections) is recorded
/// as state on the request itself; this pipeline has no synchronous caller
/// awaiting success.
#[derive(Debug, Error)]
pub enum PayoutError {
    /// The status/ledger write failed even after bounded retry. The caller
    /// may redeliver; guards and the unique ledger key keep that safe.
    #[error("Payout persistence failed: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// The withdrawal payout state machine.
///
/// States: `pending → paid` or `pending → failed`, both terminal. The
/// transfer provider and notification dispatcher are injected at
/// construction; no ambient global clients.
pub struct PayoutPipeline {
    repo: Arc<Repository>,
    provider: Arc<dyn TransferProvider>,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl PayoutPipeline {
    pub fn new(
        repo: Arc<Repository>,
        provider: Arc<dyn TransferProvider>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            repo,
            provider,
            notifier,
        }
    }

    /// Process one change event for a withdrawal request.
    ///
    /// # Errors
    /// Returns an error only when persisting the outcome fails after
    /// bounded retry; the transfer itself is never re-issued on retry.
    pub async fn handle(
        &self,
        before: &WithdrawRequest,
        after: &WithdrawRequest,
    ) -> Result<PayoutOutcome, PayoutError> {
        if !approval_edge(before, after) {
            debug!("request {}: no approval edge, ignoring", after.id);
            return Ok(PayoutOutcome::Ignored);
        }

        // Guard on the delivered snapshot before touching anything.
        if after.status == WithdrawStatus::Paid || after.has_transfer_id() {
            debug!("request {}: already paid in snapshot, ignoring", after.id);
            return Ok(PayoutOutcome::AlreadyPaid);
        }

        // First sighting of this request: adopt the snapshot as the system
        // of record. Never overwrites an existing row, which may already
        // carry a committed terminal state.
        self.repo.insert_withdraw_request_if_absent(after).await?;

        // Re-check the guard against fresh state, as close to the mutation
        // as the storage model allows.
        let current = match self.repo.get_withdraw_request(&after.id).await? {
            Some(current) => current,
            None => after.clone(),
        };
        if current.status == WithdrawStatus::Paid || current.has_transfer_id() {
            debug!("request {}: already paid, ignoring duplicate", current.id);
            return Ok(PayoutOutcome::AlreadyPaid);
        }
        if current.status == WithdrawStatus::Failed {
            debug!("request {}: already failed, terminal", current.id);
            return Ok(PayoutOutcome::Ignored);
        }

        if current.user_id.is_blank()
            || !current.amount.is_positive()
            || current.stripe_account_id.trim().is_empty()
        {
            return self.fail(&current, VALIDATION_REASON.to_string()).await;
        }

        let Some(amount_minor) = current.amount.to_minor_units() else {
            return self
                .fail(&current, "Amount exceeds the transferable range".to_string())
                .await;
        };

        let receipt = match self
            .provider
            .create_transfer(
                amount_minor,
                &current.currency.for_transfer(),
                &current.stripe_account_id,
            )
            .await
        {
            Ok(receipt) => receipt,
            // Terminal: no automatic retry. Operators re-approve or
            // intervene manually.
            Err(e) => return self.fail(&current, e.to_string()).await,
        };

        let paid_at = TimeMs::now();
        let entry = LedgerEntry::new(
            current.user_id.clone(),
            -current.amount,
            current.currency.clone(),
            EntryType::Withdrawal,
            EntryStatus::Confirmed,
            "payout".to_string(),
            paid_at,
            Some(&current.id),
        );

        let committed = self
            .commit_with_retry(&current.id, &receipt.transfer_id, paid_at, &entry)
            .await?;

        if !committed {
            // A concurrent duplicate committed between our guard check and
            // the write; two transfers may have been issued. Eventual
            // consistency makes this window irreducible here; it needs the
            // manual reconciliation process.
            error!(
                "request {}: commit guard miss after transfer {}; possible duplicate payout, reconcile manually",
                current.id, receipt.transfer_id
            );
            return Ok(PayoutOutcome::AlreadyPaid);
        }

        info!(
            "request {}: paid {} {} to {} (transfer {})",
            current.id,
            current.amount,
            current.currency,
            current.stripe_account_id,
            receipt.transfer_id
        );

        self.dispatch(
            &current,
            Notification {
                title: "Cashback payout sent".to_string(),
                body: format!(
                    "Your withdrawal of {} {} has been paid.",
                    current.amount, current.currency
                ),
                kind: "payout".to_string(),
                priority: NotificationPriority::High,
            },
        )
        .await;

        Ok(PayoutOutcome::Paid {
            transfer_id: receipt.transfer_id,
        })
    }

    /// Record a terminal failure and tell the user. Validation and provider
    /// failures both land here; neither is retried automatically.
    async fn fail(
        &self,
        request: &WithdrawRequest,
        reason: String,
    ) -> Result<PayoutOutcome, PayoutError> {
        warn!("request {}: payout failed: {}", request.id, reason);
        self.repo.set_withdraw_failed(&request.id, &reason).await?;

        self.dispatch(
            request,
            Notification {
                title: "Withdrawal could not be completed".to_string(),
                body: reason.clone(),
                kind: "payout".to_string(),
                priority: NotificationPriority::Normal,
            },
        )
        .await;

        Ok(PayoutOutcome::Failed { reason })
    }

    /// Commit the paid status and ledger entry, retrying the write with
    /// bounded backoff. The transfer already happened; only the write is
    /// ever retried, and the SQL guard plus unique event key make the
    /// retry idempotent.
    async fn commit_with_retry(
        &self,
        id: &str,
        transfer_id: &str,
        paid_at: TimeMs,
        entry: &LedgerEntry,
    ) -> Result<bool, PayoutError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(10)),
            ..Default::default()
        };

        retry(backoff, || async {
            self.repo
                .commit_payout(id, transfer_id, paid_at, entry)
                .await
                .map_err(backoff::Error::transient)
        })
        .await
        .map_err(PayoutError::Persistence)
    }

    /// Fire-and-forget notification; failures are logged, never propagated.
    async fn dispatch(&self, request: &WithdrawRequest, notification: Notification) {
        if let Err(e) = self
            .notifier
            .notify(request.user_id.as_str(), notification)
            .await
        {
            warn!("request {}: {}", request.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Decimal, UserId};
    use std::str::FromStr;

    fn request(approve: bool) -> WithdrawRequest {
        WithdrawRequest {
            id: "wr_1".to_string(),
            user_id: UserId::new("u1".to_string()),
            amount: Decimal::from_str("50").unwrap(),
            currency: Currency::aud(),
            stripe_account_id: "acct_1".to_string(),
            approve_payout: approve,
            status: WithdrawStatus::Pending,
            transfer_id: None,
            reason: None,
            paid_at: None,
        }
    }

    #[test]
    fn edge_requires_false_to_true() {
        assert!(approval_edge(&request(false), &request(true)));
        assert!(!approval_edge(&request(false), &request(false)));
        assert!(!approval_edge(&request(true), &request(true)));
        assert!(!approval_edge(&request(true), &request(false)));
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(PayoutOutcome::Paid {
            transfer_id: "tr_1".to_string(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "paid");
        assert_eq!(json["transferId"], "tr_1");

        let json = serde_json::to_value(PayoutOutcome::Ignored).unwrap();
        assert_eq!(json["outcome"], "ignored");
    }
}
