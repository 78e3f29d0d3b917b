//! Withdrawal change-event trigger boundary.
//!
//! The external document watcher delivers `(before, after)` snapshots of a
//! withdrawal request here on every update. The pipeline computes the
//! activation edge itself; the watcher does not know what changed.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::domain::WithdrawRequest;
use crate::error::AppError;
use crate::orchestration::PayoutOutcome;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawChangeEvent {
    pub before: WithdrawRequest,
    pub after: WithdrawRequest,
}

/// Handle one change event.
///
/// Responds 200 for every processed event, including ignored and failed
/// outcomes; the watcher has no business retrying those, and the outcome
/// is recorded on the request itself. Persistence errors are 500 so the
/// watcher redelivers (guards keep redelivery safe).
pub async fn post_withdrawal_event(
    State(state): State<AppState>,
    Json(event): Json<WithdrawChangeEvent>,
) -> Result<Json<PayoutOutcome>, AppError> {
    if event.before.id != event.after.id {
        return Err(AppError::BadRequest(
            "before and after must describe the same request".into(),
        ));
    }

    let outcome = state.pipeline.handle(&event.before, &event.after).await?;
    Ok(Json(outcome))
}
