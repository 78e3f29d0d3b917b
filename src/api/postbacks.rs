//! Affiliate-network conversion postback endpoint.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::domain::Decimal;
use crate::error::AppError;
use crate::orchestration::CreditOutcome;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackRequest {
    pub click_id: String,
    /// Raw commission the network reported for the conversion, major units.
    pub commission_amount: Decimal,
}

/// Credit a conversion to the owner of the click.
///
/// Networks replay postbacks; replays respond 200 with a duplicate outcome
/// and credit nothing twice.
pub async fn post_postback(
    State(state): State<AppState>,
    Json(params): Json<PostbackRequest>,
) -> Result<Json<CreditOutcome>, AppError> {
    if !params.commission_amount.is_positive() {
        return Err(AppError::BadRequest(
            "commissionAmount must be positive".into(),
        ));
    }

    let outcome = state
        .crediter
        .credit(&params.click_id, params.commission_amount)
        .await?;

    Ok(Json(outcome))
}
