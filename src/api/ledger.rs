//! Wallet ledger read endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Decimal, UserId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub balance: String,
    pub entry_count: i64,
    pub entries: Vec<LedgerEntryDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDto {
    pub amount: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    pub status: String,
    pub note: String,
    pub created_at: i64,
}

/// Return a user's ledger entries in append order plus the running total.
pub async fn get_ledger(
    Query(params): Query<LedgerQuery>,
    State(state): State<AppState>,
) -> Result<Json<LedgerResponse>, AppError> {
    if params.user.trim().is_empty() {
        return Err(AppError::BadRequest("user must not be empty".into()));
    }

    let entries = state
        .repo
        .query_ledger(&UserId::new(params.user))
        .await?;

    let mut balance = Decimal::zero();
    for entry in &entries {
        balance = balance + entry.amount;
    }

    let entry_count = entries.len() as i64;
    let entries = entries
        .into_iter()
        .map(|e| LedgerEntryDto {
            amount: e.amount.to_canonical_string(),
            currency: e.currency.as_str().to_string(),
            entry_type: e.entry_type.as_str().to_string(),
            status: e.status.as_str().to_string(),
            note: e.note,
            created_at: e.created_at.as_ms(),
        })
        .collect();

    Ok(Json(LedgerResponse {
        balance: balance.to_canonical_string(),
        entry_count,
        entries,
    }))
}
