//! Tracking-link synthesis endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::domain::{Click, TimeMs, UserId};
use crate::engine::generate_tracking_link;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub merchant_id: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub url: String,
    pub click_id: String,
}

/// Record an outbound click and synthesize the merchant tracking URL
/// carrying the user id and the fresh click id.
pub async fn post_link(
    State(state): State<AppState>,
    Json(params): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    if params.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId must not be empty".into()));
    }

    let merchant = state
        .repo
        .get_merchant(&params.merchant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("merchant {}", params.merchant_id)))?;

    let click_id = Uuid::new_v4().to_string();
    state
        .repo
        .insert_click(&Click {
            id: click_id.clone(),
            user_id: UserId::new(params.user_id.clone()),
            merchant_id: merchant.id.clone(),
            created_at: TimeMs::now(),
        })
        .await?;

    let url = generate_tracking_link(&merchant.tracking_link_template, &params.user_id, &click_id);

    Ok(Json(LinkResponse { url, click_id }))
}
