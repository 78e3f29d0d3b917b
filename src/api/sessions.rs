//! Session-refresh endpoint: recompute the login streak.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{TimeMs, UserId};
use crate::engine::calculate_streak;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRefreshRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRefreshResponse {
    pub streak: u32,
    pub active: bool,
}

/// Derive the next streak from the stored login state and persist it.
///
/// Read-then-write with no transactional isolation: two concurrent
/// refreshes for the same user may both observe the same prior streak and
/// store the same next value. At most one day is ever lost, never gained;
/// accepted for this domain.
pub async fn post_session_refresh(
    State(state): State<AppState>,
    Json(params): Json<SessionRefreshRequest>,
) -> Result<Json<SessionRefreshResponse>, AppError> {
    let user_id = UserId::new(params.user_id);
    let user = state
        .repo
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

    let now = Utc::now();
    let result = calculate_streak(
        user.last_login.map(|t| t.to_datetime()),
        user.streak,
        now,
    );

    state
        .repo
        .update_streak(&user_id, result.streak, TimeMs::new(now.timestamp_millis()))
        .await?;

    Ok(Json(SessionRefreshResponse {
        streak: result.streak,
        active: result.active,
    }))
}
