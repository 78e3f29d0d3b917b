pub mod health;
pub mod ledger;
pub mod links;
pub mod postbacks;
pub mod sessions;
pub mod withdrawals;

use crate::db::Repository;
use crate::orchestration::{CommissionCrediter, PayoutPipeline};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub pipeline: Arc<PayoutPipeline>,
    pub crediter: Arc<CommissionCrediter>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        pipeline: Arc<PayoutPipeline>,
        crediter: Arc<CommissionCrediter>,
    ) -> Self {
        Self {
            repo,
            pipeline,
            crediter,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/withdrawals/events",
            post(withdrawals::post_withdrawal_event),
        )
        .route("/v1/links", post(links::post_link))
        .route("/v1/postbacks", post(postbacks::post_postback))
        .route("/v1/sessions/refresh", post(sessions::post_session_refresh))
        .route("/v1/ledger", get(ledger::get_ledger))
        .layer(cors)
        .with_state(state)
}
