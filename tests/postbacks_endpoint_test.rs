use axum::http::StatusCode;
use kickback::api::{self, AppState};
use kickback::db::init_db;
use kickback::domain::{AffiliateNetwork, Click, Decimal, Merchant, PlanTier, TimeMs, UserId, UserProfile};
use kickback::notify::{MockNotifier, NotificationDispatcher};
use kickback::orchestration::{CommissionCrediter, PayoutPipeline};
use kickback::transfer::{MockTransferProvider, TransferProvider};
use kickback::Repository;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    repo: Arc<Repository>,
    _temp: TempDir,
}

async fn setup_test_app(plan: PlanTier) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    repo.upsert_user(&UserProfile {
        id: UserId::new("u1".to_string()),
        plan,
        streak: 0,
        last_login: None,
    })
    .await
    .unwrap();
    repo.upsert_merchant(&Merchant {
        id: "m1".to_string(),
        name: "Example Store".to_string(),
        base_commission_rate: Decimal::from_str("0.05").unwrap(),
        tracking_link_template: "https://t.example/t/X".to_string(),
        affiliate_network: AffiliateNetwork::Awin,
    })
    .await
    .unwrap();
    repo.insert_click(&Click {
        id: "c1".to_string(),
        user_id: UserId::new("u1".to_string()),
        merchant_id: "m1".to_string(),
        created_at: TimeMs::new(1000),
    })
    .await
    .unwrap();

    let pipeline = Arc::new(PayoutPipeline::new(
        repo.clone(),
        Arc::new(MockTransferProvider::new()) as Arc<dyn TransferProvider>,
        Arc::new(MockNotifier::new()) as Arc<dyn NotificationDispatcher>,
    ));
    let crediter = Arc::new(CommissionCrediter::new(repo.clone()));
    let app = api::create_router(AppState::new(repo.clone(), pipeline, crediter));

    TestApp {
        app,
        repo,
        _temp: temp_dir,
    }
}

async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn postback_credits_free_tier_share() {
    let t = setup_test_app(PlanTier::Free).await;

    let (status, body) = post_json(
        t.app,
        "/v1/postbacks",
        r#"{"clickId": "c1", "commissionAmount": 100}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "credited");
    assert_eq!(body["userId"], "u1");
    assert_eq!(body["amount"], 15.0);

    let entries = t
        .repo
        .query_ledger(&UserId::new("u1".to_string()))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount.to_canonical_string(), "15");
    assert_eq!(entries[0].note, "cashback from Example Store");
}

#[tokio::test]
async fn postback_credits_pro_tier_share() {
    let t = setup_test_app(PlanTier::Pro).await;

    let (status, body) = post_json(
        t.app,
        "/v1/postbacks",
        r#"{"clickId": "c1", "commissionAmount": 100}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 50.0);
}

#[tokio::test]
async fn replayed_postback_credits_once() {
    let t = setup_test_app(PlanTier::Free).await;

    let body = r#"{"clickId": "c1", "commissionAmount": 100}"#;
    let (status, first) = post_json(t.app.clone(), "/v1/postbacks", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["outcome"], "credited");

    let (status, second) = post_json(t.app, "/v1/postbacks", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["outcome"], "duplicate");

    let entries = t
        .repo
        .query_ledger(&UserId::new("u1".to_string()))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn unknown_click_is_not_found() {
    let t = setup_test_app(PlanTier::Free).await;

    let (status, _) = post_json(
        t.app,
        "/v1/postbacks",
        r#"{"clickId": "missing", "commissionAmount": 100}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_positive_commission_is_rejected() {
    let t = setup_test_app(PlanTier::Free).await;

    let (status, _) = post_json(
        t.app,
        "/v1/postbacks",
        r#"{"clickId": "c1", "commissionAmount": 0}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let entries = t
        .repo
        .query_ledger(&UserId::new("u1".to_string()))
        .await
        .unwrap();
    assert!(entries.is_empty());
}
