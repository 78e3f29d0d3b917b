use axum::http::StatusCode;
use kickback::api::{self, AppState};
use kickback::db::init_db;
use kickback::domain::{AffiliateNetwork, Decimal, Merchant};
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

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

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

fn merchant(template: &str) -> Merchant {
    Merchant {
        id: "m1".to_string(),
        name: "Example Store".to_string(),
        base_commission_rate: Decimal::from_str("0.05").unwrap(),
        tracking_link_template: template.to_string(),
        affiliate_network: AffiliateNetwork::CommissionFactory,
    }
}

#[tokio::test]
async fn link_carries_user_and_click_ids() {
    let t = setup_test_app().await;
    t.repo
        .upsert_merchant(&merchant("https://t.example/t/X?UniqueId="))
        .await
        .unwrap();

    let (status, body) = post_json(
        t.app,
        "/v1/links",
        r#"{"merchantId": "m1", "userId": "u1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let click_id = body["clickId"].as_str().unwrap();
    assert!(!click_id.is_empty());
    assert_eq!(
        body["url"].as_str().unwrap(),
        format!("https://t.example/t/X?UniqueId=u1&UniqueId2={}", click_id)
    );

    // The click is recorded for later postback attribution.
    let click = t.repo.get_click(click_id).await.unwrap().unwrap();
    assert_eq!(click.user_id.as_str(), "u1");
    assert_eq!(click.merchant_id, "m1");
}

#[tokio::test]
async fn link_appends_query_when_template_has_none() {
    let t = setup_test_app().await;
    t.repo
        .upsert_merchant(&merchant("https://t.example/t/X"))
        .await
        .unwrap();

    let (status, body) = post_json(
        t.app,
        "/v1/links",
        r#"{"merchantId": "m1", "userId": "u1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let click_id = body["clickId"].as_str().unwrap();
    assert_eq!(
        body["url"].as_str().unwrap(),
        format!("https://t.example/t/X?UniqueId=u1&UniqueId2={}", click_id)
    );
}

#[tokio::test]
async fn unknown_merchant_is_not_found() {
    let t = setup_test_app().await;
    let (status, _) = post_json(
        t.app,
        "/v1/links",
        r#"{"merchantId": "nope", "userId": "u1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_user_is_rejected() {
    let t = setup_test_app().await;
    t.repo
        .upsert_merchant(&merchant("https://t.example/t/X"))
        .await
        .unwrap();

    let (status, _) = post_json(
        t.app,
        "/v1/links",
        r#"{"merchantId": "m1", "userId": "  "}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
