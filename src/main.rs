use kickback::notify::LogNotifier;
use kickback::orchestration::{CommissionCrediter, PayoutPipeline};
use kickback::transfer::StripeTransferProvider;
use kickback::{api, config::Config, db::init_db, NotificationDispatcher, Repository, TransferProvider};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let provider = match StripeTransferProvider::new(
        config.stripe_api_url.clone(),
        config.stripe_secret_key.clone(),
        Duration::from_millis(config.transfer_timeout_ms),
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to construct transfer provider: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let provider: Arc<dyn TransferProvider> = Arc::new(provider);
    let notifier: Arc<dyn NotificationDispatcher> = Arc::new(LogNotifier);
    let pipeline = Arc::new(PayoutPipeline::new(
        repo.clone(),
        provider,
        notifier,
    ));
    let crediter = Arc::new(CommissionCrediter::new(repo.clone()));

    // Create router
    let app = api::create_router(api::AppState::new(repo, pipeline, crediter));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
