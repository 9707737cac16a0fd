/// Phishing Detection Service
///
/// Serves `POST /predict` backed by the artifacts written by `train`.
/// Port: 5000
use phishing_detector::config::Config;
use phishing_detector::model_store;
use phishing_detector::server::{create_router, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (fails silently if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };
    config.log_config();

    // Refuse to start without a usable model rather than failing per request
    let detector = match model_store::load(&config.model_paths()) {
        Ok(detector) => detector,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Model loaded: {} features, {} trees",
        detector.vectorizer().vocabulary_size(),
        detector.forest().tree_count()
    );

    let app = create_router(AppState::new(detector));

    let addr = config.bind_addr();
    info!("🚀 Phishing Detection Service listening on {}", addr);
    info!("");
    info!("📊 Endpoints:");
    info!("   GET  /health   - Health check");
    info!("   POST /predict  - Classify an email");
    info!("");
    info!("📝 Example:");
    info!(r#"   curl -X POST http://localhost:{}/predict \"#, config.port);
    info!(r#"     -H 'Content-Type: application/json' \"#);
    info!(r#"     -d '{{"content": "Verify your account now"}}'"#);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
