/// HTTP boundary for the detector
///
/// `POST /predict` classifies one email. The detector is loaded once at
/// startup and shared read-only by every request.
use crate::detector::{PhishingDetector, Prediction};
use crate::error::DetectorError;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const NO_CONTENT_MESSAGE: &str = "No content provided";

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    detector: Arc<PhishingDetector>,
}

impl AppState {
    pub fn new(detector: PhishingDetector) -> Self {
        Self {
            detector: Arc::new(detector),
        }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    /// Probability of the predicted class, percent
    pub confidence: f64,
    /// Probability of phishing, percent
    pub phishing_probability: f64,
    pub status: String,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction: prediction.label.to_string(),
            confidence: prediction.confidence(),
            phishing_probability: prediction.phishing_probability(),
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    vocabulary_size: usize,
    trees: usize,
}

/// Maps detector errors onto status codes at the HTTP edge
pub struct ApiError(DetectorError);

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Prediction failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        vocabulary_size: state.detector.vectorizer().vocabulary_size(),
        trees: state.detector.forest().tree_count(),
    })
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let content = match payload {
        Ok(Json(PredictRequest {
            content: Some(content),
        })) if !content.is_empty() => content,
        Ok(_) => return Err(DetectorError::BadRequest(NO_CONTENT_MESSAGE.to_string()).into()),
        Err(rejection) => {
            info!("Rejected request body: {}", rejection);
            return Err(DetectorError::BadRequest(NO_CONTENT_MESSAGE.to_string()).into());
        }
    };

    info!("Classifying email ({} chars)", content.chars().count());

    let detector = state.detector.clone();
    let prediction = run_blocking(move || detector.predict(&content)).await?;

    info!(
        "pred={} p(phishing)={:.4}",
        prediction.label, prediction.probabilities[1]
    );

    Ok(Json(prediction.into()))
}

/// Run CPU-bound work off the async workers. A panicking task surfaces as
/// an inference failure.
async fn run_blocking<T, F>(work: F) -> Result<T, DetectorError>
where
    F: FnOnce() -> Result<T, DetectorError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DetectorError::inference(e.to_string()))?
}

/// Log each request line and the status it produced
async fn log_request_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let origin = req
        .headers()
        .get("origin")
        .and_then(|o| o.to_str().ok())
        .map(str::to_string);

    info!(
        "📥 {} {} (origin: {})",
        method,
        uri,
        origin.as_deref().unwrap_or("-")
    );
    let response = next.run(req).await;
    info!("📤 {} {} -> {}", method, uri, response.status());

    response
}

pub fn create_router(state: AppState) -> Router {
    // Browser frontends are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(log_request_middleware))
        .layer(TraceLayer::new_for_http())
}
