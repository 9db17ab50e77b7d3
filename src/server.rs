//! HTTP prediction service.
//!
//! | Method | Path             | Body                   |
//! |--------|------------------|------------------------|
//! | GET    | `/`              |                        |
//! | GET    | `/health`        |                        |
//! | POST   | `/predict`       | `{"review": "..."}`    |
//! | POST   | `/predict/batch` | `["...", "..."]`       |
//!
//! Errors are returned as `{"detail": "<message>"}` with status 400 for
//! unusable input and 500 for everything else, except that `/predict/batch`
//! answers 400 while no model is loaded.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{ArtifactPaths, ServiceConfig};
use crate::error::{ErrorKind, Result, TastebudError};
use crate::inference::{BatchItem, PredictionResult, SentimentPredictor};

/// Shared, read-only state of the service.
#[derive(Debug, Clone, Default)]
pub struct ServiceState {
    predictor: Option<Arc<SentimentPredictor>>,
}

impl ServiceState {
    pub fn new(predictor: SentimentPredictor) -> Self {
        Self {
            predictor: Some(Arc::new(predictor)),
        }
    }

    /// State without artifacts; `/health` reports unhealthy and predictions fail.
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Load artifacts from `paths`. With `allow_unloaded` a load failure is
    /// logged and an unloaded state is returned instead.
    pub fn load(paths: &ArtifactPaths, allow_unloaded: bool) -> Result<Self> {
        match SentimentPredictor::load(paths) {
            Ok(predictor) => Ok(Self::new(predictor)),
            Err(e) if allow_unloaded => {
                warn!("Starting without a model: {e}");
                Ok(Self::unloaded())
            }
            Err(e) => Err(e),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn vectorizer_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.model_loaded() && self.vectorizer_loaded()
    }

    fn predictor(&self) -> std::result::Result<Arc<SentimentPredictor>, ApiError> {
        self.predictor
            .clone()
            .ok_or_else(|| ApiError::from_error(TastebudError::ArtifactsNotLoaded, ""))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub vectorizer_loaded: bool,
}

/// Error response body `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// Map a library error to a response. Internal failures are prefixed
    /// with `context`.
    fn from_error(err: TastebudError, context: &str) -> Self {
        match (err.kind(), err) {
            (ErrorKind::ClientInput, TastebudError::InvalidInput(detail)) => Self {
                status: StatusCode::BAD_REQUEST,
                detail,
            },
            (ErrorKind::ClientInput, err) => Self {
                status: StatusCode::BAD_REQUEST,
                detail: err.to_string(),
            },
            (ErrorKind::Configuration, err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: err.to_string(),
            },
            (_, err) => {
                error!("{context}: {err}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: format!("{context}: {err}"),
                }
            }
        }
    }

    fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the service router.
pub fn router(state: ServiceState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/predict/batch", post(predict_batch))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Sentiment Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "predict": "/predict",
            "batch": "/predict/batch",
            "health": "/health",
        }
    }))
}

async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    let status = if state.is_ready() { "healthy" } else { "unhealthy" };
    Json(HealthResponse {
        status: status.to_string(),
        model_loaded: state.model_loaded(),
        vectorizer_loaded: state.vectorizer_loaded(),
    })
}

async fn predict(
    State(state): State<ServiceState>,
    Json(request): Json<ReviewRequest>,
) -> std::result::Result<Json<PredictionResult>, ApiError> {
    let predictor = state.predictor()?;
    run_blocking("Error during prediction", move || {
        predictor.predict_one(&request.review)
    })
    .await
    .map(Json)
}

async fn predict_batch(
    State(state): State<ServiceState>,
    Json(reviews): Json<Vec<String>>,
) -> std::result::Result<Json<BatchResponse>, ApiError> {
    // the batch route reports missing artifacts as a bad request
    let predictor = state
        .predictor()
        .map_err(|e| e.with_status(StatusCode::BAD_REQUEST))?;
    let results = run_blocking("Error during batch prediction", move || {
        predictor.predict_batch(reviews.as_slice())
    })
    .await?;

    Ok(Json(BatchResponse {
        total: results.len(),
        results,
    }))
}

/// Run CPU-bound model work off the async workers.
async fn run_blocking<T, F>(context: &str, work: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::from_error(TastebudError::other(e.to_string()), context))?
        .map_err(|e| ApiError::from_error(e, context))
}

/// Load the artifacts and serve until interrupted.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    config.validate()?;
    let state = ServiceState::load(&config.artifacts, config.allow_unloaded)?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        "Listening on {} (model loaded: {})",
        listener.local_addr()?,
        state.is_ready()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
}
