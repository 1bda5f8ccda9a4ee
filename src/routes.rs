use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use metrics::counter;
use std::sync::Arc;

use crate::engine::Predictor;
use crate::error::ApiError;
use crate::types::{ClassifyResponse, rank_predictions};
use crate::validate::{ClassifyParams, validate};

#[derive(Clone)]
pub struct AppState {
    predictor: Arc<dyn Predictor + Send + Sync>,
    http_client: reqwest::Client,
    model_name: String,
}

impl AppState {
    pub fn new(predictor: Arc<dyn Predictor + Send + Sync>, model_name: String) -> Self {
        Self {
            predictor,
            http_client: reqwest::Client::new(),
            model_name,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/classify", post(classify_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Single-pass pipeline: parse, validate, fetch the image, call the Space,
/// rank the predictions. Validation failures return their own messages;
/// everything unexpected is logged and collapsed into a generic 500 so no
/// internal detail leaks to the caller.
#[tracing::instrument(skip(state, body), fields(request_id = %uuid::Uuid::new_v4().simple()))]
async fn classify_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, ApiError> {
    counter!("classification_requests_total").increment(1);

    let body: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidBody)?;
    let params = validate(&body)?;

    tracing::info!(
        image_url = %params.image_url,
        top_k = params.top_k,
        use_wa_adapter = params.use_wa_adapter,
        "Processing classification request"
    );

    let image = fetch_image(&state.http_client, &params).await?;

    let raw = state
        .predictor
        .predict(image, params.top_k, params.use_wa_adapter)
        .await
        .map_err(|e| {
            counter!("classification_failures_total").increment(1);
            tracing::error!(error = %e, "Remote prediction failed");
            ApiError::Internal
        })?;

    let predictions = rank_predictions(raw);
    tracing::info!(
        predictions = predictions.len(),
        "Classification completed successfully"
    );

    Ok(Json(ClassifyResponse {
        model: state.model_name.clone(),
        top_k: params.top_k,
        adapters: params.adapters,
        predictions,
    }))
}

/// GET the source image. A non-success upstream status is the caller's
/// problem (400 with the status echoed); transport failures ride the
/// generic internal-error path like any other unexpected failure.
async fn fetch_image(client: &reqwest::Client, params: &ClassifyParams) -> Result<Bytes, ApiError> {
    let response = client
        .get(params.image_url.clone())
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, image_url = %params.image_url, "Image fetch failed");
            ApiError::Internal
        })?;

    let status = response.status();
    if !status.is_success() {
        counter!("image_fetch_failures_total").increment(1);
        return Err(ApiError::ImageFetchFailed { status });
    }

    response.bytes().await.map_err(|e| {
        tracing::error!(error = %e, image_url = %params.image_url, "Image body read failed");
        ApiError::Internal
    })
}
