use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to API callers as `{"error": "..."}` bodies.
///
/// Validation failures carry their exact client-facing message here so the
/// handler never has to format error text inline. Anything unexpected is
/// collapsed into `Internal` before it reaches the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON body.")]
    InvalidBody,

    #[error("imageUrl is required and must be a string.")]
    MissingImageUrl,

    #[error("imageUrl must be a valid URL.")]
    InvalidImageUrl,

    #[error("topK must be a positive number.")]
    InvalidTopK,

    #[error("adapters cannot have more than 5 items.")]
    TooManyAdapters,

    #[error("Failed to fetch image: {status}")]
    ImageFetchFailed { status: StatusCode },

    #[error("Internal server error while classifying image.")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
