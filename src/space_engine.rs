use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::engine::Predictor;
use crate::types::{RawPrediction, decode_predictions};

/// Predictor backed by a hosted inference Space.
///
/// Invokes the Space's named operation with a single multipart POST. No
/// retries and no timeout override; a hung Space hangs the request.
pub struct SpacePredictor {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Clone)]
pub struct SpaceConfig {
    pub space_url: String,
    pub api_name: String,
}

#[derive(Debug, Deserialize)]
struct SpaceResponse {
    #[serde(default)]
    data: Value,
}

impl SpacePredictor {
    pub fn new(config: SpaceConfig) -> Self {
        let endpoint = format!(
            "{}/run/{}",
            config.space_url.trim_end_matches('/'),
            config.api_name
        );

        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Predictor for SpacePredictor {
    #[tracing::instrument(skip(self, image), fields(image_bytes = image.len(), top_k, use_wa_adapter))]
    async fn predict(
        &self,
        image: Bytes,
        top_k: u32,
        use_wa_adapter: bool,
    ) -> Result<Vec<RawPrediction>> {
        let form = Form::new()
            .part("image", Part::stream(image).file_name("image"))
            .text("top_k", top_k.to_string())
            .text("use_wa_adapter", use_wa_adapter.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("prediction request failed")?
            .error_for_status()
            .context("prediction service returned an error status")?;

        let body: SpaceResponse = response
            .json()
            .await
            .context("prediction response was not valid JSON")?;

        tracing::debug!(endpoint = %self.endpoint, "Space call completed");
        Ok(decode_predictions(&body.data))
    }
}
