use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::types::RawPrediction;

/// Narrow seam around the remote inference service so the handler can be
/// exercised against a fake in tests.
#[async_trait]
pub trait Predictor {
    async fn predict(
        &self,
        image: Bytes,
        top_k: u32,
        use_wa_adapter: bool,
    ) -> Result<Vec<RawPrediction>>;
}
