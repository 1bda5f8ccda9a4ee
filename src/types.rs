use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub model: String,
    #[serde(rename = "topK")]
    pub top_k: u32,
    pub adapters: Vec<String>,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
    pub rank: usize,
}

/// One entry of the Space's prediction array.
///
/// The Space emits either `{"label": ..., "score": ...}` objects or
/// `[label, score]` pairs depending on the deployed pipeline version, so
/// both shapes decode here. Field values are kept as raw JSON because the
/// Space does not guarantee their types; coercion happens in `label()` and
/// `score()` with object fields taking precedence over positions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrediction {
    Labeled {
        #[serde(default)]
        label: Option<Value>,
        #[serde(default)]
        score: Option<Value>,
    },
    Pair(Value, Value),
    Opaque(Value),
}

impl RawPrediction {
    pub fn label(&self) -> String {
        let label = match self {
            RawPrediction::Labeled { label, .. } => label.as_ref().and_then(coerce_string),
            RawPrediction::Pair(label, _) => coerce_string(label),
            RawPrediction::Opaque(_) => None,
        };
        label.unwrap_or_else(|| "unknown".to_string())
    }

    pub fn score(&self) -> f64 {
        let score = match self {
            RawPrediction::Labeled { score, .. } => score.as_ref().and_then(coerce_number),
            RawPrediction::Pair(_, score) => coerce_number(score),
            RawPrediction::Opaque(_) => None,
        };
        score.unwrap_or(0.0)
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode the `data` field of a Space response. Anything that is not an
/// array yields no predictions rather than an error.
pub fn decode_predictions(data: &Value) -> Vec<RawPrediction> {
    let Value::Array(entries) = data else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            serde_json::from_value(entry.clone())
                .unwrap_or_else(|_| RawPrediction::Opaque(entry.clone()))
        })
        .collect()
}

/// Assign 1-based ranks in list order.
pub fn rank_predictions(raw: Vec<RawPrediction>) -> Vec<Prediction> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| Prediction {
            label: entry.label(),
            score: entry.score(),
            rank: index + 1,
        })
        .collect()
}
