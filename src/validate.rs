use reqwest::Url;
use serde_json::Value;

use crate::error::ApiError;

pub const DEFAULT_TOP_K: u32 = 5;
pub const MAX_TOP_K: u32 = 10;
pub const MAX_ADAPTERS: usize = 5;
pub const DEFAULT_ADAPTER: &str = "base";

/// Effective request parameters after validation and normalization.
#[derive(Debug, Clone)]
pub struct ClassifyParams {
    pub image_url: Url,
    pub top_k: u32,
    pub adapters: Vec<String>,
    /// Forwarded to the Space, never echoed back to the caller.
    pub use_wa_adapter: bool,
}

/// Validate a parsed request body. Checks run in a fixed order and stop at
/// the first failure: body shape, imageUrl, topK, adapters.
pub fn validate(body: &Value) -> Result<ClassifyParams, ApiError> {
    let body = body.as_object().ok_or(ApiError::InvalidBody)?;

    let image_url = match body.get("imageUrl") {
        Some(Value::String(url)) if !url.is_empty() => url,
        _ => return Err(ApiError::MissingImageUrl),
    };
    let image_url = Url::parse(image_url).map_err(|_| ApiError::InvalidImageUrl)?;

    let top_k = effective_top_k(body.get("topK"))?;
    let adapters = effective_adapters(body.get("adapters"))?;
    let use_wa_adapter = wants_wa_adapter(&adapters);

    Ok(ClassifyParams {
        image_url,
        top_k,
        adapters,
        use_wa_adapter,
    })
}

fn effective_top_k(value: Option<&Value>) -> Result<u32, ApiError> {
    let Some(value) = value else {
        return Ok(DEFAULT_TOP_K);
    };

    let top_k = value.as_f64().ok_or(ApiError::InvalidTopK)?;
    if !top_k.is_finite() || top_k <= 0.0 {
        return Err(ApiError::InvalidTopK);
    }

    // Saturating float-to-int cast, then clamp.
    Ok((top_k.floor() as u32).min(MAX_TOP_K))
}

fn effective_adapters(value: Option<&Value>) -> Result<Vec<String>, ApiError> {
    let Some(Value::Array(entries)) = value else {
        // Non-array adapters are tolerated and treated as absent.
        return Ok(vec![DEFAULT_ADAPTER.to_string()]);
    };

    if entries.len() > MAX_ADAPTERS {
        return Err(ApiError::TooManyAdapters);
    }

    let adapters: Vec<String> = entries
        .iter()
        .filter_map(adapter_name)
        .filter(|name| !name.is_empty())
        .collect();

    if adapters.is_empty() {
        Ok(vec![DEFAULT_ADAPTER.to_string()])
    } else {
        Ok(adapters)
    }
}

fn adapter_name(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn wants_wa_adapter(adapters: &[String]) -> bool {
    adapters
        .iter()
        .any(|a| a.eq_ignore_ascii_case("wa") || a.eq_ignore_ascii_case("wa-native"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({ "imageUrl": "https://x/img.png" })
    }

    #[test]
    fn test_body_must_be_an_object() {
        assert!(matches!(
            validate(&Value::Null),
            Err(ApiError::InvalidBody)
        ));
        assert!(matches!(
            validate(&json!([1, 2, 3])),
            Err(ApiError::InvalidBody)
        ));
    }

    #[test]
    fn test_image_url_required() {
        assert!(matches!(
            validate(&json!({})),
            Err(ApiError::MissingImageUrl)
        ));
        assert!(matches!(
            validate(&json!({ "imageUrl": 42 })),
            Err(ApiError::MissingImageUrl)
        ));
        assert!(matches!(
            validate(&json!({ "imageUrl": "" })),
            Err(ApiError::MissingImageUrl)
        ));
    }

    #[test]
    fn test_image_url_must_be_absolute() {
        assert!(matches!(
            validate(&json!({ "imageUrl": "not-a-url" })),
            Err(ApiError::InvalidImageUrl)
        ));
        assert!(matches!(
            validate(&json!({ "imageUrl": "/relative/path.png" })),
            Err(ApiError::InvalidImageUrl)
        ));
    }

    #[test]
    fn test_top_k_defaults_to_five() {
        let params = validate(&valid_body()).unwrap();
        assert_eq!(params.top_k, DEFAULT_TOP_K);
    }

    #[test]
    fn test_top_k_is_floored_and_clamped() {
        let mut body = valid_body();
        body["topK"] = json!(7.9);
        assert_eq!(validate(&body).unwrap().top_k, 7);

        body["topK"] = json!(42);
        assert_eq!(validate(&body).unwrap().top_k, MAX_TOP_K);

        body["topK"] = json!(1e300);
        assert_eq!(validate(&body).unwrap().top_k, MAX_TOP_K);

        body["topK"] = json!(0.5);
        assert_eq!(validate(&body).unwrap().top_k, 0);
    }

    #[test]
    fn test_top_k_rejects_non_positive_and_non_numeric() {
        for bad in [json!(0), json!(-3), json!("5"), json!(true), json!(null)] {
            let mut body = valid_body();
            body["topK"] = bad;
            assert!(matches!(validate(&body), Err(ApiError::InvalidTopK)));
        }
    }

    #[test]
    fn test_adapters_default_to_base() {
        assert_eq!(validate(&valid_body()).unwrap().adapters, vec!["base"]);

        let mut body = valid_body();
        body["adapters"] = json!([]);
        assert_eq!(validate(&body).unwrap().adapters, vec!["base"]);

        // Non-array adapters are treated as absent, not rejected.
        body["adapters"] = json!("wa");
        let params = validate(&body).unwrap();
        assert_eq!(params.adapters, vec!["base"]);
        assert!(!params.use_wa_adapter);
    }

    #[test]
    fn test_adapters_are_trimmed_and_filtered() {
        let mut body = valid_body();
        body["adapters"] = json!(["  leaf ", "", "   ", "fern"]);
        assert_eq!(validate(&body).unwrap().adapters, vec!["leaf", "fern"]);

        body["adapters"] = json!(["", "  "]);
        assert_eq!(validate(&body).unwrap().adapters, vec!["base"]);

        body["adapters"] = json!([3, "leaf"]);
        assert_eq!(validate(&body).unwrap().adapters, vec!["3", "leaf"]);
    }

    #[test]
    fn test_adapter_limit() {
        let mut body = valid_body();
        body["adapters"] = json!(["a", "b", "c", "d", "e"]);
        assert_eq!(validate(&body).unwrap().adapters.len(), 5);

        body["adapters"] = json!(["a", "b", "c", "d", "e", "f"]);
        assert!(matches!(validate(&body), Err(ApiError::TooManyAdapters)));
    }

    #[test]
    fn test_wa_adapter_flag_is_case_insensitive() {
        for (adapters, expected) in [
            (json!(["wa"]), true),
            (json!(["WA"]), true),
            (json!(["Wa-Native"]), true),
            (json!(["base", "wa-native"]), true),
            (json!(["water"]), false),
            (json!(["base"]), false),
        ] {
            let mut body = valid_body();
            body["adapters"] = adapters;
            assert_eq!(validate(&body).unwrap().use_wa_adapter, expected);
        }
    }
}
