//! Request and response payloads for the OpenRouter HTTP API, plus the
//! error taxonomy shared by both endpoints.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

pub mod chat;
pub mod models;

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

/// Per-token price table. OpenRouter encodes prices as decimal strings.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub completion: Option<String>,
}

impl ModelPricing {
    /// An absent or unparseable price counts as paid so it can never slip
    /// through the free filter.
    fn parse_price(value: Option<&str>) -> f64 {
        value
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(1.0)
    }

    pub fn prompt_price(&self) -> f64 {
        Self::parse_price(self.prompt.as_deref())
    }

    pub fn completion_price(&self) -> f64 {
        Self::parse_price(self.completion.as_deref())
    }

    pub fn is_free(&self) -> bool {
        self.prompt_price() == 0.0 && self.completion_price() == 0.0
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub pricing: ModelPricing,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub top_provider: Option<serde_json::Value>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default)]
    pub created: Option<i64>,
}

impl ModelInfo {
    /// Whether the listing reports a live provider behind this model. A
    /// JSON `null` counts as absent.
    pub fn has_provider(&self) -> bool {
        self.top_provider.as_ref().is_some_and(|v| !v.is_null())
    }
}

#[derive(Deserialize, Debug)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

/// Failure of one HTTP exchange with the provider.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure: DNS, connection refused, timeout. Never
    /// retried by model rotation.
    Network(reqwest::Error),

    /// Non-2xx response, preserved verbatim. The status drives the
    /// engine's retry decision; the body is kept for display.
    Http { status: u16, body: String },

    /// A 2xx response whose body did not decode to a usable payload.
    MalformedResponse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(source) => write!(f, "Network error: {source}"),
            ApiError::Http { status, body } => {
                write!(f, "API request failed with status {status}: {body}")
            }
            ApiError::MalformedResponse(detail) => {
                write!(f, "Unexpected API response: {detail}")
            }
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Network(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_from_json(value: serde_json::Value) -> ModelInfo {
        serde_json::from_value(value).expect("model fixture")
    }

    #[test]
    fn prices_parse_from_decimal_strings() {
        let pricing = ModelPricing {
            prompt: Some("0".to_string()),
            completion: Some("0.000002".to_string()),
        };
        assert_eq!(pricing.prompt_price(), 0.0);
        assert!(pricing.completion_price() > 0.0);
        assert!(!pricing.is_free());
    }

    #[test]
    fn missing_or_garbled_prices_count_as_paid() {
        assert!(!ModelPricing::default().is_free());

        let pricing = ModelPricing {
            prompt: Some("free".to_string()),
            completion: Some("0".to_string()),
        };
        assert!(!pricing.is_free());
    }

    #[test]
    fn null_top_provider_counts_as_absent() {
        let with_provider = model_from_json(serde_json::json!({
            "id": "a/model",
            "top_provider": {"context_length": 8192}
        }));
        assert!(with_provider.has_provider());

        let null_provider = model_from_json(serde_json::json!({
            "id": "b/model",
            "top_provider": null
        }));
        assert!(!null_provider.has_provider());

        let no_provider = model_from_json(serde_json::json!({"id": "c/model"}));
        assert!(!no_provider.has_provider());
    }
}
