//! Remote model client: Gemini payload types, the client seam, and client construction.

mod error;
mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{LlmError, map_http_error};
pub use gemini::GeminiFactory;

/// MIME type attached to image parts.
pub const JPEG_MIME: &str = "image/jpeg";

/// One message in a `generateContent` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Text or inline media part.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// JPEG image part; bytes are base64-encoded for the wire.
    pub fn jpeg(bytes: &[u8]) -> Self {
        use base64::Engine;
        Part::InlineData {
            inline_data: InlineData {
                mime_type: JPEG_MIME.to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }
}

/// Base64 inline payload used for image requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Request payload: the messages only. Model and safety settings come from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

impl GenerateRequest {
    /// Single user message with the given parts.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }

    /// Single user message with one text part.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::user(vec![Part::text(prompt)])
    }
}

/// Model response reduced to its text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text when present and not blank.
    pub fn non_empty_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

/// All four harm categories set to `BLOCK_NONE`.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: BlockThreshold::BlockNone,
    })
    .collect()
}

/// What a client is bound to. A client is stale when the current credential or model
/// no longer matches its binding.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientBinding {
    pub api_key: String,
    pub model: String,
    pub safety: Vec<SafetySetting>,
}

impl ClientBinding {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            safety: default_safety_settings(),
        }
    }

    pub fn matches(&self, api_key: &str, model: &str) -> bool {
        self.api_key == api_key && self.model == model
    }
}

impl std::fmt::Debug for ClientBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBinding")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("safety", &self.safety)
            .finish()
    }
}

/// A configured handle to a remote model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate_content(&self, request: &GenerateRequest)
    -> Result<GenerateResponse, LlmError>;
}

/// Builds clients for a binding. Construction is local; no request is sent.
pub trait ClientFactory: Send + Sync {
    fn build(&self, binding: &ClientBinding) -> Result<Arc<dyn ModelClient>, LlmError>;
}
