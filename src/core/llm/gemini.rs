//! Gemini `generateContent` client over reqwest.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ClientBinding, ClientFactory, Content, GenerateRequest, GenerateResponse, LlmError,
    ModelClient, SafetySetting, map_http_error,
};
use crate::core::app;

/// Client bound to one API key, model, and safety configuration.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    binding: ClientBinding,
}

impl GeminiClient {
    pub fn new(base_url: &str, binding: ClientBinding) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("{}/{}", app::NAME, app::VERSION))
            .build()
            .map_err(|e| LlmError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            binding,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.binding.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: &'a [Content],
    safety_settings: &'a [SafetySetting],
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// Response parts may carry fields other than text; only text is kept.
#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text parts of the first candidate. `None` when there is no text at all.
fn response_text(response: GenerateContentResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, LlmError> {
        let body = GenerateContentBody {
            contents: &request.contents,
            safety_settings: &self.binding.safety,
        };
        log::debug!(
            "POST generateContent model={} parts={}",
            self.binding.model,
            request.contents.iter().map(|c| c.parts.len()).sum::<usize>()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.binding.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_http_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        Ok(GenerateResponse {
            text: response_text(parsed),
        })
    }
}

/// Builds [`GeminiClient`]s against a fixed API base URL.
#[derive(Debug, Clone)]
pub struct GeminiFactory {
    base_url: String,
}

impl GeminiFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl ClientFactory for GeminiFactory {
    fn build(&self, binding: &ClientBinding) -> Result<Arc<dyn ModelClient>, LlmError> {
        Ok(Arc::new(GeminiClient::new(&self.base_url, binding.clone())?))
    }
}
