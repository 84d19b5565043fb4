//! Recipe requests: validate, build the prompt, make one model call, map the result.

use crate::core::credentials::CredentialManager;
use crate::core::llm::{GenerateRequest, LlmError, Part};

/// Returned when the model answers without any text.
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "The model returned an empty response. Try again or change the ingredients.";

/// One user request. Ingredients are required; the image is optional.
#[derive(Debug, Clone, Default)]
pub struct RecipeRequest {
    pub ingredients: String,
    pub image: Option<Vec<u8>>,
    pub image_name: Option<String>,
}

impl RecipeRequest {
    pub fn new(ingredients: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, bytes: Vec<u8>, name: Option<String>) -> Self {
        self.image = Some(bytes);
        self.image_name = name;
        self
    }

    fn image_bytes(&self) -> Option<&[u8]> {
        self.image.as_deref().filter(|b| !b.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Please enter at least one ingredient")]
    Validation,
    #[error("No API key configured. Run `pantry-recipes key set` first.")]
    NotConfigured,
    #[error("Recipe generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Prompt text for the given ingredients, embedded verbatim.
pub fn build_prompt(ingredients: &str) -> String {
    format!(
        "You are a cooking assistant for people on a tight budget.\n\
         Using these ingredients: {}\n\
         Suggest exactly 3 recipes. Each recipe must be possible to finish in 15 minutes or less.\n\
         If a photo is attached, also use the ingredients you can see in it.\n\
         Format the whole answer as Markdown: a heading per recipe, an ingredient list, and numbered steps.",
        ingredients
    )
}

/// Payload for a request: text only, or text plus a JPEG part when image bytes are present.
pub fn build_payload(request: &RecipeRequest) -> GenerateRequest {
    let mut parts = vec![Part::text(build_prompt(&request.ingredients))];
    if let Some(bytes) = request.image_bytes() {
        parts.push(Part::jpeg(bytes));
    }
    GenerateRequest::user(parts)
}

/// Generate recipes for one request. A cold manager gets one `initialize` attempt.
pub async fn generate_recipe(
    manager: &mut CredentialManager,
    request: &RecipeRequest,
) -> Result<String, RecipeError> {
    if request.ingredients.trim().is_empty() {
        return Err(RecipeError::Validation);
    }
    if !manager.is_ready() {
        manager.initialize().await;
    }
    let client = manager.client().ok_or(RecipeError::NotConfigured)?;

    let payload = build_payload(request);
    log::info!(
        "requesting recipes from {} (image: {})",
        manager.model(),
        match (request.image_bytes(), request.image_name.as_deref()) {
            (Some(b), Some(name)) => format!("{}, {} bytes", name, b.len()),
            (Some(b), None) => format!("{} bytes", b.len()),
            (None, _) => "none".to_string(),
        }
    );

    let response = client.generate_content(&payload).await?;
    Ok(match response.non_empty_text() {
        Some(text) => text.to_string(),
        None => {
            log::warn!("model returned no text");
            EMPTY_RESPONSE_FALLBACK.to_string()
        }
    })
}
