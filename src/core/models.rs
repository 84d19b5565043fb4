//! Model selection: candidate model names and the default.
//!
//! The candidate list is loaded from `config/models.json` (embedded at compile time
//! and validated by `build.rs`).

use std::sync::OnceLock;

use serde::Deserialize;

/// Ordered list of candidate model names with a fixed default.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelSelection {
    default_index: usize,
    candidates: Vec<String>,
}

impl ModelSelection {
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    /// Normalized name of the default candidate.
    pub fn default_model(&self) -> String {
        normalize_model_name(&self.candidates[self.default_index])
    }
}

fn load_selection() -> ModelSelection {
    let json = include_str!("../../config/models.json");
    serde_json::from_str(json).expect("models.json must be valid")
}

static SELECTION: OnceLock<ModelSelection> = OnceLock::new();

/// Returns the embedded model selection, loading it on first access.
pub fn selection() -> &'static ModelSelection {
    SELECTION.get_or_init(load_selection)
}

/// Strip a namespace prefix: `models/gemini-1.5-pro` → `gemini-1.5-pro`.
/// Bare names are returned trimmed.
pub fn normalize_model_name(name: &str) -> String {
    let name = name.trim();
    name.rsplit('/').next().unwrap_or(name).to_string()
}
