//! Runtime configuration from the environment (`.env` is loaded by `main`).

use std::env;

use crate::core::models::{self, normalize_model_name};
use crate::core::paths;
use crate::core::store::{CredentialStore, FileStore, MemoryStore, StoreError};

/// Seeds the session (memory) store; never read by the file store.
pub const SESSION_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Which credential backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

impl StoreKind {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "file" => Ok(StoreKind::File),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::InvalidStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// Model from `PANTRY_MODEL` or the embedded default, ignoring `--model`.
    pub base_model_id: String,
    /// Model in effect: `--model` when given, else `base_model_id`.
    pub model_id: String,
    pub store: StoreKind,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PANTRY_STORE must be 'file' or 'memory', got '{0}'")]
    InvalidStore(String),
    #[error("No config directory available (set {})", paths::CONFIG_DIR_ENV)]
    NoConfigDir,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Config {
    /// Open the configured credential store.
    pub fn open_store(&self) -> Result<Box<dyn CredentialStore>, ConfigError> {
        match self.store {
            StoreKind::File => match FileStore::in_config_dir() {
                Ok(s) => Ok(Box::new(s)),
                Err(StoreError::NoConfigDir) => Err(ConfigError::NoConfigDir),
                Err(e) => Err(ConfigError::Store(e)),
            },
            StoreKind::Memory => Ok(Box::new(match env_non_empty(SESSION_KEY_ENV) {
                Some(key) => MemoryStore::with_value(key.trim()),
                None => MemoryStore::new(),
            })),
        }
    }

    /// Where the model name came from, for `config` output.
    pub fn model_source(model_override: Option<&str>) -> &'static str {
        if model_override.is_some() {
            "from --model"
        } else if env_non_empty("PANTRY_MODEL").is_some() {
            "from PANTRY_MODEL"
        } else {
            "default"
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Load configuration from environment. `model_override` (the `--model` flag) wins over
/// `PANTRY_MODEL`, which wins over the embedded default.
pub fn load(model_override: Option<&str>) -> Result<Config, ConfigError> {
    let base_url = env_non_empty("GEMINI_BASE_URL")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let base_model_id = env_non_empty("PANTRY_MODEL")
        .map(|m| normalize_model_name(&m))
        .unwrap_or_else(|| models::selection().default_model());
    let model_id = model_override
        .map(normalize_model_name)
        .unwrap_or_else(|| base_model_id.clone());

    let store = match env::var("PANTRY_STORE") {
        Ok(s) => StoreKind::parse(&s)?,
        Err(_) => StoreKind::File,
    };

    Ok(Config {
        base_url,
        base_model_id,
        model_id,
        store,
    })
}
