//! Credential/model manager: owns the API key and the client bound to it.
//!
//! One explicitly constructed instance per process. The manager reads and writes the
//! key through a [`CredentialStore`] and builds clients through a [`ClientFactory`],
//! so both can be swapped (session-only storage, stub clients in tests).

use std::sync::Arc;

use crate::core::llm::{ClientBinding, ClientFactory, GenerateRequest, LlmError, ModelClient};
use crate::core::models::normalize_model_name;
use crate::core::store::{CredentialStore, StoreError};

/// Visible prefix length of a masked credential.
pub const MASK_PREFIX_LEN: usize = 10;
/// Appended to the visible prefix.
pub const MASK_MARKER: &str = "...";
/// Fixed prompt used by [`CredentialManager::test_connection`].
pub const PING_PROMPT: &str = "Reply with the single word: pong";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("API key must not be empty")]
    InvalidInput,
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Client(#[from] LlmError),
}

struct BoundClient {
    binding: ClientBinding,
    client: Arc<dyn ModelClient>,
}

pub struct CredentialManager {
    store: Box<dyn CredentialStore>,
    factory: Box<dyn ClientFactory>,
    model: String,
    credential: Option<String>,
    client: Option<BoundClient>,
    initialized: bool,
}

impl CredentialManager {
    pub fn new(
        store: Box<dyn CredentialStore>,
        factory: Box<dyn ClientFactory>,
        model: &str,
    ) -> Self {
        Self {
            store,
            factory,
            model: normalize_model_name(model),
            credential: None,
            client: None,
            initialized: false,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Load the key from storage and make sure a client is bound to it.
    ///
    /// Always reads the store afresh. A client already bound to the same key and model
    /// is kept. Read failures degrade to "no key".
    pub async fn initialize(&mut self) {
        let stored = match self.store.load() {
            Ok(v) => v.filter(|k| !k.trim().is_empty()),
            Err(e) => {
                log::warn!("Could not read stored API key, treating as absent: {}", e);
                None
            }
        };

        match stored {
            Some(key) => {
                let current = self
                    .client
                    .as_ref()
                    .is_some_and(|c| c.binding.matches(&key, &self.model));
                if !current {
                    self.client = match self.bind(&key) {
                        Ok(c) => Some(c),
                        Err(e) => {
                            log::warn!("Could not build model client: {}", e);
                            None
                        }
                    };
                }
                self.credential = Some(key);
            }
            None => {
                self.credential = None;
                self.client = None;
            }
        }
        self.initialized = true;
        log::debug!("initialized: ready={}", self.is_ready());
    }

    /// Validate, bind a client, persist, then commit in memory.
    ///
    /// On error nothing in memory changes.
    pub async fn save_credential(&mut self, value: &str) -> Result<(), CredentialError> {
        let key = value.trim();
        if key.is_empty() {
            return Err(CredentialError::InvalidInput);
        }
        let client = self.bind(key)?;
        self.store.save(key)?;

        self.credential = Some(key.to_string());
        self.client = Some(client);
        self.initialized = true;
        log::info!("API key saved ({})", mask(key));
        Ok(())
    }

    /// Remove the key from storage and memory. Storage errors are logged only.
    pub async fn clear_credential(&mut self) {
        if let Err(e) = self.store.clear() {
            log::warn!("Could not remove stored API key: {}", e);
        }
        self.credential = None;
        self.client = None;
        log::info!("API key cleared");
    }

    /// Rebuild the client from the current key and send a short ping.
    /// True when the model answered with non-empty text.
    pub async fn test_connection(&mut self) -> bool {
        let Some(key) = self.credential.clone() else {
            log::info!("connection test skipped: no API key");
            return false;
        };
        self.client = match self.bind(&key) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("Could not build model client: {}", e);
                None
            }
        };
        let Some(bound) = self.client.as_ref() else {
            return false;
        };

        match bound
            .client
            .generate_content(&GenerateRequest::text(PING_PROMPT))
            .await
        {
            Ok(response) => {
                let ok = response.non_empty_text().is_some();
                log::info!("connection test: {}", if ok { "ok" } else { "empty response" });
                ok
            }
            Err(e) => {
                log::warn!("connection test failed: {}", e);
                false
            }
        }
    }

    /// Switch models. A held key is rebound to the new model immediately.
    pub fn set_model(&mut self, model: &str) -> Result<(), CredentialError> {
        let model = normalize_model_name(model);
        if model == self.model {
            return Ok(());
        }
        self.model = model;
        self.client = None;
        if let Some(key) = self.credential.clone() {
            self.client = Some(self.bind(&key)?);
        }
        Ok(())
    }

    /// Key held, client bound to exactly that key and the current model, and
    /// initialization has run at least once.
    pub fn is_ready(&self) -> bool {
        let Some(key) = self.credential.as_deref() else {
            return false;
        };
        self.initialized
            && !key.is_empty()
            && self
                .client
                .as_ref()
                .is_some_and(|c| c.binding.matches(key, &self.model))
    }

    /// Display form of the key: a short prefix and a marker, never the whole key.
    pub fn masked_credential(&self) -> Option<String> {
        self.credential.as_deref().map(mask)
    }

    /// The bound client, only when ready.
    pub(crate) fn client(&self) -> Option<Arc<dyn ModelClient>> {
        if !self.is_ready() {
            return None;
        }
        self.client.as_ref().map(|c| Arc::clone(&c.client))
    }

    fn bind(&self, key: &str) -> Result<BoundClient, LlmError> {
        let binding = ClientBinding::new(key, &self.model);
        let client = self.factory.build(&binding)?;
        log::debug!("bound model client: model={}", self.model);
        Ok(BoundClient { binding, client })
    }
}

fn mask(key: &str) -> String {
    let len = key.chars().count();
    let visible = if len > MASK_PREFIX_LEN {
        MASK_PREFIX_LEN
    } else {
        len / 2
    };
    let prefix: String = key.chars().take(visible).collect();
    format!("{}{}", prefix, MASK_MARKER)
}
