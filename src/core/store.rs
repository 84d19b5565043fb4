//! Credential storage: one key-value entry holding the API key.
//!
//! The file backend keeps the key in a dedicated file with restrictive permissions
//! (0o600 on Unix) and replaces it via temp file + rename, so a read right after a
//! write always sees the new value. The memory backend keeps the key for the
//! lifetime of the process only.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::core::paths;

/// Fixed key name the credential is stored under.
pub const CREDENTIAL_KEY: &str = "gemini-api-key";

/// Errors when reading or writing the stored credential.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No config directory available")]
    NoConfigDir,
    #[error("Failed to access stored API key: {0}")]
    Io(#[from] io::Error),
}

/// Persistence backend for the credential.
pub trait CredentialStore: Send + Sync {
    /// Read the stored value. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<String>, StoreError>;
    /// Overwrite the stored value.
    fn save(&self, value: &str) -> Result<(), StoreError>;
    /// Remove the stored value. Removing an absent value is not an error.
    fn clear(&self) -> Result<(), StoreError>;
    /// Short description for `config` output.
    fn describe(&self) -> String;
}

/// File-backed store: `<dir>/gemini-api-key`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store in the given directory under [`CREDENTIAL_KEY`].
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CREDENTIAL_KEY),
        }
    }

    /// Store in the application config directory.
    pub fn in_config_dir() -> Result<Self, StoreError> {
        let dir = paths::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::in_dir(&dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let key = content.trim();
        Ok(if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        })
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        let dir = self.path.parent().ok_or_else(|| {
            StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Invalid credentials path",
            ))
        })?;
        fs::create_dir_all(dir)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            // Owner-only from the first byte written.
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&tmp)?;
            #[cfg(unix)]
            {
                // `mode` only applies on creation; a leftover temp file keeps its old bits.
                let mut perms = file.metadata()?.permissions();
                perms.set_mode(0o600);
                file.set_permissions(perms)?;
            }
            file.write_all(value.trim().as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("file ({})", self.path().display())
    }
}

/// Session-only store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session store starting out with `value`.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a usable Option.
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot().clone().filter(|v| !v.trim().is_empty()))
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        *self.slot() = Some(value.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory (session only)".to_string()
    }
}
