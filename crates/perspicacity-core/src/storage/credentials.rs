//! Credential storage
//!
//! The service needs two secrets on every request. They live in a flat JSON
//! object on disk and are read fresh before each session starts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::paths;

/// The secrets the service expects, in the order they are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKey {
    Gemini,
    Google,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 2] = [CredentialKey::Gemini, CredentialKey::Google];

    /// Key in the JSON store
    pub fn storage_key(&self) -> &'static str {
        match self {
            CredentialKey::Gemini => "gemini_api_key",
            CredentialKey::Google => "google_api_key",
        }
    }

    /// Human readable name for prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            CredentialKey::Gemini => "Gemini",
            CredentialKey::Google => "Google",
        }
    }
}

/// Both secrets, resolved and non-empty
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub google_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("google_api_key", &"<redacted>")
            .finish()
    }
}

/// Key-value store backing the settings surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(flatten)]
    keys: HashMap<String, String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Load credentials from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path(&paths::credentials_file())
    }

    /// Load credentials from a specific path. A missing file is an empty store.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut store = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str::<CredentialStore>(&contents)?
        } else {
            Self::default()
        };
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Re-read the backing file, keeping the in-memory store if it has none
    pub fn reload(&mut self) -> Result<()> {
        if let Some(path) = self.path.clone() {
            *self = Self::load_from_path(&path)?;
        }
        Ok(())
    }

    /// Save to the path this store was loaded from (or the default one)
    pub fn save(&self) -> Result<()> {
        let path = self.path.clone().unwrap_or_else(paths::credentials_file);
        self.save_to_path(&path)
    }

    /// Save credentials to a specific path
    ///
    /// Writes a temp file and renames it over the original. On Unix the file
    /// is restricted to 0600 before the rename.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = fs::metadata(&temp_path)?.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(&temp_path, permissions)?;
        }

        fs::rename(&temp_path, path)?;
        tracing::debug!("Credentials saved atomically to {:?}", path);
        Ok(())
    }

    /// Get a secret, treating blank values as absent
    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        self.keys
            .get(key.storage_key())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Set a secret (trimmed)
    pub fn set(&mut self, key: CredentialKey, value: &str) {
        self.keys
            .insert(key.storage_key().to_string(), value.trim().to_string());
    }

    pub fn remove(&mut self, key: CredentialKey) {
        self.keys.remove(key.storage_key());
    }

    /// Resolve both secrets, failing on the first missing one
    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = self
            .get(CredentialKey::Gemini)
            .ok_or(EngineError::MissingCredential(CredentialKey::Gemini.storage_key()))?;
        let google_api_key = self
            .get(CredentialKey::Google)
            .ok_or(EngineError::MissingCredential(CredentialKey::Google.storage_key()))?;
        Ok(Credentials {
            api_key: api_key.to_string(),
            google_api_key: google_api_key.to_string(),
        })
    }

    /// First secret that still needs configuring
    pub fn first_missing(&self) -> Option<CredentialKey> {
        CredentialKey::ALL.into_iter().find(|k| self.get(*k).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::load_from_path(&dir.path().join("credentials.json")).unwrap();
        assert_eq!(store.first_missing(), Some(CredentialKey::Gemini));
        assert!(matches!(
            store.credentials(),
            Err(EngineError::MissingCredential("gemini_api_key"))
        ));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut store = CredentialStore::default();
        store.set(CredentialKey::Gemini, "g-key");
        store.set(CredentialKey::Google, "   ");
        assert_eq!(store.first_missing(), Some(CredentialKey::Google));
        assert!(matches!(
            store.credentials(),
            Err(EngineError::MissingCredential("google_api_key"))
        ));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let mut store = CredentialStore::load_from_path(&path).unwrap();
        store.set(CredentialKey::Gemini, " g-key ");
        store.set(CredentialKey::Google, "goog-key");
        store.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"gemini_api_key\": \"g-key\""));

        let loaded = CredentialStore::load_from_path(&path).unwrap();
        let creds = loaded.credentials().unwrap();
        assert_eq!(creds.api_key, "g-key");
        assert_eq!(creds.google_api_key, "goog-key");
        assert!(!format!("{:?}", creds).contains("g-key"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let mut store = CredentialStore::default();
        store.set(CredentialKey::Gemini, "a");
        store.save_to_path(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
