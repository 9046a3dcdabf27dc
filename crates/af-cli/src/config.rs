//! Credential storage.
//!
//! The persisted store holds the personal access token and the selected
//! project. Process-level secrets (`AF_TOKEN`, `AF_PROJECT_ID`) take
//! precedence over it on reads and are never written.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CliError;

/// Secret override for the personal access token.
pub const AF_TOKEN: &str = "AF_TOKEN";
/// Secret override for the project ID.
pub const AF_PROJECT_ID: &str = "AF_PROJECT_ID";

/// Keys held by a [`CredentialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Personal access token.
    PersonalAccessToken,
    /// Selected project ID.
    ProjectId,
}

/// Persistent key-value store for credentials.
pub trait CredentialStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: ConfigKey) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: ConfigKey, value: &str) -> Result<(), CliError>;

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn clear(&self, key: ConfigKey) -> Result<(), CliError>;

    /// Remove every value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn clear_all(&self) -> Result<(), CliError>;
}

/// Values from the process environment that override the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    /// `AF_TOKEN`.
    pub token: Option<String>,
    /// `AF_PROJECT_ID`.
    pub project_id: Option<String>,
}

impl Secrets {
    /// Read secrets from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            token: read(AF_TOKEN),
            project_id: read(AF_PROJECT_ID),
        }
    }
}

/// Credentials resolved for one invocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Personal access token.
    pub personal_access_token: Option<String>,
    /// Selected project ID.
    pub project_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "personal_access_token",
                &self.personal_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Credential access with secret overrides applied.
#[derive(Clone)]
pub struct Config {
    store: Arc<dyn CredentialStore>,
    secrets: Secrets,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token_override", &self.secrets.token.is_some())
            .field("project_override", &self.secrets.project_id)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Wrap a store with the given overrides.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, secrets: Secrets) -> Self {
        Self { store, secrets }
    }

    /// Current credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            personal_access_token: self.personal_access_token(),
            project_id: self.project_id(),
        }
    }

    /// Personal access token, override first.
    #[must_use]
    pub fn personal_access_token(&self) -> Option<String> {
        self.secrets
            .token
            .clone()
            .or_else(|| self.store.get(ConfigKey::PersonalAccessToken))
    }

    /// Project ID, override first.
    #[must_use]
    pub fn project_id(&self) -> Option<String> {
        self.secrets
            .project_id
            .clone()
            .or_else(|| self.store.get(ConfigKey::ProjectId))
    }

    /// Whether `AF_TOKEN` shadows the stored token.
    #[must_use]
    pub const fn token_overridden(&self) -> bool {
        self.secrets.token.is_some()
    }

    /// Persist a freshly issued token.
    ///
    /// The stored project ID is cleared: the token may belong to a different
    /// account.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn store_personal_access_token(&self, token: &str) -> Result<(), CliError> {
        self.store.set(ConfigKey::PersonalAccessToken, token)?;
        self.store.clear(ConfigKey::ProjectId)?;
        debug!("stored new personal access token, cleared project");
        Ok(())
    }

    /// Remove all stored credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), CliError> {
        self.store.clear_all()
    }
}

// ============================================================================
// File store
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    personal_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
}

impl StoredConfig {
    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::PersonalAccessToken => &mut self.personal_access_token,
            ConfigKey::ProjectId => &mut self.project_id,
        }
    }

    fn value(&self, key: ConfigKey) -> Option<&String> {
        match key {
            ConfigKey::PersonalAccessToken => self.personal_access_token.as_ref(),
            ConfigKey::ProjectId => self.project_id.as_ref(),
        }
    }
}

/// JSON file store, by default `<config dir>/alternate-futures/global.json`.
///
/// The file is re-read on every access; a missing or unreadable file reads
/// as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the per-user default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn default_location() -> Result<Self, CliError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("could not determine config directory".into()))?;
        Ok(Self::new(dir.join("alternate-futures").join("global.json")))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoredConfig {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return StoredConfig::default();
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring unreadable config file");
            StoredConfig::default()
        })
    }

    fn save(&self, config: &StoredConfig) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(config)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten files written by older versions.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(contents.as_bytes())?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut StoredConfig)) -> Result<(), CliError> {
        let mut config = self.load();
        f(&mut config);
        self.save(&config)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: ConfigKey) -> Option<String> {
        self.load().value(key).cloned()
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), CliError> {
        self.update(|config| *config.slot(key) = Some(value.to_string()))
    }

    fn clear(&self, key: ConfigKey) -> Result<(), CliError> {
        self.update(|config| *config.slot(key) = None)
    }

    fn clear_all(&self) -> Result<(), CliError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<ConfigKey, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .insert(ConfigKey::PersonalAccessToken, token.to_string());
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: ConfigKey) -> Option<String> {
        self.values.lock().get(&key).cloned()
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<(), CliError> {
        self.values.lock().insert(key, value.to_string());
        Ok(())
    }

    fn clear(&self, key: ConfigKey) -> Result<(), CliError> {
        self.values.lock().remove(&key);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), CliError> {
        self.values.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(secrets: Secrets) -> (Arc<MemoryStore>, Config) {
        let store = Arc::new(MemoryStore::new());
        let config = Config::new(store.clone(), secrets);
        (store, config)
    }

    #[test]
    fn secrets_override_store() {
        let (store, config) = memory_config(Secrets {
            token: Some("env-token".into()),
            project_id: None,
        });
        store.set(ConfigKey::PersonalAccessToken, "stored").expect("set");
        store.set(ConfigKey::ProjectId, "proj_stored").expect("set");

        let creds = config.credentials();
        assert_eq!(creds.personal_access_token.as_deref(), Some("env-token"));
        assert_eq!(creds.project_id.as_deref(), Some("proj_stored"));
        assert!(config.token_overridden());
    }

    #[test]
    fn new_token_clears_project() {
        let (store, config) = memory_config(Secrets::default());
        store.set(ConfigKey::ProjectId, "proj_old").expect("set project");

        config.store_personal_access_token("pat_new").expect("store");

        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("pat_new"));
        assert!(store.get(ConfigKey::ProjectId).is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let (store, config) = memory_config(Secrets::default());
        config.store_personal_access_token("pat").expect("store");
        store.set(ConfigKey::ProjectId, "proj").expect("set project");

        config.clear().expect("clear");
        assert_eq!(config.credentials(), Credentials::default());
    }

    #[test]
    fn credentials_debug_redacts_token() {
        let creds = Credentials {
            personal_access_token: Some("very-secret".into()),
            project_id: None,
        };
        assert!(!format!("{creds:?}").contains("very-secret"));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("global.json");

        {
            let store = FileStore::new(&path);
            store.set(ConfigKey::PersonalAccessToken, "pat_file").expect("set");
            store.set(ConfigKey::ProjectId, "proj_file").expect("set");
        }

        let store = FileStore::new(&path);
        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("pat_file"));
        assert_eq!(store.get(ConfigKey::ProjectId).as_deref(), Some("proj_file"));

        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"personalAccessToken\""));
        assert!(raw.contains("\"projectId\""));
    }

    #[test]
    fn file_store_clear_key_and_all() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("global.json"));

        store.set(ConfigKey::PersonalAccessToken, "pat").expect("set");
        store.set(ConfigKey::ProjectId, "proj").expect("set");
        store.clear(ConfigKey::ProjectId).expect("clear");
        assert!(store.get(ConfigKey::ProjectId).is_none());
        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("pat"));

        store.clear_all().expect("clear all");
        assert!(!store.path().exists());
        assert!(store.get(ConfigKey::PersonalAccessToken).is_none());
        store.clear_all().expect("clear all twice");
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("global.json");
        std::fs::write(&path, "{not json").expect("write");

        let store = FileStore::new(&path);
        assert!(store.get(ConfigKey::PersonalAccessToken).is_none());
        store.set(ConfigKey::PersonalAccessToken, "pat").expect("set overwrites");
        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("pat"));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("global.json"));
        store.set(ConfigKey::PersonalAccessToken, "pat").expect("set");

        let mode = std::fs::metadata(store.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("global.json");
        std::fs::write(&path, "{}").expect("seed");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).expect("chmod");

        let store = FileStore::new(path.clone());
        store.set(ConfigKey::PersonalAccessToken, "pat").expect("set");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get(ConfigKey::PersonalAccessToken).as_deref(), Some("pat"));
    }
}
