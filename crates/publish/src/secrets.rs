//! Layered secret resolution
//!
//! Credentials are looked up in an ordered list of sources. The first source
//! that has a value for the key wins; later sources are not consulted. A key
//! found nowhere resolves to `None`, which is never an error here. Publishers
//! decide at use time whether an absent credential is fatal.

use aarpub_core::config::{Config, SecretsProfile};
use aarpub_core::error::{Error, Result};
use aarpub_core::properties::Properties;
use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key/value file loaded on first lookup
///
/// A missing or unreadable file behaves as an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: OnceCell<Properties>,
}

impl FileStore {
    /// Create a store backed by `path`; nothing is read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: OnceCell::new(),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been read
    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Look up a key, reading the file on first use
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).map(str::to_string)
    }

    fn entries(&self) -> &Properties {
        self.entries.get_or_init(|| match Properties::load_optional(&self.path) {
            Ok(props) => {
                debug!(path = %self.path.display(), count = props.len(), "Loaded secrets file");
                props
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Ignoring unreadable secrets file");
                Properties::new()
            }
        })
    }
}

/// One layer of the lookup chain
#[derive(Debug)]
pub enum SecretSource {
    /// `key=value` file, loaded lazily
    File(FileStore),
    /// The process environment
    Environment,
    /// Fixed values, for injected environments
    Fixed(HashMap<String, String>),
}

impl SecretSource {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Environment => "environment",
            Self::Fixed(_) => "fixed",
        }
    }

    /// Value for `key` in this layer, if any
    pub fn lookup(&self, key: &str) -> Option<String> {
        match self {
            Self::File(store) => store.get(key),
            // Non-UTF-8 values count as unset
            Self::Environment => std::env::var(key).ok(),
            Self::Fixed(values) => values.get(key).cloned(),
        }
    }
}

/// Ordered chain of secret sources
#[derive(Debug)]
pub struct SecretResolver {
    sources: Vec<SecretSource>,
}

impl SecretResolver {
    /// Resolver over an explicit list of sources, highest priority first
    pub fn new(sources: Vec<SecretSource>) -> Self {
        Self { sources }
    }

    /// Secrets file first, then the process environment
    pub fn layered(secrets_file: impl Into<PathBuf>) -> Self {
        Self::new(vec![
            SecretSource::File(FileStore::new(secrets_file)),
            SecretSource::Environment,
        ])
    }

    /// Process environment only
    pub fn env_only() -> Self {
        Self::new(vec![SecretSource::Environment])
    }

    /// Build the resolver selected by the configured profile
    pub fn from_config(config: &Config) -> Self {
        match config.schema.secrets.profile {
            SecretsProfile::Layered => Self::layered(config.secrets_path()),
            SecretsProfile::EnvOnly => Self::env_only(),
        }
    }

    /// Sources in lookup order
    pub fn sources(&self) -> &[SecretSource] {
        &self.sources
    }

    /// Resolve a key against the chain
    pub fn resolve(&self, key: &str) -> Option<String> {
        for source in &self.sources {
            if let Some(value) = source.lookup(key) {
                debug!(key, source = source.name(), "Secret resolved");
                return Some(value);
            }
        }
        debug!(key, "Secret not found in any source");
        None
    }

    /// Resolve the identity and token pair
    pub fn resolve_credentials(&self, keys: &CredentialKeys) -> Credentials {
        Credentials {
            identity_key: keys.identity.clone(),
            token_key: keys.token.clone(),
            identity: self.resolve(&keys.identity),
            token: self.resolve(&keys.token),
        }
    }
}

/// Names of the two credential keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeys {
    pub identity: String,
    pub token: String,
}

impl CredentialKeys {
    pub fn new(identity: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.schema.secrets.identity_key.clone(),
            config.schema.secrets.token_key.clone(),
        )
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self::new("GITHUB_USERNAME", "GITHUB_TOKEN")
    }
}

/// Resolved repository credentials
///
/// The token never appears in `Debug` output or serialized reports.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub identity_key: String,
    pub token_key: String,
    pub identity: Option<String>,
    #[serde(rename = "token", serialize_with = "serialize_redacted")]
    pub token: Option<String>,
}

impl Credentials {
    /// Identity and token, or a missing-credentials error naming the first absent key
    pub fn require(&self) -> Result<(&str, &str)> {
        let identity = self
            .identity
            .as_deref()
            .ok_or_else(|| Error::missing_credentials(&self.identity_key))?;
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| Error::missing_credentials(&self.token_key))?;
        Ok((identity, token))
    }

    /// Whether both values resolved
    pub fn is_complete(&self) -> bool {
        self.identity.is_some() && self.token.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity_key", &self.identity_key)
            .field("token_key", &self.token_key)
            .field("identity", &self.identity)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn serialize_redacted<S: Serializer>(
    token: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    token.as_ref().map(|_| "<redacted>").serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarpub_core::error::ErrorCode;
    use tempfile::TempDir;

    fn fixed(pairs: &[(&str, &str)]) -> SecretSource {
        SecretSource::Fixed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn secrets_file(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        std::fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_file_value_wins_over_environment() {
        let (_dir, path) = secrets_file("GITHUB_TOKEN=abc123\n");
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(path)),
            fixed(&[("GITHUB_TOKEN", "xyz789")]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_TOKEN").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_falls_back_to_environment_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(temp_dir.path().join(".env"))),
            fixed(&[("GITHUB_USERNAME", "bob")]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_USERNAME").as_deref(), Some("bob"));
    }

    #[test]
    fn test_falls_back_when_key_absent_from_file() {
        let (_dir, path) = secrets_file("OTHER=1\n");
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(path)),
            fixed(&[("GITHUB_USERNAME", "bob")]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_USERNAME").as_deref(), Some("bob"));
    }

    #[test]
    fn test_absent_everywhere_is_none() {
        let (_dir, path) = secrets_file("OTHER=1\n");
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(path)),
            fixed(&[]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_TOKEN"), None);
    }

    #[test]
    fn test_empty_file_value_still_wins() {
        let (_dir, path) = secrets_file("GITHUB_TOKEN=\n");
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(path)),
            fixed(&[("GITHUB_TOKEN", "xyz789")]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_TOKEN").as_deref(), Some(""));
    }

    #[test]
    fn test_file_is_read_once() {
        let (_dir, path) = secrets_file("GITHUB_TOKEN=abc123\n");
        let store = FileStore::new(&path);
        assert!(!store.is_loaded());

        assert_eq!(store.get("GITHUB_TOKEN").as_deref(), Some("abc123"));
        assert!(store.is_loaded());

        std::fs::write(&path, "GITHUB_TOKEN=changed\n").unwrap();
        assert_eq!(store.get("GITHUB_TOKEN").as_deref(), Some("abc123"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (_dir, path) = secrets_file("GITHUB_USERNAME=alice\n");
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(path)),
            fixed(&[("GITHUB_TOKEN", "xyz789")]),
        ]);

        for key in ["GITHUB_USERNAME", "GITHUB_TOKEN", "MISSING"] {
            assert_eq!(resolver.resolve(key), resolver.resolve(key));
        }
    }

    #[test]
    fn test_unreadable_file_is_empty_layer() {
        // A directory where the file should be fails to read but must not error
        let temp_dir = TempDir::new().unwrap();
        let resolver = SecretResolver::new(vec![
            SecretSource::File(FileStore::new(temp_dir.path())),
            fixed(&[("GITHUB_TOKEN", "xyz789")]),
        ]);

        assert_eq!(resolver.resolve("GITHUB_TOKEN").as_deref(), Some("xyz789"));
    }

    #[test]
    fn test_process_environment_layer() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = SecretResolver::layered(temp_dir.path().join(".env"));

        temp_env::with_var("AARPUB_TEST_USERNAME", Some("bob"), || {
            assert_eq!(
                resolver.resolve("AARPUB_TEST_USERNAME").as_deref(),
                Some("bob")
            );
        });
        temp_env::with_var_unset("AARPUB_TEST_USERNAME", || {
            assert_eq!(resolver.resolve("AARPUB_TEST_USERNAME"), None);
        });
    }

    #[test]
    fn test_layered_file_beats_process_environment() {
        let (_dir, path) = secrets_file("AARPUB_TEST_TOKEN=abc123\n");
        let resolver = SecretResolver::layered(path);

        temp_env::with_var("AARPUB_TEST_TOKEN", Some("xyz789"), || {
            assert_eq!(
                resolver.resolve("AARPUB_TEST_TOKEN").as_deref(),
                Some("abc123")
            );
        });
    }

    #[test]
    fn test_env_only_ignores_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".env"), "AARPUB_TEST_ENV_ONLY=file\n").unwrap();
        let config = Config::from_toml(&format!(
            "[project]\nroot = {:?}\n[secrets]\nprofile = \"env-only\"\n",
            temp_dir.path().display().to_string()
        ))
        .unwrap();
        let resolver = SecretResolver::from_config(&config);

        assert_eq!(resolver.sources().len(), 1);
        temp_env::with_var("AARPUB_TEST_ENV_ONLY", Some("env"), || {
            assert_eq!(resolver.resolve("AARPUB_TEST_ENV_ONLY").as_deref(), Some("env"));
        });
    }

    #[test]
    fn test_credentials_require() {
        let resolver = SecretResolver::new(vec![fixed(&[("GITHUB_USERNAME", "bob")])]);
        let creds = resolver.resolve_credentials(&CredentialKeys::default());

        assert!(!creds.is_complete());
        let err = creds.require().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingCredentials);
        assert!(err.message.contains("GITHUB_TOKEN"));

        let resolver = SecretResolver::new(vec![fixed(&[
            ("GITHUB_USERNAME", "bob"),
            ("GITHUB_TOKEN", "abc123"),
        ])]);
        let creds = resolver.resolve_credentials(&CredentialKeys::default());
        assert_eq!(creds.require().unwrap(), ("bob", "abc123"));
    }

    #[test]
    fn test_token_is_redacted() {
        let resolver = SecretResolver::new(vec![fixed(&[
            ("GITHUB_USERNAME", "bob"),
            ("GITHUB_TOKEN", "abc123"),
        ])]);
        let creds = resolver.resolve_credentials(&CredentialKeys::default());

        let debug = format!("{:?}", creds);
        let json = serde_json::to_string(&creds).unwrap();
        assert!(!debug.contains("abc123"));
        assert!(!json.contains("abc123"));
        assert!(json.contains("<redacted>"));
        assert!(json.contains("bob"));
    }
}
