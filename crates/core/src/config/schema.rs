//! Configuration schema definitions
//!
//! Every section and field has a default, so an empty `aarpub.toml` (or no
//! file at all) describes the conventional Android library layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Android project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Root of the Gradle project
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Library module directory, relative to the root
    #[serde(default = "default_module")]
    pub module: String,

    /// Build script, relative to the module directory
    #[serde(default = "default_build_script")]
    pub build_script: String,

    /// Version catalog, relative to the root
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Gradle properties file, relative to the root
    #[serde(default = "default_properties_file")]
    pub properties_file: PathBuf,

    /// Dependency configurations whose entries are published as runtime
    #[serde(default = "default_configurations")]
    pub configurations: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            module: default_module(),
            build_script: default_build_script(),
            catalog: default_catalog(),
            properties_file: default_properties_file(),
            configurations: default_configurations(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_module() -> String {
    "samplelib".to_string()
}

fn default_build_script() -> String {
    "build.gradle.kts".to_string()
}

fn default_catalog() -> PathBuf {
    PathBuf::from("gradle/libs.versions.toml")
}

fn default_properties_file() -> PathBuf {
    PathBuf::from("gradle.properties")
}

fn default_configurations() -> Vec<String> {
    vec!["implementation".to_string()]
}

/// Which credential layers are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SecretsProfile {
    /// Secrets file first, then the process environment
    #[default]
    Layered,
    /// Process environment only
    EnvOnly,
}

/// Credential resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default)]
    pub profile: SecretsProfile,

    /// Secrets file, relative to the project root
    #[serde(default = "default_secrets_file")]
    pub file: PathBuf,

    /// Key holding the repository identity
    #[serde(default = "default_identity_key")]
    pub identity_key: String,

    /// Key holding the repository token
    #[serde(default = "default_token_key")]
    pub token_key: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            profile: SecretsProfile::default(),
            file: default_secrets_file(),
            identity_key: default_identity_key(),
            token_key: default_token_key(),
        }
    }
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_identity_key() -> String {
    "GITHUB_USERNAME".to_string()
}

fn default_token_key() -> String {
    "GITHUB_TOKEN".to_string()
}

/// Publishing target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Display name of the target repository
    #[serde(default = "default_repository_name")]
    pub repository_name: String,

    /// Overrides `github.maven.url` from the Gradle properties
    #[serde(default)]
    pub repository_url: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repository_name: default_repository_name(),
            repository_url: None,
        }
    }
}

fn default_repository_name() -> String {
    "GitHubPackages".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
