//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist; otherwise the standard locations are
    /// searched and defaults are used when none is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let schema = match &config_path {
            Some(p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate()?;

        tracing::debug!(path = ?config.path, "Configuration loaded");
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = Self {
            schema: toml::from_str(text)?,
            path: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that parse but cannot drive a publish
    fn validate(&self) -> Result<()> {
        let configurations = &self.schema.project.configurations;
        if configurations.is_empty() || configurations.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::config(
                "[project].configurations must list at least one non-empty configuration name",
            )
            .with_suggestion("Use configurations = [\"implementation\"]"));
        }
        Ok(())
    }

    /// Absolute-or-relative path of the project root
    pub fn project_root(&self) -> &Path {
        &self.schema.project.root
    }

    /// Library module directory
    pub fn module_dir(&self) -> PathBuf {
        self.project_root().join(&self.schema.project.module)
    }

    /// Module build script
    pub fn build_script_path(&self) -> PathBuf {
        self.module_dir().join(&self.schema.project.build_script)
    }

    /// Version catalog file
    pub fn catalog_path(&self) -> PathBuf {
        self.project_root().join(&self.schema.project.catalog)
    }

    /// Gradle properties file
    pub fn properties_path(&self) -> PathBuf {
        self.project_root().join(&self.schema.project.properties_file)
    }

    /// Secrets file
    pub fn secrets_path(&self) -> PathBuf {
        self.project_root().join(&self.schema.secrets.file)
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".aarpub.toml", "aarpub.toml", ".config/aarpub.toml"];

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}
