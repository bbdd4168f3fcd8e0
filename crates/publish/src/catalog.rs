//! Gradle version catalog (`gradle/libs.versions.toml`)
//!
//! Resolves `libs.<alias>` accessors to dependency declarations. Catalog
//! entries that cannot be fully resolved (no version, dangling `version.ref`)
//! still produce a declaration; the manifest filter decides what to do with
//! them.

use crate::manifest::DependencyDeclaration;
use aarpub_core::error::{Error, ErrorCode, Result, ResultExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    versions: BTreeMap<String, VersionSpec>,
    #[serde(default)]
    libraries: BTreeMap<String, LibrarySpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VersionSpec {
    Plain(String),
    Table(VersionTable),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VersionTable {
    #[serde(rename = "ref")]
    reference: Option<String>,
    strictly: Option<String>,
    require: Option<String>,
    prefer: Option<String>,
}

impl VersionTable {
    fn rich(&self) -> Option<&str> {
        self.strictly
            .as_deref()
            .or(self.require.as_deref())
            .or(self.prefer.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LibrarySpec {
    Notation(String),
    Table(LibraryTable),
}

#[derive(Debug, Clone, Deserialize)]
struct LibraryTable {
    module: Option<String>,
    group: Option<String>,
    name: Option<String>,
    version: Option<VersionSpec>,
}

/// Parsed version catalog
#[derive(Debug, Default)]
pub struct VersionCatalog {
    versions: BTreeMap<String, VersionSpec>,
    libraries: BTreeMap<String, LibrarySpec>,
}

impl VersionCatalog {
    /// Parse catalog TOML
    pub fn parse(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| {
            Error::new(ErrorCode::CatalogParseError, format!("Invalid version catalog: {}", e))
                .with_source(e)
        })?;
        Ok(Self {
            versions: file.versions,
            libraries: file.libraries,
        })
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(Error::from)
            .context(format!("Failed to read version catalog {}", path.display()))?;
        Self::parse(&text).context(format!("In {}", path.display()))
    }

    /// Read a catalog, treating a missing file as an empty catalog
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No version catalog");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Number of library aliases
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Whether the catalog declares no libraries
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Resolve an accessor such as `jackson.databind` (with or without a
    /// leading `libs.`) to a declaration
    pub fn resolve(&self, accessor: &str) -> Option<DependencyDeclaration> {
        let wanted = normalize_alias(accessor.strip_prefix("libs.").unwrap_or(accessor));
        let spec = self
            .libraries
            .iter()
            .find(|(alias, _)| normalize_alias(alias) == wanted)
            .map(|(_, spec)| spec)?;
        Some(self.declaration_for(spec))
    }

    fn declaration_for(&self, spec: &LibrarySpec) -> DependencyDeclaration {
        match spec {
            LibrarySpec::Notation(notation) => DependencyDeclaration::from_notation(notation)
                .unwrap_or_else(|| DependencyDeclaration::new(None::<String>, notation.clone(), None::<String>)),
            LibrarySpec::Table(table) => {
                let (group, name) = match &table.module {
                    Some(module) => match module.split_once(':') {
                        Some((g, n)) => (Some(g.to_string()), n.to_string()),
                        None => (None, module.clone()),
                    },
                    None => (table.group.clone(), table.name.clone().unwrap_or_default()),
                };
                let version = table.version.as_ref().and_then(|v| self.version_of(v));
                DependencyDeclaration::new(group, name, version)
            }
        }
    }

    fn version_of(&self, spec: &VersionSpec) -> Option<String> {
        match spec {
            VersionSpec::Plain(v) => Some(v.clone()),
            VersionSpec::Table(table) => match &table.reference {
                Some(name) => match self.versions.get(name) {
                    // A [versions] entry is never itself a reference
                    Some(VersionSpec::Plain(v)) => Some(v.clone()),
                    Some(VersionSpec::Table(t)) => t.rich().map(str::to_string),
                    None => {
                        tracing::warn!(reference = %name, "version.ref points at an undefined version");
                        None
                    }
                },
                None => table.rich().map(str::to_string),
            },
        }
    }
}

/// Gradle treats `-`, `_` and `.` in aliases as the same separator
fn normalize_alias(alias: &str) -> String {
    alias
        .chars()
        .map(|c| if matches!(c, '-' | '_') { '.' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[versions]
jackson = "2.17.1"
okhttp = { strictly = "4.12.0" }

[libraries]
jackson-databind = { module = "com.fasterxml.jackson.core:jackson-databind", version.ref = "jackson" }
jackson_annotations = { group = "com.fasterxml.jackson.core", name = "jackson-annotations", version.ref = "jackson" }
jackson-core = "com.fasterxml.jackson.core:jackson-core:2.17.1"
okhttp = { module = "com.squareup.okhttp3:okhttp", version.ref = "okhttp" }
bom-managed = { module = "com.example:managed" }
dangling = { module = "com.example:dangling", version.ref = "missing" }
rich = { module = "com.example:rich", version = { require = "1.0", prefer = "1.2" } }
"#;

    fn catalog() -> VersionCatalog {
        VersionCatalog::parse(CATALOG).unwrap()
    }

    #[test]
    fn test_module_with_version_ref() {
        let decl = catalog().resolve("libs.jackson.databind").unwrap();
        assert_eq!(decl.group.as_deref(), Some("com.fasterxml.jackson.core"));
        assert_eq!(decl.artifact, "jackson-databind");
        assert_eq!(decl.version.as_deref(), Some("2.17.1"));
    }

    #[test]
    fn test_group_and_name_form() {
        let decl = catalog().resolve("jackson.annotations").unwrap();
        assert_eq!(decl.artifact, "jackson-annotations");
        assert_eq!(decl.version.as_deref(), Some("2.17.1"));
    }

    #[test]
    fn test_string_notation() {
        let decl = catalog().resolve("libs.jackson.core").unwrap();
        assert_eq!(decl.artifact, "jackson-core");
        assert_eq!(decl.version.as_deref(), Some("2.17.1"));
    }

    #[test]
    fn test_rich_versions() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve("okhttp").unwrap().version.as_deref(),
            Some("4.12.0")
        );
        assert_eq!(catalog.resolve("rich").unwrap().version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_unresolved_versions_are_absent() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("bom.managed").unwrap().version, None);
        assert_eq!(catalog.resolve("dangling").unwrap().version, None);
    }

    #[test]
    fn test_unknown_alias() {
        assert!(catalog().resolve("libs.retrofit").is_none());
    }

    #[test]
    fn test_invalid_toml_is_catalog_error() {
        let err = VersionCatalog::parse("[libraries\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogParseError);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let catalog = VersionCatalog::load_optional(&temp_dir.path().join("libs.versions.toml")).unwrap();
        assert!(catalog.is_empty());
    }
}
