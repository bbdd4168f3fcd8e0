//! Manifest synthesis
//!
//! Turns declared runtime dependencies into manifest entries. A declaration
//! takes part only when both its group and its version are known; everything
//! else is dropped without error. Entry order follows declaration order so
//! published metadata is reproducible.

use serde::{Deserialize, Serialize};

/// Scope tag attached to every synthesized entry
pub const RUNTIME_SCOPE: &str = "runtime";

/// One declared library dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    pub group: Option<String>,
    pub artifact: String,
    pub version: Option<String>,
    /// Configuration the dependency was declared under, e.g. `implementation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
}

impl DependencyDeclaration {
    pub fn new(
        group: Option<impl Into<String>>,
        artifact: impl Into<String>,
        version: Option<impl Into<String>>,
    ) -> Self {
        Self {
            group: group.map(Into::into),
            artifact: artifact.into(),
            version: version.map(Into::into),
            configuration: None,
        }
    }

    /// Tag the configuration the declaration came from
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Whether the declaration carries both group and version
    pub fn is_complete(&self) -> bool {
        self.group.is_some() && self.version.is_some()
    }

    /// Parse `group:artifact[:version]` notation
    ///
    /// Empty segments count as absent. Returns `None` when there is no `:`.
    pub fn from_notation(notation: &str) -> Option<Self> {
        let mut parts = notation.trim().splitn(3, ':');
        let group = parts.next()?;
        let artifact = parts.next()?;
        let version = parts.next();

        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };

        Some(Self {
            group: non_empty(group),
            artifact: artifact.trim().to_string(),
            version: version.and_then(non_empty),
            configuration: None,
        })
    }
}

/// A dependency as it appears in published metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub scope: String,
}

impl ManifestEntry {
    fn from_declaration(decl: &DependencyDeclaration) -> Option<Self> {
        let group = decl.group.as_ref()?;
        let version = decl.version.as_ref()?;
        Some(Self {
            group: group.clone(),
            artifact: decl.artifact.clone(),
            version: version.clone(),
            scope: RUNTIME_SCOPE.to_string(),
        })
    }

    /// `group:artifact:version`
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Project complete declarations into runtime manifest entries, in order
pub fn synthesize(declarations: &[DependencyDeclaration]) -> Vec<ManifestEntry> {
    let entries: Vec<ManifestEntry> = declarations
        .iter()
        .filter_map(ManifestEntry::from_declaration)
        .collect();

    tracing::debug!(
        declared = declarations.len(),
        emitted = entries.len(),
        "Synthesized manifest"
    );
    entries
}
