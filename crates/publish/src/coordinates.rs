//! Package coordinates from `gradle.properties`

use aarpub_core::error::{Error, Result, ResultExt};
use aarpub_core::properties::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const GROUP_KEY: &str = "lib.group";
pub const ARTIFACT_KEY: &str = "lib.artifact";
pub const VERSION_KEY: &str = "lib.version";
pub const NAME_KEY: &str = "lib.name";
pub const REPOSITORY_URL_KEY: &str = "github.maven.url";

/// Group, artifact and version of the package being published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCoordinates {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl PackageCoordinates {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Repository-relative directory, e.g. `com/fearth/samplelib/1.0.0`
    pub fn repository_dir(&self) -> PathBuf {
        let mut dir: PathBuf = self.group.split('.').collect();
        dir.push(&self.artifact);
        dir.push(&self.version);
        dir
    }

    /// Check that each part is usable as a repository path segment
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("group", &self.group),
            ("artifact", &self.artifact),
            ("version", &self.version),
        ] {
            if let Some(bad) = value
                .chars()
                .find(|c| c.is_whitespace() || matches!(*c, '/' | '\\' | ':'))
            {
                return Err(Error::validation(format!(
                    "Package {} '{}' contains invalid character {:?}",
                    label, value, bad
                )));
            }
        }
        if self.group.split('.').any(str::is_empty) || self.version.starts_with('.') {
            return Err(Error::validation(format!(
                "Package coordinates '{}' have an empty or relative path segment",
                self
            )));
        }
        Ok(())
    }

    /// `artifact-version`, the base name of published files
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.artifact, self.version)
    }
}

impl fmt::Display for PackageCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Everything the build descriptor supplies about the published package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProperties {
    pub coordinates: PackageCoordinates,
    /// Base name of the Gradle module output (`lib.name`)
    pub library_name: String,
    pub repository_url: String,
}

impl BuildProperties {
    /// Read the publishing keys out of parsed Gradle properties
    ///
    /// `source` only names the file in error messages.
    pub fn from_properties(props: &Properties, source: &Path) -> Result<Self> {
        let require = |key: &str| {
            props
                .get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::missing_property(key, source))
        };

        let coordinates = PackageCoordinates::new(
            require(GROUP_KEY)?,
            require(ARTIFACT_KEY)?,
            require(VERSION_KEY)?,
        );
        coordinates
            .validate()
            .with_suggestion(format!("Fix the lib.* entries in {}", source.display()))?;

        Ok(Self {
            coordinates,
            library_name: require(NAME_KEY)?,
            repository_url: require(REPOSITORY_URL_KEY)?,
        })
    }

    /// Load from a `gradle.properties` file
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_properties(&Properties::load(path)?, path)
    }

    /// Path of the release `.aar` Gradle produces for this module
    pub fn artifact_path(&self, module_dir: &Path) -> PathBuf {
        module_dir
            .join("build")
            .join("outputs")
            .join("aar")
            .join(format!("{}-release.aar", self.library_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aarpub_core::error::ErrorCode;

    const GRADLE_PROPERTIES: &str = "\
org.gradle.jvmargs=-Xmx2048m
lib.group=com.fearth.sample
lib.artifact=samplelib
lib.version=1.0.0
lib.name=samplelib
github.maven.url=https://maven.pkg.github.com/fearth/sample
";

    #[test]
    fn test_from_properties() {
        let props = Properties::parse(GRADLE_PROPERTIES);
        let build = BuildProperties::from_properties(&props, Path::new("gradle.properties")).unwrap();

        assert_eq!(build.coordinates.to_string(), "com.fearth.sample:samplelib:1.0.0");
        assert_eq!(build.library_name, "samplelib");
        assert_eq!(build.repository_url, "https://maven.pkg.github.com/fearth/sample");
    }

    #[test]
    fn test_missing_key_names_key() {
        let props = Properties::parse("lib.group=com.x\nlib.artifact=a\n");
        let err = BuildProperties::from_properties(&props, Path::new("gradle.properties")).unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingProperty);
        assert!(err.message.contains("lib.version"));
    }

    #[test]
    fn test_invalid_coordinates_are_validation_errors() {
        for bad in [
            "lib.group=com.x\nlib.artifact=sample lib\n",
            "lib.group=com..x\nlib.artifact=a\n",
            "lib.group=com.x\nlib.artifact=../a\n",
        ] {
            let text = format!("{bad}lib.version=1.0\nlib.name=a\ngithub.maven.url=file:///tmp/r\n");
            let props = Properties::parse(&text);
            let err = BuildProperties::from_properties(&props, Path::new("gradle.properties"))
                .unwrap_err();

            assert_eq!(err.code, ErrorCode::ValidationError, "{bad}");
            assert_eq!(err.exit_code(), aarpub_core::error::exit_codes::VALIDATION_ERROR);
            assert!(err.suggestion.is_some());
        }
    }

    #[test]
    fn test_artifact_path() {
        let props = Properties::parse(GRADLE_PROPERTIES);
        let build = BuildProperties::from_properties(&props, Path::new("gradle.properties")).unwrap();

        assert_eq!(
            build.artifact_path(Path::new("/work/samplelib")),
            PathBuf::from("/work/samplelib/build/outputs/aar/samplelib-release.aar")
        );
    }

    #[test]
    fn test_repository_dir() {
        let coords = PackageCoordinates::new("com.fearth.sample", "samplelib", "1.0.0");
        assert_eq!(
            coords.repository_dir(),
            PathBuf::from("com/fearth/sample/samplelib/1.0.0")
        );
        assert_eq!(coords.file_stem(), "samplelib-1.0.0");
    }
}
