//! Publish descriptor assembly
//!
//! Resolve credentials, synthesize the manifest, and combine both with the
//! package coordinates, repository and artifact path. No state outlives the
//! returned descriptor.

use crate::build_script::BuildScriptReader;
use crate::catalog::VersionCatalog;
use crate::coordinates::{BuildProperties, PackageCoordinates};
use crate::manifest::{synthesize, DependencyDeclaration, ManifestEntry};
use crate::secrets::{CredentialKeys, Credentials, SecretResolver};
use aarpub_core::config::Config;
use aarpub_core::error::{Result, ResultExt};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Target Maven repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
}

/// Everything handed to a publisher
#[derive(Debug, Clone, Serialize)]
pub struct PublishDescriptor {
    pub coordinates: PackageCoordinates,
    pub repository: Repository,
    pub credentials: Credentials,
    pub artifact_path: PathBuf,
    pub dependencies: Vec<ManifestEntry>,
}

/// Statically known inputs supplied by the build
#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub coordinates: PackageCoordinates,
    pub repository: Repository,
    pub declarations: Vec<DependencyDeclaration>,
    pub artifact_path: PathBuf,
}

impl BuildInputs {
    /// Read coordinates, repository and declared dependencies from a project checkout
    pub fn load(config: &Config) -> Result<Self> {
        let properties_path = config.properties_path();
        let build = BuildProperties::load(&properties_path)
            .context("While reading package coordinates")?;

        let catalog = VersionCatalog::load_optional(&config.catalog_path())?;
        let reader = BuildScriptReader::new(&catalog, &config.schema.project.configurations);
        let declarations = reader.read(&config.build_script_path())?;

        let url = config
            .schema
            .publish
            .repository_url
            .clone()
            .unwrap_or_else(|| build.repository_url.clone());

        Ok(Self {
            artifact_path: build.artifact_path(&config.module_dir()),
            coordinates: build.coordinates,
            repository: Repository {
                name: config.schema.publish.repository_name.clone(),
                url,
            },
            declarations,
        })
    }
}

/// Combine credentials, manifest and build inputs
pub fn assemble(
    resolver: &SecretResolver,
    keys: &CredentialKeys,
    inputs: BuildInputs,
) -> PublishDescriptor {
    let credentials = resolver.resolve_credentials(keys);
    let dependencies = synthesize(&inputs.declarations);

    info!(
        package = %inputs.coordinates,
        repository = %inputs.repository.url,
        dependencies = dependencies.len(),
        credentials_complete = credentials.is_complete(),
        "Assembled publish descriptor"
    );

    PublishDescriptor {
        coordinates: inputs.coordinates,
        repository: inputs.repository,
        credentials,
        artifact_path: inputs.artifact_path,
        dependencies,
    }
}

/// Assemble a descriptor for the project described by `config`
pub fn assemble_from_config(config: &Config) -> Result<PublishDescriptor> {
    let inputs = BuildInputs::load(config)?;
    let resolver = SecretResolver::from_config(config);
    Ok(assemble(&resolver, &CredentialKeys::from_config(config), inputs))
}
