//! Publishing Android library packages to Maven repositories
//!
//! This crate provides:
//! - Layered credential resolution (secrets file, then environment)
//! - Runtime dependency manifest synthesis
//! - Readers for `gradle.properties`, the version catalog and module build scripts
//! - Publish descriptor assembly and POM rendering
//! - The publisher seam, with dry-run and local repository implementations

pub mod build_script;
pub mod catalog;
pub mod coordinates;
pub mod descriptor;
pub mod gradle;
pub mod manifest;
pub mod pom;
pub mod publisher;
pub mod secrets;

pub use coordinates::PackageCoordinates;
pub use descriptor::{assemble, assemble_from_config, BuildInputs, PublishDescriptor, Repository};
pub use manifest::{synthesize, DependencyDeclaration, ManifestEntry};
pub use publisher::{publisher_for, Publisher, PublishReport};
pub use secrets::{CredentialKeys, Credentials, SecretResolver, SecretSource};
