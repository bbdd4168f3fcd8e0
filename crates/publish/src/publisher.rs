//! Publisher seam
//!
//! A [`Publisher`] takes a finished descriptor plus the built artifact and
//! performs the upload. Network transports live outside this crate; the
//! in-tree implementations cover dry runs and file-system repositories.

use crate::descriptor::PublishDescriptor;
use crate::pom::render_pom;
use aarpub_core::error::{Error, Result, ResultExt};
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a publish call
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub package: String,
    pub repository: String,
    pub dry_run: bool,
    /// Files written, or that would be written, relative to the repository root
    pub files: Vec<PathBuf>,
}

/// Accepts a finished descriptor and an artifact path and performs the upload
pub trait Publisher {
    fn publish(&self, descriptor: &PublishDescriptor, artifact: &Path) -> Result<PublishReport>;
}

/// Choose an in-tree publisher for a repository URL
pub fn publisher_for(url: &str, dry_run: bool) -> Result<Box<dyn Publisher>> {
    if dry_run {
        return Ok(Box::new(DryRunPublisher));
    }
    Ok(Box::new(LocalRepositoryPublisher::from_url(url)?))
}

fn ensure_artifact(artifact: &Path) -> Result<()> {
    if artifact.is_file() {
        Ok(())
    } else {
        Err(Error::artifact_not_found(artifact))
    }
}

fn write_file(target: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(target, bytes)
        .map_err(|e| Error::publish(format!("Cannot write {}", target.display())).with_source(e))
}

fn planned_files(descriptor: &PublishDescriptor) -> Vec<PathBuf> {
    let dir = descriptor.coordinates.repository_dir();
    let stem = descriptor.coordinates.file_stem();
    ["aar", "pom"]
        .iter()
        .flat_map(|ext| {
            let base = format!("{stem}.{ext}");
            [
                dir.join(&base),
                dir.join(format!("{base}.sha1")),
                dir.join(format!("{base}.sha256")),
            ]
        })
        .collect()
}

/// Reports what would be published without writing anything
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunPublisher;

impl Publisher for DryRunPublisher {
    fn publish(&self, descriptor: &PublishDescriptor, artifact: &Path) -> Result<PublishReport> {
        ensure_artifact(artifact)?;

        if let Err(err) = descriptor.credentials.require() {
            warn!(error = %err.message, "Credentials incomplete; a real upload would fail");
        }

        Ok(PublishReport {
            package: descriptor.coordinates.to_string(),
            repository: descriptor.repository.url.clone(),
            dry_run: true,
            files: planned_files(descriptor),
        })
    }
}

/// Writes a Maven repository layout to a local directory
#[derive(Debug, Clone)]
pub struct LocalRepositoryPublisher {
    root: PathBuf,
}

impl LocalRepositoryPublisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Accepts `file://` URLs and bare paths; remote schemes are refused
    pub fn from_url(url: &str) -> Result<Self> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(Self::new(path));
        }
        if url.contains("://") {
            return Err(Error::unsupported_transport(url));
        }
        Ok(Self::new(url))
    }

    fn write_with_checksums(&self, relative: &Path, bytes: &[u8]) -> Result<Vec<PathBuf>> {
        let target = self.root.join(relative);
        write_file(&target, bytes)?;

        let mut written = vec![relative.to_path_buf()];
        for (ext, digest) in [
            ("sha1", hex::encode(Sha1::digest(bytes))),
            ("sha256", hex::encode(Sha256::digest(bytes))),
        ] {
            let mut name = relative.as_os_str().to_owned();
            name.push(format!(".{ext}"));
            let checksum = PathBuf::from(name);
            write_file(&self.root.join(&checksum), digest.as_bytes())?;
            written.push(checksum);
        }
        Ok(written)
    }
}

impl Publisher for LocalRepositoryPublisher {
    fn publish(&self, descriptor: &PublishDescriptor, artifact: &Path) -> Result<PublishReport> {
        ensure_artifact(artifact)?;

        let coords = &descriptor.coordinates;
        let dir = coords.repository_dir();
        let target_dir = self.root.join(&dir);
        std::fs::create_dir_all(&target_dir).map_err(|e| {
            Error::publish(format!("Cannot create {}", target_dir.display())).with_source(e)
        })?;

        let stem = coords.file_stem();
        let aar_bytes = std::fs::read(artifact)
            .map_err(Error::from)
            .context(format!("Failed to read {}", artifact.display()))?;
        let pom = render_pom(coords, &descriptor.dependencies);

        let mut files = self.write_with_checksums(&dir.join(format!("{stem}.aar")), &aar_bytes)?;
        files.extend(self.write_with_checksums(&dir.join(format!("{stem}.pom")), pom.as_bytes())?);

        info!(
            package = %coords,
            root = %self.root.display(),
            files = files.len(),
            "Published to local repository"
        );

        Ok(PublishReport {
            package: coords.to_string(),
            repository: self.root.display().to_string(),
            dry_run: false,
            files,
        })
    }
}
