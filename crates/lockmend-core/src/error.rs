use crate::semver::{ParseError, Version};
use crate::yarn::lockfile::LockfileError;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lockmend operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid version or range: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Lockfile(#[from] LockfileError),

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot deserialize audit report: {0}")]
    AuditParse(#[source] serde_json::Error),

    #[error("Unsupported yarn version: {0}")]
    UnsupportedYarn(Version),

    #[error("Package not found in yarn.lock: {name}")]
    PackageNotFound { name: String },
}

impl Error {
    #[must_use]
    pub fn package_not_found(name: &str) -> Self {
        Self::PackageNotFound {
            name: name.to_string(),
        }
    }
}
