//! `package.json` resolutions and their consistency with the lockfile.

use super::key;
use super::lockfile::Lockfile;
use crate::error::Error;
use crate::semver::{Range, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Manifest filename.
pub const MANIFEST_NAME: &str = "package.json";

/// The parts of `package.json` this tool reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resolutions: BTreeMap<String, String>,
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn read_from(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A `resolutions` key: `name`, `name@range` or `**/name@range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionKey {
    pub package: String,
    pub range: Option<String>,
}

impl ResolutionKey {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix("**/").unwrap_or(text);
        match key::package_name(text) {
            Some(package) => Self {
                package: package.to_string(),
                range: Some(text[package.len() + 1..].to_string()),
            },
            None => Self {
                package: text.to_string(),
                range: None,
            },
        }
    }
}

/// Something off about a declared resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionDiagnostic {
    /// A name-only resolution whose value is not an exact version.
    Unrestricted { key: String, value: String },
    /// A resolution no lockfile entry makes use of.
    Superfluous { key: String },
}

impl fmt::Display for ResolutionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted { key, value } => write!(
                f,
                "resolution \"{key}\": \"{value}\" applies to every request, pin an exact version or add a range to the key"
            ),
            Self::Superfluous { key } => {
                write!(f, "resolution \"{key}\" matches nothing in yarn.lock")
            }
        }
    }
}

/// Check every declared resolution against the lockfile.
#[must_use]
pub fn check_resolutions(manifest: &Manifest, lock: &Lockfile) -> Vec<ResolutionDiagnostic> {
    let mut diagnostics = Vec::new();

    for (declared, value) in &manifest.resolutions {
        let parsed = ResolutionKey::parse(declared);

        match &parsed.range {
            None => {
                if !pins_exact(value) {
                    diagnostics.push(ResolutionDiagnostic::Unrestricted {
                        key: declared.clone(),
                        value: value.clone(),
                    });
                }
                if !lock.contains_package(&parsed.package) {
                    diagnostics.push(ResolutionDiagnostic::Superfluous {
                        key: declared.clone(),
                    });
                }
            }
            Some(range) => {
                if !is_used(lock, &parsed.package, range) {
                    diagnostics.push(ResolutionDiagnostic::Superfluous {
                        key: declared.clone(),
                    });
                }
            }
        }
    }

    diagnostics
}

/// Whether a resolution value names exactly one version. Values using a
/// non-registry protocol are taken as pinned.
fn pins_exact(value: &str) -> bool {
    let value = value.strip_prefix("npm:").unwrap_or(value);
    if value.contains(':') {
        return true;
    }
    Range::parse(value).is_ok_and(|range| range.is_exact())
}

fn is_used(lock: &Lockfile, package: &str, declared: &str) -> bool {
    let declared_range = Range::parse(declared).ok();
    let view = lock.package_entries(package);

    view.by_specifier.iter().any(|(specifier, entry)| {
        if key::requested_range(specifier).as_deref() == Some(declared) {
            return true;
        }
        match (&declared_range, Version::parse(&entry.version)) {
            (Some(range), Ok(version)) => range.matches(&version),
            _ => false,
        }
    })
}
