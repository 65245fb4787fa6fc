//! Parsing `yarn npm audit --json --recursive` output.
//!
//! Two dialects exist. Yarn 2 and 3 print one document:
//!
//! ```json
//! {"advisories": {"1097678": {"module_name": "minimist",
//!   "vulnerable_versions": "<1.2.6", "patched_versions": ">=1.2.6"}}}
//! ```
//!
//! Yarn 4 prints one JSON object per line and never states the patched range:
//!
//! ```json
//! {"value": "minimist", "children": {"ID": 1097678, "Vulnerable Versions": "<1.2.6"}}
//! ```

use crate::error::Error;
use crate::semver::{Range, Version};
use serde::Deserialize;
use std::collections::BTreeMap;

const DEPRECATION_MARKER: &str = " (deprecation)";

/// One package known to be vulnerable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub package_name: String,
    pub still_vulnerable: Range,
    pub patched: Option<Range>,
}

impl Advisory {
    /// Versions that are safe to resolve to, or `None` when no release has
    /// been patched yet.
    #[must_use]
    pub fn safe_range(&self) -> Option<Range> {
        match &self.patched {
            Some(patched) => Some(patched.clone()),
            None => self.still_vulnerable.patches(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClassicAudit {
    #[serde(default)]
    advisories: BTreeMap<String, ClassicAdvisory>,
}

#[derive(Debug, Deserialize)]
struct ClassicAdvisory {
    module_name: String,
    #[serde(default = "any_version")]
    vulnerable_versions: String,
    #[serde(default)]
    patched_versions: Option<String>,
}

fn any_version() -> String {
    "*".to_string()
}

#[derive(Debug, Deserialize)]
struct ModernIssue {
    value: String,
    children: ModernChildren,
}

#[derive(Debug, Deserialize)]
struct ModernChildren {
    #[serde(rename = "ID", default)]
    id: serde_json::Value,
    #[serde(rename = "Vulnerable Versions")]
    vulnerable_versions: String,
}

/// Parse audit output in the dialect of the given yarn version.
///
/// # Errors
/// Fails on yarn older than 2, malformed JSON, or malformed ranges.
pub fn parse_audit(output: &str, yarn: &Version) -> Result<Vec<Advisory>, Error> {
    match yarn.major {
        2 | 3 => parse_classic(output),
        major if major >= 4 => parse_modern(output),
        _ => Err(Error::UnsupportedYarn(yarn.clone())),
    }
}

fn parse_classic(output: &str) -> Result<Vec<Advisory>, Error> {
    let audit: ClassicAudit = serde_json::from_str(output).map_err(Error::AuditParse)?;

    audit
        .advisories
        .into_values()
        .map(|advisory| -> Result<Advisory, Error> {
            let patched = match advisory.patched_versions.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(text) => Some(Range::parse(text)?),
            };
            Ok(Advisory {
                package_name: advisory.module_name,
                still_vulnerable: Range::parse(&advisory.vulnerable_versions)?,
                patched,
            })
        })
        .collect()
}

fn parse_modern(output: &str) -> Result<Vec<Advisory>, Error> {
    let mut advisories = Vec::new();
    for issue in serde_json::Deserializer::from_str(output).into_iter::<ModernIssue>() {
        let issue = issue.map_err(Error::AuditParse)?;
        if is_deprecation(&issue.children.id) {
            continue;
        }
        advisories.push(Advisory {
            package_name: issue.value,
            still_vulnerable: Range::parse(&issue.children.vulnerable_versions)?,
            patched: None,
        });
    }
    Ok(advisories)
}

fn is_deprecation(id: &serde_json::Value) -> bool {
    id.as_str().is_some_and(|id| id.contains(DEPRECATION_MARKER))
}
