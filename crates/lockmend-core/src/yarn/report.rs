//! Outcome of a reconciliation run.

use crate::semver::Version;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// A package version touched while regrouping entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Regrouped {
    pub package: String,
    pub version: String,
}

impl Regrouped {
    #[must_use]
    pub fn new(package: &str, version: &str) -> Self {
        Self {
            package: package.to_string(),
            version: version.to_string(),
        }
    }
}

/// Everything a run of fix/reset/shrink wants the user to know.
///
/// Library code never logs; callers render this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// `name@requested` -> lowest version that would satisfy the safe range.
    pub suggestions: BTreeMap<String, Version>,
    /// `name@requested` with no safe version to suggest.
    pub no_fix: BTreeSet<String>,
    /// Packages whose advisory has no patched range.
    pub unpatched: BTreeSet<String>,
    /// Packages whose entries were removed, in order.
    pub resets: Vec<String>,
    /// Versions that lost all their descriptors during shrink.
    pub dropped: Vec<Regrouped>,
    /// Versions that gained or lost descriptors during shrink.
    pub saved: Vec<Regrouped>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution suggestion. When one already exists for the key,
    /// the higher witness wins.
    pub fn suggest(&mut self, request_key: String, witness: Version) {
        match self.suggestions.get(&request_key) {
            Some(existing) if !existing.at_least().matches(&witness) => {}
            _ => {
                self.suggestions.insert(request_key, witness);
            }
        }
    }

    /// Suggestions as `resolutions` entries: `("name@requested", "^version")`.
    #[must_use]
    pub fn resolutions(&self) -> Vec<(String, String)> {
        self.suggestions
            .iter()
            .map(|(key, witness)| (key.clone(), format!("^{witness}")))
            .collect()
    }

    /// Suggestions formatted as lines to paste into `package.json`.
    #[must_use]
    pub fn render_resolutions(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.resolutions() {
            let _ = writeln!(out, "    \"{key}\": \"{value}\",");
        }
        out
    }

    #[must_use]
    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Report) {
        for (key, witness) in other.suggestions {
            self.suggest(key, witness);
        }
        self.no_fix.extend(other.no_fix);
        self.unpatched.extend(other.unpatched);
        self.resets.extend(other.resets);
        self.dropped.extend(other.dropped);
        self.saved.extend(other.saved);
    }
}
