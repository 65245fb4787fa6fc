//! Fix, Reset and Shrink: the three lockfile mutations.
//!
//! Fix and Reset delete entries so the next `yarn install` re-resolves them.
//! Shrink merges descriptors onto the highest already-present version that
//! still satisfies them.

use super::key;
use super::lockfile::{LockEntry, Lockfile, Resolved};
use super::report::{Regrouped, Report};
use crate::config::MissingPackage;
use crate::error::Error;
use crate::semver::{Overlap, Range, Version};
use std::collections::BTreeMap;

impl Lockfile {
    /// Bring every entry of `package` into `safe`.
    ///
    /// Entries already inside the safe range are left alone. When a requested
    /// range overlaps the safe range, all of the package's entries are removed.
    /// Otherwise a resolution is suggested, or the request is recorded as
    /// having no fix.
    ///
    /// # Errors
    /// Fails on unparsable versions or ranges, and on a missing package when
    /// `missing` is [`MissingPackage::Fail`].
    pub fn fix(
        &mut self,
        package: &str,
        safe: &Range,
        missing: MissingPackage,
        report: &mut Report,
    ) -> Result<(), Error> {
        let view = self.package_entries(package);
        if view.by_specifier.is_empty() {
            return missing_package(package, missing);
        }

        let mut needs_reset = false;
        for (specifier, entry) in &view.by_specifier {
            if safe.matches(&Version::parse(&entry.version)?) {
                continue;
            }
            let Some(requested) = key::requested_range(specifier) else {
                continue;
            };
            let request_key = key::request_key(package, &requested);

            match Range::parse(&requested)?.overlaps(safe) {
                Overlap::Overlapping => needs_reset = true,
                Overlap::Disjoint { witness: Some(witness) } => {
                    report.suggest(request_key, witness);
                }
                Overlap::Disjoint { witness: None } => {
                    report.no_fix.insert(request_key);
                }
            }
        }

        if needs_reset {
            self.remove_package(package, report);
        }
        Ok(())
    }

    /// Remove every entry of `package`. Returns how many were removed.
    ///
    /// # Errors
    /// Fails on a missing package when `missing` is [`MissingPackage::Fail`].
    pub fn reset(
        &mut self,
        package: &str,
        missing: MissingPackage,
        report: &mut Report,
    ) -> Result<usize, Error> {
        let removed = self.remove_package(package, report);
        if removed == 0 {
            missing_package(package, missing)?;
        }
        Ok(removed)
    }

    /// Regroup every package with more than one entry so each descriptor
    /// points at the highest present version it accepts.
    ///
    /// Running it twice leaves the lockfile unchanged the second time.
    ///
    /// # Errors
    /// Fails on unparsable versions or ranges.
    pub fn shrink(&mut self, report: &mut Report) -> Result<(), Error> {
        for (package, count) in self.package_counts() {
            if count > 1 {
                self.shrink_package(&package, report)?;
            }
        }
        Ok(())
    }

    fn shrink_package(&mut self, package: &str, report: &mut Report) -> Result<(), Error> {
        let view = self.package_entries(package);
        let by_version: BTreeMap<Resolved, LockEntry> = view
            .by_version
            .iter()
            .map(|(resolved, entry)| (resolved.clone(), (*entry).clone()))
            .collect();

        // Descriptors only move between entries of their own protocol.
        let mut assigned: BTreeMap<&str, &Resolved> = BTreeMap::new();
        for (specifier, entry) in &view.by_specifier {
            let own = Resolved::of(specifier, entry);
            let Some((mut target, _)) = by_version.get_key_value(&own) else {
                continue;
            };
            if let Some(requested) = key::requested_range(specifier) {
                let request = Range::parse(&requested)?;
                let mut best = Version::parse(&target.version)?;
                for present in by_version.keys().filter(|r| r.protocol == own.protocol) {
                    let candidate = Version::parse(&present.version)?;
                    if best.at_least().matches(&candidate) && request.matches(&candidate) {
                        best = candidate;
                        target = present;
                    }
                }
            }
            assigned.insert(specifier, target);
        }

        let mut regrouped = BTreeMap::new();
        let mut changed = false;
        for (resolved, entry) in &by_version {
            let specifiers: Vec<&str> = assigned
                .iter()
                .filter(|(_, target)| **target == resolved)
                .map(|(specifier, _)| *specifier)
                .collect();

            if specifiers.is_empty() {
                changed = true;
                report.dropped.push(Regrouped::new(package, &resolved.version));
                continue;
            }

            let combined = key::join(&specifiers);
            if self.entries.get(&combined) != Some(entry) {
                changed = true;
                report.saved.push(Regrouped::new(package, &resolved.version));
            }
            regrouped.insert(combined, entry.clone());
        }

        if changed {
            self.remove_package(package, report);
            self.entries.extend(regrouped);
            self.dirty = true;
        }
        Ok(())
    }

    fn remove_package(&mut self, package: &str, report: &mut Report) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !key::belongs_to(k, package));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.dirty = true;
            report.resets.push(package.to_string());
        }
        removed
    }
}

fn missing_package(package: &str, missing: MissingPackage) -> Result<(), Error> {
    match missing {
        MissingPackage::Ignore => Ok(()),
        MissingPackage::Fail => Err(Error::package_not_found(package)),
    }
}
