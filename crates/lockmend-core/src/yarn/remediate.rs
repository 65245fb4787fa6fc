//! Turning audit advisories into lockfile fixes.

use super::audit::Advisory;
use super::lockfile::Lockfile;
use super::report::Report;
use crate::config::MissingPackage;
use crate::error::Error;

/// Fix every advisory against the lockfile.
///
/// Advisories without a safe range are recorded as unpatched. Packages the
/// lockfile does not hold are skipped.
///
/// # Errors
/// Fails on unparsable versions or ranges in the lockfile.
pub fn apply_advisories(
    lock: &mut Lockfile,
    advisories: &[Advisory],
    report: &mut Report,
) -> Result<(), Error> {
    for advisory in advisories {
        match advisory.safe_range() {
            Some(safe) => lock.fix(&advisory.package_name, &safe, MissingPackage::Ignore, report)?,
            None => {
                report.unpatched.insert(advisory.package_name.clone());
            }
        }
    }
    Ok(())
}
