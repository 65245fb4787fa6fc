//! `lockmend auto`: install, audit, fix, repeat until yarn.lock settles.

use super::output;
use crate::yarn::PackageManager;
use lockmend_core::yarn::{apply_advisories, parse_audit};
use lockmend_core::{Config, Lockfile, Report};
use miette::{bail, IntoDiagnostic, Result};
use std::collections::HashSet;
use tracing::{info, info_span, warn};

pub fn run(config: &Config, yarn: &dyn PackageManager, shrink: bool, json: bool) -> Result<()> {
    let yarn_version = yarn.version()?;
    info!(version = %yarn_version, "detected yarn");

    let path = config.lockfile_path();
    let mut seen = HashSet::new();
    let mut total = Report::new();
    let mut changed = false;
    let mut round = 0;

    loop {
        round += 1;
        if round > config.max_rounds {
            bail!(
                "yarn.lock still changing after {} rounds (raise --max-rounds)",
                config.max_rounds
            );
        }

        let span = info_span!("auto", round);
        let _guard = span.enter();

        info!("yarn install");
        yarn.install()?;

        info!("yarn npm audit --json --recursive");
        let audit = yarn.audit()?;
        let advisories = parse_audit(&audit, &yarn_version).into_diagnostic()?;
        info!(count = advisories.len(), "advisories");

        let mut lock = Lockfile::read_from(&path).into_diagnostic()?;
        if !seen.insert(lock.content_hash().into_diagnostic()?) {
            warn!("yarn.lock returned to an earlier state, stopping");
            break;
        }

        let mut report = Report::new();
        apply_advisories(&mut lock, &advisories, &mut report).into_diagnostic()?;
        if shrink {
            lock.shrink(&mut report).into_diagnostic()?;
        }
        output::log_report(&report);
        total.merge(report);

        if !lock.try_save(&path).into_diagnostic()? {
            info!("yarn.lock stable");
            break;
        }
        changed = true;
    }

    output::finish(&total, changed, json)
}
