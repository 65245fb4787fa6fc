use super::output;
use lockmend_core::{Config, Lockfile, Report};
use miette::{IntoDiagnostic, Result};
use tracing::info_span;

/// Remove every entry of the given packages so yarn re-resolves them.
pub fn run(config: &Config, packages: &[String], json: bool) -> Result<()> {
    let span = info_span!("reset", count = packages.len());
    let _guard = span.enter();

    let path = config.lockfile_path();
    let mut lock = Lockfile::read_from(&path).into_diagnostic()?;
    let mut report = Report::new();
    for package in packages {
        lock.reset(package, config.missing_package, &mut report)
            .into_diagnostic()?;
    }

    let changed = lock.try_save(&path).into_diagnostic()?;
    output::log_report(&report);
    output::finish(&report, changed, json)
}
