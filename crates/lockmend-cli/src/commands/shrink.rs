use super::output;
use lockmend_core::{Config, Lockfile, Report};
use miette::{IntoDiagnostic, Result};
use tracing::info_span;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let span = info_span!("shrink");
    let _guard = span.enter();

    let path = config.lockfile_path();
    let mut lock = Lockfile::read_from(&path).into_diagnostic()?;
    let mut report = Report::new();
    lock.shrink(&mut report).into_diagnostic()?;

    let changed = lock.try_save(&path).into_diagnostic()?;
    output::log_report(&report);
    output::finish(&report, changed, json)
}
