use super::output;
use lockmend_core::{Config, Lockfile, Range, Report};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::{debug, info_span};

/// Bring one package into a safe range. Range words are joined with spaces,
/// so `fix ms >= 2.1.2` works unquoted.
pub fn run(config: &Config, package: &str, range: &[String], json: bool) -> Result<()> {
    let text = range.join(" ");
    let safe = Range::parse(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid safe range {text:?}"))?;

    let span = info_span!("fix", package = %package, safe = %safe);
    let _guard = span.enter();

    let path = config.lockfile_path();
    let mut lock = Lockfile::read_from(&path).into_diagnostic()?;
    let mut report = Report::new();
    lock.fix(package, &safe, config.missing_package, &mut report)
        .into_diagnostic()?;

    let changed = lock.try_save(&path).into_diagnostic()?;
    debug!(changed, "fix finished");

    output::log_report(&report);
    output::finish(&report, changed, json)
}
