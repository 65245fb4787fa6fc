use super::output::Outcome;
use lockmend_core::yarn::{check_resolutions, Manifest};
use lockmend_core::{Config, Lockfile, Report};
use miette::{IntoDiagnostic, Result};
use tracing::debug;

/// Exit code when a resolution needs attention.
pub const EXIT_ISSUES: i32 = 1;

/// Check `package.json` resolutions against yarn.lock. Read-only.
pub fn run(config: &Config, json: bool) -> Result<()> {
    let manifest = Manifest::read_from(&config.manifest_path()).into_diagnostic()?;
    let lock = Lockfile::read_from(&config.lockfile_path()).into_diagnostic()?;
    let diagnostics = check_resolutions(&manifest, &lock);
    debug!(
        declared = manifest.resolutions.len(),
        issues = diagnostics.len(),
        "checked resolutions"
    );

    if json {
        let report = Report::new();
        let outcome = Outcome::new(&report, false, &diagnostics);
        println!("{}", serde_json::to_string_pretty(&outcome).into_diagnostic()?);
    } else if diagnostics.is_empty() {
        println!(
            "{} resolution(s) consistent with yarn.lock",
            manifest.resolutions.len()
        );
    } else {
        for diagnostic in &diagnostics {
            println!("{diagnostic}");
        }
    }

    if !diagnostics.is_empty() {
        std::process::exit(EXIT_ISSUES);
    }
    Ok(())
}
