//! Rendering of reconciliation results, shared by every mutating command.

use lockmend_core::yarn::{Regrouped, ResolutionDiagnostic};
use lockmend_core::Report;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// The single JSON object printed on stdout with `--json`.
#[derive(Debug, Serialize)]
pub struct Outcome<'a> {
    pub ok: bool,
    pub changed: bool,
    pub suggestions: BTreeMap<String, String>,
    pub no_fix: &'a BTreeSet<String>,
    pub unpatched: &'a BTreeSet<String>,
    pub dropped: &'a [Regrouped],
    pub resets: &'a [String],
    pub resolutions: &'a [ResolutionDiagnostic],
}

impl<'a> Outcome<'a> {
    pub fn new(report: &'a Report, changed: bool, resolutions: &'a [ResolutionDiagnostic]) -> Self {
        Self {
            ok: resolutions.is_empty(),
            changed,
            suggestions: report.resolutions().into_iter().collect(),
            no_fix: &report.no_fix,
            unpatched: &report.unpatched,
            dropped: &report.dropped,
            resets: &report.resets,
            resolutions,
        }
    }
}

/// Log what the engine did.
pub fn log_report(report: &Report) {
    for package in &report.resets {
        info!(package = %package, "reset");
    }
    for Regrouped { package, version } in &report.dropped {
        info!(package = %package, version = %version, "drop");
    }
    for Regrouped { package, version } in &report.saved {
        info!(package = %package, version = %version, "save");
    }
    for request in &report.no_fix {
        warn!(request = %request, "no fix available");
    }
    for package in &report.unpatched {
        warn!(package = %package, "advisory has no patched versions");
    }
    for (request, witness) in &report.suggestions {
        info!(request = %request, witness = %witness, "resolution suggested");
    }
}

/// Print the final result: one JSON object, or the human summary.
pub fn finish(report: &Report, changed: bool, json: bool) -> Result<()> {
    if json {
        let outcome = Outcome::new(report, changed, &[]);
        println!("{}", serde_json::to_string_pretty(&outcome).into_diagnostic()?);
        return Ok(());
    }

    if report.has_suggestions() {
        println!("Add to \"resolutions\" in package.json:");
        print!("{}", report.render_resolutions());
    }
    if changed {
        println!("yarn.lock updated, run `yarn install`");
    } else {
        println!("yarn.lock stable");
    }
    Ok(())
}
