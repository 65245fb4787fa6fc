//! The `yarn` executable as seen by `lockmend auto`.

use lockmend_core::{Config, Version};
use miette::{miette, IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use std::process::{Command, Output};
use tracing::debug;

/// The package-manager operations the auto loop drives.
pub trait PackageManager {
    /// Installed yarn version, selecting the audit dialect.
    fn version(&self) -> Result<Version>;

    /// `yarn install`, re-resolving whatever the lockfile lacks.
    fn install(&self) -> Result<()>;

    /// `yarn npm audit --json --recursive`, raw stdout.
    fn audit(&self) -> Result<String>;
}

/// Runs a real `yarn` binary in the project directory.
#[derive(Debug, Clone)]
pub struct YarnCli {
    bin: PathBuf,
    cwd: PathBuf,
}

impl YarnCli {
    /// Use the configured binary, else whatever `yarn` is on `PATH`.
    pub fn locate(config: &Config) -> Result<Self> {
        let bin = match &config.yarn_bin {
            Some(bin) => bin.clone(),
            None => which::which("yarn")
                .into_diagnostic()
                .wrap_err("yarn not found on PATH (set LOCKMEND_YARN to override)")?,
        };
        debug!(bin = %bin.display(), "using yarn");

        Ok(Self {
            bin,
            cwd: config.cwd.clone(),
        })
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, "spawning yarn");
        Command::new(&self.bin)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to run {} {}", self.bin.display(), args.join(" ")))
    }
}

impl PackageManager for YarnCli {
    fn version(&self) -> Result<Version> {
        let output = self.run(&["--version"])?;
        if !output.status.success() {
            return Err(miette!("yarn --version exited with {}", output.status));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Version::parse(text.trim())
            .into_diagnostic()
            .wrap_err_with(|| format!("unrecognised yarn version {:?}", text.trim()))
    }

    fn install(&self) -> Result<()> {
        let output = self.run(&["install"])?;
        if output.status.success() {
            return Ok(());
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Err(miette!(
            "yarn install exited with {}\n{}",
            output.status,
            stdout.trim_end()
        ))
    }

    fn audit(&self) -> Result<String> {
        let output = self.run(&["npm", "audit", "--json", "--recursive"])?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        // yarn exits non-zero whenever it finds something
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(miette!(
                "yarn npm audit exited with {}\n{}",
                output.status,
                stderr.trim_end()
            ));
        }
        Ok(stdout)
    }
}
