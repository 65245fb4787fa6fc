use crate::yarn::lockfile::LOCKFILE_NAME;
use crate::yarn::manifest::MANIFEST_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bound on `auto` install/audit/fix rounds.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Runtime configuration for lockmend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project directory holding `package.json` and `yarn.lock`.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// What single-package commands do when the package is not locked.
    pub missing_package: MissingPackage,

    /// Explicit yarn executable; located on `PATH` when unset.
    pub yarn_bin: Option<PathBuf>,

    /// Maximum install/audit/fix rounds before `auto` gives up.
    pub max_rounds: u32,
}

/// Policy for operations naming a package absent from the lockfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingPackage {
    /// Nothing to do: treat as a no-op.
    #[default]
    Ignore,
    /// Fail the command with a not-found error.
    Fail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            missing_package: MissingPackage::default(),
            yarn_bin: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    #[must_use]
    pub fn with_missing_package(mut self, policy: MissingPackage) -> Self {
        self.missing_package = policy;
        self
    }

    #[must_use]
    pub fn with_yarn_bin(mut self, yarn_bin: Option<PathBuf>) -> Self {
        self.yarn_bin = yarn_bin;
        self
    }

    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub fn lockfile_path(&self) -> PathBuf {
        self.cwd.join(LOCKFILE_NAME)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.cwd.join(MANIFEST_NAME)
    }
}
