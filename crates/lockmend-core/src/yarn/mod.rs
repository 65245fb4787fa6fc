//! Yarn berry lockfile model, reconciliation and advisory handling.

pub mod audit;
pub mod fields;
pub mod key;
pub mod lockfile;
pub mod manifest;
mod reconcile;
pub mod remediate;
pub mod report;

pub use audit::{parse_audit, Advisory};
pub use fields::{Fields, Node};
pub use lockfile::{LockEntry, Lockfile, LockfileError, Resolved, LOCKFILE_NAME};
pub use manifest::{check_resolutions, Manifest, ResolutionDiagnostic, ResolutionKey, MANIFEST_NAME};
pub use remediate::apply_advisories;
pub use report::{Regrouped, Report};
