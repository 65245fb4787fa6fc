//! Versions and range expressions in the dialect yarn lockfiles and audit
//! reports use.

pub mod error;
pub mod overlap;
pub mod range;
mod token;
pub mod version;

pub use error::ParseError;
pub use overlap::Overlap;
pub use range::{Constraint, Factor, Range, Term};
pub use version::Version;
