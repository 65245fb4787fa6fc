#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod semver;
pub mod version;
pub mod yarn;

pub use config::{Config, MissingPackage};
pub use error::Error;
pub use semver::{Overlap, ParseError, Range, Version};
pub use version::VERSION;
pub use yarn::{Lockfile, Report};
