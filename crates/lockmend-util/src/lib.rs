#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for lockmend.
//!
//! Pure helper functions with no logging dependencies. Logging is handled by
//! the CLI crate.

pub mod fs;
pub mod hash;
