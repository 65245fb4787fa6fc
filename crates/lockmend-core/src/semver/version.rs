//! Concrete package versions.

use super::error::ParseError;
use super::range::{Constraint, Factor, Range};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A single resolved version: `MAJOR.MINOR.PATCH` plus an opaque suffix.
///
/// `pre` holds everything after the patch digits, including any `#hash`
/// fragment left by yarn's patch protocol. It takes part in equality but never
/// in precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: String,
}

impl Version {
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: String::new(),
        }
    }

    /// Parse `MAJOR[.MINOR[.PATCH<suffix>]][#fragment]`.
    ///
    /// Missing minor and patch default to zero. The suffix of the third
    /// segment is whatever follows its leading digits.
    ///
    /// # Errors
    /// Returns the offending token when a numeric segment does not parse.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (text, fragment) = match text.find('#') {
            Some(loc) => text.split_at(loc),
            None => (text, ""),
        };

        let mut parts = text.splitn(3, '.');
        let major_token = parts.next().unwrap_or_default();
        let major =
            parse_number(major_token).ok_or_else(|| ParseError::InvalidMajor(major_token.into()))?;

        let minor = match parts.next() {
            Some(token) => {
                parse_number(token).ok_or_else(|| ParseError::InvalidMinor(token.into()))?
            }
            None => 0,
        };

        let (patch, pre) = match parts.next() {
            Some(token) => {
                let digits = token.bytes().take_while(u8::is_ascii_digit).count();
                let (number, pre) = token.split_at(digits);
                let patch =
                    parse_number(number).ok_or_else(|| ParseError::InvalidPatch(token.into()))?;
                (patch, pre)
            }
            None => (0, ""),
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre: format!("{pre}{fragment}"),
        })
    }

    /// Compare the numeric triple only.
    #[must_use]
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// The smallest version strictly greater than this one in patch steps,
    /// absent when the patch number is already at its maximum.
    #[must_use]
    pub fn next_patch(&self) -> Option<Self> {
        let patch = self.patch.checked_add(1)?;
        Some(Self::new(self.major, self.minor, patch))
    }

    /// `>=self` as a range.
    #[must_use]
    pub fn at_least(&self) -> Range {
        Range::from_factor(Factor::new(Constraint::AtLeast, self.clone()))
    }

    #[must_use]
    pub fn has_pre(&self) -> bool {
        !self.pre.is_empty()
    }
}

/// Digits only: rejects the signs and whitespace that `u64::from_str` tolerates.
fn parse_number(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}{}", self.major, self.minor, self.patch, self.pre)
    }
}
