//! Version and range parse errors.

use thiserror::Error;

/// A malformed version or range expression.
///
/// Parse failures are never skipped: an unreadable range could be hiding a
/// vulnerable package.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid major {0:?}")]
    InvalidMajor(String),

    #[error("invalid minor {0:?}")]
    InvalidMinor(String),

    #[error("invalid patch {0:?}")]
    InvalidPatch(String),

    #[error("empty range term")]
    EmptyTerm,

    /// A bare `-` that does not sit between two plain versions.
    #[error("hyphen in invalid position in {0:?}")]
    MisplacedHyphen(String),

    /// The upper bound of `A - B` carried its own operator.
    #[error("hyphen range bound {0:?} must be a plain version")]
    HyphenBound(String),

    #[error("invalid term {term:?}: {source}")]
    InvalidTerm {
        term: String,
        #[source]
        source: Box<ParseError>,
    },
}
