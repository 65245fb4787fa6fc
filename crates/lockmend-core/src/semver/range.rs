//! Range expressions: an OR of terms, each an AND of factors.
//!
//! ```text
//! ^1.2.0 || >=2.0.0 <2.4.0 || 3.x || 4.0.0 - 4.2.1
//! ```
//!
//! Parsing runs in fixed passes per factor: classify the token, rewrite
//! wildcard segments, parse the operand, then apply the major-zero downgrade.
//! Reordering the passes changes what `0.x` or `^0.0.3` mean.

use super::error::ParseError;
use super::token::{self, Token};
use super::version::Version;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How a factor compares a candidate against its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `=1.2.3` or a bare `1.2.3`.
    Exact,
    /// `~1.2.3`: same major and minor, patch at least.
    MatchMinor,
    /// `^1.2.3`: same major, at least the given minor/patch.
    MatchMajor,
    AtLeast,
    AtMost,
    Greater,
    Less,
}

impl Constraint {
    #[must_use]
    pub fn operator(self) -> &'static str {
        match self {
            Self::Exact => "",
            Self::MatchMinor => "~",
            Self::MatchMajor => "^",
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }
}

/// One atomic comparison within a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Factor {
    /// `*` / `latest`: matches everything and carries no version.
    Any,
    Compare(Constraint, Version),
}

impl Factor {
    #[must_use]
    pub fn new(constraint: Constraint, version: Version) -> Self {
        Self::Compare(constraint, version)
    }

    /// Whether `candidate` satisfies this factor.
    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        let (constraint, own) = match self {
            Self::Any => return true,
            Self::Compare(constraint, own) => (*constraint, own),
        };

        // Strict: suffixes must be identical. Loose: a plain release also passes.
        let pre_matches = |strict: bool| own.pre == candidate.pre || (!strict && !candidate.has_pre());
        let order = candidate.cmp_precedence(own);

        match constraint {
            Constraint::Exact => order == Ordering::Equal && pre_matches(true),
            Constraint::MatchMinor => {
                candidate.major == own.major
                    && candidate.minor == own.minor
                    && candidate.patch >= own.patch
                    && pre_matches(false)
            }
            Constraint::MatchMajor => {
                candidate.major == own.major && order != Ordering::Less && pre_matches(false)
            }
            Constraint::AtLeast => order != Ordering::Less && pre_matches(false),
            Constraint::AtMost => order != Ordering::Greater && pre_matches(false),
            Constraint::Greater => order == Ordering::Greater && pre_matches(false),
            Constraint::Less => order == Ordering::Less && pre_matches(false),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Compare(constraint, version) => write!(f, "{}{version}", constraint.operator()),
        }
    }
}

/// An AND of factors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    factors: Vec<Factor>,
}

impl Term {
    #[must_use]
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        self.factors.iter().all(|factor| factor.matches(candidate))
    }

    fn parse(term: &str) -> Result<Self, ParseError> {
        let source = token::normalize(term);
        if source.is_empty() {
            return Err(ParseError::EmptyTerm);
        }

        let bare_integer = token::is_bare_integer(&source);
        let tokens: Vec<&str> = source.split(' ').collect();
        let mut factors: Vec<Factor> = Vec::with_capacity(tokens.len());

        // The lower side of `a - b` must be written as an exact version, not
        // merely reduced to one.
        let mut exact_operand = false;
        let mut index = 0;
        while index < tokens.len() {
            match token::classify(tokens[index], bare_integer) {
                Token::Any => {
                    factors.push(Factor::Any);
                    exact_operand = false;
                }
                Token::Hyphen => {
                    let upper = parse_hyphen_upper(&source, tokens.get(index + 1).copied())?;
                    match factors.last_mut() {
                        Some(Factor::Compare(constraint @ Constraint::Exact, _)) if exact_operand => {
                            *constraint = Constraint::AtLeast;
                        }
                        _ => return Err(ParseError::MisplacedHyphen(source.clone())),
                    }
                    factors.push(upper);
                    exact_operand = false;
                    index += 1;
                }
                Token::Operand {
                    constraint,
                    operand,
                    ..
                } => {
                    factors.push(build_factor(constraint, operand)?);
                    exact_operand = constraint == Constraint::Exact;
                }
            }
            index += 1;
        }

        Ok(Self { factors })
    }
}

/// The token after `-` becomes an `AtMost` bound and must be a plain version.
fn parse_hyphen_upper(source: &str, token: Option<&str>) -> Result<Factor, ParseError> {
    let Some(token) = token else {
        return Err(ParseError::MisplacedHyphen(source.to_string()));
    };

    match token::classify(token, false) {
        Token::Operand {
            constraint: Constraint::Exact,
            operand,
            explicit: false,
        } if rewrite_wildcard(operand).is_none() => Ok(Factor::new(
            Constraint::AtMost,
            Version::parse(operand)?,
        )),
        _ => Err(ParseError::HyphenBound(token.to_string())),
    }
}

/// Build a factor from a classified operand.
fn build_factor(constraint: Constraint, operand: &str) -> Result<Factor, ParseError> {
    let (constraint, operand) = match rewrite_wildcard(operand) {
        Some(Wildcard::Everything) => return Ok(Factor::Any),
        Some(Wildcard::Rewritten(constraint, operand)) => (constraint, Cow::Owned(operand)),
        None => (constraint, Cow::Borrowed(operand)),
    };

    let version = Version::parse(&operand)?;
    let constraint = downgrade_major_zero(constraint, &version);
    Ok(Factor::new(constraint, version))
}

enum Wildcard {
    Everything,
    Rewritten(Constraint, String),
}

/// Pass 1: `N.x` / `N.*` become `^N.0.0`, `N.M.x` / `N.M.*` become `~N.M.0`,
/// whatever operator was written.
fn rewrite_wildcard(operand: &str) -> Option<Wildcard> {
    let (core, fragment) = operand.split_at(operand.find('#').unwrap_or(operand.len()));
    let segments: Vec<&str> = core.split('.').collect();
    let position = segments
        .iter()
        .position(|segment| matches!(*segment, "x" | "X" | "*"))?;

    Some(match position {
        0 => Wildcard::Everything,
        1 => Wildcard::Rewritten(
            Constraint::MatchMajor,
            format!("{}.0.0{fragment}", segments[0]),
        ),
        _ => Wildcard::Rewritten(
            Constraint::MatchMinor,
            format!("{}.{}.0{fragment}", segments[0], segments[1]),
        ),
    })
}

/// Pass 2: below 1.0.0 the leading zero promises no stability, so `^0.y.z`
/// behaves like `~0.y.z`, and `~0.0.z` pins the patch.
fn downgrade_major_zero(constraint: Constraint, version: &Version) -> Constraint {
    let constraint = match constraint {
        Constraint::MatchMajor if version.major == 0 => Constraint::MatchMinor,
        other => other,
    };
    match constraint {
        Constraint::MatchMinor if version.major == 0 && version.minor == 0 => Constraint::Exact,
        other => other,
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, factor) in self.factors.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{factor}")?;
        }
        Ok(())
    }
}

/// A parsed range expression (a "request").
///
/// Always holds at least one term, and every term at least one factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    terms: Vec<Term>,
}

impl Range {
    /// Parse a range expression.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidTerm`] wrapping the first failing term.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let terms = text
            .split("||")
            .map(str::trim)
            .map(|part| {
                Term::parse(part).map_err(|source| ParseError::InvalidTerm {
                    term: part.to_string(),
                    source: Box::new(source),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { terms })
    }

    /// A single-factor range.
    #[must_use]
    pub fn from_factor(factor: Factor) -> Self {
        Self {
            terms: vec![Term {
                factors: vec![factor],
            }],
        }
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether any term accepts `candidate`.
    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        self.terms.iter().any(|term| term.matches(candidate))
    }

    /// Whether this range pins one exact version.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(
            self.terms.as_slice(),
            [term] if matches!(term.factors.as_slice(), [Factor::Compare(Constraint::Exact, _)])
        )
    }
}

impl FromStr for Range {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> Range {
        Range::parse(text).unwrap()
    }

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn assert_matches(r: &Range, inside: &[&str], outside: &[&str]) {
        for text in inside {
            assert!(r.matches(&v(text)), "{r} must match {text}");
        }
        for text in outside {
            assert!(!r.matches(&v(text)), "{r} must not match {text}");
        }
    }

    #[test]
    fn test_hyphen_range() {
        assert_matches(
            &range("0.28.0 - 0.30.0"),
            &["0.28.0", "0.28.3", "0.29.5", "0.30.0"],
            &["0.25.99", "0.30.1"],
        );
    }

    #[test]
    fn test_hyphen_range_errors() {
        let err = Range::parse("- 1.0.0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTerm { ref source, .. } if matches!(**source, ParseError::MisplacedHyphen(_))
        ));

        let err = Range::parse("1.0.0 -").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTerm { ref source, .. } if matches!(**source, ParseError::MisplacedHyphen(_))
        ));

        let err = Range::parse("^1.0.0 - 2.0.0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTerm { ref source, .. } if matches!(**source, ParseError::MisplacedHyphen(_))
        ));

        let err = Range::parse("1.0.0 - <2.0.0").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTerm { ref source, .. } if **source == ParseError::HyphenBound("<2.0.0".into())
        ));
    }

    #[test]
    fn test_hyphen_after_reduced_caret_rejected() {
        for text in ["^0.0.3 - 1.0.0", "~0.0.3 - 1.0.0", "1.x - 2.0.0"] {
            let err = Range::parse(text).unwrap_err();
            assert!(
                matches!(
                    err,
                    ParseError::InvalidTerm { ref source, .. } if matches!(**source, ParseError::MisplacedHyphen(_))
                ),
                "{text} must be rejected"
            );
        }
        assert_matches(&range("=0.0.3 - 1.0.0"), &["0.0.3", "1.0.0"], &["0.0.2", "1.0.1"]);
    }

    #[test]
    fn test_caret_major_zero_downgrade() {
        assert_matches(&range("^0.5.2"), &["0.5.2", "0.5.9"], &["0.6.0", "0.5.1"]);
        assert_matches(&range("^0.0.3"), &["0.0.3"], &["0.0.4", "0.0.2", "0.1.0"]);
        assert_matches(&range("~0.0.3"), &["0.0.3"], &["0.0.4"]);
    }

    #[test]
    fn test_caret_and_tilde() {
        assert_matches(&range("^1.2.3"), &["1.2.3", "1.2.9", "1.9.0"], &["1.2.2", "2.0.0"]);
        assert_matches(&range("~1.2.3"), &["1.2.3", "1.2.40"], &["1.3.0", "1.2.2"]);
    }

    #[test]
    fn test_wildcards() {
        assert_matches(&range("1.x"), &["1.0.0", "1.4.2", "1.99.99"], &["0.9.9", "2.0.0"]);
        assert_matches(&range("1.*"), &["1.0.0", "1.4.2"], &["2.0.0"]);
        assert_matches(&range("1.2.x"), &["1.2.0", "1.2.17"], &["1.3.0", "1.1.9"]);
        assert_matches(&range(">=1.2.*"), &["1.2.5"], &["1.3.0"]);
        assert_eq!(range("*"), Range::from_factor(Factor::Any));
        assert_eq!(range("x"), Range::from_factor(Factor::Any));
    }

    #[test]
    fn test_bare_integer_means_major() {
        assert_matches(&range("2"), &["2.0.0", "2.7.1"], &["3.0.0", "1.9.9"]);
        assert_eq!(range("1.2").to_string(), "1.2.0");
    }

    #[test]
    fn test_comparators_with_spaces() {
        let r = range(">= 2.1.2 < 3.0.0");
        assert_eq!(r.terms().len(), 1);
        assert_eq!(r.terms()[0].factors().len(), 2);
        assert_matches(&r, &["2.1.2", "2.9.9"], &["2.1.1", "3.0.0"]);

        assert_matches(&range("<=1.4.0 >1.0.0"), &["1.0.1", "1.4.0"], &["1.0.0", "1.4.1"]);
        assert_matches(&range("=1.4.0"), &["1.4.0"], &["1.4.1"]);
    }

    #[test]
    fn test_or_terms() {
        let r = range("^1.0.0 || ^3.0.0||4.1.0");
        assert_eq!(r.terms().len(), 3);
        assert_matches(&r, &["1.5.0", "3.0.1", "4.1.0"], &["2.0.0", "4.1.1"]);
    }

    #[test]
    fn test_any_matches_everything() {
        assert_matches(&range("*"), &["0.0.0", "99.1.0-beta"], &[]);
        assert_matches(&range("latest"), &["1.0.0"], &[]);
    }

    #[test]
    fn test_pre_release_matching() {
        // Exact is strict about suffixes
        assert_matches(&range("1.0.0-beta.2"), &["1.0.0-beta.2"], &["1.0.0", "1.0.0-beta.3"]);
        // Other constraints accept plain releases but not foreign suffixes
        assert_matches(&range(">=1.0.0-beta.2"), &["1.0.0-beta.2", "1.2.0"], &["1.2.0-rc.1"]);
        assert_matches(&range("^1.0.0"), &["1.3.0"], &["1.3.0-rc.1"]);
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(matches!(
            Range::parse(""),
            Err(ParseError::InvalidTerm { ref source, .. }) if **source == ParseError::EmptyTerm
        ));
        assert!(Range::parse("^1.0.0 || ").is_err());
        assert!(Range::parse(">=banana").is_err());
        assert!(Range::parse("npm:^1.0.0").is_err());
    }

    #[test]
    fn test_display_reparses_to_same_range() {
        for text in ["^1.2.3", ">=1.0.0 <2.0.0 || 3.x", "1.0.0 - 2.0.0", "^0.5.2", "*"] {
            let parsed = range(text);
            assert_eq!(range(&parsed.to_string()), parsed, "{text}");
        }
        assert_eq!(range("1.0.0 - 2.0.0").to_string(), ">=1.0.0 <=2.0.0");
        assert_eq!(range("^0.5.2").to_string(), "~0.5.2");
    }

    #[test]
    fn test_is_exact() {
        assert!(range("1.2.3").is_exact());
        assert!(range("=1.2.3").is_exact());
        assert!(range("^0.0.3").is_exact());
        assert!(!range("^1.2.3").is_exact());
        assert!(!range("1.2.3 || 1.2.4").is_exact());
    }

    #[test]
    fn test_hash_suffix_in_request() {
        let r = range("^1.20.0#~builtin<compat/resolve>");
        assert_matches(&r, &["1.22.1"], &["2.0.0"]);
    }
}
