//! Tokenizer for a single range term.
//!
//! A term is normalized (whitespace collapsed, operators glued to their
//! operands), split on spaces, and each token is classified by the first
//! matching rule below. Rule order matters: `>=` must be tried before `>`.

use super::range::Constraint;

/// Characters that bind to the operand that follows them.
const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// Tokens that accept every version.
const ANY_TOKENS: &[&str] = &["*", "x", "X", "latest"];

/// The hyphen-range separator, only valid as `A - B`.
pub(crate) const HYPHEN: &str = "-";

/// Operator prefixes, in match priority order.
const OPERATORS: &[(&str, Constraint)] = &[
    ("^", Constraint::MatchMajor),
    ("~", Constraint::MatchMinor),
    (">=", Constraint::AtLeast),
    ("<=", Constraint::AtMost),
    ("<", Constraint::Less),
    (">", Constraint::Greater),
    ("=", Constraint::Exact),
];

/// One classified token of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Any,
    Hyphen,
    Operand {
        constraint: Constraint,
        operand: &'a str,
        /// Whether the constraint came from an explicit operator prefix.
        explicit: bool,
    },
}

/// Collapse whitespace runs to one space and drop the whitespace after an
/// operator, so `>= 1.2.3` and `>=1.2.3` produce the same token.
pub(crate) fn normalize(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    let mut pending_space = false;

    for c in term.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() && !out.ends_with(OPERATOR_CHARS) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

/// Whether the whole normalized term is a bare integer such as `2`.
pub(crate) fn is_bare_integer(source: &str) -> bool {
    !source.is_empty() && source.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a token. `bare_integer_term` selects `MatchMajor` over `Exact`
/// for operator-less tokens.
pub(crate) fn classify(token: &str, bare_integer_term: bool) -> Token<'_> {
    if ANY_TOKENS.contains(&token) {
        return Token::Any;
    }
    if token == HYPHEN {
        return Token::Hyphen;
    }

    for &(prefix, constraint) in OPERATORS {
        if let Some(operand) = token.strip_prefix(prefix) {
            return Token::Operand {
                constraint,
                operand,
                explicit: true,
            };
        }
    }

    let constraint = if bare_integer_term {
        Constraint::MatchMajor
    } else {
        Constraint::Exact
    };
    Token::Operand {
        constraint,
        operand: token,
        explicit: false,
    }
}
