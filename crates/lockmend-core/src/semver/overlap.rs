//! Boundary-sampling reasoning between ranges.
//!
//! Neither operation here is a full interval proof. Both look only at the
//! boundary versions that factors name, which is what suggestions are built
//! from.

use super::range::{Constraint, Factor, Range};
use super::version::Version;
use std::cmp::Ordering;

/// Outcome of [`Range::overlaps`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlap {
    /// Some anchor of the other range satisfies this one.
    Overlapping,
    /// No anchor satisfies this range. The witness is the other range's first
    /// anchor, absent when the other range names no lower boundary at all.
    Disjoint { witness: Option<Version> },
}

impl Overlap {
    #[must_use]
    pub fn is_overlapping(&self) -> bool {
        matches!(self, Self::Overlapping)
    }
}

impl Range {
    /// The smallest versions each factor admits, in declaration order.
    ///
    /// `Greater v` contributes `v` plus one patch; `Less` and `Any` have no
    /// lower boundary and contribute nothing, nor does `Greater` on the last
    /// representable patch.
    #[must_use]
    pub fn anchors(&self) -> Vec<Version> {
        self.terms()
            .iter()
            .flat_map(|term| term.factors())
            .filter_map(|factor| match factor {
                Factor::Any | Factor::Compare(Constraint::Less, _) => None,
                Factor::Compare(Constraint::Greater, version) => version.next_patch(),
                Factor::Compare(_, version) => Some(version.clone()),
            })
            .collect()
    }

    /// Whether this range accepts any anchor of `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Range) -> Overlap {
        let anchors = other.anchors();
        if anchors.iter().any(|anchor| self.matches(anchor)) {
            return Overlap::Overlapping;
        }

        Overlap::Disjoint {
            witness: anchors.into_iter().next(),
        }
    }

    /// Treat `self` as the still-vulnerable versions and derive the safe range:
    /// everything strictly above the highest upper bound of any term.
    ///
    /// Returns `None` when some term is unbounded above, i.e. no patched
    /// release exists.
    #[must_use]
    pub fn patches(&self) -> Option<Range> {
        let mut highest: Option<Upper> = None;
        for term in self.terms() {
            let bound = term
                .factors()
                .iter()
                .filter_map(upper_bound)
                .min_by(Upper::cmp_admitted)?;
            if highest.as_ref().map_or(true, |h| bound.cmp_admitted(h) == Ordering::Greater) {
                highest = Some(bound);
            }
        }

        highest.map(|upper| {
            Range::from_factor(match upper {
                Upper::Inclusive(version) => Factor::new(Constraint::Greater, version),
                Upper::Exclusive(version) => Factor::new(Constraint::AtLeast, version),
            })
        })
    }
}

/// The highest version a factor admits.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Upper {
    /// Versions up to and including this one.
    Inclusive(Version),
    /// Versions strictly below this one.
    Exclusive(Version),
}

impl Upper {
    fn version(&self) -> &Version {
        match self {
            Self::Inclusive(v) | Self::Exclusive(v) => v,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Exclusive(_) => 0,
            Self::Inclusive(_) => 1,
        }
    }

    /// Order by how much the bound admits; `<v` admits less than `<=v`.
    fn cmp_admitted(&self, other: &Self) -> Ordering {
        self.version()
            .cmp_precedence(other.version())
            .then(self.rank().cmp(&other.rank()))
    }
}

fn upper_bound(factor: &Factor) -> Option<Upper> {
    let Factor::Compare(constraint, v) = factor else {
        return None;
    };
    let release = Version::new(v.major, v.minor, v.patch);

    match constraint {
        Constraint::Exact | Constraint::AtMost => Some(Upper::Inclusive(release)),
        Constraint::Less => Some(Upper::Exclusive(release)),
        // Past the last representable minor or major nothing bounds the factor.
        Constraint::MatchMinor => v
            .minor
            .checked_add(1)
            .map(|minor| Upper::Exclusive(Version::new(v.major, minor, 0))),
        Constraint::MatchMajor => v
            .major
            .checked_add(1)
            .map(|major| Upper::Exclusive(Version::new(major, 0, 0))),
        Constraint::AtLeast | Constraint::Greater => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(text: &str) -> Range {
        Range::parse(text).unwrap()
    }

    #[test]
    fn test_overlap_found() {
        let safe = range(">=1.4.0");
        let requested = range("^1.2.0");
        assert!(requested.overlaps(&safe).is_overlapping());
    }

    #[test]
    fn test_overlap_witness() {
        let safe = range(">=2.0.0");
        let requested = range("^1.0.0");
        assert_eq!(
            requested.overlaps(&safe),
            Overlap::Disjoint {
                witness: Some(Version::new(2, 0, 0))
            }
        );
    }

    #[test]
    fn test_overlap_witness_is_first_anchor() {
        let safe = range(">=3.1.0 || >=2.5.0 <3.0.0");
        assert_eq!(
            range("^1.0.0").overlaps(&safe),
            Overlap::Disjoint {
                witness: Some(Version::new(3, 1, 0))
            }
        );
        assert!(range("^2.0.0").overlaps(&safe).is_overlapping());
    }

    #[test]
    fn test_overlap_without_anchors() {
        assert_eq!(
            range("^1.0.0").overlaps(&range("<0.0.0")),
            Overlap::Disjoint { witness: None }
        );
        assert_eq!(
            range("^1.0.0").overlaps(&range("*")),
            Overlap::Disjoint { witness: None }
        );
    }

    #[test]
    fn test_greater_anchor_is_next_patch() {
        assert_eq!(range(">1.2.3").anchors(), vec![Version::new(1, 2, 4)]);
        assert!(range("~1.2.3").overlaps(&range(">1.2.3")).is_overlapping());
        assert!(!range("1.2.3").overlaps(&range(">1.2.3")).is_overlapping());
    }

    #[test]
    fn test_boundaries_at_numeric_limit() {
        let top = range(">1.0.18446744073709551615");
        assert!(top.anchors().is_empty());
        assert_eq!(
            range("^1.0.0").overlaps(&top),
            Overlap::Disjoint { witness: None }
        );

        assert_eq!(range("~1.18446744073709551615.0").patches(), None);
        assert_eq!(range("^18446744073709551615.0.0").patches(), None);
        assert_eq!(
            range("^18446744073709551615.0.0 || <2.0.0").patches(),
            None
        );
    }

    #[test]
    fn test_anchors_skip_less_and_any() {
        let anchors = range(">=1.0.0 <1.5.0 || * || 2.1.0").anchors();
        assert_eq!(anchors, vec![Version::new(1, 0, 0), Version::new(2, 1, 0)]);
    }

    #[test]
    fn test_patches_from_less() {
        assert_eq!(range("<4.17.21").patches(), Some(range(">=4.17.21")));
        assert_eq!(range(">=4.0.0 <4.17.21").patches(), Some(range(">=4.17.21")));
    }

    #[test]
    fn test_patches_from_inclusive_bounds() {
        assert_eq!(range("<=2.3.0").patches(), Some(range(">2.3.0")));
        assert_eq!(range("1.0.0").patches(), Some(range(">1.0.0")));
        assert_eq!(range("1.0.0 - 1.2.0").patches(), Some(range(">1.2.0")));
    }

    #[test]
    fn test_patches_takes_highest_term() {
        let vulnerable = range("<1.2.3 || >=2.0.0 <2.0.5 || ~2.0.1");
        assert_eq!(vulnerable.patches(), Some(range(">=2.1.0")));

        let vulnerable = range("<3.0.0 || <=3.0.0");
        assert_eq!(vulnerable.patches(), Some(range(">3.0.0")));
    }

    #[test]
    fn test_patches_tightest_bound_within_term() {
        assert_eq!(range("^1.2.0 <1.4.0").patches(), Some(range(">=1.4.0")));
    }

    #[test]
    fn test_patches_unbounded() {
        assert_eq!(range(">=1.0.0").patches(), None);
        assert_eq!(range("<1.0.0 || *").patches(), None);
    }
}
