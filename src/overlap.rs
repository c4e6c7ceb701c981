//! Positional comparison of two entities.
//!
//! ```text
//!          exact   nested-bigger   nested-smaller   starts-before   ends-after
//! a:        []        [   ]             []             [   ]           [   ]
//! b:        []         []             [   ]              [   ]       [   ]
//! ```
//!
//! Only the first fragment of each span is compared; the second fragment of
//! a discontinuous span is ignored. Boundaries are inclusive, so two spans
//! that merely touch (`a` ends where `b` starts) count as overlapping.

use std::fmt;

use serde::Serialize;

use crate::models::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapKind {
    Exact,
    NestedBigger,
    NestedSmaller,
    StartsBefore,
    EndsAfter,
}

impl OverlapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapKind::Exact => "exact",
            OverlapKind::NestedBigger => "nested-bigger",
            OverlapKind::NestedSmaller => "nested-smaller",
            OverlapKind::StartsBefore => "starts-before",
            OverlapKind::EndsAfter => "ends-after",
        }
    }

    /// The classification seen from the other entity's side.
    pub fn mirrored(&self) -> OverlapKind {
        match self {
            OverlapKind::Exact => OverlapKind::Exact,
            OverlapKind::NestedBigger => OverlapKind::NestedSmaller,
            OverlapKind::NestedSmaller => OverlapKind::NestedBigger,
            OverlapKind::StartsBefore => OverlapKind::EndsAfter,
            OverlapKind::EndsAfter => OverlapKind::StartsBefore,
        }
    }
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify how `a` sits relative to `b`. `None` when they are disjoint.
pub fn compare_overlap(a: &Entity, b: &Entity) -> Option<OverlapKind> {
    compare_ranges(a.span.first(), b.span.first())
}

/// Same as [`compare_overlap`] on raw `(start, end)` pairs.
pub fn compare_ranges(a: (usize, usize), b: (usize, usize)) -> Option<OverlapKind> {
    let ((a0, a1), (b0, b1)) = (a, b);

    if a0 == b0 && a1 == b1 {
        Some(OverlapKind::Exact)
    } else if a0 <= b0 && a1 >= b1 {
        Some(OverlapKind::NestedBigger)
    } else if a0 >= b0 && a1 <= b1 {
        Some(OverlapKind::NestedSmaller)
    } else if a0 <= b0 && b0 <= a1 && a1 <= b1 {
        Some(OverlapKind::StartsBefore)
    } else if b0 <= a0 && a0 <= b1 && b1 <= a1 {
        Some(OverlapKind::EndsAfter)
    } else {
        None
    }
}

impl Entity {
    pub fn compare_overlap(&self, other: &Entity) -> Option<OverlapKind> {
        compare_overlap(self, other)
    }
}
