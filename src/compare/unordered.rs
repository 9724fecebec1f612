//! Order-insensitive sequence comparison.
//!
//! Some child collections of a decoded unit — annotation sets, exception
//! handler tables, method lists — may legitimately be reordered by
//! independent encodings of equivalent programs. These are compared as
//! unordered multisets: sort both sides into canonical order under the
//! element comparator, then walk pairwise.
//!
//! Because the element comparator is total and consistent, the sorted form
//! is a unique representative of the multiset, which reduces what would be a
//! quadratic assignment problem to a sort plus a linear walk. Duplicates are
//! handled for free: values, not positions, determine sort order, so equal
//! duplicates pair up and contribute ties.

use std::cmp::Ordering;

use crate::compare::scoped::Cmp;
use crate::compare::Comparator;
use crate::index::LabelLookup;

/// Compare two optional sequences as unordered multisets.
///
/// Null policy applies to the sequence references themselves; a length
/// difference short-circuits with the sign of the difference before any
/// element work. Neither input is mutated.
pub fn compare_unordered<T>(
    a: Option<&[T]>,
    b: Option<&[T]>,
    cmp: &dyn Comparator<T>,
) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }

    let mut sorted_a: Vec<&T> = a.iter().collect();
    let mut sorted_b: Vec<&T> = b.iter().collect();
    sorted_a.sort_by(|x, y| cmp.compare_values(x, y));
    sorted_b.sort_by(|x, y| cmp.compare_values(x, y));

    for (x, y) in sorted_a.iter().zip(&sorted_b) {
        let ord = cmp.compare_values(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// `compare_unordered` with a context-threaded element comparator. The same
/// `scope` instance is passed to every element comparison, canonical sort
/// included.
pub fn compare_unordered_in<T>(
    a: Option<&[T]>,
    b: Option<&[T]>,
    cmp: Cmp<'_, T>,
    scope: &dyn LabelLookup,
) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }

    let mut sorted_a: Vec<&T> = a.iter().collect();
    let mut sorted_b: Vec<&T> = b.iter().collect();
    sorted_a.sort_by(|x, y| cmp.compare_values_in(x, y, scope));
    sorted_b.sort_by(|x, y| cmp.compare_values_in(x, y, scope));

    for (x, y) in sorted_a.iter().zip(&sorted_b) {
        let ord = cmp.compare_values_in(x, y, scope);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

// ─── Tests ────────────────────────────────────────────────────────
