//! Context-threading comparators.
//!
//! Branch targets inside two independently decoded structures cannot be
//! compared by identity — only by the position each one resolves to through
//! a `LabelLookup` built during a prior traversal. Rather than resolving
//! targets eagerly, the lookup is threaded through the comparison itself:
//! a `ScopedComparator` receives the scope on every call, and composition
//! passes the same scope instance through every stage unchanged. The scope
//! is read-only for the duration of one comparison; only the traversal phase
//! that built it mutates it.
//!
//! The two comparator flavors — context-free and context-aware — are a
//! tagged variant (`Cmp`), so combinators dispatch by exhaustive match
//! instead of any runtime capability check.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::compare::Comparator;
use crate::index::LabelLookup;

// ─── Scoped Comparator ────────────────────────────────────────────

/// A comparator whose verdict may depend on a label lookup supplied per
/// call.
///
/// Implementors write `compare_values_in` for the non-null case; the
/// provided `compare_in` applies the family's null policy first.
pub trait ScopedComparator<T: ?Sized> {
    fn compare_values_in(&self, a: &T, b: &T, scope: &dyn LabelLookup) -> Ordering;

    fn compare_in(&self, a: Option<&T>, b: Option<&T>, scope: &dyn LabelLookup) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => self.compare_values_in(a, b, scope),
        }
    }
}

// ─── Tagged Flavor ────────────────────────────────────────────────

/// Either comparator flavor, usable wherever a context-aware comparator is
/// expected. A `Free` comparator in a scoped position simply ignores the
/// scope.
pub enum Cmp<'c, T: ?Sized> {
    Free(&'c dyn Comparator<T>),
    Scoped(&'c dyn ScopedComparator<T>),
}

impl<'c, T: ?Sized> Clone for Cmp<'c, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, T: ?Sized> Copy for Cmp<'c, T> {}

impl<'c, T: ?Sized> Cmp<'c, T> {
    pub fn compare_values_in(&self, a: &T, b: &T, scope: &dyn LabelLookup) -> Ordering {
        match self {
            Cmp::Free(cmp) => cmp.compare_values(a, b),
            Cmp::Scoped(cmp) => cmp.compare_values_in(a, b, scope),
        }
    }

    pub fn compare_in(&self, a: Option<&T>, b: Option<&T>, scope: &dyn LabelLookup) -> Ordering {
        match self {
            Cmp::Free(cmp) => cmp.compare(a, b),
            Cmp::Scoped(cmp) => cmp.compare_in(a, b, scope),
        }
    }

    /// Compose: this comparator first; on a tie, `next`. One scope instance
    /// threads through both stages.
    pub fn then(self, next: Cmp<'c, T>) -> Chain<'c, T> {
        Chain {
            first: self,
            second: next,
        }
    }
}

// ─── Chaining ─────────────────────────────────────────────────────

/// "Compare by A, then by B" with the scope threaded through both stages.
pub struct Chain<'c, T: ?Sized> {
    first: Cmp<'c, T>,
    second: Cmp<'c, T>,
}

impl<'c, T: ?Sized> ScopedComparator<T> for Chain<'c, T> {
    fn compare_values_in(&self, a: &T, b: &T, scope: &dyn LabelLookup) -> Ordering {
        let ord = self.first.compare_values_in(a, b, scope);
        if ord != Ordering::Equal {
            return ord;
        }
        self.second.compare_values_in(a, b, scope)
    }
}

// ─── Scope Binding ────────────────────────────────────────────────

/// A comparator with one fixed lookup bound at construction, satisfying the
/// context-free capability.
///
/// Binding a `Scoped` comparator hands the bound scope to its real
/// context-aware path on every call; binding a `Free` comparator changes
/// nothing — the scope is simply never consulted. Useful wherever a generic
/// comparator position (a sort call, `compare_unordered`) cannot pass a
/// scope itself.
pub struct Bound<'c, T: ?Sized, L> {
    inner: Cmp<'c, T>,
    scope: L,
}

impl<'c, T: ?Sized, L: LabelLookup> Bound<'c, T, L> {
    pub fn new(inner: Cmp<'c, T>, scope: L) -> Self {
        Self { inner, scope }
    }
}

impl<'c, T: ?Sized, L: LabelLookup> Comparator<T> for Bound<'c, T, L> {
    fn compare_values(&self, a: &T, b: &T) -> Ordering {
        self.inner.compare_values_in(a, b, &self.scope)
    }
}

// ─── Key Extraction ───────────────────────────────────────────────

/// Compare by a derived key.
///
/// Extraction is a pure projection — it never sees the scope; only the key
/// comparator may be context-aware. Extracted keys go through the null
/// policy, so an absent key sorts first.
pub struct Keyed<'c, T, K: ?Sized, F> {
    extract: F,
    key_cmp: Cmp<'c, K>,
    marker: PhantomData<fn(&T, &K)>,
}

impl<'c, T, K: ?Sized, F> ScopedComparator<T> for Keyed<'c, T, K, F>
where
    F: for<'x> Fn(&'x T) -> Option<&'x K>,
{
    fn compare_values_in(&self, a: &T, b: &T, scope: &dyn LabelLookup) -> Ordering {
        self.key_cmp
            .compare_in((self.extract)(a), (self.extract)(b), scope)
    }
}

/// Build a key-extracting comparator.
pub fn comparing<'c, T, K, F>(extract: F, key_cmp: Cmp<'c, K>) -> Keyed<'c, T, K, F>
where
    K: ?Sized,
    F: for<'x> Fn(&'x T) -> Option<&'x K>,
{
    Keyed {
        extract,
        key_cmp,
        marker: PhantomData,
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::TEXT_CMP;
    use crate::index::LabelIndex;
    use crate::ir::Label;

    /// Orders labels by resolved position; unresolved ties.
    struct ByPosition;
    impl ScopedComparator<Label> for ByPosition {
        fn compare_values_in(&self, a: &Label, b: &Label, scope: &dyn LabelLookup) -> Ordering {
            scope.find(*a).cmp(&scope.find(*b))
        }
    }

    /// Context-free comparator that never distinguishes.
    struct TiesAlways;
    impl Comparator<Label> for TiesAlways {
        fn compare_values(&self, _a: &Label, _b: &Label) -> Ordering {
            Ordering::Equal
        }
    }

    fn scope_with(entries: &[(Label, u32)]) -> LabelIndex {
        let mut ix = LabelIndex::new();
        ix.put_all(entries.iter().copied());
        ix
    }

    #[test]
    fn test_free_flavor_ignores_scope() {
        let a = Label::fresh();
        let b = Label::fresh();
        let scope = scope_with(&[(a, 0), (b, 1)]);
        let cmp = Cmp::Free(&TiesAlways);
        assert_eq!(cmp.compare_values_in(&a, &b, &scope), Ordering::Equal);
    }

    #[test]
    fn test_scoped_flavor_uses_scope() {
        let a = Label::fresh();
        let b = Label::fresh();
        let scope = scope_with(&[(a, 0), (b, 1)]);
        let cmp = Cmp::Scoped(&ByPosition);
        assert_eq!(cmp.compare_values_in(&a, &b, &scope), Ordering::Less);
        assert_eq!(cmp.compare_values_in(&b, &a, &scope), Ordering::Greater);
    }

    #[test]
    fn test_null_policy_in_scoped_path() {
        let a = Label::fresh();
        let scope = scope_with(&[(a, 0)]);
        let cmp = Cmp::Scoped(&ByPosition);
        assert_eq!(cmp.compare_in(None, None, &scope), Ordering::Equal);
        assert_eq!(cmp.compare_in(None, Some(&a), &scope), Ordering::Less);
        assert_eq!(cmp.compare_in(Some(&a), None, &scope), Ordering::Greater);
    }

    #[test]
    fn test_chain_first_stage_wins_when_decisive() {
        let a = Label::fresh();
        let b = Label::fresh();
        // First stage orders a before b; second would order b before a.
        let scope = scope_with(&[(a, 0), (b, 1)]);

        struct Reversed;
        impl ScopedComparator<Label> for Reversed {
            fn compare_values_in(
                &self,
                a: &Label,
                b: &Label,
                scope: &dyn LabelLookup,
            ) -> Ordering {
                scope.find(*b).cmp(&scope.find(*a))
            }
        }

        let chain = Cmp::Scoped(&ByPosition).then(Cmp::Scoped(&Reversed));
        assert_eq!(chain.compare_values_in(&a, &b, &scope), Ordering::Less);
    }

    #[test]
    fn test_chain_threads_scope_to_second_stage() {
        let a = Label::fresh();
        let b = Label::fresh();
        // Entry present for `a` only; second stage distinguishes purely via
        // the lookup.
        let scope = scope_with(&[(a, 0)]);

        let chain = Cmp::Free(&TiesAlways).then(Cmp::Scoped(&ByPosition));
        let direct = ByPosition.compare_values_in(&a, &b, &scope);
        assert_eq!(chain.compare_values_in(&a, &b, &scope), direct);
        assert_ne!(direct, Ordering::Equal);
    }

    #[test]
    fn test_chain_ties_when_both_stages_tie() {
        let a = Label::fresh();
        let b = Label::fresh();
        let scope = LabelIndex::new();
        let chain = Cmp::Free(&TiesAlways).then(Cmp::Scoped(&ByPosition));
        // Both unresolved: second stage ties too.
        assert_eq!(chain.compare_values_in(&a, &b, &scope), Ordering::Equal);
    }

    #[test]
    fn test_bound_scoped_comparator_uses_bound_scope() {
        let a = Label::fresh();
        let b = Label::fresh();
        let scope = scope_with(&[(a, 1), (b, 0)]);
        let bound = Bound::new(Cmp::Scoped(&ByPosition), scope);
        assert_eq!(bound.compare_values(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_bound_free_comparator_ignores_bound_scope() {
        let a = Label::fresh();
        let b = Label::fresh();
        let scope = scope_with(&[(a, 1), (b, 0)]);
        let bound = Bound::new(Cmp::Free(&TiesAlways), scope);
        assert_eq!(bound.compare_values(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_comparing_projects_then_compares() {
        struct Named {
            name: Option<String>,
        }
        fn name_of(n: &Named) -> Option<&str> {
            n.name.as_deref()
        }

        let keyed = comparing(name_of, Cmp::Free(&TEXT_CMP));
        let scope = LabelIndex::new();

        let alpha = Named {
            name: Some("alpha".to_string()),
        };
        let beta = Named {
            name: Some("beta".to_string()),
        };
        let anon = Named { name: None };

        assert_eq!(
            keyed.compare_values_in(&alpha, &beta, &scope),
            Ordering::Less
        );
        assert_eq!(
            keyed.compare_values_in(&beta, &alpha, &scope),
            Ordering::Greater
        );
        // Absent key sorts first.
        assert_eq!(keyed.compare_values_in(&anon, &alpha, &scope), Ordering::Less);
        assert_eq!(keyed.compare_values_in(&anon, &anon, &scope), Ordering::Equal);
    }
}
