//! Structural equivalence checking for decoded code units.
//!
//! Given two independently decoded units, decides whether they are
//! structurally equivalent — same members, same annotations, same control
//! flow — even though their branch-target tokens differ and their unordered
//! collections may be permuted. Two stages:
//! 1. Content fingerprint comparison (cheap equality fast path)
//! 2. Full comparator walk (total order, also the authority on direction)
//!
//! The checker builds one label scope per side from a position-assigning
//! traversal, combines them, and threads the combined scope through the
//! whole comparator chain.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::compare::node::UNIT_CMP;
use crate::compare::scoped::ScopedComparator;
use crate::fingerprint::unit_fingerprint;
use crate::index::{unit_index, CombinedIndex};
use crate::ir::CodeUnit;

// ─── Result Types ──────────────────────────────────────────────────

/// Verdict of an equivalence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EquivalenceVerdict {
    /// Structurally equivalent.
    Equivalent,
    /// Not equivalent; the first unit orders before the second.
    OrderedBefore,
    /// Not equivalent; the first unit orders after the second.
    OrderedAfter,
}

impl fmt::Display for EquivalenceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquivalenceVerdict::Equivalent => write!(f, "EQUIVALENT"),
            EquivalenceVerdict::OrderedBefore => write!(f, "ORDERED BEFORE"),
            EquivalenceVerdict::OrderedAfter => write!(f, "ORDERED AFTER"),
        }
    }
}

/// Result of an equivalence check.
#[derive(Clone, Debug, Serialize)]
pub struct EquivalenceReport {
    /// The two unit names being compared.
    pub unit_a: String,
    pub unit_b: String,
    pub verdict: EquivalenceVerdict,
    /// Stage that decided the verdict.
    pub method: String,
}

impl fmt::Display for EquivalenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {}: {} ({})",
            self.unit_a, self.unit_b, self.verdict, self.method
        )
    }
}

// ─── Entry Points ──────────────────────────────────────────────────

/// Total structural order over two decoded units.
///
/// Builds each side's label scope, combines them, and runs the default unit
/// comparator with the combined scope threaded through every stage.
pub fn compare_units(a: &CodeUnit, b: &CodeUnit) -> Ordering {
    let scope = combined_scope(a, b);
    UNIT_CMP.compare_values_in(a, b, &scope)
}

/// Structural equivalence of two decoded units.
pub fn units_equivalent(a: &CodeUnit, b: &CodeUnit) -> bool {
    check_equivalence(a, b).verdict == EquivalenceVerdict::Equivalent
}

/// Check equivalence, reporting which stage decided.
pub fn check_equivalence(a: &CodeUnit, b: &CodeUnit) -> EquivalenceReport {
    let scope = combined_scope(a, b);

    // Stage 1: fingerprint fast path.
    if unit_fingerprint(a, &scope) == unit_fingerprint(b, &scope) {
        return EquivalenceReport {
            unit_a: a.name.clone(),
            unit_b: b.name.clone(),
            verdict: EquivalenceVerdict::Equivalent,
            method: "content fingerprint".to_string(),
        };
    }

    // Stage 2: full structural comparison.
    let verdict = match UNIT_CMP.compare_values_in(a, b, &scope) {
        Ordering::Equal => EquivalenceVerdict::Equivalent,
        Ordering::Less => EquivalenceVerdict::OrderedBefore,
        Ordering::Greater => EquivalenceVerdict::OrderedAfter,
    };
    EquivalenceReport {
        unit_a: a.name.clone(),
        unit_b: b.name.clone(),
        verdict,
        method: "structural comparison".to_string(),
    }
}

/// One scope resolving labels from both sides.
fn combined_scope(a: &CodeUnit, b: &CodeUnit) -> CombinedIndex {
    let mut scope = CombinedIndex::new();
    scope.register(unit_index(a));
    scope.register(unit_index(b));
    scope
}

// ─── Tests ─────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::BlockBuilder;
    use crate::ir::{Annotation, BinOp, Cond, Label, Method};

    /// Build a countdown unit the way one decode pass would, with fresh
    /// labels throughout.
    fn countdown_unit(name: &str) -> CodeUnit {
        let head = Label::fresh();
        let exit = Label::fresh();
        let mut b = BlockBuilder::new();
        b.registers(2)
            .const_(0, 10)
            .const_(1, 1)
            .mark(head)
            .branch(Cond::Eq, 0, exit)
            .binop(BinOp::Sub, 0, 0, 1)
            .jump(head)
            .mark(exit)
            .ret(None);
        CodeUnit {
            name: name.to_string(),
            annotations: vec![Annotation {
                ty: "Generated".to_string(),
                elements: Vec::new(),
            }],
            methods: vec![Method {
                name: "countdown".to_string(),
                annotations: Vec::new(),
                code: Some(b.finish().unwrap()),
            }],
        }
    }

    #[test]
    fn test_independent_decodes_are_equivalent() {
        let a = countdown_unit("U");
        let b = countdown_unit("U");
        assert_eq!(compare_units(&a, &b), Ordering::Equal);
        assert!(units_equivalent(&a, &b));
    }

    #[test]
    fn test_fingerprint_fast_path_reported() {
        let a = countdown_unit("U");
        let b = countdown_unit("U");
        let report = check_equivalence(&a, &b);
        assert_eq!(report.verdict, EquivalenceVerdict::Equivalent);
        assert!(report.method.contains("fingerprint"));
    }

    #[test]
    fn test_different_names_order_lexicographically() {
        let a = countdown_unit("Alpha");
        let b = countdown_unit("Beta");
        assert_eq!(compare_units(&a, &b), Ordering::Less);
        assert_eq!(compare_units(&b, &a), Ordering::Greater);

        let report = check_equivalence(&a, &b);
        assert_eq!(report.verdict, EquivalenceVerdict::OrderedBefore);
        assert!(report.method.contains("structural"));
    }

    #[test]
    fn test_changed_branch_shape_not_equivalent() {
        let a = countdown_unit("U");
        let mut b = countdown_unit("U");
        // Flip the loop exit condition.
        let code = b.methods[0].code.as_mut().unwrap();
        for insn in &mut code.insns {
            if let crate::ir::Insn::Branch { cond, .. } = insn {
                *cond = Cond::Ne;
            }
        }
        assert_ne!(compare_units(&a, &b), Ordering::Equal);
        assert!(!units_equivalent(&a, &b));
    }

    #[test]
    fn test_comparison_is_antisymmetric() {
        let a = countdown_unit("U");
        let mut b = countdown_unit("U");
        b.methods[0].name = "countdown2".to_string();
        let ab = compare_units(&a, &b);
        let ba = compare_units(&b, &a);
        assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn test_report_display() {
        let a = countdown_unit("U");
        let b = countdown_unit("U");
        let report = check_equivalence(&a, &b);
        let text = format!("{}", report);
        assert!(text.contains("EQUIVALENT"));
        assert!(text.contains("U vs U"));
    }
}
