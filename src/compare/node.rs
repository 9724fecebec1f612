//! Default comparators, one per decoded-node type.
//!
//! Each comparator is a stateless unit struct with a reusable `const`
//! instance. Anything that can contain a branch target is context-aware;
//! annotation trees are label-free and stay context-free. Unordered child
//! collections (annotation sets, handler tables, method lists) go through
//! the order-insensitive comparator; instruction streams compare pairwise in
//! stream order.

use std::cmp::Ordering;

use crate::compare::scoped::{comparing, Cmp, ScopedComparator};
use crate::compare::unordered::{compare_unordered, compare_unordered_in};
use crate::compare::{compare_text, Comparator, TEXT_CMP};
use crate::index::LabelLookup;
use crate::ir::{
    Annotation, AnnotationElement, AnnotationValue, CodeBlock, CodeUnit, Handler, Insn, Label,
    Method,
};

// ─── Branch Targets ───────────────────────────────────────────────

/// Orders branch targets by resolved position.
///
/// A target that resolves sorts before one that does not; two unresolved
/// targets are indistinguishable (identity tokens carry no order of their
/// own) and tie.
pub struct TargetCmp;

pub const TARGET_CMP: TargetCmp = TargetCmp;

impl ScopedComparator<Label> for TargetCmp {
    fn compare_values_in(&self, a: &Label, b: &Label, scope: &dyn LabelLookup) -> Ordering {
        match (scope.find(*a), scope.find(*b)) {
            (Some(pa), Some(pb)) => pa.cmp(&pb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// ─── Annotation Values ────────────────────────────────────────────

/// Orders annotation values: variant kind first, then payload. Arrays
/// compare element-wise in order (annotation arrays are ordered).
pub struct ValueCmp;

pub const VALUE_CMP: ValueCmp = ValueCmp;

fn value_rank(value: &AnnotationValue) -> u8 {
    match value {
        AnnotationValue::Int(_) => 0,
        AnnotationValue::Text(_) => 1,
        AnnotationValue::Type(_) => 2,
        AnnotationValue::Nested(_) => 3,
        AnnotationValue::Array(_) => 4,
    }
}

impl Comparator<AnnotationValue> for ValueCmp {
    fn compare_values(&self, a: &AnnotationValue, b: &AnnotationValue) -> Ordering {
        use AnnotationValue::*;
        match (a, b) {
            (Int(x), Int(y)) => x.cmp(y),
            (Text(x), Text(y)) => x.cmp(y),
            (Type(x), Type(y)) => x.cmp(y),
            (Nested(x), Nested(y)) => ANNOTATION_CMP.compare_values(x, y),
            (Array(x), Array(y)) => {
                let ord = x.len().cmp(&y.len());
                if ord != Ordering::Equal {
                    return ord;
                }
                for (xv, yv) in x.iter().zip(y) {
                    let ord = self.compare_values(xv, yv);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }
            _ => value_rank(a).cmp(&value_rank(b)),
        }
    }
}

/// Orders annotation elements by name, then value.
pub struct ElementCmp;

pub const ELEMENT_CMP: ElementCmp = ElementCmp;

impl Comparator<AnnotationElement> for ElementCmp {
    fn compare_values(&self, a: &AnnotationElement, b: &AnnotationElement) -> Ordering {
        let ord = a.name.cmp(&b.name);
        if ord != Ordering::Equal {
            return ord;
        }
        VALUE_CMP.compare_values(&a.value, &b.value)
    }
}

/// Orders annotations by type name, then by their element sets (unordered).
pub struct AnnotationCmp;

pub const ANNOTATION_CMP: AnnotationCmp = AnnotationCmp;

impl Comparator<Annotation> for AnnotationCmp {
    fn compare_values(&self, a: &Annotation, b: &Annotation) -> Ordering {
        let ord = a.ty.cmp(&b.ty);
        if ord != Ordering::Equal {
            return ord;
        }
        compare_unordered(Some(&a.elements), Some(&b.elements), &ELEMENT_CMP)
    }
}

// ─── Exception Handlers ───────────────────────────────────────────

/// Orders handlers by catch type (catch-all sorts first), then protected
/// range, then handler target — ranges and targets by resolved position.
pub struct HandlerCmp;

pub const HANDLER_CMP: HandlerCmp = HandlerCmp;

impl ScopedComparator<Handler> for HandlerCmp {
    fn compare_values_in(&self, a: &Handler, b: &Handler, scope: &dyn LabelLookup) -> Ordering {
        let ord = compare_text(a.catch_type.as_deref(), b.catch_type.as_deref());
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = TARGET_CMP.compare_values_in(&a.start, &b.start, scope);
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = TARGET_CMP.compare_values_in(&a.end, &b.end, scope);
        if ord != Ordering::Equal {
            return ord;
        }
        TARGET_CMP.compare_values_in(&a.target, &b.target, scope)
    }
}

// ─── Instructions ─────────────────────────────────────────────────

/// Orders instructions: opcode kind first, then fields, with every branch
/// target resolved through the threaded scope.
pub struct InsnCmp;

pub const INSN_CMP: InsnCmp = InsnCmp;

fn insn_rank(insn: &Insn) -> u8 {
    match insn {
        Insn::Nop => 0,
        Insn::Mark(_) => 1,
        Insn::Const { .. } => 2,
        Insn::Move { .. } => 3,
        Insn::BinOp { .. } => 4,
        Insn::Jump { .. } => 5,
        Insn::Branch { .. } => 6,
        Insn::Switch { .. } => 7,
        Insn::Invoke { .. } => 8,
        Insn::Return { .. } => 9,
        Insn::Throw { .. } => 10,
    }
}

impl ScopedComparator<Insn> for InsnCmp {
    fn compare_values_in(&self, a: &Insn, b: &Insn, scope: &dyn LabelLookup) -> Ordering {
        use Insn::*;
        match (a, b) {
            (Nop, Nop) => Ordering::Equal,
            (Mark(x), Mark(y)) => TARGET_CMP.compare_values_in(x, y, scope),
            (
                Const { reg: r1, value: v1 },
                Const { reg: r2, value: v2 },
            ) => r1.cmp(r2).then(v1.cmp(v2)),
            (
                Move { dst: d1, src: s1 },
                Move { dst: d2, src: s2 },
            ) => d1.cmp(d2).then(s1.cmp(s2)),
            (
                BinOp {
                    op: o1,
                    dst: d1,
                    lhs: l1,
                    rhs: r1,
                },
                BinOp {
                    op: o2,
                    dst: d2,
                    lhs: l2,
                    rhs: r2,
                },
            ) => o1
                .cmp(o2)
                .then(d1.cmp(d2))
                .then(l1.cmp(l2))
                .then(r1.cmp(r2)),
            (Jump { target: t1 }, Jump { target: t2 }) => {
                TARGET_CMP.compare_values_in(t1, t2, scope)
            }
            (
                Branch {
                    cond: c1,
                    reg: r1,
                    target: t1,
                },
                Branch {
                    cond: c2,
                    reg: r2,
                    target: t2,
                },
            ) => {
                let ord = c1.cmp(c2).then(r1.cmp(r2));
                if ord != Ordering::Equal {
                    return ord;
                }
                TARGET_CMP.compare_values_in(t1, t2, scope)
            }
            (
                Switch {
                    reg: r1,
                    targets: t1,
                },
                Switch {
                    reg: r2,
                    targets: t2,
                },
            ) => {
                let ord = r1.cmp(r2).then(t1.len().cmp(&t2.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
                // Switch tables are ordered within one decode.
                for ((v1, l1), (v2, l2)) in t1.iter().zip(t2) {
                    let ord = v1.cmp(v2);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    let ord = TARGET_CMP.compare_values_in(l1, l2, scope);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            }
            (
                Invoke {
                    method: m1,
                    args: a1,
                },
                Invoke {
                    method: m2,
                    args: a2,
                },
            ) => m1.cmp(m2).then(a1.cmp(a2)),
            (Return { reg: r1 }, Return { reg: r2 }) => r1.cmp(r2),
            (Throw { reg: r1 }, Throw { reg: r2 }) => r1.cmp(r2),
            _ => insn_rank(a).cmp(&insn_rank(b)),
        }
    }
}

// ─── Code Blocks ──────────────────────────────────────────────────

/// Orders blocks: register budget, then the instruction stream pairwise in
/// order, then the handler set (unordered).
pub struct BlockCmp;

pub const BLOCK_CMP: BlockCmp = BlockCmp;

impl ScopedComparator<CodeBlock> for BlockCmp {
    fn compare_values_in(&self, a: &CodeBlock, b: &CodeBlock, scope: &dyn LabelLookup) -> Ordering {
        let ord = a.registers.cmp(&b.registers);
        if ord != Ordering::Equal {
            return ord;
        }
        let ord = a.insns.len().cmp(&b.insns.len());
        if ord != Ordering::Equal {
            return ord;
        }
        for (x, y) in a.insns.iter().zip(&b.insns) {
            let ord = INSN_CMP.compare_values_in(x, y, scope);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        compare_unordered_in(
            Some(&a.handlers),
            Some(&b.handlers),
            Cmp::Scoped(&HANDLER_CMP),
            scope,
        )
    }
}

// ─── Methods ──────────────────────────────────────────────────────

/// Orders methods: name, then annotation set (unordered), then body
/// (absent body sorts first).
pub struct MethodCmp;

pub const METHOD_CMP: MethodCmp = MethodCmp;

fn method_name(method: &Method) -> Option<&str> {
    Some(&method.name)
}

struct MethodAnnotationsCmp;
impl Comparator<Method> for MethodAnnotationsCmp {
    fn compare_values(&self, a: &Method, b: &Method) -> Ordering {
        compare_unordered(Some(&a.annotations), Some(&b.annotations), &ANNOTATION_CMP)
    }
}

struct MethodCodeCmp;
impl ScopedComparator<Method> for MethodCodeCmp {
    fn compare_values_in(&self, a: &Method, b: &Method, scope: &dyn LabelLookup) -> Ordering {
        Cmp::Scoped(&BLOCK_CMP).compare_in(a.code.as_ref(), b.code.as_ref(), scope)
    }
}

impl ScopedComparator<Method> for MethodCmp {
    fn compare_values_in(&self, a: &Method, b: &Method, scope: &dyn LabelLookup) -> Ordering {
        let by_name = comparing(method_name, Cmp::Free(&TEXT_CMP));
        let head = Cmp::Scoped(&by_name).then(Cmp::Free(&MethodAnnotationsCmp));
        let full = Cmp::Scoped(&head).then(Cmp::Scoped(&MethodCodeCmp));
        full.compare_values_in(a, b, scope)
    }
}

// ─── Units ────────────────────────────────────────────────────────

/// Orders units: name, then annotation set (unordered), then method set
/// (unordered).
pub struct UnitCmp;

pub const UNIT_CMP: UnitCmp = UnitCmp;

fn unit_name(unit: &CodeUnit) -> Option<&str> {
    Some(&unit.name)
}

struct UnitAnnotationsCmp;
impl Comparator<CodeUnit> for UnitAnnotationsCmp {
    fn compare_values(&self, a: &CodeUnit, b: &CodeUnit) -> Ordering {
        compare_unordered(Some(&a.annotations), Some(&b.annotations), &ANNOTATION_CMP)
    }
}

struct UnitMethodsCmp;
impl ScopedComparator<CodeUnit> for UnitMethodsCmp {
    fn compare_values_in(&self, a: &CodeUnit, b: &CodeUnit, scope: &dyn LabelLookup) -> Ordering {
        compare_unordered_in(
            Some(&a.methods),
            Some(&b.methods),
            Cmp::Scoped(&METHOD_CMP),
            scope,
        )
    }
}

impl ScopedComparator<CodeUnit> for UnitCmp {
    fn compare_values_in(&self, a: &CodeUnit, b: &CodeUnit, scope: &dyn LabelLookup) -> Ordering {
        let by_name = comparing(unit_name, Cmp::Free(&TEXT_CMP));
        let head = Cmp::Scoped(&by_name).then(Cmp::Free(&UnitAnnotationsCmp));
        let full = Cmp::Scoped(&head).then(Cmp::Scoped(&UnitMethodsCmp));
        full.compare_values_in(a, b, scope)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
