pub mod compare;
pub mod equiv;
pub mod fingerprint;
pub mod index;
pub mod ir;

// Re-exports — keep the common surface reachable as `ordex::X`
pub use compare::scoped::{comparing, Bound, Chain, Cmp, Keyed, ScopedComparator};
pub use compare::unordered::{compare_unordered, compare_unordered_in};
pub use compare::{compare_text, Comparator, TextCmp, TEXT_CMP};
pub use equiv::{
    check_equivalence, compare_units, units_equivalent, EquivalenceReport, EquivalenceVerdict,
};
pub use fingerprint::{block_fingerprint, unit_fingerprint, Fingerprint};
pub use index::{
    assign_block_positions, block_index, method_index, unit_index, CombinedIndex, LabelIndex,
    LabelLookup, SharedLabelIndex,
};
pub use ir::{
    Annotation, AnnotationElement, AnnotationValue, BinOp, CodeBlock, CodeUnit, Cond, Handler,
    Insn, Label, Method,
};
