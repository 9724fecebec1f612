//! Position assignment: the traversal phase that gives labels an identity
//! that survives independent decodes.
//!
//! Walking a block's instruction stream in order, the n-th `Mark` gets
//! ordinal n. Two independent decodes of the same program mark the same
//! points in the same order, so equivalent jump targets land on equal
//! positions even though their label tokens differ.
//!
//! Hierarchy mirrors the structure that produced the labels: a method's
//! index consults its block index as a child; a unit's index merges every
//! method index.

use std::cell::RefCell;
use std::rc::Rc;

use crate::index::{LabelIndex, SharedLabelIndex};
use crate::ir::{CodeBlock, CodeUnit, Insn, Method};

/// Record each label marker's ordinal into `index`.
///
/// Uses `put_if_unknown`, so a label that is marked twice — or already known
/// to an ancestor scope — keeps its first-assigned position.
pub fn assign_block_positions(block: &CodeBlock, index: &mut LabelIndex) {
    let mut ordinal = 0u32;
    for insn in &block.insns {
        if let Insn::Mark(label) = insn {
            index.put_if_unknown(*label, ordinal);
            ordinal += 1;
        }
    }
}

/// Build a fresh index for one block.
pub fn block_index(block: &CodeBlock) -> LabelIndex {
    let mut index = LabelIndex::new();
    assign_block_positions(block, &mut index);
    index
}

/// Build a method-scope index. The block's index is attached as a live
/// child, so the method scope resolves block labels by delegation.
pub fn method_index(method: &Method) -> SharedLabelIndex {
    let scope = LabelIndex::shared();
    if let Some(code) = &method.code {
        let child = Rc::new(RefCell::new(block_index(code)));
        scope.borrow_mut().add_child(child);
    }
    scope
}

/// Build a unit-scope index by merging every method scope.
pub fn unit_index(unit: &CodeUnit) -> SharedLabelIndex {
    let scope = LabelIndex::shared();
    for method in &unit.methods {
        let method_scope = method_index(method);
        scope.borrow_mut().merge_with(&method_scope.borrow());
    }
    scope
}

// ─── Tests ────────────────────────────────────────────────────────
