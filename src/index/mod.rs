//! Label index: hierarchical resolution of branch-target tokens to stable
//! positions.
//!
//! A `LabelIndex` maps opaque `Label` tokens to the integer positions a
//! prior traversal assigned them (see `assign`). Indices form a fallback
//! graph: a miss in the local map consults each child in insertion order.
//! Children are shared (`Rc<RefCell<_>>`) — adding a child creates a live
//! edge, and lookups always see the child's current state, while
//! `merge_with` is a one-time flatten-and-copy. The two are deliberately
//! separate operations; conflating them would silently change when mutations
//! become visible.
//!
//! Everything here is single-threaded. The intended lifecycle is one
//! traversal phase that mutates the index, then a comparison phase that only
//! reads it.

pub mod assign;
pub mod combined;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ir::Label;

pub use assign::{assign_block_positions, block_index, method_index, unit_index};
pub use combined::CombinedIndex;

// ─── Lookup Seam ──────────────────────────────────────────────────

/// Read-only resolution of a label to its assigned position.
///
/// Absence is a defined outcome, not an error: a label may simply not be
/// known to this lookup or any of its fallbacks.
pub trait LabelLookup {
    fn find(&self, label: Label) -> Option<u32>;
}

// ─── LabelIndex ───────────────────────────────────────────────────

/// A shared, mutable handle to a `LabelIndex`.
pub type SharedLabelIndex = Rc<RefCell<LabelIndex>>;

/// Hierarchical label-to-position mapping with fallback children.
#[derive(Clone, Debug, Default)]
pub struct LabelIndex {
    labels: HashMap<Label, u32>,
    children: Vec<SharedLabelIndex>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// New empty index behind a shared handle.
    pub fn shared() -> SharedLabelIndex {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Resolve `label`: local map first, then each child in insertion order,
    /// first definite hit wins.
    pub fn find(&self, label: Label) -> Option<u32> {
        if let Some(&pos) = self.labels.get(&label) {
            return Some(pos);
        }
        self.children
            .iter()
            .find_map(|child| child.borrow().find(label))
    }

    /// Bulk-insert entries into the local map. Last writer wins for keys
    /// present in `entries`.
    pub fn put_all(&mut self, entries: impl IntoIterator<Item = (Label, u32)>) {
        self.labels.extend(entries);
    }

    /// Insert `label -> pos` locally, unless the label already resolves
    /// anywhere in the reachable graph. First writer wins across the merge
    /// graph: a later coincidental re-discovery never overwrites the
    /// first-assigned position.
    pub fn put_if_unknown(&mut self, label: Label, pos: u32) {
        if self.find(label).is_none() {
            self.labels.insert(label, pos);
        }
    }

    /// Flattened view of every reachable entry, honoring `find` precedence:
    /// local entries win over children, earlier children over later ones.
    pub fn all_label_indices(&self) -> HashMap<Label, u32> {
        let mut all = HashMap::new();
        for child in self.children.iter().rev() {
            all.extend(child.borrow().all_label_indices());
        }
        all.extend(self.labels.iter().map(|(&label, &pos)| (label, pos)));
        all
    }

    /// Drop every local entry. Children and object identity are untouched,
    /// so an index can be recycled across repeated traversals.
    pub fn clear_label_indices(&mut self) {
        self.labels.clear();
    }

    /// Append `child` as an additional source consulted on local miss.
    ///
    /// The edge is live: the child remains shared with its original owner,
    /// both sides may keep mutating it, and lookups through this index see
    /// its current state.
    pub fn add_child(&mut self, child: SharedLabelIndex) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[SharedLabelIndex] {
        &self.children
    }

    /// Drop every child edge. Local entries are untouched.
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// One-time merge: copy `other`'s flattened entries into the local map
    /// (last writer wins, as `put_all`) and append `other`'s direct children
    /// as additional fallbacks. Later mutations of `other`'s own local map
    /// are not reflected here — use `add_child` for live sharing.
    pub fn merge_with(&mut self, other: &LabelIndex) {
        self.put_all(other.all_label_indices());
        self.children.extend(other.children.iter().cloned());
    }
}

impl LabelLookup for LabelIndex {
    fn find(&self, label: Label) -> Option<u32> {
        LabelIndex::find(self, label)
    }
}

impl LabelLookup for SharedLabelIndex {
    fn find(&self, label: Label) -> Option<u32> {
        self.borrow().find(label)
    }
}

// ─── Tests ────────────────────────────────────────────────────────
