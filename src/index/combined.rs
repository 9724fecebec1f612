//! First-hit facade over several label indices.
//!
//! A comparison sometimes has to resolve labels that originate from more
//! than one independently built scope (two units compared jointly, each with
//! its own index hierarchy). `CombinedIndex` presents those sources as one
//! lookup: members are tried in registration order, the first definite hit
//! wins, and a total miss is the same defined outcome as a single-index
//! miss.

use crate::index::{LabelLookup, SharedLabelIndex};
use crate::ir::Label;

/// Registration-ordered collection of lookup sources. Read-only after
/// registration — the facade itself never mutates its members.
#[derive(Clone, Debug, Default)]
pub struct CombinedIndex {
    sources: Vec<SharedLabelIndex>,
}

impl CombinedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: Vec<SharedLabelIndex>) -> Self {
        Self { sources }
    }

    /// Append a source consulted after every earlier registration.
    pub fn register(&mut self, source: SharedLabelIndex) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[SharedLabelIndex] {
        &self.sources
    }
}

impl LabelLookup for CombinedIndex {
    fn find(&self, label: Label) -> Option<u32> {
        self.sources
            .iter()
            .find_map(|source| source.borrow().find(label))
    }
}

// ─── Tests ────────────────────────────────────────────────────────
