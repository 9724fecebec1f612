//! Programmatic construction of decoded code blocks.
//!
//! `BlockBuilder` assembles an instruction stream the way a decoder would
//! emit it: labels are allocated up front with `Label::fresh()`, marked into
//! the stream where they land, and referenced from jumps, branches, and
//! handlers. `finish()` validates that every referenced target was actually
//! marked — a block that jumps to a label that never appears in the stream is
//! invalid input, not a comparable structure.


use std::collections::HashSet;
use std::fmt;

use super::{BinOp, CodeBlock, Cond, Handler, Insn, Label};

// ─── Errors ───────────────────────────────────────────────────────

/// A structurally invalid block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A jump, branch, switch, or handler references a label that is never
    /// marked in the instruction stream.
    UnmarkedTarget(Label),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnmarkedTarget(label) => {
                write!(f, "target {} is never marked in the instruction stream", label)
            }
        }
    }
}

impl std::error::Error for BuildError {}

// ─── BlockBuilder ─────────────────────────────────────────────────

/// Builds a `CodeBlock` instruction by instruction.
#[derive(Default)]
pub struct BlockBuilder {
    registers: u16,
    insns: Vec<Insn>,
    handlers: Vec<Handler>,
    marked: HashSet<Label>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the register budget for the finished block.
    pub fn registers(&mut self, n: u16) -> &mut Self {
        self.registers = n;
        self
    }

    /// Append an arbitrary instruction.
    pub fn push(&mut self, insn: Insn) -> &mut Self {
        if let Insn::Mark(label) = insn {
            self.marked.insert(label);
        }
        self.insns.push(insn);
        self
    }

    // ── Emit helpers ──────────────────────────────────────────────

    /// Define `label` at the current stream position.
    pub fn mark(&mut self, label: Label) -> &mut Self {
        self.push(Insn::Mark(label))
    }

    pub fn nop(&mut self) -> &mut Self {
        self.push(Insn::Nop)
    }

    pub fn const_(&mut self, reg: u16, value: i64) -> &mut Self {
        self.push(Insn::Const { reg, value })
    }

    pub fn mov(&mut self, dst: u16, src: u16) -> &mut Self {
        self.push(Insn::Move { dst, src })
    }

    pub fn binop(&mut self, op: BinOp, dst: u16, lhs: u16, rhs: u16) -> &mut Self {
        self.push(Insn::BinOp { op, dst, lhs, rhs })
    }

    pub fn jump(&mut self, target: Label) -> &mut Self {
        self.push(Insn::Jump { target })
    }

    pub fn branch(&mut self, cond: Cond, reg: u16, target: Label) -> &mut Self {
        self.push(Insn::Branch { cond, reg, target })
    }

    pub fn switch(&mut self, reg: u16, targets: Vec<(i64, Label)>) -> &mut Self {
        self.push(Insn::Switch { reg, targets })
    }

    pub fn invoke(&mut self, method: &str, args: Vec<u16>) -> &mut Self {
        self.push(Insn::Invoke {
            method: method.to_string(),
            args,
        })
    }

    pub fn ret(&mut self, reg: Option<u16>) -> &mut Self {
        self.push(Insn::Return { reg })
    }

    pub fn throw(&mut self, reg: u16) -> &mut Self {
        self.push(Insn::Throw { reg })
    }

    /// Register an exception handler over the `start..end` label range.
    pub fn handler(
        &mut self,
        start: Label,
        end: Label,
        catch_type: Option<&str>,
        target: Label,
    ) -> &mut Self {
        self.handlers.push(Handler {
            start,
            end,
            catch_type: catch_type.map(str::to_string),
            target,
        });
        self
    }

    // ── Finish ────────────────────────────────────────────────────

    /// Validate target references and produce the block.
    pub fn finish(self) -> Result<CodeBlock, BuildError> {
        for insn in &self.insns {
            match insn {
                Insn::Jump { target } | Insn::Branch { target, .. } => {
                    self.check_marked(*target)?;
                }
                Insn::Switch { targets, .. } => {
                    for (_, target) in targets {
                        self.check_marked(*target)?;
                    }
                }
                _ => {}
            }
        }
        for handler in &self.handlers {
            self.check_marked(handler.start)?;
            self.check_marked(handler.end)?;
            self.check_marked(handler.target)?;
        }

        Ok(CodeBlock {
            registers: self.registers,
            insns: self.insns,
            handlers: self.handlers,
        })
    }

    fn check_marked(&self, label: Label) -> Result<(), BuildError> {
        if self.marked.contains(&label) {
            Ok(())
        } else {
            Err(BuildError::UnmarkedTarget(label))
        }
    }
}
