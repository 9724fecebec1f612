//! Decoded bytecode unit model.
//!
//! The tree of typed nodes the comparator engine decides over: a `CodeUnit`
//! holds methods and annotations, a `Method` optionally holds a `CodeBlock`,
//! and a block is a flat instruction stream plus exception handlers.
//!
//! Branch targets are opaque `Label` tokens. A label carries no structural
//! content and no intrinsic order — two independent decodes of the same
//! program produce distinct tokens for the same jump destination, so labels
//! are only meaningful through the positions assigned by `index::assign`.
//!
//! Order semantics per collection:
//!   - instruction streams and switch tables are ordered
//!   - annotation sets, annotation elements, exception handler sets, and
//!     method sets are unordered (independent encoders may permute them)

pub mod builder;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ─── Branch-Target Label ──────────────────────────────────────────

static NEXT_LABEL_ID: AtomicU64 = AtomicU64::new(1);

/// An opaque branch-target token.
///
/// Identity-only: `Label` supports equality and hashing but deliberately no
/// `Ord`/`PartialOrd`. The inner id is allocated from a process-wide counter
/// so tokens from different decodes never collide; it has no meaning beyond
/// identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Label(u64);

impl Label {
    /// Allocate a token distinct from every other token in this process.
    pub fn fresh() -> Self {
        Self(NEXT_LABEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

// ─── Instructions ─────────────────────────────────────────────────

/// Binary arithmetic/logic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// Branch conditions, tested against zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A decoded instruction.
///
/// `Mark` is a label definition in the stream — the point a `Jump`, `Branch`,
/// `Switch`, or handler target refers to. Everything else is an ordinary
/// register-machine operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Insn {
    Nop,
    /// Label definition (branch/jump/handler target).
    Mark(Label),
    /// Load an immediate into a register.
    Const { reg: u16, value: i64 },
    /// Register-to-register move.
    Move { dst: u16, src: u16 },
    /// dst = lhs <op> rhs
    BinOp {
        op: BinOp,
        dst: u16,
        lhs: u16,
        rhs: u16,
    },
    /// Unconditional jump.
    Jump { target: Label },
    /// Conditional branch: jump when `reg` satisfies `cond`.
    Branch { cond: Cond, reg: u16, target: Label },
    /// Multi-way branch on `reg`; table of (case value, target).
    Switch {
        reg: u16,
        targets: Vec<(i64, Label)>,
    },
    /// Call a named method with argument registers.
    Invoke { method: String, args: Vec<u16> },
    /// Return, optionally with a value register.
    Return { reg: Option<u16> },
    /// Throw the exception object in `reg`.
    Throw { reg: u16 },
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::Nop => write!(f, "nop"),
            Insn::Mark(label) => write!(f, "{}:", label),
            Insn::Const { reg, value } => write!(f, "const v{}, {}", reg, value),
            Insn::Move { dst, src } => write!(f, "move v{}, v{}", dst, src),
            Insn::BinOp { op, dst, lhs, rhs } => {
                write!(f, "{} v{}, v{}, v{}", op.mnemonic(), dst, lhs, rhs)
            }
            Insn::Jump { target } => write!(f, "jump {}", target),
            Insn::Branch { cond, reg, target } => {
                write!(f, "if-{} v{}, {}", cond.mnemonic(), reg, target)
            }
            Insn::Switch { reg, targets } => {
                write!(f, "switch v{}", reg)?;
                for (value, target) in targets {
                    write!(f, " [{} -> {}]", value, target)?;
                }
                Ok(())
            }
            Insn::Invoke { method, args } => {
                write!(f, "invoke {}(", method)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "v{}", arg)?;
                }
                write!(f, ")")
            }
            Insn::Return { reg: Some(reg) } => write!(f, "return v{}", reg),
            Insn::Return { reg: None } => write!(f, "return"),
            Insn::Throw { reg } => write!(f, "throw v{}", reg),
        }
    }
}

impl BinOp {
    fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Rem => "rem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::Shr => "shr",
        }
    }
}

impl Cond {
    fn mnemonic(self) -> &'static str {
        match self {
            Cond::Eq => "eqz",
            Cond::Ne => "nez",
            Cond::Lt => "ltz",
            Cond::Le => "lez",
            Cond::Gt => "gtz",
            Cond::Ge => "gez",
        }
    }
}

// ─── Exception Handlers ───────────────────────────────────────────

/// An exception handler: protects the `start..end` label range, routes
/// matching throws to `target`. `catch_type` of `None` is a catch-all.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Handler {
    pub start: Label,
    pub end: Label,
    pub catch_type: Option<String>,
    pub target: Label,
}

// ─── Annotations ──────────────────────────────────────────────────

/// A named annotation with an unordered element set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    /// Annotation type name.
    pub ty: String,
    pub elements: Vec<AnnotationElement>,
}

/// One `name = value` pair inside an annotation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationElement {
    pub name: String,
    pub value: AnnotationValue,
}

/// An annotation element value. Arrays are ordered; everything else is a
/// leaf or a nested annotation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AnnotationValue {
    Int(i64),
    Text(String),
    /// A type reference by canonical name.
    Type(String),
    Nested(Annotation),
    Array(Vec<AnnotationValue>),
}

// ─── Code Structure ───────────────────────────────────────────────

/// A method body: register budget, ordered instruction stream, unordered
/// handler set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodeBlock {
    pub registers: u16,
    pub insns: Vec<Insn>,
    pub handlers: Vec<Handler>,
}

impl CodeBlock {
    /// Render the block as an assembly-style listing, one instruction per
    /// line. Label tokens print with their raw ids, which are only stable
    /// within one decode.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for insn in &self.insns {
            out.push_str(&format!("{}\n", insn));
        }
        out
    }
}

/// A decoded method: name, unordered annotation set, optional body.
/// Abstract/native methods decode without code.
#[derive(Clone, Debug, Serialize)]
pub struct Method {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub code: Option<CodeBlock>,
}

/// A decoded binary-code unit (one class-like container).
///
/// Method order is not semantically significant; independent encoders may
/// emit members in any order.
#[derive(Clone, Debug, Serialize)]
pub struct CodeUnit {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub methods: Vec<Method>,
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_labels_are_distinct() {
        let a = Label::fresh();
        let b = Label::fresh();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_insn_display() {
        let target = Label::fresh();
        assert_eq!(format!("{}", Insn::Nop), "nop");
        assert_eq!(
            format!("{}", Insn::Const { reg: 3, value: -7 }),
            "const v3, -7"
        );
        assert_eq!(
            format!(
                "{}",
                Insn::BinOp {
                    op: BinOp::Add,
                    dst: 0,
                    lhs: 1,
                    rhs: 2
                }
            ),
            "add v0, v1, v2"
        );
        assert_eq!(
            format!("{}", Insn::Jump { target }),
            format!("jump {}", target)
        );
        assert_eq!(format!("{}", Insn::Return { reg: None }), "return");
    }

    #[test]
    fn test_switch_display() {
        let a = Label::fresh();
        let b = Label::fresh();
        let insn = Insn::Switch {
            reg: 1,
            targets: vec![(0, a), (7, b)],
        };
        assert_eq!(
            format!("{}", insn),
            format!("switch v1 [0 -> {}] [7 -> {}]", a, b)
        );
    }

    #[test]
    fn test_block_listing() {
        let l = Label::fresh();
        let block = CodeBlock {
            registers: 2,
            insns: vec![
                Insn::Mark(l),
                Insn::Const { reg: 0, value: 1 },
                Insn::Jump { target: l },
            ],
            handlers: Vec::new(),
        };
        let listing = block.listing();
        assert_eq!(listing.lines().count(), 3);
        assert!(listing.starts_with(&format!("{}:", l)));
    }
}
