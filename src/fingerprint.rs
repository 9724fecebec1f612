//! Position-normalized content fingerprints.
//!
//! A fingerprint is a BLAKE3 hash of a unit's canonical serialization. Two
//! normalizations make it stable across independent decodes:
//!   - every branch-target token is replaced by the position it resolves to
//!     through the supplied lookup (tokens themselves are meaningless across
//!     decodes);
//!   - unordered collections (annotation sets, elements, handler tables,
//!     method lists) serialize in canonical sorted order under the same
//!     default comparators the engine compares with.
//! Equivalent units therefore fingerprint identically, and the fingerprint
//! verdict agrees with the full structural comparison.
//!
//! The lookup itself is never serialized — positions are folded into the
//! byte stream and forgotten.

use crate::compare::node::{
    ANNOTATION_CMP, ELEMENT_CMP, HANDLER_CMP, METHOD_CMP,
};
use crate::compare::scoped::ScopedComparator;
use crate::compare::Comparator;
use crate::index::LabelLookup;
use crate::ir::{
    Annotation, AnnotationElement, AnnotationValue, CodeBlock, CodeUnit, Handler, Insn, Label,
    Method,
};

// ─── Serialization Format Tags ─────────────────────────────────────

// Node type tags (1-byte prefix).
const TAG_UNIT: u8 = 0x01;
const TAG_METHOD: u8 = 0x02;
const TAG_BLOCK: u8 = 0x03;
const TAG_HANDLER: u8 = 0x04;
const TAG_ANNOTATION: u8 = 0x05;
const TAG_ELEMENT: u8 = 0x06;

// Instruction tags.
const TAG_NOP: u8 = 0x10;
const TAG_MARK: u8 = 0x11;
const TAG_CONST: u8 = 0x12;
const TAG_MOVE: u8 = 0x13;
const TAG_BINOP: u8 = 0x14;
const TAG_JUMP: u8 = 0x15;
const TAG_BRANCH: u8 = 0x16;
const TAG_SWITCH: u8 = 0x17;
const TAG_INVOKE: u8 = 0x18;
const TAG_RETURN: u8 = 0x19;
const TAG_THROW: u8 = 0x1A;

// Annotation value tags.
const TAG_VAL_INT: u8 = 0x20;
const TAG_VAL_TEXT: u8 = 0x21;
const TAG_VAL_TYPE: u8 = 0x22;
const TAG_VAL_NESTED: u8 = 0x23;
const TAG_VAL_ARRAY: u8 = 0x24;

// Presence tags.
const TAG_NONE: u8 = 0x30;
const TAG_SOME: u8 = 0x31;
const TAG_TARGET: u8 = 0x32;
const TAG_TARGET_UNRESOLVED: u8 = 0x33;

// Version byte for fingerprint stability.
const FINGERPRINT_VERSION: u8 = 1;

// ─── Fingerprint ───────────────────────────────────────────────────

/// A 256-bit BLAKE3 content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Display as full hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Display as an 8-character prefix, for logs and listings.
    pub fn to_short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.to_short())
    }
}

// ─── Entry Points ──────────────────────────────────────────────────

/// Fingerprint a unit with its labels resolved through `scope`.
pub fn unit_fingerprint(unit: &CodeUnit, scope: &dyn LabelLookup) -> Fingerprint {
    let mut buf = vec![FINGERPRINT_VERSION];
    write_unit(&mut buf, unit, scope);
    Fingerprint(*blake3::hash(&buf).as_bytes())
}

/// Fingerprint a single block with its labels resolved through `scope`.
pub fn block_fingerprint(block: &CodeBlock, scope: &dyn LabelLookup) -> Fingerprint {
    let mut buf = vec![FINGERPRINT_VERSION];
    write_block(&mut buf, block, scope);
    Fingerprint(*blake3::hash(&buf).as_bytes())
}

// ─── Serialization ─────────────────────────────────────────────────

fn write_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

fn write_target(buf: &mut Vec<u8>, label: Label, scope: &dyn LabelLookup) {
    match scope.find(label) {
        Some(pos) => {
            buf.push(TAG_TARGET);
            buf.extend_from_slice(&pos.to_le_bytes());
        }
        None => buf.push(TAG_TARGET_UNRESOLVED),
    }
}

fn write_unit(buf: &mut Vec<u8>, unit: &CodeUnit, scope: &dyn LabelLookup) {
    buf.push(TAG_UNIT);
    write_str(buf, &unit.name);

    write_annotations(buf, &unit.annotations);

    let mut methods: Vec<&Method> = unit.methods.iter().collect();
    methods.sort_by(|a, b| METHOD_CMP.compare_values_in(a, b, scope));
    buf.extend_from_slice(&(methods.len() as u32).to_le_bytes());
    for method in methods {
        write_method(buf, method, scope);
    }
}

fn write_method(buf: &mut Vec<u8>, method: &Method, scope: &dyn LabelLookup) {
    buf.push(TAG_METHOD);
    write_str(buf, &method.name);
    write_annotations(buf, &method.annotations);
    match &method.code {
        Some(block) => {
            buf.push(TAG_SOME);
            write_block(buf, block, scope);
        }
        None => buf.push(TAG_NONE),
    }
}

fn write_block(buf: &mut Vec<u8>, block: &CodeBlock, scope: &dyn LabelLookup) {
    buf.push(TAG_BLOCK);
    buf.extend_from_slice(&block.registers.to_le_bytes());

    buf.extend_from_slice(&(block.insns.len() as u32).to_le_bytes());
    for insn in &block.insns {
        write_insn(buf, insn, scope);
    }

    let mut handlers: Vec<&Handler> = block.handlers.iter().collect();
    handlers.sort_by(|a, b| HANDLER_CMP.compare_values_in(a, b, scope));
    buf.extend_from_slice(&(handlers.len() as u32).to_le_bytes());
    for handler in handlers {
        write_handler(buf, handler, scope);
    }
}

fn write_handler(buf: &mut Vec<u8>, handler: &Handler, scope: &dyn LabelLookup) {
    buf.push(TAG_HANDLER);
    match &handler.catch_type {
        Some(ty) => {
            buf.push(TAG_SOME);
            write_str(buf, ty);
        }
        None => buf.push(TAG_NONE),
    }
    write_target(buf, handler.start, scope);
    write_target(buf, handler.end, scope);
    write_target(buf, handler.target, scope);
}

fn write_insn(buf: &mut Vec<u8>, insn: &Insn, scope: &dyn LabelLookup) {
    match insn {
        Insn::Nop => buf.push(TAG_NOP),
        Insn::Mark(label) => {
            buf.push(TAG_MARK);
            write_target(buf, *label, scope);
        }
        Insn::Const { reg, value } => {
            buf.push(TAG_CONST);
            buf.extend_from_slice(&reg.to_le_bytes());
            buf.extend_from_slice(&value.to_le_bytes());
        }
        Insn::Move { dst, src } => {
            buf.push(TAG_MOVE);
            buf.extend_from_slice(&dst.to_le_bytes());
            buf.extend_from_slice(&src.to_le_bytes());
        }
        Insn::BinOp { op, dst, lhs, rhs } => {
            buf.push(TAG_BINOP);
            buf.push(*op as u8);
            buf.extend_from_slice(&dst.to_le_bytes());
            buf.extend_from_slice(&lhs.to_le_bytes());
            buf.extend_from_slice(&rhs.to_le_bytes());
        }
        Insn::Jump { target } => {
            buf.push(TAG_JUMP);
            write_target(buf, *target, scope);
        }
        Insn::Branch { cond, reg, target } => {
            buf.push(TAG_BRANCH);
            buf.push(*cond as u8);
            buf.extend_from_slice(&reg.to_le_bytes());
            write_target(buf, *target, scope);
        }
        Insn::Switch { reg, targets } => {
            buf.push(TAG_SWITCH);
            buf.extend_from_slice(&reg.to_le_bytes());
            buf.extend_from_slice(&(targets.len() as u32).to_le_bytes());
            for (value, target) in targets {
                buf.extend_from_slice(&value.to_le_bytes());
                write_target(buf, *target, scope);
            }
        }
        Insn::Invoke { method, args } => {
            buf.push(TAG_INVOKE);
            write_str(buf, method);
            buf.extend_from_slice(&(args.len() as u32).to_le_bytes());
            for arg in args {
                buf.extend_from_slice(&arg.to_le_bytes());
            }
        }
        Insn::Return { reg } => {
            buf.push(TAG_RETURN);
            match reg {
                Some(reg) => {
                    buf.push(TAG_SOME);
                    buf.extend_from_slice(&reg.to_le_bytes());
                }
                None => buf.push(TAG_NONE),
            }
        }
        Insn::Throw { reg } => {
            buf.push(TAG_THROW);
            buf.extend_from_slice(&reg.to_le_bytes());
        }
    }
}

fn write_annotations(buf: &mut Vec<u8>, annotations: &[Annotation]) {
    let mut sorted: Vec<&Annotation> = annotations.iter().collect();
    sorted.sort_by(|a, b| ANNOTATION_CMP.compare_values(a, b));
    buf.extend_from_slice(&(sorted.len() as u32).to_le_bytes());
    for annotation in sorted {
        write_annotation(buf, annotation);
    }
}

fn write_annotation(buf: &mut Vec<u8>, annotation: &Annotation) {
    buf.push(TAG_ANNOTATION);
    write_str(buf, &annotation.ty);

    let mut elements: Vec<&AnnotationElement> = annotation.elements.iter().collect();
    elements.sort_by(|a, b| ELEMENT_CMP.compare_values(a, b));
    buf.extend_from_slice(&(elements.len() as u32).to_le_bytes());
    for element in elements {
        buf.push(TAG_ELEMENT);
        write_str(buf, &element.name);
        write_value(buf, &element.value);
    }
}

fn write_value(buf: &mut Vec<u8>, value: &AnnotationValue) {
    match value {
        AnnotationValue::Int(v) => {
            buf.push(TAG_VAL_INT);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        AnnotationValue::Text(s) => {
            buf.push(TAG_VAL_TEXT);
            write_str(buf, s);
        }
        AnnotationValue::Type(s) => {
            buf.push(TAG_VAL_TYPE);
            write_str(buf, s);
        }
        AnnotationValue::Nested(a) => {
            buf.push(TAG_VAL_NESTED);
            write_annotation(buf, a);
        }
        AnnotationValue::Array(values) => {
            buf.push(TAG_VAL_ARRAY);
            buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
            for v in values {
                write_value(buf, v);
            }
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────
