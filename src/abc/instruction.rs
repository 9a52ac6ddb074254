//! Decoded AVM2 instructions.
//!
//! Instructions are produced by an external disassembler. The matcher only cares about
//! the opcode id and, for every operand, its declared type plus either a decoded literal
//! value or a raw pool index.

use std::sync::Arc;

use strum::{Display, EnumIter};

/// Declared type of an instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OperandType {
    /// String pool reference
    String,
    /// Double pool reference
    Double,
    /// Inline byte
    U8,
    /// Inline variable-length unsigned 30-bit integer
    U30,
    /// Integer pool reference
    Int,
    /// Unsigned integer pool reference
    UInt,
    /// Multiname (symbol table) reference
    Multiname,
    /// Namespace pool reference
    Namespace,
    /// Method signature reference
    Method,
    /// Class reference
    Class,
    /// Exception table reference
    Exception,
    /// Signed 24-bit branch offset
    Offset,
    /// Debug information
    Debug,
}

impl OperandType {
    /// True for the operand types whose values take part in instruction equality.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::String | Self::Double | Self::U8 | Self::U30 | Self::Int | Self::UInt
        )
    }
}

/// The decoded value of an operand.
#[derive(Debug, Clone)]
pub enum OperandValue {
    /// No decoded value (references, offsets)
    None,
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Double(f64),
    /// String contents, `None` when the reference is absent
    Str(Option<Arc<str>>),
}

impl PartialEq for OperandValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OperandValue::None, OperandValue::None) => true,
            (OperandValue::Int(a), OperandValue::Int(b)) => a == b,
            (OperandValue::UInt(a), OperandValue::UInt(b)) => a == b,
            (OperandValue::Double(a), OperandValue::Double(b)) => a.to_bits() == b.to_bits(),
            (OperandValue::Str(a), OperandValue::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OperandValue {}

/// A single instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    /// Declared type
    pub kind: OperandType,
    /// Raw encoded value (pool index or immediate)
    pub raw: u32,
    /// Decoded value
    pub value: OperandValue,
}

impl Operand {
    /// A reference to the 1-based multiname pool entry `raw`.
    #[must_use]
    pub fn multiname(raw: u32) -> Self {
        Operand {
            kind: OperandType::Multiname,
            raw,
            value: OperandValue::None,
        }
    }

    /// A string reference decoded to `value`.
    #[must_use]
    pub fn string(raw: u32, value: &str) -> Self {
        Operand {
            kind: OperandType::String,
            raw,
            value: OperandValue::Str(Some(Arc::from(value))),
        }
    }

    /// An inline byte.
    #[must_use]
    pub fn byte(value: u8) -> Self {
        Operand {
            kind: OperandType::U8,
            raw: u32::from(value),
            value: OperandValue::UInt(u64::from(value)),
        }
    }

    /// An inline u30 immediate.
    #[must_use]
    pub fn u30(value: u32) -> Self {
        Operand {
            kind: OperandType::U30,
            raw: value,
            value: OperandValue::UInt(u64::from(value)),
        }
    }

    /// An integer pool reference decoded to `value`.
    #[must_use]
    pub fn int(raw: u32, value: i64) -> Self {
        Operand {
            kind: OperandType::Int,
            raw,
            value: OperandValue::Int(value),
        }
    }

    /// A double pool reference decoded to `value`.
    #[must_use]
    pub fn double(raw: u32, value: f64) -> Self {
        Operand {
            kind: OperandType::Double,
            raw,
            value: OperandValue::Double(value),
        }
    }

    /// A branch offset.
    #[must_use]
    pub fn offset(value: i32) -> Self {
        Operand {
            kind: OperandType::Offset,
            raw: value as u32,
            value: OperandValue::Int(i64::from(value)),
        }
    }

    /// 0-based symbol position for multiname operands.
    ///
    /// Returns `None` for other operand types and for the null reference.
    #[must_use]
    pub fn symbol(&self) -> Option<usize> {
        if self.kind != OperandType::Multiname {
            return None;
        }
        (self.raw as usize).checked_sub(1)
    }
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Opcode id
    pub opcode: u8,
    /// Operands in encoding order
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// An instruction without operands.
    #[must_use]
    pub fn new(opcode: u8) -> Self {
        Instruction {
            opcode,
            operands: Vec::new(),
        }
    }

    /// An instruction with operands.
    #[must_use]
    pub fn with_operands(opcode: u8, operands: Vec<Operand>) -> Self {
        Instruction { opcode, operands }
    }

    /// Same opcode and equal values for every literal-typed operand.
    ///
    /// Symbol references are deliberately ignored: they are what the caller is trying to
    /// discover.
    #[must_use]
    pub fn literal_eq(&self, other: &Instruction) -> bool {
        if self.opcode != other.opcode {
            return false;
        }

        self.operands
            .iter()
            .zip(other.operands.iter())
            .all(|(left, right)| {
                !left.kind.is_literal() || (left.kind == right.kind && left.value == right.value)
            })
    }

    /// Iterates `(operand position, symbol position)` for every multiname operand.
    pub fn symbols(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.operands
            .iter()
            .enumerate()
            .filter_map(|(position, operand)| operand.symbol().map(|symbol| (position, symbol)))
    }
}
