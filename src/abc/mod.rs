//! In-memory model of a parsed ABC (ActionScript Byte Code) image.
//!
//! Parsing the container format is the job of an external component; this module only
//! defines the shape the matcher consumes. All types are plain data and are never mutated
//! once an analysis session has been created.
//!
//! # Key Types
//! - [`AbcImage`] - The root value: pools, descriptors and method bodies
//! - [`Multiname`] - A symbol table entry
//! - [`Trait`] - A member descriptor owned by an instance, class or script
//! - [`MethodBody`] / [`MethodInfo`] - Method bodies and signatures
//! - [`Instruction`] / [`Operand`] - Decoded instructions
//! - [`ImageBuilder`] - Incremental image construction
//!
//! # Indexing Conventions
//!
//! References stored inside records keep their raw ABC encoding: string and multiname
//! references are 1-based with `0` reserved for "absent". Everything the public API of
//! this crate returns or accepts as a *symbol* is the 0-based position in
//! [`AbcImage::symbols`]. [`symbol_slot`] converts between the two.

mod builder;
mod image;
mod instruction;
mod method;
mod multiname;
mod traits;

pub use builder::ImageBuilder;
pub use image::{AbcImage, ClassInfo, InstanceInfo, ScriptInfo};
pub use instruction::{Instruction, Operand, OperandType, OperandValue};
pub use method::{MethodBody, MethodFlags, MethodInfo};
pub use multiname::{Multiname, MultinameKind};
pub use traits::{Trait, TraitAttributes, TraitData, TraitKind};

/// Converts a raw 1-based multiname reference into a 0-based symbol position.
///
/// Returns `None` for the null reference `0`.
#[must_use]
pub fn symbol_slot(raw: u32) -> Option<usize> {
    (raw as usize).checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_slot() {
        assert_eq!(symbol_slot(0), None);
        assert_eq!(symbol_slot(1), Some(0));
        assert_eq!(symbol_slot(42), Some(41));
    }
}
