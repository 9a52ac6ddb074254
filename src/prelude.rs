//! # abcscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the abcscope library. Import this module to get quick access to everything needed
//! to build images, run a comparison and read its result.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all abcscope operations
pub use crate::Error;

/// The result type used throughout abcscope
pub use crate::Result;

/// Matcher configuration
pub use crate::config::MatcherConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// One baseline/candidate comparison
pub use crate::session::ComparisonSession;

/// Instruction decoding seam and the decode-once cache
pub use crate::disassembler::{DecodedBodies, Disassembler, Listing};

// ================================================================================================
// Image Model
// ================================================================================================

/// Images and their builder
pub use crate::abc::{AbcImage, ImageBuilder};

/// Symbol table entries
pub use crate::abc::{Multiname, MultinameKind};

/// Traits, methods and instructions
pub use crate::abc::{
    Instruction, MethodBody, MethodFlags, MethodInfo, Operand, OperandType, OperandValue, Trait,
    TraitKind,
};

// ================================================================================================
// Analysis, Alignment and Resolution
// ================================================================================================

/// Per-image analysis and structural comparison
pub use crate::analysis::{AnalyzedImage, CrossReferenceIndex, StructuralComparator, TraitCache};

/// Sequence alignment
pub use crate::diff::{align, EditScript, Run, RunKind, Side, SideIndex};

/// Symbol mapping
pub use crate::resolver::{PassKind, PassReport, Resolution, SymbolMapping, SymbolResolver};
