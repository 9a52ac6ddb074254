//! The seam between the matcher and an external AVM2 instruction decoder.
//!
//! Decoding instruction bytes into typed operands is not done by this crate. Callers
//! plug in a [`Disassembler`], either a type of their own, a closure, or a pre-decoded
//! [`Listing`]. Every method body is decoded exactly once per image through
//! [`DecodedBodies`], and all later stages share the decoded streams.
//!
//! # Example
//!
//! ```rust
//! use abcscope::abc::{AbcImage, Instruction, MethodBody};
//! use abcscope::disassembler::{DecodedBodies, Disassembler};
//!
//! // A toy decoder that treats each byte as an operand-less opcode.
//! let decoder = |_: &AbcImage, body: &MethodBody| -> abcscope::Result<Vec<Instruction>> {
//!     Ok(body.code.iter().map(|&op| Instruction::new(op)).collect())
//! };
//!
//! let mut image = AbcImage::default();
//! let mut body = MethodBody::new(0);
//! body.code = vec![0xD0, 0x30, 0x47];
//! image.bodies.push(body);
//!
//! let decoded = DecodedBodies::decode(&image, &decoder, false);
//! assert_eq!(decoded.get(0).map(|s| s.len()), Some(3));
//! ```

mod cache;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{
    abc::{AbcImage, Instruction, MethodBody},
    Error, Result,
};

pub use cache::DecodedBodies;

/// Decodes the instruction stream of a method body.
///
/// Implementations must be pure: decoding the same body twice yields the same stream.
pub trait Disassembler: Send + Sync {
    /// Decodes `body`, which belongs to `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be decoded. Index construction treats such a
    /// body as empty rather than failing.
    fn disassemble(&self, image: &AbcImage, body: &MethodBody) -> Result<Vec<Instruction>>;
}

impl<F> Disassembler for F
where
    F: Fn(&AbcImage, &MethodBody) -> Result<Vec<Instruction>> + Send + Sync,
{
    fn disassemble(&self, image: &AbcImage, body: &MethodBody) -> Result<Vec<Instruction>> {
        self(image, body)
    }
}

/// Pre-decoded instruction streams keyed by method index.
///
/// For parsers that decode eagerly, and for tests.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    streams: FxHashMap<u32, Arc<[Instruction]>>,
}

impl Listing {
    /// Creates an empty listing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the stream for the body of `method`, replacing any earlier one.
    pub fn insert(&mut self, method: u32, instructions: Vec<Instruction>) {
        self.streams.insert(method, Arc::from(instructions));
    }

    /// The stream recorded for `method`.
    #[must_use]
    pub fn get(&self, method: u32) -> Option<&[Instruction]> {
        self.streams.get(&method).map(AsRef::as_ref)
    }

    /// Number of recorded streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// True if no stream has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl Disassembler for Listing {
    fn disassemble(&self, _image: &AbcImage, body: &MethodBody) -> Result<Vec<Instruction>> {
        self.streams
            .get(&body.method)
            .map(|stream| stream.to_vec())
            .ok_or_else(|| Error::Disassembly {
                method: body.method,
                message: "no stream recorded".to_string(),
            })
    }
}
