//! Decode-once storage for method body instruction streams.

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::{
    abc::{AbcImage, Instruction, MethodBody},
    disassembler::Disassembler,
};

/// Instruction streams of every method body in one image.
///
/// Streams are addressed by body position (index into [`AbcImage::bodies`]). A body the
/// disassembler rejects is stored as an empty stream and counted in
/// [`DecodedBodies::failures`].
#[derive(Debug, Clone, Default)]
pub struct DecodedBodies {
    streams: Vec<Arc<[Instruction]>>,
    by_method: FxHashMap<u32, usize>,
    failures: usize,
}

impl DecodedBodies {
    /// Decodes all bodies of `image`.
    ///
    /// With `parallel` set the bodies are decoded on the rayon pool; the result is stored
    /// in body order either way.
    pub fn decode(image: &AbcImage, disassembler: &dyn Disassembler, parallel: bool) -> Self {
        let decode_one = |body: &MethodBody| -> Option<Arc<[Instruction]>> {
            match disassembler.disassemble(image, body) {
                Ok(instructions) => Some(Arc::from(instructions)),
                Err(error) => {
                    tracing::warn!("Treating body of method {} as empty: {}", body.method, error);
                    None
                }
            }
        };

        let decoded: Vec<Option<Arc<[Instruction]>>> = if parallel {
            image.bodies.par_iter().map(decode_one).collect()
        } else {
            image.bodies.iter().map(decode_one).collect()
        };

        let failures = decoded.iter().filter(|stream| stream.is_none()).count();
        let streams = decoded
            .into_iter()
            .map(|stream| stream.unwrap_or_else(|| Arc::from(Vec::new())))
            .collect();

        let mut by_method = FxHashMap::default();
        for (position, body) in image.bodies.iter().enumerate() {
            by_method.entry(body.method).or_insert(position);
        }

        DecodedBodies {
            streams,
            by_method,
            failures,
        }
    }

    /// Instructions of the body at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&[Instruction]> {
        self.streams.get(position).map(AsRef::as_ref)
    }

    /// Position of the first body implementing `method`.
    #[must_use]
    pub fn body_of(&self, method: u32) -> Option<usize> {
        self.by_method.get(&method).copied()
    }

    /// Instructions of the body implementing `method`.
    #[must_use]
    pub fn for_method(&self, method: u32) -> Option<&[Instruction]> {
        self.body_of(method).and_then(|position| self.get(position))
    }

    /// Number of decoded bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// True when the image has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Number of bodies the disassembler rejected.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }
}
