use crate::{
    abc::{AbcImage, Instruction, MethodBody},
    analysis::CrossReferenceIndex,
    disassembler::{DecodedBodies, Disassembler},
    error::malformed_error,
    Result,
};

/// An image prepared for comparison: decoded method bodies plus cross-reference index.
///
/// The image itself stays owned by the caller.
#[derive(Debug)]
pub struct AnalyzedImage<'a> {
    image: &'a AbcImage,
    bodies: DecodedBodies,
    index: CrossReferenceIndex,
}

impl<'a> AnalyzedImage<'a> {
    /// Decodes every body of `image` once and builds its index.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the instance and class tables differ in
    /// length; ABC stores the two halves of each class definition in parallel arrays.
    pub fn analyze(
        image: &'a AbcImage,
        disassembler: &dyn Disassembler,
        parallel: bool,
    ) -> Result<Self> {
        if image.instances.len() != image.classes.len() {
            return Err(malformed_error!(
                "{} instances but {} classes",
                image.instances.len(),
                image.classes.len()
            ));
        }

        let bodies = DecodedBodies::decode(image, disassembler, parallel);
        let index = CrossReferenceIndex::build(image, &bodies, parallel);

        Ok(AnalyzedImage {
            image,
            bodies,
            index,
        })
    }

    /// The underlying image.
    #[must_use]
    pub fn image(&self) -> &'a AbcImage {
        self.image
    }

    /// Decoded instruction streams.
    #[must_use]
    pub fn bodies(&self) -> &DecodedBodies {
        &self.bodies
    }

    /// Cross-reference index.
    #[must_use]
    pub fn index(&self) -> &CrossReferenceIndex {
        &self.index
    }

    /// The body record and decoded stream at body position `position`.
    #[must_use]
    pub fn body(&self, position: usize) -> Option<(&'a MethodBody, &[Instruction])> {
        let body = self.image.bodies.get(position)?;
        Some((body, self.bodies.get(position)?))
    }

    /// Number of symbol table entries.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.image.symbols.len()
    }
}
