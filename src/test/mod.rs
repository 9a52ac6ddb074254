use crate::{
    abc::{AbcImage, ImageBuilder, Instruction},
    analysis::AnalyzedImage,
    diff::Side,
    disassembler::Listing,
};

/// A built image together with the instruction streams recorded while building it
pub struct Prepared {
    pub image: AbcImage,
    pub listing: Listing,
}

/// Baseline and candidate images built by the same closure
pub struct ImagePair {
    pub baseline: Prepared,
    pub candidate: Prepared,
}

impl ImagePair {
    // Runs `f` once per side; `f` can branch on the side to introduce differences
    pub fn build(mut f: impl FnMut(&mut ImageBuilder, Side)) -> Self {
        let mut prepare = |side| {
            let mut builder = ImageBuilder::new();
            f(&mut builder, side);
            let (image, listing) = builder.finish();
            Prepared { image, listing }
        };

        ImagePair {
            baseline: prepare(Side::Baseline),
            candidate: prepare(Side::Candidate),
        }
    }
}

// Helper function to analyze a prepared image against its own listing
pub fn analyze(prepared: &Prepared) -> AnalyzedImage<'_> {
    AnalyzedImage::analyze(&prepared.image, &prepared.listing, false).unwrap()
}

// Helper function to create an operand-less instruction stream from raw opcodes
pub fn method_body(opcodes: &[u8]) -> Vec<Instruction> {
    opcodes.iter().map(|&opcode| Instruction::new(opcode)).collect()
}
