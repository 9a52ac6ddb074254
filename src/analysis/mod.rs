//! Per-image analysis and cross-image structural comparison.
//!
//! # Components
//!
//! - [`CrossReferenceIndex`]: who declares and who mentions each symbol of one image
//! - [`AnalyzedImage`]: an image together with its decoded bodies and its index
//! - [`StructuralComparator`]: decides whether a baseline symbol and a candidate symbol
//!   denote the same program entity
//! - [`TraitCache`]: memoized trait comparisons shared by all comparator calls of a session
//!
//! Data flows one way: images are decoded and indexed once, after which everything in
//! this module is read-only apart from the trait cache.

mod analyzed;
mod cache;
mod equality;
mod xref;

pub use analyzed::AnalyzedImage;
pub use cache::TraitCache;
pub use equality::StructuralComparator;
pub use xref::{
    CrossReferenceIndex, MethodOwner, OwnerRole, TraitOwner, TraitRef, XRef, XRefStats,
};
