// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # abcscope
//!
//! Structural symbol matching between two versions of an obfuscated ActionScript Byte Code
//! (ABC) program.
//!
//! Obfuscators rename every identifier they can, and each recompilation renumbers the
//! symbol table. `abcscope` takes two already-parsed images, a *baseline* and a
//! *candidate*, and works out which candidate symbol is which baseline symbol by looking
//! at program structure instead of names.
//!
//! ## Features
//!
//! - **Cross-reference indexing** - Per-symbol record of every declaration and code use,
//!   built in parallel with deterministic ordering
//! - **Structural equality** - Recursive comparison of traits, method signatures and
//!   opcode streams, memoized in a concurrent cache
//! - **Linear-space alignment** - Myers' middle-snake shortest edit script over symbol
//!   tables and instruction streams
//! - **Mapping propagation** - Heuristic passes that carry known mappings through
//!   matching method bodies
//!
//! ## Quick Start
//!
//! ```rust
//! use abcscope::prelude::*;
//!
//! let build = |name: &str| {
//!     let mut builder = ImageBuilder::new();
//!     builder.add_qname("Player");
//!     builder.add_qname(name);
//!     builder.finish()
//! };
//! let (baseline, baseline_code) = build("_-Kx");
//! let (candidate, candidate_code) = build("_-Qz");
//!
//! let session = ComparisonSession::with_disassemblers(
//!     &baseline,
//!     &candidate,
//!     &baseline_code,
//!     &candidate_code,
//!     MatcherConfig::default(),
//! )?;
//!
//! let script = session.diff()?;
//! let resolution = session.resolve(&script)?;
//! for (old, new) in resolution.mapping.iter() {
//!     println!("{old} -> {new}");
//! }
//! # Ok::<(), abcscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows one way through the crate:
//!
//! - [`abc`] - The image model consumed by everything else, plus [`abc::ImageBuilder`]
//! - [`disassembler`] - The seam to an external instruction decoder; bodies are decoded
//!   once per image
//! - [`analysis`] - Cross-reference indices and the structural comparator
//! - [`diff`] - Sequence alignment producing an [`diff::EditScript`]
//! - [`resolver`] - Turns an edit script into a [`resolver::SymbolMapping`]
//! - [`session`] - Ties the above together for one comparison
//!
//! ## Error Handling
//!
//! Structural mismatches and dangling references are never errors; they make a
//! comparison report "not equal". [`Error`] covers caller mistakes (an alignment predicate
//! comparing two elements of the same side, positions outside a table) and images that
//! are unusable as a whole.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for phase summaries, `trace` for individual
//! propagated mappings, `warn` for bodies the disassembler rejects). No subscriber is
//! installed.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use abcscope::prelude::*;
///
/// let config = MatcherConfig::default().with_size_match_rounds(3);
/// assert!(config.is_obfuscated("_-a"));
/// ```
pub mod prelude;

pub mod abc;
pub mod analysis;
pub mod config;
pub mod diff;
pub mod disassembler;
pub mod resolver;
pub mod session;

/// `abcscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `abcscope` Error type
///
/// Covers every failure mode of the crate; see the variants for details.
pub use error::Error;

/// Main entry point for comparing two images.
pub use session::ComparisonSession;

/// Matcher configuration.
pub use config::MatcherConfig;

/// Root of the image model.
pub use abc::AbcImage;
