//! The top-level comparison session.
//!
//! A [`ComparisonSession`] owns everything that lives for one baseline/candidate
//! comparison: both analysed images (decoded bodies and cross-reference indices), the
//! trait comparison cache, and an optional pinned mapping. The images themselves stay
//! borrowed from the caller and are never mutated.
//!
//! # Examples
//!
//! ```rust
//! use abcscope::prelude::*;
//!
//! let build = |member: &str| {
//!     let mut builder = ImageBuilder::new();
//!     builder.add_qname("Main");
//!     builder.add_qname(member);
//!     builder.finish()
//! };
//! let (old, old_code) = build("_-a1");
//! let (new, new_code) = build("_-b7");
//!
//! let session = ComparisonSession::with_disassemblers(
//!     &old,
//!     &new,
//!     &old_code,
//!     &new_code,
//!     MatcherConfig::default(),
//! )?;
//!
//! let resolution = session.resolve_symbols()?;
//! assert_eq!(resolution.mapping.get(0), Some(0));
//! assert_eq!(resolution.mapping.get(1), Some(1));
//! # Ok::<(), abcscope::Error>(())
//! ```

use crate::{
    abc::AbcImage,
    analysis::{AnalyzedImage, StructuralComparator, TraitCache},
    config::MatcherConfig,
    diff::{align, EditScript, SideIndex},
    disassembler::Disassembler,
    resolver::{Resolution, SymbolMapping, SymbolResolver},
    Result,
};

/// State of one baseline/candidate comparison.
pub struct ComparisonSession<'a> {
    baseline: AnalyzedImage<'a>,
    candidate: AnalyzedImage<'a>,
    config: MatcherConfig,
    cache: TraitCache,
    pinned: Option<SymbolMapping>,
}

impl<'a> ComparisonSession<'a> {
    /// Analyses both images with the same disassembler.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if either image is structurally unusable.
    pub fn new(
        baseline: &'a AbcImage,
        candidate: &'a AbcImage,
        disassembler: &dyn Disassembler,
        config: MatcherConfig,
    ) -> Result<Self> {
        Self::with_disassemblers(baseline, candidate, disassembler, disassembler, config)
    }

    /// Analyses both images, each with its own disassembler.
    ///
    /// With [`MatcherConfig::parallel`] set, the two images are analysed concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if either image is structurally unusable.
    pub fn with_disassemblers(
        baseline: &'a AbcImage,
        candidate: &'a AbcImage,
        baseline_disassembler: &dyn Disassembler,
        candidate_disassembler: &dyn Disassembler,
        config: MatcherConfig,
    ) -> Result<Self> {
        let parallel = config.parallel;
        let analyze_baseline = || AnalyzedImage::analyze(baseline, baseline_disassembler, parallel);
        let analyze_candidate =
            || AnalyzedImage::analyze(candidate, candidate_disassembler, parallel);

        let (baseline, candidate) = if parallel {
            rayon::join(analyze_baseline, analyze_candidate)
        } else {
            (analyze_baseline(), analyze_candidate())
        };

        Ok(Self::from_analyzed(baseline?, candidate?, config))
    }

    /// Creates a session from images that were analysed beforehand.
    #[must_use]
    pub fn from_analyzed(
        baseline: AnalyzedImage<'a>,
        candidate: AnalyzedImage<'a>,
        config: MatcherConfig,
    ) -> Self {
        ComparisonSession {
            baseline,
            candidate,
            config,
            cache: TraitCache::new(),
            pinned: None,
        }
    }

    /// A comparator over this session's state.
    #[must_use]
    pub fn comparator(&self) -> StructuralComparator<'_, 'a> {
        let comparator =
            StructuralComparator::new(&self.baseline, &self.candidate, &self.cache, &self.config);
        match &self.pinned {
            Some(mapping) => comparator.with_pinned(mapping),
            None => comparator,
        }
    }

    /// Compares baseline symbol `a` with candidate symbol `b`.
    #[must_use]
    pub fn equal(&self, a: usize, b: usize, shallow: bool) -> bool {
        self.comparator().equal(a, b, shallow)
    }

    /// Aligns the two symbol tables under full structural equality.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::PredicateContract`] from the alignment predicate; this
    /// cannot happen for the sequences built here.
    pub fn diff(&self) -> Result<EditScript> {
        let comparator = self.comparator();
        let seq_a: Vec<SideIndex> = (0..self.baseline.symbol_count())
            .map(SideIndex::baseline)
            .collect();
        let seq_b: Vec<SideIndex> = (0..self.candidate.symbol_count())
            .map(SideIndex::candidate)
            .collect();

        let script = align(&seq_a, &seq_b, |x, y| {
            let (a, b) = SideIndex::check_pair(*x, *y)?;
            Ok(comparator.equal(a, b, false))
        })?;

        tracing::debug!(
            "Aligned {} baseline and {} candidate symbols: {} kept, {} deleted, {} inserted",
            seq_a.len(),
            seq_b.len(),
            script.kept_len(),
            script.deleted(),
            script.inserted()
        );

        Ok(script)
    }

    /// A resolver over this session's images.
    #[must_use]
    pub fn resolver(&self) -> SymbolResolver<'_, 'a> {
        SymbolResolver::new(&self.baseline, &self.candidate, &self.config)
    }

    /// Resolves a script produced by [`ComparisonSession::diff`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the script does not fit the symbol tables.
    pub fn resolve(&self, script: &EditScript) -> Result<Resolution> {
        self.resolver().resolve(script)
    }

    /// Resolves a script computed over custom symbol sequences.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the script does not fit the sequences or a
    /// sequence names a position outside its symbol table.
    pub fn resolve_with(
        &self,
        script: &EditScript,
        seq_a: &[usize],
        seq_b: &[usize],
    ) -> Result<Resolution> {
        self.resolver().resolve_sequences(script, seq_a, seq_b)
    }

    /// Runs [`ComparisonSession::diff`] followed by [`ComparisonSession::resolve`].
    ///
    /// # Errors
    ///
    /// See [`ComparisonSession::diff`] and [`ComparisonSession::resolve`].
    pub fn resolve_symbols(&self) -> Result<Resolution> {
        let script = self.diff()?;
        self.resolve(&script)
    }

    /// Pairs equally long deleted and inserted runs of `script`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the script does not fit the symbol tables.
    pub fn pair_replacements(&self, script: &EditScript) -> Result<Resolution> {
        self.resolver().pair_replacements(script)
    }

    /// Makes later comparisons honour `mapping`.
    ///
    /// Cached trait results were computed without the mapping and are dropped.
    pub fn pin_mapping(&mut self, mapping: SymbolMapping) {
        self.cache.clear();
        self.pinned = Some(mapping);
    }

    /// The pinned mapping, if any.
    #[must_use]
    pub fn pinned(&self) -> Option<&SymbolMapping> {
        self.pinned.as_ref()
    }

    /// Drops the pinned mapping and every cached comparison.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.pinned = None;
    }

    /// The trait comparison cache.
    #[must_use]
    pub fn trait_cache(&self) -> &TraitCache {
        &self.cache
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The analysed baseline image.
    #[must_use]
    pub fn baseline(&self) -> &AnalyzedImage<'a> {
        &self.baseline
    }

    /// The analysed candidate image.
    #[must_use]
    pub fn candidate(&self) -> &AnalyzedImage<'a> {
        &self.candidate
    }
}
