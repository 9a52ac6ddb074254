//! Turning an edit script over two symbol tables into a symbol mapping.
//!
//! Resolution runs in two stages:
//!
//! 1. **Projection**: every element of a kept run is mapped to its counterpart at the same
//!    relative position in the other sequence. Deleted and inserted runs are left alone.
//! 2. **Propagation**: method bodies that mention a still unmapped baseline symbol are
//!    paired with their candidate counterparts and aligned instruction by instruction,
//!    see [`PassKind`] for the pairing heuristics.
//!
//! Whatever is still unmapped afterwards is reported, never guessed. Unmapped symbols
//! with a literal (non-obfuscated) qualified name are genuine additions or removals and
//! are listed in [`Resolution::removed`] and [`Resolution::added`]; all other unmapped
//! symbols are ambiguous and end up in the `unresolved_*` sets.
//!
//! [`SymbolResolver::pair_replacements`] offers the cheaper alternative of treating a
//! deleted run followed by an inserted run of the same length as a renaming.

mod mapping;
mod propagation;

use std::collections::BTreeSet;

pub use mapping::SymbolMapping;
pub use propagation::{PassKind, PassReport};

use crate::{
    analysis::AnalyzedImage,
    config::MatcherConfig,
    diff::{EditScript, RunKind},
    Error, Result,
};

use propagation::Propagator;

/// Result of resolving an edit script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Baseline to candidate symbol mapping
    pub mapping: SymbolMapping,
    /// Unmapped baseline symbols whose identity could not be decided
    pub unresolved_baseline: BTreeSet<usize>,
    /// Candidate symbols nothing maps to and whose identity could not be decided
    pub unresolved_candidate: BTreeSet<usize>,
    /// Unmapped baseline symbols with a literal name, i.e. removed from the candidate
    pub removed: BTreeSet<usize>,
    /// Unmapped candidate symbols with a literal name, i.e. new in the candidate
    pub added: BTreeSet<usize>,
    /// Reports of the propagation passes that ran, in order
    pub passes: Vec<PassReport>,
}

impl Resolution {
    /// True if every symbol of both sequences was either mapped or has a literal name.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved_baseline.is_empty() && self.unresolved_candidate.is_empty()
    }
}

/// Resolves symbol mappings between two analysed images.
pub struct SymbolResolver<'r, 'a> {
    baseline: &'r AnalyzedImage<'a>,
    candidate: &'r AnalyzedImage<'a>,
    config: &'r MatcherConfig,
}

impl<'r, 'a> SymbolResolver<'r, 'a> {
    /// Creates a resolver over two analysed images.
    #[must_use]
    pub fn new(
        baseline: &'r AnalyzedImage<'a>,
        candidate: &'r AnalyzedImage<'a>,
        config: &'r MatcherConfig,
    ) -> Self {
        SymbolResolver {
            baseline,
            candidate,
            config,
        }
    }

    /// Resolves a script computed over the complete symbol tables of both images.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the script covers more elements than the symbol
    /// tables hold.
    pub fn resolve(&self, script: &EditScript) -> Result<Resolution> {
        let (seq_a, seq_b) = self.full_tables();
        self.resolve_sequences(script, &seq_a, &seq_b)
    }

    /// Resolves a script computed over the symbol sequences `seq_a` and `seq_b`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the script addresses an element outside the
    /// sequences, or a sequence names a position outside its symbol table.
    pub fn resolve_sequences(
        &self,
        script: &EditScript,
        seq_a: &[usize],
        seq_b: &[usize],
    ) -> Result<Resolution> {
        let mut mapping = self.project(script, seq_a, seq_b)?;
        tracing::debug!(
            "Projected {} of {} baseline symbols from the edit script",
            mapping.len(),
            seq_a.len()
        );

        let fully_mapped = (0..self.baseline.symbol_count()).all(|s| mapping.contains(s));
        let passes = if fully_mapped {
            Vec::new()
        } else {
            Propagator {
                baseline: self.baseline,
                candidate: self.candidate,
                config: self.config,
            }
            .run(&mut mapping)?
        };

        let targets = mapping.targets();
        let unmapped_a = seq_a.iter().copied().filter(|&s| !mapping.contains(s));
        let unmapped_b = seq_b.iter().copied().filter(|s| !targets.contains(s));

        let mut resolution = Resolution {
            passes,
            ..Resolution::default()
        };
        self.classify(unmapped_a, unmapped_b, &mut resolution);
        resolution.mapping = mapping;

        tracing::debug!(
            "Resolved {} symbols, {} baseline and {} candidate unresolved",
            resolution.mapping.len(),
            resolution.unresolved_baseline.len(),
            resolution.unresolved_candidate.len()
        );

        Ok(resolution)
    }

    /// Maps every kept element of `script` to its counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the script addresses an element outside the
    /// sequences, or a sequence names a position outside its symbol table.
    pub fn project(
        &self,
        script: &EditScript,
        seq_a: &[usize],
        seq_b: &[usize],
    ) -> Result<SymbolMapping> {
        self.check_sequences(script, seq_a, seq_b)?;

        let mut mapping = SymbolMapping::new();
        for (x, y) in script.kept_pairs() {
            mapping.insert(seq_a[x], seq_b[y]);
        }
        Ok(mapping)
    }

    /// Pairs each deleted run with an immediately following inserted run of equal length.
    ///
    /// Paired runs are mapped element by element. Runs of different lengths are not
    /// paired at all. Kept runs are not mapped, every other deleted or inserted element
    /// is reported as unmapped. No propagation is performed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if the script covers more elements than the symbol
    /// tables hold.
    pub fn pair_replacements(&self, script: &EditScript) -> Result<Resolution> {
        let (seq_a, seq_b) = self.full_tables();
        self.check_sequences(script, &seq_a, &seq_b)?;

        let mut mapping = SymbolMapping::new();
        let mut unpaired_a = Vec::new();
        let mut unpaired_b = Vec::new();
        let mut pending = None;

        for run in script.runs() {
            match run.kind {
                RunKind::Deleted => {
                    if let Some(previous) = pending.replace(*run) {
                        unpaired_a.extend(previous.old_start..previous.old_start + previous.len);
                    }
                }
                RunKind::Inserted => match pending.take() {
                    Some(removed) if removed.len == run.len => {
                        for k in 0..run.len {
                            let (a, b) = (removed.old_start + k, run.new_start + k);
                            mapping.insert(seq_a[a], seq_b[b]);
                        }
                    }
                    other => {
                        if let Some(removed) = other {
                            unpaired_a.extend(removed.old_start..removed.old_start + removed.len);
                        }
                        unpaired_b.extend(run.new_start..run.new_start + run.len);
                    }
                },
                RunKind::Kept => {
                    if let Some(removed) = pending.take() {
                        unpaired_a.extend(removed.old_start..removed.old_start + removed.len);
                    }
                }
            }
        }
        if let Some(removed) = pending {
            unpaired_a.extend(removed.old_start..removed.old_start + removed.len);
        }

        let mut resolution = Resolution::default();
        self.classify(
            unpaired_a.into_iter().map(|x| seq_a[x]),
            unpaired_b.into_iter().map(|y| seq_b[y]),
            &mut resolution,
        );
        resolution.mapping = mapping;
        Ok(resolution)
    }

    fn full_tables(&self) -> (Vec<usize>, Vec<usize>) {
        (
            (0..self.baseline.symbol_count()).collect(),
            (0..self.candidate.symbol_count()).collect(),
        )
    }

    fn check_sequences(&self, script: &EditScript, seq_a: &[usize], seq_b: &[usize]) -> Result<()> {
        if script.old_len() > seq_a.len() || script.new_len() > seq_b.len() {
            return Err(Error::OutOfBounds);
        }

        let symbols_a = self.baseline.symbol_count();
        let symbols_b = self.candidate.symbol_count();
        if seq_a.iter().any(|&s| s >= symbols_a) || seq_b.iter().any(|&s| s >= symbols_b) {
            return Err(Error::OutOfBounds);
        }

        Ok(())
    }

    fn classify(
        &self,
        unmapped_a: impl Iterator<Item = usize>,
        unmapped_b: impl Iterator<Item = usize>,
        resolution: &mut Resolution,
    ) {
        for symbol in unmapped_a {
            if self.has_literal_name(self.baseline, symbol) {
                resolution.removed.insert(symbol);
            } else {
                resolution.unresolved_baseline.insert(symbol);
            }
        }
        for symbol in unmapped_b {
            if self.has_literal_name(self.candidate, symbol) {
                resolution.added.insert(symbol);
            } else {
                resolution.unresolved_candidate.insert(symbol);
            }
        }
    }

    fn has_literal_name(&self, image: &AnalyzedImage<'_>, symbol: usize) -> bool {
        image
            .image()
            .symbol_name(symbol)
            .is_some_and(|name| !self.config.is_obfuscated(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abc::{
            ClassInfo, InstanceInfo, Instruction, MethodBody, MethodFlags, Operand, Trait,
            TraitKind,
        },
        analysis::{StructuralComparator, TraitCache},
        diff::{align_indices, Side},
        test::{analyze, ImagePair},
    };

    fn script_for(
        baseline: &AnalyzedImage<'_>,
        candidate: &AnalyzedImage<'_>,
        config: &MatcherConfig,
    ) -> EditScript {
        let cache = TraitCache::new();
        let cmp = StructuralComparator::new(baseline, candidate, &cache, config);
        align_indices(baseline.symbol_count(), candidate.symbol_count(), |a, b| {
            Ok(cmp.equal(a, b, false))
        })
        .unwrap()
    }

    #[test]
    fn test_projection_with_deletion() {
        let pair = ImagePair::build(|b, side| {
            b.add_qname("A");
            if side == Side::Baseline {
                b.add_qname("B");
            }
            b.add_qname("C");
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let script = script_for(&baseline, &candidate, &config);
        let resolution = SymbolResolver::new(&baseline, &candidate, &config)
            .resolve(&script)
            .unwrap();

        assert_eq!(resolution.mapping.iter().collect::<Vec<_>>(), vec![(0, 0), (2, 1)]);
        assert!(resolution.is_complete());
        assert_eq!(resolution.removed.iter().copied().collect::<Vec<_>>(), vec![1]);
        assert!(resolution.added.is_empty());
    }

    #[test]
    fn test_propagation_through_owner() {
        // `_-z` is only reachable through code; its owner method is named by `run`.
        let pair = ImagePair::build(|b, side| {
            let class = b.add_qname("Main");
            let member = b.add_qname("run");
            if side == Side::Candidate {
                b.add_qname("_-pad");
            }
            let z = b.add_qname(if side == Side::Baseline { "_-z" } else { "_-Y" });
            let method = b.add_method(0, MethodFlags::empty());
            b.add_simple_class(
                class,
                vec![Trait::callable(member, TraitKind::Method, method)],
                Vec::new(),
            );
            b.add_body(
                MethodBody::new(method),
                vec![
                    Instruction::new(0xD0),
                    Instruction::with_operands(0x66, vec![Operand::multiname(z)]),
                    Instruction::new(0x47),
                ],
            );
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let resolver = SymbolResolver::new(&baseline, &candidate, &config);
        let seq_a = [0, 1];
        let seq_b = [0, 1];
        let script = align_indices(2, 2, |_, _| Ok(true)).unwrap();

        let resolution = resolver.resolve_sequences(&script, &seq_a, &seq_b).unwrap();
        assert_eq!(resolution.mapping.get(2), Some(3));
        assert_eq!(resolution.passes[0].kind, PassKind::OwnerAligned);
        assert_eq!(resolution.passes[0].mapped, 1);
        assert!(resolution.unresolved_baseline.is_empty());
    }

    #[test]
    fn test_instruction_cap_skips_bodies() {
        let pair = ImagePair::build(|b, side| {
            let class = b.add_qname("Main");
            let member = b.add_qname("run");
            let z = b.add_qname(if side == Side::Baseline { "_-z" } else { "_-Y" });
            let method = b.add_method(0, MethodFlags::empty());
            b.add_simple_class(
                class,
                vec![Trait::callable(member, TraitKind::Method, method)],
                Vec::new(),
            );
            let mut code = vec![Instruction::new(0x02); 20];
            code.push(Instruction::with_operands(0x66, vec![Operand::multiname(z)]));
            b.add_body(MethodBody::new(method), code);
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default().with_max_propagation_instructions(10);

        let resolver = SymbolResolver::new(&baseline, &candidate, &config);
        let script = align_indices(2, 2, |_, _| Ok(true)).unwrap();
        let resolution = resolver.resolve_sequences(&script, &[0, 1], &[0, 1]).unwrap();

        assert!(!resolution.mapping.contains(2));
        assert!(resolution.passes.iter().all(|p| p.skipped_bodies == 1));
        assert_eq!(resolution.passes.len(), 3);
    }

    #[test]
    fn test_size_matched_requires_unique_candidate() {
        // Baseline has one getter under `Main`, the candidate two of similar size.
        let pair = ImagePair::build(|b, side| {
            let class = b.add_qname("Main");
            let z = b.add_qname(if side == Side::Baseline { "_-z" } else { "_-Y" });
            let getters = if side == Side::Baseline { 1 } else { 2 };
            let mut traits = Vec::new();
            for _ in 0..getters {
                let method = b.add_method(0, MethodFlags::empty());
                b.add_body(
                    MethodBody::new(method),
                    vec![
                        Instruction::new(0xD0),
                        Instruction::with_operands(0x66, vec![Operand::multiname(z)]),
                        Instruction::new(0x48),
                    ],
                );
                traits.push(Trait::callable(class, TraitKind::Getter, method));
            }
            b.add_simple_class(class, traits, Vec::new());
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let resolver = SymbolResolver::new(&baseline, &candidate, &config);
        let mut mapping = SymbolMapping::new();
        mapping.insert(0, 0);

        let propagator = Propagator {
            baseline: &baseline,
            candidate: &candidate,
            config: &config,
        };
        let size = propagator.pass(PassKind::SizeMatched, &mut mapping).unwrap();
        assert_eq!(size.mapped, 0);
        assert_eq!(size.visited_bodies, 0);

        // the owner-aligned pass takes the first role match
        let owner = propagator.pass(PassKind::OwnerAligned, &mut mapping).unwrap();
        assert_eq!(owner.mapped, 1);
        assert_eq!(mapping.get(1), Some(1));

        let script = align_indices(2, 2, |a, b| Ok(a == b)).unwrap();
        assert!(resolver.resolve(&script).unwrap().mapping.contains(1));
    }

    #[test]
    fn test_pair_replacements() {
        let pair = ImagePair::build(|b, side| {
            if side == Side::Baseline {
                for name in ["Keep", "_-a", "_-b", "Tail", "_-lonely"] {
                    b.add_qname(name);
                }
            } else {
                for name in ["Fresh", "Keep", "_-X", "_-Y", "Tail"] {
                    b.add_qname(name);
                }
            }
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let names = |image: &AnalyzedImage<'_>| -> Vec<String> {
            (0..image.symbol_count())
                .map(|s| image.image().symbol_name(s).unwrap_or_default().to_string())
                .collect()
        };
        // +Fresh | Keep | -_-a -_-b +_-X +_-Y | Tail | -_-lonely
        let script =
            crate::diff::align(&names(&baseline), &names(&candidate), |x, y| Ok(x == y)).unwrap();

        let resolver = SymbolResolver::new(&baseline, &candidate, &config);
        let resolution = resolver.pair_replacements(&script).unwrap();

        assert_eq!(resolution.mapping.iter().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
        assert_eq!(resolution.unresolved_baseline.iter().copied().collect::<Vec<_>>(), vec![4]);
        assert_eq!(resolution.added.iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(resolution.unresolved_candidate.is_empty());
        assert!(resolution.removed.is_empty());
        assert!(resolution.passes.is_empty());
    }

    #[test]
    fn test_unequal_replacement_runs_stay_unpaired() {
        let pair = ImagePair::build(|b, side| {
            if side == Side::Baseline {
                for name in ["Keep", "_-a", "_-b", "Tail"] {
                    b.add_qname(name);
                }
            } else {
                for name in ["Keep", "_-X", "Tail"] {
                    b.add_qname(name);
                }
            }
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        // Keep | -_-a -_-b +_-X | Tail
        let script = align_indices(4, 3, |a, b| {
            Ok(matches!((a, b), (0, 0) | (3, 2)))
        })
        .unwrap();
        assert_eq!((script.deleted(), script.inserted()), (2, 1));

        let resolution = SymbolResolver::new(&baseline, &candidate, &config)
            .pair_replacements(&script)
            .unwrap();

        assert!(resolution.mapping.is_empty());
        assert_eq!(
            resolution.unresolved_baseline.iter().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            resolution.unresolved_candidate.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
        assert!(resolution.removed.is_empty());
        assert!(resolution.added.is_empty());
    }

    #[test]
    fn test_size_matched_maps_unique_candidate() {
        // One getter per side, so the size-matched pass finds a single partner.
        let pair = ImagePair::build(|b, side| {
            let class = b.add_qname("Main");
            let z = b.add_qname(if side == Side::Baseline { "_-z" } else { "_-Y" });
            let method = b.add_method(0, MethodFlags::empty());
            let mut code = vec![
                Instruction::new(0xD0),
                Instruction::with_operands(0x66, vec![Operand::multiname(z)]),
            ];
            if side == Side::Candidate {
                code.push(Instruction::new(0x02));
            }
            code.extend((0..8).map(|_| Instruction::new(0x02)));
            code.push(Instruction::new(0x48));
            b.add_body(MethodBody::new(method), code);
            b.add_simple_class(
                class,
                vec![Trait::callable(class, TraitKind::Getter, method)],
                Vec::new(),
            );
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let propagator = Propagator {
            baseline: &baseline,
            candidate: &candidate,
            config: &config,
        };
        let mut mapping = SymbolMapping::new();
        mapping.insert(0, 0);

        let report = propagator.pass(PassKind::SizeMatched, &mut mapping).unwrap();
        assert_eq!(report.kind, PassKind::SizeMatched);
        assert_eq!(report.visited_bodies, 1);
        assert_eq!(report.mapped, 1);
        assert_eq!(mapping.get(1), Some(1));

        // 11 vs 12 instructions is outside a 5% tolerance
        let strict = MatcherConfig::default().with_size_tolerance(0.05);
        let propagator = Propagator {
            config: &strict,
            ..propagator
        };
        let mut mapping = SymbolMapping::new();
        mapping.insert(0, 0);
        let report = propagator.pass(PassKind::SizeMatched, &mut mapping).unwrap();
        assert_eq!(report.mapped, 0);
        assert!(!mapping.contains(1));
    }

    /// Three-link chain: `Main`'s initializer uses `_-r`, the method of `_-r` uses
    /// `_-q`, the method of `_-q` uses `_-p`. Each symbol becomes reachable only once
    /// the previous one is mapped, and lower positions are visited first.
    fn owner_chain() -> ImagePair {
        ImagePair::build(|b, side| {
            let suffix = if side == Side::Baseline { "a" } else { "b" };
            let class = b.add_qname("Main");
            let p = b.add_qname(&format!("_-p{suffix}"));
            let q = b.add_qname(&format!("_-q{suffix}"));
            let r = b.add_qname(&format!("_-r{suffix}"));

            let uses = |symbol| {
                vec![
                    Instruction::new(0xD0),
                    Instruction::with_operands(0x66, vec![Operand::multiname(symbol)]),
                    Instruction::new(0x47),
                ]
            };

            let method_r = b.add_method(0, MethodFlags::empty());
            let method_q = b.add_method(0, MethodFlags::empty());
            b.add_body(MethodBody::new(method_r), uses(q));
            b.add_body(MethodBody::new(method_q), uses(p));

            let iinit = b.add_method(0, MethodFlags::empty());
            let cinit = b.add_method(0, MethodFlags::empty());
            b.add_class(
                InstanceInfo {
                    name: class,
                    super_name: 0,
                    flags: 0,
                    iinit,
                    traits: vec![
                        Trait::callable(r, TraitKind::Method, method_r),
                        Trait::callable(q, TraitKind::Method, method_q),
                    ],
                },
                ClassInfo {
                    cinit,
                    traits: Vec::new(),
                },
            );
            b.add_body(MethodBody::new(iinit), uses(r));
        })
    }

    #[test]
    fn test_fixed_number_of_rounds() {
        let pair = owner_chain();
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let script = align_indices(1, 1, |_, _| Ok(true)).unwrap();

        // A, B: the last link is never reached
        let config = MatcherConfig::default().with_size_match_rounds(1);
        let resolution = SymbolResolver::new(&baseline, &candidate, &config)
            .resolve_sequences(&script, &[0], &[0])
            .unwrap();
        assert_eq!(resolution.passes.len(), 2);
        assert_eq!(resolution.mapping.get(3), Some(3));
        assert_eq!(resolution.mapping.get(2), Some(2));
        assert!(!resolution.mapping.contains(1));
        assert_eq!(
            resolution.unresolved_baseline.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_propagate_until_stable() {
        let pair = owner_chain();
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let script = align_indices(1, 1, |_, _| Ok(true)).unwrap();

        let config = MatcherConfig::default()
            .with_size_match_rounds(1)
            .with_propagate_until_stable(true);
        let resolution = SymbolResolver::new(&baseline, &candidate, &config)
            .resolve_sequences(&script, &[0], &[0])
            .unwrap();

        let kinds: Vec<_> = resolution.passes.iter().map(|p| p.kind).collect();
        let mapped: Vec<_> = resolution.passes.iter().map(|p| p.mapped).collect();
        assert_eq!(
            kinds,
            [PassKind::OwnerAligned, PassKind::SizeMatched].repeat(3)
        );
        // round 1 maps `_-r` then `_-q`, round 2 maps `_-p`, round 3 finds nothing
        assert_eq!(mapped, vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(resolution.mapping.get(1), Some(1));
        assert!(resolution.is_complete());
    }

    #[test]
    fn test_script_larger_than_tables() {
        let pair = ImagePair::build(|b, _| {
            b.add_qname("A");
        });
        let baseline = analyze(&pair.baseline);
        let candidate = analyze(&pair.candidate);
        let config = MatcherConfig::default();

        let script = align_indices(3, 3, |a, b| Ok(a == b)).unwrap();
        let resolver = SymbolResolver::new(&baseline, &candidate, &config);
        assert!(matches!(resolver.resolve(&script), Err(Error::OutOfBounds)));
        assert!(matches!(
            resolver.pair_replacements(&script),
            Err(Error::OutOfBounds)
        ));
    }
}
