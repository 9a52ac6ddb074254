//! Mapping propagation through matched method bodies.
//!
//! Both passes start from a baseline symbol that is still unmapped, visit every body that
//! mentions it, and look for the body that plays the same part in the candidate image.
//! Once a partner body is found, the two instruction streams are aligned on opcodes and
//! literal operands, and every symbol operand of a kept instruction pair yields a mapping
//! from the baseline operand to the candidate operand at the same operand position.
//!
//! The passes only differ in how the partner body is chosen:
//!
//! - [`PassKind::OwnerAligned`] takes the candidate method with the same role under the
//!   mapped owner symbol.
//! - [`PassKind::SizeMatched`] additionally requires that exactly one such method has an
//!   instruction count within the configured relative tolerance.

use strum::Display;

use crate::{
    abc::Instruction,
    analysis::AnalyzedImage,
    config::MatcherConfig,
    diff::align,
    resolver::SymbolMapping,
    Result,
};

/// Heuristic used to pair method bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PassKind {
    /// Partner chosen by owner correspondence
    #[strum(serialize = "owner-aligned")]
    OwnerAligned,
    /// Partner chosen by owner correspondence and instruction count
    #[strum(serialize = "size-matched")]
    SizeMatched,
}

/// Outcome of one propagation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// Which heuristic ran
    pub kind: PassKind,
    /// Bodies that were paired and aligned
    pub visited_bodies: usize,
    /// Paired bodies skipped for exceeding the instruction cap
    pub skipped_bodies: usize,
    /// Mappings added by the pass
    pub mapped: usize,
}

impl PassReport {
    fn new(kind: PassKind) -> Self {
        PassReport {
            kind,
            visited_bodies: 0,
            skipped_bodies: 0,
            mapped: 0,
        }
    }
}

pub(super) struct Propagator<'r, 'a> {
    pub baseline: &'r AnalyzedImage<'a>,
    pub candidate: &'r AnalyzedImage<'a>,
    pub config: &'r MatcherConfig,
}

impl Propagator<'_, '_> {
    /// Runs the configured sequence of passes and returns one report per pass.
    pub fn run(&self, mapping: &mut SymbolMapping) -> Result<Vec<PassReport>> {
        let mut reports = Vec::new();

        if self.config.propagate_until_stable {
            loop {
                let owner = self.pass(PassKind::OwnerAligned, mapping)?;
                let size = self.pass(PassKind::SizeMatched, mapping)?;
                let progress = owner.mapped + size.mapped;
                reports.push(owner);
                reports.push(size);
                if progress == 0 {
                    break;
                }
            }
        } else {
            reports.push(self.pass(PassKind::OwnerAligned, mapping)?);
            for _ in 0..self.config.size_match_rounds {
                reports.push(self.pass(PassKind::SizeMatched, mapping)?);
            }
        }

        Ok(reports)
    }

    /// One pass over every baseline symbol unmapped at its start.
    pub fn pass(&self, kind: PassKind, mapping: &mut SymbolMapping) -> Result<PassReport> {
        let mut report = PassReport::new(kind);
        let unmapped: Vec<usize> = (0..self.baseline.symbol_count())
            .filter(|&symbol| !mapping.contains(symbol))
            .collect();

        for symbol in unmapped {
            if mapping.contains(symbol) {
                continue;
            }
            let Some(xref) = self.baseline.index().get(symbol) else {
                continue;
            };

            for &body in &xref.code_references {
                let Some(partner) = self.partner(kind, body, mapping) else {
                    continue;
                };
                let (Some((_, code_a)), Some((_, code_b))) =
                    (self.baseline.body(body), self.candidate.body(partner))
                else {
                    continue;
                };

                let cap = self.config.max_propagation_instructions;
                if code_a.len() > cap || code_b.len() > cap {
                    report.skipped_bodies += 1;
                    continue;
                }

                report.visited_bodies += 1;
                report.mapped += self.harvest(code_a, code_b, mapping)?;
            }
        }

        tracing::debug!(
            "{} pass: {} bodies aligned, {} skipped, {} new mappings",
            kind,
            report.visited_bodies,
            report.skipped_bodies,
            report.mapped
        );

        Ok(report)
    }

    /// Candidate body playing the part of baseline body `body`, if one can be determined.
    fn partner(&self, kind: PassKind, body: usize, mapping: &SymbolMapping) -> Option<usize> {
        let (record, code_a) = self.baseline.body(body)?;
        let owner = self.baseline.index().owner(record.method)?;
        let mapped_owner = mapping.get(owner.symbol)?;

        let candidate_index = self.candidate.index();
        let candidate_bodies = self.candidate.bodies();
        let mut methods = candidate_index
            .owned_by(mapped_owner)
            .iter()
            .filter(|&&method| {
                candidate_index
                    .owner(method)
                    .is_some_and(|candidate| candidate.role == owner.role)
            })
            .filter_map(|&method| candidate_bodies.body_of(method));

        match kind {
            PassKind::OwnerAligned => methods.next(),
            PassKind::SizeMatched => {
                if code_a.is_empty() {
                    return None;
                }
                let len_a = code_a.len() as f64;
                let mut sized = methods.filter(|&position| {
                    let len_b = candidate_bodies.get(position).map_or(0, <[Instruction]>::len);
                    (len_b as f64 - len_a).abs() / len_a < self.config.size_tolerance
                });

                let first = sized.next()?;
                match sized.next() {
                    Some(_) => None,
                    None => Some(first),
                }
            }
        }
    }

    /// Aligns two paired bodies and records symbol correspondences of kept instructions.
    fn harvest(
        &self,
        code_a: &[Instruction],
        code_b: &[Instruction],
        mapping: &mut SymbolMapping,
    ) -> Result<usize> {
        let script = align(code_a, code_b, |x, y| Ok(x.literal_eq(y)))?;
        let symbols_a = self.baseline.symbol_count();
        let symbols_b = self.candidate.symbol_count();

        let mut added = 0;
        for (x, y) in script.kept_pairs() {
            let (left, right) = (&code_a[x], &code_b[y]);
            for (position, symbol_a) in left.symbols() {
                let Some(symbol_b) = right.operands.get(position).and_then(|op| op.symbol())
                else {
                    continue;
                };
                if symbol_a >= symbols_a || symbol_b >= symbols_b {
                    continue;
                }
                if mapping.insert(symbol_a, symbol_b) {
                    tracing::trace!("Propagated symbol {} -> {}", symbol_a, symbol_b);
                    added += 1;
                }
            }
        }

        Ok(added)
    }
}
