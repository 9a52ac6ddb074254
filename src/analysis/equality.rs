//! Structural symbol equality across two images.
//!
//! Literal names only mean something while they are not obfuscated. Once both sides
//! carry generated names the comparator falls back to the shape of the program around
//! the symbol: how many instances and traits declare it, what those traits look like,
//! and which kinds of methods mention it in their code.
//!
//! # Recursion bound
//!
//! A slot's declared type is itself a symbol, and comparing it in full could recurse
//! back into the traits that led there. Type references are therefore always compared
//! *shallow* (cardinalities only), which bounds the recursion depth at one level of
//! trait comparison without any cycle detection.

use crate::{
    abc::{symbol_slot, Trait, TraitData},
    analysis::{AnalyzedImage, TraitCache, TraitRef, XRef},
    config::MatcherConfig,
    resolver::SymbolMapping,
};

/// Compares baseline symbols with candidate symbols.
///
/// The comparator is a cheap borrow of session state and can be shared across threads;
/// its only mutable state is the [`TraitCache`], which tolerates concurrent writers.
#[derive(Clone, Copy)]
pub struct StructuralComparator<'s, 'a> {
    baseline: &'s AnalyzedImage<'a>,
    candidate: &'s AnalyzedImage<'a>,
    cache: &'s TraitCache,
    config: &'s MatcherConfig,
    pinned: Option<&'s SymbolMapping>,
}

impl<'s, 'a> StructuralComparator<'s, 'a> {
    /// Creates a comparator over two analysed images.
    #[must_use]
    pub fn new(
        baseline: &'s AnalyzedImage<'a>,
        candidate: &'s AnalyzedImage<'a>,
        cache: &'s TraitCache,
        config: &'s MatcherConfig,
    ) -> Self {
        StructuralComparator {
            baseline,
            candidate,
            cache,
            config,
            pinned: None,
        }
    }

    /// Consults `mapping` before any structural work.
    ///
    /// A baseline symbol present in the mapping equals exactly the candidate symbol it
    /// maps to.
    #[must_use]
    pub fn with_pinned(mut self, mapping: &'s SymbolMapping) -> Self {
        self.pinned = Some(mapping);
        self
    }

    /// Decides whether baseline symbol `a` and candidate symbol `b` are the same entity.
    ///
    /// With `shallow` set, matching reference counts are sufficient. Positions outside
    /// either symbol table compare unequal.
    #[must_use]
    pub fn equal(&self, a: usize, b: usize, shallow: bool) -> bool {
        if let Some(mapped) = self.pinned.and_then(|mapping| mapping.get(a)) {
            return mapped == b;
        }

        let (Some(left), Some(right)) = (
            self.baseline.image().symbol(a),
            self.candidate.image().symbol(b),
        ) else {
            return false;
        };

        if left.kind() != right.kind() {
            return false;
        }

        // Only qualified names are resolved; other kinds are equal when their kind is.
        match (left.qualified_name(), right.qualified_name()) {
            (Some(name_a), Some(name_b)) => self.compare_qualified(a, b, name_a, name_b, shallow),
            _ => true,
        }
    }

    fn compare_qualified(
        &self,
        a: usize,
        b: usize,
        name_a: u32,
        name_b: u32,
        shallow: bool,
    ) -> bool {
        if name_a != 0 && name_b != 0 {
            let (Some(literal_a), Some(literal_b)) = (
                self.baseline.image().string(name_a),
                self.candidate.image().string(name_b),
            ) else {
                return false;
            };

            let obfuscated_a = self.config.is_obfuscated(literal_a);
            if obfuscated_a != self.config.is_obfuscated(literal_b) {
                return false;
            }
            if !obfuscated_a {
                return literal_a == literal_b;
            }
        }

        let (Some(xref_a), Some(xref_b)) = (
            self.baseline.index().get(a),
            self.candidate.index().get(b),
        ) else {
            return false;
        };

        self.compare_structure(xref_a, xref_b, shallow)
    }

    fn compare_structure(&self, a: &XRef, b: &XRef, shallow: bool) -> bool {
        if a.instances.len() != b.instances.len()
            || a.instance_traits.len() != b.instance_traits.len()
            || a.class_traits.len() != b.class_traits.len()
        {
            return false;
        }

        if shallow {
            return true;
        }

        if a.code_references.len() != b.code_references.len() {
            return false;
        }

        let image_a = self.baseline.image();
        let image_b = self.candidate.image();

        if !self.traits_match(&a.instance_traits, &b.instance_traits)
            || !self.traits_match(&a.class_traits, &b.class_traits)
        {
            return false;
        }

        a.code_references
            .iter()
            .zip(&b.code_references)
            .all(|(&body_a, &body_b)| {
                let method_a = image_a
                    .bodies
                    .get(body_a)
                    .and_then(|body| image_a.method(body.method));
                let method_b = image_b
                    .bodies
                    .get(body_b)
                    .and_then(|body| image_b.method(body.method));

                match (method_a, method_b) {
                    (Some(m1), Some(m2)) => {
                        m1.flags == m2.flags && m1.param_count == m2.param_count
                    }
                    _ => false,
                }
            })
    }

    fn traits_match(&self, refs_a: &[TraitRef], refs_b: &[TraitRef]) -> bool {
        refs_a
            .iter()
            .zip(refs_b)
            .all(|(x, y)| self.compare_traits(*x, *y))
    }

    /// Compares baseline trait `x` with candidate trait `y`, memoized by trait address.
    ///
    /// Addresses that do not resolve compare unequal.
    #[must_use]
    pub fn compare_traits(&self, x: TraitRef, y: TraitRef) -> bool {
        if let Some(cached) = self.cache.get(x, y) {
            return cached;
        }

        let result = match (
            x.resolve(self.baseline.image()),
            y.resolve(self.candidate.image()),
        ) {
            (Some(t1), Some(t2)) => self.compare_traits_uncached(t1, t2),
            _ => false,
        };
        self.cache.insert(x, y, result)
    }

    fn compare_traits_uncached(&self, t1: &Trait, t2: &Trait) -> bool {
        if !t1.same_kind(t2) {
            return false;
        }

        if t1.kind.is_callable() {
            let (Some(m1), Some(m2)) = (t1.method(), t2.method()) else {
                return false;
            };
            return self.compare_methods(m1, m2);
        }

        match (&t1.data, &t2.data) {
            (
                TraitData::Slot {
                    slot_id: id_a,
                    type_name: type_a,
                    ..
                },
                TraitData::Slot {
                    slot_id: id_b,
                    type_name: type_b,
                    ..
                },
            ) => {
                if id_a != id_b {
                    return false;
                }
                match (symbol_slot(*type_a), symbol_slot(*type_b)) {
                    (None, None) => true,
                    (Some(x), Some(y)) => self.equal(x, y, true),
                    _ => false,
                }
            }
            _ => true,
        }
    }

    fn compare_methods(&self, m1: u32, m2: u32) -> bool {
        let (Some(info_a), Some(info_b)) = (
            self.baseline.image().method(m1),
            self.candidate.image().method(m2),
        ) else {
            return false;
        };

        if info_a.param_count != info_b.param_count
            || info_a.flags != info_b.flags
            || info_a.is_named() != info_b.is_named()
        {
            return false;
        }

        let body_a = self
            .baseline
            .bodies()
            .body_of(m1)
            .and_then(|position| self.baseline.body(position));
        let body_b = self
            .candidate
            .bodies()
            .body_of(m2)
            .and_then(|position| self.candidate.body(position));

        let (Some((body_a, code_a)), Some((body_b, code_b))) = (body_a, body_b) else {
            return true;
        };

        body_a.same_frame(body_b)
            && code_a.len() == code_b.len()
            && code_a
                .iter()
                .zip(code_b)
                .all(|(x, y)| x.opcode == y.opcode)
    }
}
