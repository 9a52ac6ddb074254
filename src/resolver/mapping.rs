use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Partial function from baseline symbol positions to candidate symbol positions.
///
/// Entries are never overwritten: the first mapping recorded for a baseline symbol is
/// final, later attempts are ignored. Iteration is ordered by baseline position, so two
/// runs over the same inputs produce identical mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMapping {
    entries: BTreeMap<usize, usize>,
}

impl SymbolMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `baseline -> candidate` unless `baseline` is already mapped.
    ///
    /// Returns true if the entry was added.
    pub fn insert(&mut self, baseline: usize, candidate: usize) -> bool {
        match self.entries.entry(baseline) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(candidate);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Candidate symbol for `baseline`.
    #[must_use]
    pub fn get(&self, baseline: usize) -> Option<usize> {
        self.entries.get(&baseline).copied()
    }

    /// True if `baseline` is mapped.
    #[must_use]
    pub fn contains(&self, baseline: usize) -> bool {
        self.entries.contains_key(&baseline)
    }

    /// Number of mapped baseline symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(baseline, candidate)` pairs in ascending baseline order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&a, &b)| (a, b))
    }

    /// The set of candidate symbols that something maps to.
    #[must_use]
    pub fn targets(&self) -> BTreeSet<usize> {
        self.entries.values().copied().collect()
    }
}

impl FromIterator<(usize, usize)> for SymbolMapping {
    /// Builds a mapping, keeping the first pair seen for each baseline symbol.
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        let mut mapping = SymbolMapping::new();
        for (a, b) in iter {
            mapping.insert(a, b);
        }
        mapping
    }
}
