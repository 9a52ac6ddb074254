use dashmap::DashMap;

use crate::analysis::TraitRef;

/// Memoized trait comparison results.
///
/// Keys are the address of the baseline trait paired with the address of the candidate
/// trait. A symbol's trait bucket holds every trait sharing its name, so names alone
/// would collapse distinct bucket entries onto one result. Writes are insert-if-absent:
/// the first stored result for a pair is kept, and concurrent writers of the same
/// result are harmless.
#[derive(Debug, Default)]
pub struct TraitCache {
    entries: DashMap<(TraitRef, TraitRef), bool>,
}

impl TraitCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for baseline trait `a` against candidate trait `b`, if any.
    #[must_use]
    pub fn get(&self, a: TraitRef, b: TraitRef) -> Option<bool> {
        self.entries.get(&(a, b)).map(|entry| *entry)
    }

    /// Stores `result` unless the pair is already cached and returns the stored value.
    pub fn insert(&self, a: TraitRef, b: TraitRef, result: bool) -> bool {
        *self.entries.entry((a, b)).or_insert(result)
    }

    /// Number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached result.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::analysis::TraitOwner;

    fn instance_trait(instance: usize, index: usize) -> TraitRef {
        TraitRef {
            owner: TraitOwner::Instance(instance),
            index,
        }
    }

    #[test]
    fn test_lookup_is_per_side() {
        let cache = TraitCache::new();
        cache.insert(instance_trait(0, 3), instance_trait(1, 9), true);

        assert_eq!(cache.get(instance_trait(0, 3), instance_trait(1, 9)), Some(true));
        assert_eq!(cache.get(instance_trait(1, 9), instance_trait(0, 3)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_owner_is_part_of_the_key() {
        let cache = TraitCache::new();
        let class_trait = TraitRef {
            owner: TraitOwner::Class(0),
            index: 0,
        };
        cache.insert(instance_trait(0, 0), instance_trait(0, 0), true);

        assert_eq!(cache.get(class_trait, instance_trait(0, 0)), None);
        assert_eq!(cache.get(instance_trait(0, 0), class_trait), None);
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = TraitCache::new();
        assert!(!cache.insert(instance_trait(0, 1), instance_trait(0, 2), false));
        assert!(!cache.insert(instance_trait(0, 1), instance_trait(0, 2), true));
        assert_eq!(cache.get(instance_trait(0, 1), instance_trait(0, 2)), Some(false));
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = Arc::new(TraitCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        cache.insert(instance_trait(i, 0), instance_trait(i, 1), i % 2 == 0);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 100);
        assert_eq!(cache.get(instance_trait(4, 0), instance_trait(4, 1)), Some(true));
        assert_eq!(cache.get(instance_trait(5, 0), instance_trait(5, 1)), Some(false));

        cache.clear();
        assert!(cache.is_empty());
    }
}
