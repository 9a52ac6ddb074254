//! Per-symbol cross-reference index.
//!
//! For every position in the symbol table the index records who declares the symbol and
//! who mentions it: the instances that carry it as their name or as a member name, the
//! instance and class traits named by it, and the method bodies that use it as an
//! instruction operand.
//!
//! # Ordering
//!
//! Structural comparison pairs the `i`-th entry of a bucket in one image with the
//! `i`-th entry of the corresponding bucket in the other image, so buckets must list
//! their entries in declaration order. Construction may fan out over the rayon pool,
//! but every category produces its contributions through an order-preserving
//! `collect`, and the categories are merged sequentially in a fixed order
//! (instances, classes, method bodies). The resulting index is identical whether it
//! was built in parallel or not.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    abc::{symbol_slot, AbcImage, OperandType, Trait, TraitKind},
    disassembler::DecodedBodies,
};

/// Which descriptor owns a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitOwner {
    /// Position in [`AbcImage::instances`]
    Instance(usize),
    /// Position in [`AbcImage::classes`]
    Class(usize),
}

/// Address of a trait inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitRef {
    /// Owning descriptor
    pub owner: TraitOwner,
    /// Position in the owner's trait list
    pub index: usize,
}

impl TraitRef {
    /// Looks the trait up in `image`.
    #[must_use]
    pub fn resolve<'a>(&self, image: &'a AbcImage) -> Option<&'a Trait> {
        let traits = match self.owner {
            TraitOwner::Instance(i) => &image.instances.get(i)?.traits,
            TraitOwner::Class(i) => &image.classes.get(i)?.traits,
        };
        traits.get(self.index)
    }
}

/// How a method relates to the symbol that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerRole {
    /// Instance initializer of the named class
    Initializer,
    /// Static initializer of the named class
    StaticInitializer,
    /// Implementation of a callable trait of the given kind
    Trait(TraitKind),
    /// Initializer of a script whose first trait declares the named class
    Script,
}

/// The symbol a method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodOwner {
    /// Symbol position of the owner
    pub symbol: usize,
    /// Relationship between owner and method
    pub role: OwnerRole,
}

/// All references to one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XRef {
    /// Instances named by the symbol or declaring a member named by it
    pub instances: Vec<usize>,
    /// Instance traits named by the symbol
    pub instance_traits: Vec<TraitRef>,
    /// Class traits named by the symbol
    pub class_traits: Vec<TraitRef>,
    /// Bodies using the symbol as an instruction operand, each listed once
    pub code_references: Vec<usize>,
}

impl XRef {
    /// True if nothing references the symbol.
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.instances.is_empty()
            && self.instance_traits.is_empty()
            && self.class_traits.is_empty()
            && self.code_references.is_empty()
    }
}

/// Counters gathered while building an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XRefStats {
    /// Number of symbols covered
    pub symbols: usize,
    /// Symbols without any reference
    pub unused: usize,
    /// References that pointed at `0` or past the end of the symbol table
    pub dangling: usize,
}

enum Entry {
    Instance(usize),
    InstanceTrait(TraitRef),
    ClassTrait(TraitRef),
    Code(usize),
}

/// The cross-reference index of one image.
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceIndex {
    xrefs: Vec<XRef>,
    owners: Vec<Option<MethodOwner>>,
    owned: FxHashMap<usize, Vec<u32>>,
    stats: XRefStats,
}

fn collect_ordered<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().enumerate().map(|(i, v)| f(i, v)).collect()
    } else {
        items.iter().enumerate().map(|(i, v)| f(i, v)).collect()
    }
}

impl CrossReferenceIndex {
    /// Builds the index for `image`.
    ///
    /// `bodies` must have been decoded from the same image.
    pub fn build(image: &AbcImage, bodies: &DecodedBodies, parallel: bool) -> Self {
        let instance_entries = collect_ordered(&image.instances, parallel, |i, instance| {
            let mut entries = Vec::with_capacity(1 + instance.traits.len() * 2);
            entries.push((instance.name, Entry::Instance(i)));
            for (index, t) in instance.traits.iter().enumerate() {
                let trait_ref = TraitRef {
                    owner: TraitOwner::Instance(i),
                    index,
                };
                entries.push((t.name, Entry::InstanceTrait(trait_ref)));
                entries.push((t.name, Entry::Instance(i)));
            }
            entries
        });

        let class_entries = collect_ordered(&image.classes, parallel, |i, class| {
            class
                .traits
                .iter()
                .enumerate()
                .map(|(index, t)| {
                    let trait_ref = TraitRef {
                        owner: TraitOwner::Class(i),
                        index,
                    };
                    (t.name, Entry::ClassTrait(trait_ref))
                })
                .collect::<Vec<_>>()
        });

        let body_entries = collect_ordered(&image.bodies, parallel, |position, _| {
            let mut seen = FxHashSet::default();
            let mut entries = Vec::new();
            for instruction in bodies.get(position).unwrap_or_default() {
                for operand in &instruction.operands {
                    if operand.kind == OperandType::Multiname && seen.insert(operand.raw) {
                        entries.push((operand.raw, Entry::Code(position)));
                    }
                }
            }
            entries
        });

        let symbol_count = image.symbols.len();
        let mut xrefs = vec![XRef::default(); symbol_count];
        let mut dangling = 0;

        let contributions = instance_entries
            .into_iter()
            .chain(class_entries)
            .chain(body_entries)
            .flatten();

        for (raw, entry) in contributions {
            let Some(xref) = symbol_slot(raw).and_then(|slot| xrefs.get_mut(slot)) else {
                dangling += 1;
                continue;
            };

            match entry {
                Entry::Instance(i) => xref.instances.push(i),
                Entry::InstanceTrait(t) => xref.instance_traits.push(t),
                Entry::ClassTrait(t) => xref.class_traits.push(t),
                Entry::Code(body) => xref.code_references.push(body),
            }
        }

        let (owners, owned) = Self::build_owners(image);

        let stats = XRefStats {
            symbols: symbol_count,
            unused: xrefs.iter().filter(|x| x.is_unused()).count(),
            dangling,
        };

        tracing::debug!(
            "Indexed {} symbols ({} unused, {} dangling references) over {} bodies",
            stats.symbols,
            stats.unused,
            stats.dangling,
            image.bodies.len()
        );

        CrossReferenceIndex {
            xrefs,
            owners,
            owned,
            stats,
        }
    }

    fn build_owners(image: &AbcImage) -> (Vec<Option<MethodOwner>>, FxHashMap<usize, Vec<u32>>) {
        let mut owners: Vec<Option<MethodOwner>> = vec![None; image.methods.len()];
        let symbol_count = image.symbols.len();

        let mut assign = |method: u32, raw: u32, role: OwnerRole| {
            let Some(symbol) = symbol_slot(raw).filter(|&s| s < symbol_count) else {
                return;
            };
            if let Some(slot @ None) = owners.get_mut(method as usize) {
                *slot = Some(MethodOwner { symbol, role });
            }
        };

        let callable = |t: &Trait| {
            if t.kind.is_callable() {
                t.method().map(|m| (m, OwnerRole::Trait(t.kind)))
            } else {
                None
            }
        };

        for (instance, class) in image.instances.iter().zip(image.classes.iter()) {
            assign(instance.iinit, instance.name, OwnerRole::Initializer);
            assign(class.cinit, instance.name, OwnerRole::StaticInitializer);
        }
        for instance in &image.instances {
            for t in &instance.traits {
                if let Some((method, role)) = callable(t) {
                    assign(method, t.name, role);
                }
            }
        }
        for class in &image.classes {
            for t in &class.traits {
                if let Some((method, role)) = callable(t) {
                    assign(method, t.name, role);
                }
            }
        }
        for script in &image.scripts {
            if let Some(first) = script.traits.first().filter(|t| t.kind == TraitKind::Class) {
                assign(script.init, first.name, OwnerRole::Script);
            }
        }

        let mut owned: FxHashMap<usize, Vec<u32>> = FxHashMap::default();
        for (method, owner) in owners.iter().enumerate() {
            if let Some(owner) = owner {
                owned.entry(owner.symbol).or_default().push(method as u32);
            }
        }

        (owners, owned)
    }

    /// References to the symbol at `symbol`.
    #[must_use]
    pub fn get(&self, symbol: usize) -> Option<&XRef> {
        self.xrefs.get(symbol)
    }

    /// Number of symbols covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xrefs.len()
    }

    /// True for an image without symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xrefs.is_empty()
    }

    /// Owner of `method`, if the image declares one.
    #[must_use]
    pub fn owner(&self, method: u32) -> Option<MethodOwner> {
        self.owners.get(method as usize).copied().flatten()
    }

    /// Methods owned by `symbol`, in ascending method index order.
    #[must_use]
    pub fn owned_by(&self, symbol: usize) -> &[u32] {
        self.owned.get(&symbol).map_or(&[], Vec::as_slice)
    }

    /// Counters gathered during construction.
    #[must_use]
    pub fn stats(&self) -> XRefStats {
        self.stats
    }
}
