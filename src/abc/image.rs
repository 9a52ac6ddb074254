use std::sync::Arc;

use crate::abc::{symbol_slot, MethodBody, MethodInfo, Multiname, Trait};

/// Instance (object) side of a class definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceInfo {
    /// Raw multiname index of the class name
    pub name: u32,
    /// Raw multiname index of the base class, `0` for none
    pub super_name: u32,
    /// Instance flags (sealed, final, interface, protected namespace)
    pub flags: u8,
    /// Method index of the instance initializer
    pub iinit: u32,
    /// Instance traits in declaration order
    pub traits: Vec<Trait>,
}

/// Static side of a class definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassInfo {
    /// Method index of the static initializer
    pub cinit: u32,
    /// Class traits in declaration order
    pub traits: Vec<Trait>,
}

/// A script entry point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptInfo {
    /// Method index of the script initializer
    pub init: u32,
    /// Script traits in declaration order
    pub traits: Vec<Trait>,
}

/// A parsed ABC bytecode image.
///
/// Produced by an external parser and never mutated by this crate. Pools that the ABC
/// format addresses with 1-based indices (strings, multinames) are stored without their
/// implicit zero entry.
#[derive(Debug, Clone, Default)]
pub struct AbcImage {
    /// String pool
    pub strings: Vec<Arc<str>>,
    /// Symbol table (multiname pool)
    pub symbols: Vec<Multiname>,
    /// Method signatures
    pub methods: Vec<MethodInfo>,
    /// Instance descriptors, parallel to `classes`
    pub instances: Vec<InstanceInfo>,
    /// Class descriptors, parallel to `instances`
    pub classes: Vec<ClassInfo>,
    /// Script descriptors
    pub scripts: Vec<ScriptInfo>,
    /// Method bodies
    pub bodies: Vec<MethodBody>,
}

impl AbcImage {
    /// Resolves a raw string index. `0` and dangling indices yield `None`.
    #[must_use]
    pub fn string(&self, raw: u32) -> Option<&str> {
        let slot = (raw as usize).checked_sub(1)?;
        self.strings.get(slot).map(AsRef::as_ref)
    }

    /// The symbol at a 0-based position.
    #[must_use]
    pub fn symbol(&self, position: usize) -> Option<&Multiname> {
        self.symbols.get(position)
    }

    /// The symbol referenced by a raw multiname index.
    #[must_use]
    pub fn symbol_ref(&self, raw: u32) -> Option<&Multiname> {
        symbol_slot(raw).and_then(|position| self.symbols.get(position))
    }

    /// Literal name of the qualified symbol at `position`.
    ///
    /// `None` for non-qualified kinds, runtime wildcards and dangling string references.
    #[must_use]
    pub fn symbol_name(&self, position: usize) -> Option<&str> {
        let name = self.symbol(position)?.qualified_name()?;
        self.string(name)
    }

    /// A method signature by index.
    #[must_use]
    pub fn method(&self, index: u32) -> Option<&MethodInfo> {
        self.methods.get(index as usize)
    }

    /// Number of symbol table entries.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}
