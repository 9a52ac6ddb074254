//! Symbol table entries (ABC multinames).
//!
//! Every name an ABC program mentions, from class names down to property accesses in
//! method bodies, is an index into the multiname pool. Obfuscators rename the string
//! that a qualified multiname points at, and recompilation renumbers the pool itself,
//! which is why matching has to fall back to structure.

use strum::{Display, EnumIter};

/// Discriminant of a [`Multiname`], carrying the ABC tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum MultinameKind {
    /// Namespace-qualified name
    QName = 0x07,
    /// Namespace-qualified attribute name
    QNameA = 0x0D,
    /// Runtime-qualified name
    RTQName = 0x0F,
    /// Runtime-qualified attribute name
    RTQNameA = 0x10,
    /// Runtime-qualified late-bound name
    RTQNameL = 0x11,
    /// Runtime-qualified late-bound attribute name
    RTQNameLA = 0x12,
    /// Name resolved against a namespace set
    Multiname = 0x09,
    /// Attribute name resolved against a namespace set
    MultinameA = 0x0E,
    /// Late-bound name resolved against a namespace set
    MultinameL = 0x1B,
    /// Late-bound attribute name resolved against a namespace set
    MultinameLA = 0x1C,
    /// Parameterized type name (`Vector.<T>`)
    TypeName = 0x1D,
}

impl MultinameKind {
    /// Returns the ABC tag byte.
    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// True for the two namespace-qualified kinds, the only ones resolved by name.
    #[must_use]
    pub fn is_qualified(self) -> bool {
        matches!(self, Self::QName | Self::QNameA)
    }
}

/// A single symbol table entry.
///
/// String and namespace references are raw pool indices; `0` means the value is
/// supplied at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Multiname {
    /// `QName` / `QNameA`
    QName {
        /// Attribute variant (`QNameA`)
        attribute: bool,
        /// Raw namespace pool index
        ns: u32,
        /// Raw string pool index, `0` for a wildcard name
        name: u32,
    },
    /// `RTQName` / `RTQNameA`
    RTQName {
        /// Attribute variant
        attribute: bool,
        /// Raw string pool index
        name: u32,
    },
    /// `RTQNameL` / `RTQNameLA`
    RTQNameL {
        /// Attribute variant
        attribute: bool,
    },
    /// `Multiname` / `MultinameA`
    Multiname {
        /// Attribute variant
        attribute: bool,
        /// Raw string pool index
        name: u32,
        /// Raw namespace-set pool index
        ns_set: u32,
    },
    /// `MultinameL` / `MultinameLA`
    MultinameL {
        /// Attribute variant
        attribute: bool,
        /// Raw namespace-set pool index
        ns_set: u32,
    },
    /// `TypeName`
    TypeName {
        /// Raw multiname index of the generic base type
        qname: u32,
        /// Raw multiname indices of the type parameters
        params: Vec<u32>,
    },
}

impl Multiname {
    /// Convenience constructor for a plain `QName`.
    #[must_use]
    pub fn qname(ns: u32, name: u32) -> Self {
        Multiname::QName {
            attribute: false,
            ns,
            name,
        }
    }

    /// The kind tag of this entry.
    #[must_use]
    pub fn kind(&self) -> MultinameKind {
        match self {
            Multiname::QName { attribute, .. } => {
                if *attribute {
                    MultinameKind::QNameA
                } else {
                    MultinameKind::QName
                }
            }
            Multiname::RTQName { attribute, .. } => {
                if *attribute {
                    MultinameKind::RTQNameA
                } else {
                    MultinameKind::RTQName
                }
            }
            Multiname::RTQNameL { attribute } => {
                if *attribute {
                    MultinameKind::RTQNameLA
                } else {
                    MultinameKind::RTQNameL
                }
            }
            Multiname::Multiname { attribute, .. } => {
                if *attribute {
                    MultinameKind::MultinameA
                } else {
                    MultinameKind::Multiname
                }
            }
            Multiname::MultinameL { attribute, .. } => {
                if *attribute {
                    MultinameKind::MultinameLA
                } else {
                    MultinameKind::MultinameL
                }
            }
            Multiname::TypeName { .. } => MultinameKind::TypeName,
        }
    }

    /// Raw string index of a qualified name, `None` for other kinds.
    ///
    /// A returned `Some(0)` is the runtime wildcard.
    #[must_use]
    pub fn qualified_name(&self) -> Option<u32> {
        match self {
            Multiname::QName { name, .. } => Some(*name),
            _ => None,
        }
    }
}
