//! Member descriptors attached to instances, classes and scripts.

use bitflags::bitflags;
use strum::{Display, EnumIter};

/// What a trait declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum TraitKind {
    /// Variable slot
    Slot = 0,
    /// Method
    Method = 1,
    /// Property getter
    Getter = 2,
    /// Property setter
    Setter = 3,
    /// Nested class
    Class = 4,
    /// Function closure
    Function = 5,
    /// Constant slot
    Const = 6,
}

impl TraitKind {
    /// True for kinds whose payload refers to a method signature.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Self::Method | Self::Getter | Self::Setter | Self::Function
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Upper-nibble trait attributes
    pub struct TraitAttributes: u8 {
        /// Cannot be overridden
        const FINAL = 0x1;
        /// Overrides a base class member
        const OVERRIDE = 0x2;
        /// Carries metadata entries
        const METADATA = 0x4;
    }
}

/// Kind-specific trait payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TraitData {
    /// Payload of `Slot` and `Const` traits
    Slot {
        /// Declared slot id
        slot_id: u32,
        /// Raw multiname index of the declared type, `0` for `*`
        type_name: u32,
        /// Raw constant pool index of the initial value, `0` for none
        vindex: u32,
        /// Constant kind byte for `vindex`
        vkind: u8,
    },
    /// Payload of `Method`, `Getter` and `Setter` traits
    Method {
        /// Dispatch id
        disp_id: u32,
        /// Method signature index
        method: u32,
    },
    /// Payload of `Class` traits
    Class {
        /// Declared slot id
        slot_id: u32,
        /// Class index
        class: u32,
    },
    /// Payload of `Function` traits
    Function {
        /// Declared slot id
        slot_id: u32,
        /// Method signature index
        function: u32,
    },
}

/// A member descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    /// Raw multiname index naming the member
    pub name: u32,
    /// Trait kind
    pub kind: TraitKind,
    /// Trait attributes
    pub attributes: TraitAttributes,
    /// Kind-specific payload
    pub data: TraitData,
}

impl Trait {
    /// A `Slot` trait with the given declared type.
    #[must_use]
    pub fn slot(name: u32, slot_id: u32, type_name: u32) -> Self {
        Trait {
            name,
            kind: TraitKind::Slot,
            attributes: TraitAttributes::empty(),
            data: TraitData::Slot {
                slot_id,
                type_name,
                vindex: 0,
                vkind: 0,
            },
        }
    }

    /// A callable trait of `kind` pointing at `method`.
    ///
    /// `Function` traits store the method in their own payload variant; every other kind
    /// uses [`TraitData::Method`].
    #[must_use]
    pub fn callable(name: u32, kind: TraitKind, method: u32) -> Self {
        let data = match kind {
            TraitKind::Function => TraitData::Function {
                slot_id: 0,
                function: method,
            },
            _ => TraitData::Method { disp_id: 0, method },
        };

        Trait {
            name,
            kind,
            attributes: TraitAttributes::empty(),
            data,
        }
    }

    /// A `Class` trait.
    #[must_use]
    pub fn class(name: u32, slot_id: u32, class: u32) -> Self {
        Trait {
            name,
            kind: TraitKind::Class,
            attributes: TraitAttributes::empty(),
            data: TraitData::Class { slot_id, class },
        }
    }

    /// Method signature index for callable traits.
    #[must_use]
    pub fn method(&self) -> Option<u32> {
        match self.data {
            TraitData::Method { method, .. } => Some(method),
            TraitData::Function { function, .. } => Some(function),
            _ => None,
        }
    }

    /// True when both kind and attributes match.
    #[must_use]
    pub fn same_kind(&self, other: &Trait) -> bool {
        self.kind == other.kind && self.attributes == other.attributes
    }
}
