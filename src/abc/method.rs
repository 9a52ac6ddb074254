//! Method signatures and bodies.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Method signature flags
    pub struct MethodFlags: u8 {
        /// Body uses the `arguments` object
        const NEED_ARGUMENTS = 0x01;
        /// Body creates an activation object
        const NEED_ACTIVATION = 0x02;
        /// Method takes a rest parameter
        const NEED_REST = 0x04;
        /// Signature carries optional parameter defaults
        const HAS_OPTIONAL = 0x08;
        /// Body changes the default XML namespace
        const SET_DXNS = 0x40;
        /// Signature carries parameter names
        const HAS_PARAM_NAMES = 0x80;
    }
}

/// A method signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodInfo {
    /// Number of declared parameters
    pub param_count: u32,
    /// Raw string index of the debug name, `0` for anonymous methods
    pub name: u32,
    /// Signature flags
    pub flags: MethodFlags,
}

impl MethodInfo {
    /// An anonymous signature.
    #[must_use]
    pub fn new(param_count: u32, flags: MethodFlags) -> Self {
        MethodInfo {
            param_count,
            name: 0,
            flags,
        }
    }

    /// True when the signature carries a debug name.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.name != 0
    }
}

/// The body of a method, as delivered by the external parser.
///
/// `code` is kept opaque; it is only ever interpreted by a
/// [`Disassembler`](crate::disassembler::Disassembler).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodBody {
    /// Index of the signature this body implements
    pub method: u32,
    /// Maximum operand stack depth
    pub max_stack: u32,
    /// Number of local registers
    pub local_count: u32,
    /// Scope depth on entry
    pub init_scope_depth: u32,
    /// Maximum scope depth
    pub max_scope_depth: u32,
    /// Raw instruction bytes
    pub code: Vec<u8>,
}

impl MethodBody {
    /// A body for `method` with default frame metadata and no code.
    #[must_use]
    pub fn new(method: u32) -> Self {
        MethodBody {
            method,
            max_stack: 1,
            local_count: 1,
            init_scope_depth: 0,
            max_scope_depth: 1,
            code: Vec::new(),
        }
    }

    /// True when max-stack, local count and both scope depths match.
    #[must_use]
    pub fn same_frame(&self, other: &MethodBody) -> bool {
        self.max_stack == other.max_stack
            && self.local_count == other.local_count
            && self.init_scope_depth == other.init_scope_depth
            && self.max_scope_depth == other.max_scope_depth
    }
}
