//! Incremental construction of [`AbcImage`] values.
//!
//! Adapters that translate the output of an ABC parser, and the test suites, assemble
//! images through [`ImageBuilder`]. Instruction streams handed to the builder are
//! collected into a [`Listing`] so that the resulting pair can be fed straight into a
//! comparison session.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{
    abc::{
        AbcImage, ClassInfo, Instruction, InstanceInfo, MethodBody, MethodFlags, MethodInfo,
        Multiname, ScriptInfo, Trait,
    },
    disassembler::Listing,
};

/// Builder for [`AbcImage`].
///
/// All `add_*` methods return the raw index the ABC format would use to refer to the new
/// entry: 1-based for strings and multinames, 0-based for methods, classes and scripts.
#[derive(Debug, Default)]
pub struct ImageBuilder {
    image: AbcImage,
    interned: FxHashMap<Arc<str>, u32>,
    listing: Listing,
}

impl ImageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string and returns its raw pool index.
    pub fn add_string(&mut self, value: &str) -> u32 {
        if let Some(&raw) = self.interned.get(value) {
            return raw;
        }

        let value: Arc<str> = Arc::from(value);
        self.image.strings.push(value.clone());
        let raw = self.image.strings.len() as u32;
        self.interned.insert(value, raw);
        raw
    }

    /// Appends a symbol table entry and returns its raw multiname index.
    pub fn add_symbol(&mut self, multiname: Multiname) -> u32 {
        self.image.symbols.push(multiname);
        self.image.symbols.len() as u32
    }

    /// Appends a `QName` in the public namespace.
    pub fn add_qname(&mut self, name: &str) -> u32 {
        let name = self.add_string(name);
        self.add_symbol(Multiname::qname(1, name))
    }

    /// Appends a `QName` whose name is supplied at runtime.
    pub fn add_wildcard_qname(&mut self) -> u32 {
        self.add_symbol(Multiname::qname(1, 0))
    }

    /// Appends a method signature and returns its index.
    pub fn add_method(&mut self, param_count: u32, flags: MethodFlags) -> u32 {
        self.image.methods.push(MethodInfo::new(param_count, flags));
        (self.image.methods.len() - 1) as u32
    }

    /// Appends a named method signature and returns its index.
    pub fn add_named_method(&mut self, name: &str, param_count: u32, flags: MethodFlags) -> u32 {
        let name = self.add_string(name);
        self.image.methods.push(MethodInfo {
            param_count,
            name,
            flags,
        });
        (self.image.methods.len() - 1) as u32
    }

    /// Appends a body for `method` with the given instruction stream.
    ///
    /// The stream is recorded in the builder's [`Listing`]; the body's raw code stays empty.
    pub fn add_body(&mut self, body: MethodBody, instructions: Vec<Instruction>) {
        self.listing.insert(body.method, instructions);
        self.image.bodies.push(body);
    }

    /// Appends an instance/class pair and returns the class index.
    pub fn add_class(&mut self, instance: InstanceInfo, class: ClassInfo) -> u32 {
        self.image.instances.push(instance);
        self.image.classes.push(class);
        (self.image.classes.len() - 1) as u32
    }

    /// Appends a class named `name` with the given traits and returns the class index.
    ///
    /// Creates an empty initializer signature for each side.
    pub fn add_simple_class(
        &mut self,
        name: u32,
        instance_traits: Vec<Trait>,
        class_traits: Vec<Trait>,
    ) -> u32 {
        let iinit = self.add_method(0, MethodFlags::empty());
        let cinit = self.add_method(0, MethodFlags::empty());

        self.add_class(
            InstanceInfo {
                name,
                super_name: 0,
                flags: 0,
                iinit,
                traits: instance_traits,
            },
            ClassInfo {
                cinit,
                traits: class_traits,
            },
        )
    }

    /// Appends a script and returns its index.
    pub fn add_script(&mut self, script: ScriptInfo) -> u32 {
        self.image.scripts.push(script);
        (self.image.scripts.len() - 1) as u32
    }

    /// Finishes the image, discarding the recorded listing.
    #[must_use]
    pub fn build(self) -> AbcImage {
        self.image
    }

    /// Finishes the image and returns it together with the recorded listing.
    #[must_use]
    pub fn finish(self) -> (AbcImage, Listing) {
        (self.image, self.listing)
    }
}
