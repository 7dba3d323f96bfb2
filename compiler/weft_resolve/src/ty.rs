//! The closed set of type variants.
//!
//! A type is either a built-in scalar, a structural composite (array,
//! dictionary, optional) created fresh at each type-expression site, or a
//! reference to a user declaration (struct, enum, case, flagset). Composites
//! are values: they live inside the field or argument that mentions them and
//! are never inserted into a scope.

use std::fmt;

use crate::object::{DeclArena, DeclId};
use crate::path::Path;

/// Built-in scalar kinds. These are the only keyable types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bytes,
    Bool,
}

impl Primitive {
    /// All primitives, in the order they are registered in the world scope.
    pub const ALL: [Primitive; 11] = [
        Primitive::UInt8,
        Primitive::UInt16,
        Primitive::UInt32,
        Primitive::UInt64,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::String,
        Primitive::Bytes,
        Primitive::Bool,
    ];

    /// The source-level name, also the canonical display form.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::UInt8 => "UInt8",
            Primitive::UInt16 => "UInt16",
            Primitive::UInt32 => "UInt32",
            Primitive::UInt64 => "UInt64",
            Primitive::Int8 => "Int8",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::String => "String",
            Primitive::Bytes => "Bytes",
            Primitive::Bool => "Bool",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Primitive(Primitive),
    /// `[T]`
    Array(Box<Type>),
    /// `[K: V]`; the key must be keyable.
    Dictionary { key: Box<Type>, value: Box<Type> },
    /// `T?`; nesting is permitted, nothing collapses.
    Optional(Box<Type>),
    /// A struct, enum, enum case, or flagset declaration.
    Named(DeclId),
}

impl Type {
    /// Whether this type may be used as a dictionary key.
    ///
    /// True only for primitive scalars; composites and user declarations
    /// are not hashable on the wire.
    pub fn is_keyable(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Canonical display form, used verbatim in generated schemas and
    /// signatures: `[T]`, `[K: V]`, `T?`, or the bare name.
    pub fn display(&self, arena: &DeclArena) -> String {
        match self {
            Type::Primitive(p) => p.name().to_owned(),
            Type::Array(element) => format!("[{}]", element.display(arena)),
            Type::Dictionary { key, value } => {
                format!("[{}: {}]", key.display(arena), value.display(arena))
            }
            Type::Optional(element) => format!("{}?", element.display(arena)),
            Type::Named(id) => arena[*id].name.clone(),
        }
    }

    /// The address of this type.
    ///
    /// Composites carry a synthetic, non-unique marker; primitives are
    /// addressed by name outside any module; named types use their
    /// declaration's path.
    pub fn path(&self, arena: &DeclArena) -> Path {
        match self {
            Type::Primitive(p) => Path::builtin(p.name()),
            Type::Array(_) => Path::builtin("Array"),
            Type::Dictionary { .. } => Path::builtin("Dictionary"),
            Type::Optional(_) => Path::builtin("Optional"),
            Type::Named(id) => arena[*id].path.clone(),
        }
    }

    /// Structural member of a composite: `Element` for arrays and
    /// optionals, `Key`/`Element` for dictionaries. Named declarations
    /// answer member lookups through the object model instead.
    pub fn structural_child(&self, name: &str) -> Option<&Type> {
        match (self, name) {
            (Type::Array(element) | Type::Optional(element), "Element") => Some(element),
            (Type::Dictionary { value, .. }, "Element") => Some(value),
            (Type::Dictionary { key, .. }, "Key") => Some(key),
            _ => None,
        }
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn dictionary(key: Type, value: Type) -> Type {
        Type::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn optional(element: Type) -> Type {
        Type::Optional(Box::new(element))
    }
}
