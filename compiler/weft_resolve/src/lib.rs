//! Weft Resolve - Semantic Resolution Engine
//!
//! Turns syntax trees from `weft_ir` into a bound, cross-referenced symbol
//! graph: names resolved to declarations, type expressions resolved to
//! concrete types, and one or more files assembled into a module whose
//! declarations are addressable by [`Path`].
//!
//! # Architecture
//!
//! - All declarations live in a [`DeclArena`]; parent and child links are
//!   [`DeclId`] indices, never owning pointers, so the parent back-references
//!   the object model requires cannot form ownership cycles.
//! - [`Env`] is a persistent scope chain. Pushing a frame allocates a new
//!   head; frames already captured by bound declarations are never mutated
//!   underneath them. The shared root ([`Env::world`]) holds the built-in
//!   primitive types and is immutable after process start.
//! - [`Context`] drives binding: one scope frame per module, declarations
//!   bound in source order, each registered into the module scope right
//!   after construction. Cross-module references go through an injected
//!   [`ImportResolver`].
//!
//! Binding is fail-fast: the first error aborts the enclosing module and no
//! partial module is returned.

mod context;
mod env;
mod error;
mod imports;
mod object;
mod path;
mod symbol;
mod ty;

pub use context::{BindOptions, Context};
pub use env::Env;
pub use error::{BindError, BindErrorKind};
pub use imports::{FileImports, ImportResolver, NoImports, SourceLoader};
pub use object::{Decl, DeclArena, DeclId, DeclKind, ModuleData, ObjectRef};
pub use path::Path;
pub use symbol::resolve_symbol;
pub use ty::{Primitive, Type};
