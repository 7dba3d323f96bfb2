//! Weft IR - Syntax Tree Types
//!
//! This crate defines the parser boundary of the Weft compiler: the typed
//! syntax tree an external parser hands to the resolver. It contains:
//! - Spans for source locations
//! - Per-kind declaration nodes (structs, enums, flagsets, protocols, streams)
//! - Discriminated type expressions (identifier / array / dictionary /
//!   optional / member access)
//! - Multi-file combination for modules assembled from several sources
//!
//! The resolver treats these trees as already syntactically valid; nothing
//! here performs name lookup or validation.

mod ast;
mod span;

pub use ast::{
    ArgumentDecl,
    CaseDecl,
    EnumDecl,
    EventDecl,
    FieldDecl,
    File,
    FlagDecl,
    FlagsetDecl,
    FuncDecl,
    ImportDecl,
    ProtocolDecl,
    SignalDecl,
    StreamDecl,
    StructDecl,
    TypeExpr,
};
pub use span::Span;
