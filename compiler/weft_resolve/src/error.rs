//! The resolution error taxonomy.
//!
//! Every error is terminal for the binding of the enclosing module: no
//! partial module is ever returned. Cross-module failures chain through
//! [`BindErrorKind::UnresolvedImport`] so a caller can render "module X
//! failed because module Y failed because …" from the standard error
//! source chain.

use thiserror::Error;

use crate::path::Path;

/// What went wrong.
#[derive(Debug, Error)]
pub enum BindErrorKind {
    /// A name has no visible binding in the active scope chain.
    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    /// A resolved name or member denotes a declaration that is not a type.
    #[error("`{0}` is not a type")]
    NotAType(String),

    /// A dictionary key type is not hashable.
    #[error("`{0}` is not a valid type to use as a dictionary key")]
    KeyNotHashable(String),

    /// A qualified reference names a member the base does not have.
    #[error("`{base}` has no member `{member}`")]
    NoSuchMember { base: String, member: String },

    /// A name was declared twice in the same scope.
    #[error("`{0}` is already declared in this scope")]
    DuplicateName(String),

    /// The workspace has no product under the requested name.
    #[error("no product named `{name}` in workspace `{workspace}`")]
    UnknownProduct { name: String, workspace: String },

    /// The injected loader/parser could not produce a file for an import
    /// path; the reason is surfaced unchanged.
    #[error("failed to load module at `{path}`: {reason}")]
    ImportFailed { path: String, reason: String },

    /// An imported module failed to bind; the cause is preserved.
    #[error("failed to resolve import `{path}`")]
    UnresolvedImport {
        path: String,
        #[source]
        source: Box<BindError>,
    },

    /// A module transitively imports itself.
    #[error("import cycle detected through `{0}`")]
    ImportCycle(String),
}

/// A binding failure, located at the declaration being bound.
#[derive(Debug, Error)]
#[error("error binding `{path}`: {kind}")]
pub struct BindError {
    /// The intended path of the declaration under construction when the
    /// failure occurred.
    pub path: Path,
    #[source]
    pub kind: BindErrorKind,
}

impl BindError {
    pub fn new(path: Path, kind: BindErrorKind) -> BindError {
        BindError { path, kind }
    }
}
