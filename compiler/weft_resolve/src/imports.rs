//! Pluggable cross-module import resolution.

use weft_ir::File;

use crate::context::Context;
use crate::error::{BindError, BindErrorKind};
use crate::object::DeclId;
use crate::path::Path;

/// Strategy for turning an import path into a bound module.
///
/// The resolver never caches across independent calls; a strategy that is
/// asked for the same module twice decides for itself whether to re-bind
/// (like [`FileImports`]) or hand back an already-bound module (like the
/// workspace strategy in `weft_workspace`, where products are bound once
/// and referenced by many dependents).
pub trait ImportResolver {
    /// Resolve `path`, requested from the module at `from`, to a bound
    /// module declaration.
    fn module_for(
        &mut self,
        ctx: &mut Context,
        path: &str,
        from: &str,
    ) -> Result<DeclId, BindError>;
}

/// Strategy for standalone binding: every import fails.
pub struct NoImports;

impl ImportResolver for NoImports {
    fn module_for(
        &mut self,
        _ctx: &mut Context,
        path: &str,
        from: &str,
    ) -> Result<DeclId, BindError> {
        Err(BindError::new(
            Path::module(path),
            BindErrorKind::ImportFailed {
                path: path.to_owned(),
                reason: format!("imports are not available when binding `{from}` standalone"),
            },
        ))
    }
}

/// Produces the parsed file for an import path.
///
/// File discovery, reading and parsing all live behind this boundary; the
/// error string is surfaced unchanged as the reason of an `ImportFailed`.
/// Implemented for any `FnMut(&str) -> Result<File, String>`.
pub trait SourceLoader {
    fn load(&mut self, path: &str) -> Result<File, String>;
}

impl<F> SourceLoader for F
where
    F: FnMut(&str) -> Result<File, String>,
{
    fn load(&mut self, path: &str) -> Result<File, String> {
        self(path)
    }
}

/// The direct filesystem strategy: load and bind the single file found at
/// the import path. No caching — importing the same path from two modules
/// binds it twice.
pub struct FileImports<L> {
    loader: L,
}

impl<L: SourceLoader> FileImports<L> {
    pub fn new(loader: L) -> Self {
        FileImports { loader }
    }
}

impl<L: SourceLoader> ImportResolver for FileImports<L> {
    fn module_for(
        &mut self,
        ctx: &mut Context,
        path: &str,
        _from: &str,
    ) -> Result<DeclId, BindError> {
        let file = self.loader.load(path).map_err(|reason| {
            BindError::new(
                Path::module(path),
                BindErrorKind::ImportFailed {
                    path: path.to_owned(),
                    reason,
                },
            )
        })?;
        ctx.bind_module(vec![file], self, path)
    }
}
