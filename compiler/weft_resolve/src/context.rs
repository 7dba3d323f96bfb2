//! The resolver: scope management, type-expression resolution, and
//! declaration binding.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};
use weft_ir::{
    ArgumentDecl, EnumDecl, EventDecl, FieldDecl, File, FlagsetDecl, FuncDecl, ProtocolDecl,
    SignalDecl, StreamDecl, StructDecl, TypeExpr,
};

use crate::env::Env;
use crate::error::{BindError, BindErrorKind};
use crate::imports::ImportResolver;
use crate::object::{Decl, DeclArena, DeclId, DeclKind, ModuleData, ObjectRef};
use crate::path::Path;
use crate::ty::Type;

/// Binding policy switches.
#[derive(Copy, Clone, Debug, Default)]
pub struct BindOptions {
    /// Permit binding the same name twice into one scope, with
    /// last-write-wins lookup. Off by default: redeclaration is an error.
    pub allow_redeclaration: bool,
}

/// The orchestrator of a binding run.
///
/// Owns the declaration arena and the live scope chain. Binding a module
/// installs exactly one scope frame directly over the world scope, binds
/// the merged file's declarations in source order, and restores the
/// caller's scope; each bound declaration keeps a snapshot of the scope
/// that was active at its declaration.
///
/// Resolution is single-threaded and synchronous: a binding call runs to
/// completion or fails, and nothing else may touch the context meanwhile.
pub struct Context {
    arena: DeclArena,
    env: Env,
    options: BindOptions,
    /// Module paths currently being bound, for import cycle detection.
    in_progress: FxHashSet<String>,
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl Context {
    pub fn new() -> Context {
        Context::with_options(BindOptions::default())
    }

    pub fn with_options(options: BindOptions) -> Context {
        Context {
            arena: DeclArena::new(),
            env: Env::world(),
            options,
            in_progress: FxHashSet::default(),
        }
    }

    /// The declarations bound so far.
    pub fn arena(&self) -> &DeclArena {
        &self.arena
    }

    /// Consume the context, keeping the bound declarations.
    pub fn into_arena(self) -> DeclArena {
        self.arena
    }

    /// Attach documentation text to an already-bound declaration. Used by
    /// workspace assembly for per-product module docs.
    pub fn set_doc(&mut self, id: DeclId, doc: impl Into<String>) {
        self.arena.get_mut(id).doc = Some(doc.into());
    }

    /// Bind one module from its source files.
    ///
    /// `files` are merged in the given order before binding, so cross-file
    /// forward references behave exactly like same-file ones. Imports are
    /// delegated to `resolver`. On error no partial module is returned and
    /// the scope frame is discarded either way.
    pub fn bind_module(
        &mut self,
        files: Vec<File>,
        resolver: &mut dyn ImportResolver,
        module_path: &str,
    ) -> Result<DeclId, BindError> {
        let path = Path::module(module_path);
        if !self.in_progress.insert(module_path.to_owned()) {
            return Err(BindError::new(
                path,
                BindErrorKind::ImportCycle(module_path.to_owned()),
            ));
        }
        debug!(module = module_path, files = files.len(), "binding module");

        let file = File::combine(files);
        // The module frame sits directly over the world scope. A re-entrant
        // bind during import resolution must not see the importer's
        // partially-populated frame.
        let saved = std::mem::replace(&mut self.env, Env::world().child());
        let result = self.bind_file(&file, resolver, &path);
        self.env = saved;
        self.in_progress.remove(module_path);

        if result.is_ok() {
            debug!(module = module_path, decls = self.arena.len(), "bound module");
        }
        result
    }

    /// Register a name in the current scope, enforcing the redeclaration
    /// policy. `at` is the intended path of the declaration being bound.
    fn declare(&mut self, name: &str, object: ObjectRef, at: &Path) -> Result<(), BindError> {
        if self.env.contains_local(name) && !self.options.allow_redeclaration {
            return Err(BindError::new(
                at.clone(),
                BindErrorKind::DuplicateName(name.to_owned()),
            ));
        }
        self.env.bind(name, object);
        Ok(())
    }

    fn bind_file(
        &mut self,
        file: &File,
        resolver: &mut dyn ImportResolver,
        path: &Path,
    ) -> Result<DeclId, BindError> {
        let name = path
            .module_path
            .rsplit('/')
            .next()
            .unwrap_or(&path.module_path)
            .to_owned();
        let module = self.arena.alloc(Decl {
            name,
            doc: None,
            path: path.clone(),
            parent: None,
            scope: self.env.clone(),
            kind: DeclKind::Module(ModuleData::default()),
        });

        let mut data = ModuleData::default();

        for import in &file.imports {
            debug!(path = %import.path, alias = %import.alias, "resolving import");
            let imported = resolver
                .module_for(self, &import.path, &path.module_path)
                .map_err(|cause| {
                    BindError::new(
                        path.clone(),
                        BindErrorKind::UnresolvedImport {
                            path: import.path.clone(),
                            source: Box::new(cause),
                        },
                    )
                })?;
            self.declare(&import.alias, ObjectRef::Decl(imported), path)?;
            data.imports.push((import.alias.clone(), imported));
        }
        for item in &file.structs {
            data.structs.push(self.bind_struct(item, module, path)?);
        }
        for item in &file.enums {
            data.enums.push(self.bind_enum(item, module, path)?);
        }
        for item in &file.flagsets {
            data.flagsets.push(self.bind_flagset(item, module, path)?);
        }
        for item in &file.protocols {
            data.protocols.push(self.bind_protocol(item, module, path)?);
        }
        for item in &file.streams {
            data.streams.push(self.bind_stream(item, module, path)?);
        }

        match &mut self.arena.get_mut(module).kind {
            DeclKind::Module(m) => *m = data,
            _ => unreachable!("module declaration changed kind mid-bind"),
        }
        Ok(module)
    }

    fn bind_struct(
        &mut self,
        item: &StructDecl,
        module: DeclId,
        module_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = module_path.appended(&item.name);
        trace!(path = %path, "binding struct");
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(module),
            scope: self.env.clone(),
            kind: DeclKind::Struct { fields: Vec::new() },
        });
        let fields = self.bind_fields(&item.fields, id, &path)?;
        match &mut self.arena.get_mut(id).kind {
            DeclKind::Struct { fields: f } => *f = fields,
            _ => unreachable!(),
        }
        self.declare(&item.name, ObjectRef::Decl(id), &path)?;
        Ok(id)
    }

    fn bind_enum(
        &mut self,
        item: &EnumDecl,
        module: DeclId,
        module_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = module_path.appended(&item.name);
        trace!(path = %path, "binding enum");
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(module),
            scope: self.env.clone(),
            kind: DeclKind::Enum { cases: Vec::new() },
        });

        let mut cases = Vec::with_capacity(item.cases.len());
        for case in &item.cases {
            let case_path = path.appended(&case.name);
            let case_id = self.arena.alloc(Decl {
                name: case.name.clone(),
                doc: case.doc.clone(),
                path: case_path.clone(),
                parent: Some(id),
                scope: self.env.clone(),
                kind: DeclKind::Case { fields: Vec::new() },
            });
            let fields = self.bind_arguments(&case.values, case_id, &case_path)?;
            match &mut self.arena.get_mut(case_id).kind {
                DeclKind::Case { fields: f } => *f = fields,
                _ => unreachable!(),
            }
            cases.push(case_id);
        }

        match &mut self.arena.get_mut(id).kind {
            DeclKind::Enum { cases: c } => *c = cases,
            _ => unreachable!(),
        }
        self.declare(&item.name, ObjectRef::Decl(id), &path)?;
        Ok(id)
    }

    fn bind_flagset(
        &mut self,
        item: &FlagsetDecl,
        module: DeclId,
        module_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = module_path.appended(&item.name);
        trace!(path = %path, "binding flagset");
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(module),
            scope: self.env.clone(),
            kind: DeclKind::Flagset {
                optional: item.optional,
                flags: Vec::new(),
            },
        });

        let mut flags = Vec::with_capacity(item.flags.len());
        for flag in &item.flags {
            flags.push(self.arena.alloc(Decl {
                name: flag.name.clone(),
                doc: flag.doc.clone(),
                path: path.appended(&flag.name),
                parent: Some(id),
                scope: self.env.clone(),
                kind: DeclKind::Flag,
            }));
        }

        match &mut self.arena.get_mut(id).kind {
            DeclKind::Flagset { flags: f, .. } => *f = flags,
            _ => unreachable!(),
        }
        self.declare(&item.name, ObjectRef::Decl(id), &path)?;
        Ok(id)
    }

    fn bind_protocol(
        &mut self,
        item: &ProtocolDecl,
        module: DeclId,
        module_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = module_path.appended(&item.name);
        trace!(path = %path, "binding protocol");
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(module),
            scope: self.env.clone(),
            kind: DeclKind::Protocol {
                funcs: Vec::new(),
                events: Vec::new(),
                signals: Vec::new(),
            },
        });

        let mut funcs = Vec::with_capacity(item.funcs.len());
        for func in &item.funcs {
            funcs.push(self.bind_func(func, id, &path)?);
        }
        let mut events = Vec::with_capacity(item.events.len());
        for event in &item.events {
            events.push(self.bind_event(event, id, &path)?);
        }
        let mut signals = Vec::with_capacity(item.signals.len());
        for signal in &item.signals {
            signals.push(self.bind_signal(signal, id, &path)?);
        }

        match &mut self.arena.get_mut(id).kind {
            DeclKind::Protocol {
                funcs: f,
                events: e,
                signals: s,
            } => {
                *f = funcs;
                *e = events;
                *s = signals;
            }
            _ => unreachable!(),
        }
        self.declare(&item.name, ObjectRef::Decl(id), &path)?;
        Ok(id)
    }

    fn bind_stream(
        &mut self,
        item: &StreamDecl,
        module: DeclId,
        module_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = module_path.appended(&item.name);
        trace!(path = %path, "binding stream");
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(module),
            scope: self.env.clone(),
            kind: DeclKind::Stream {
                events: Vec::new(),
                signals: Vec::new(),
            },
        });

        let mut events = Vec::with_capacity(item.events.len());
        for event in &item.events {
            events.push(self.bind_event(event, id, &path)?);
        }
        let mut signals = Vec::with_capacity(item.signals.len());
        for signal in &item.signals {
            signals.push(self.bind_signal(signal, id, &path)?);
        }

        match &mut self.arena.get_mut(id).kind {
            DeclKind::Stream {
                events: e,
                signals: s,
            } => {
                *e = events;
                *s = signals;
            }
            _ => unreachable!(),
        }
        self.declare(&item.name, ObjectRef::Decl(id), &path)?;
        Ok(id)
    }

    fn bind_func(
        &mut self,
        item: &FuncDecl,
        protocol: DeclId,
        protocol_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = protocol_path.appended(&item.name);
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(protocol),
            scope: self.env.clone(),
            kind: DeclKind::Func {
                arguments: Vec::new(),
                returns: None,
                throws: None,
            },
        });
        let arguments = self.bind_arguments(&item.arguments, id, &path)?;
        let returns = self.resolve_type_opt(item.returns.as_ref(), &path)?;
        let throws = self.resolve_type_opt(item.throws.as_ref(), &path)?;
        match &mut self.arena.get_mut(id).kind {
            DeclKind::Func {
                arguments: a,
                returns: r,
                throws: t,
            } => {
                *a = arguments;
                *r = returns;
                *t = throws;
            }
            _ => unreachable!(),
        }
        Ok(id)
    }

    fn bind_event(
        &mut self,
        item: &EventDecl,
        parent: DeclId,
        parent_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = parent_path.appended(&item.name);
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(parent),
            scope: self.env.clone(),
            kind: DeclKind::Event {
                arguments: Vec::new(),
            },
        });
        let arguments = self.bind_arguments(&item.arguments, id, &path)?;
        match &mut self.arena.get_mut(id).kind {
            DeclKind::Event { arguments: a } => *a = arguments,
            _ => unreachable!(),
        }
        Ok(id)
    }

    fn bind_signal(
        &mut self,
        item: &SignalDecl,
        parent: DeclId,
        parent_path: &Path,
    ) -> Result<DeclId, BindError> {
        let path = parent_path.appended(&item.name);
        let id = self.arena.alloc(Decl {
            name: item.name.clone(),
            doc: item.doc.clone(),
            path: path.clone(),
            parent: Some(parent),
            scope: self.env.clone(),
            kind: DeclKind::Signal {
                arguments: Vec::new(),
            },
        });
        let arguments = self.bind_arguments(&item.arguments, id, &path)?;
        match &mut self.arena.get_mut(id).kind {
            DeclKind::Signal { arguments: a } => *a = arguments,
            _ => unreachable!(),
        }
        Ok(id)
    }

    /// Bind struct fields under `parent`, resolving each declared type
    /// against the scope as it stands. The parent itself is not yet in
    /// scope, so a declaration cannot reference itself from its own fields.
    fn bind_fields(
        &mut self,
        fields: &[FieldDecl],
        parent: DeclId,
        parent_path: &Path,
    ) -> Result<Vec<DeclId>, BindError> {
        let mut ids = Vec::with_capacity(fields.len());
        for field in fields {
            let path = parent_path.appended(&field.name);
            let ty = self.resolve_type(&field.ty, &path)?;
            ids.push(self.arena.alloc(Decl {
                name: field.name.clone(),
                doc: field.doc.clone(),
                path,
                parent: Some(parent),
                scope: self.env.clone(),
                kind: DeclKind::Field { ty },
            }));
        }
        Ok(ids)
    }

    /// Same as [`Self::bind_fields`] for argument lists (function and
    /// notification parameters, enum case payloads).
    fn bind_arguments(
        &mut self,
        arguments: &[ArgumentDecl],
        parent: DeclId,
        parent_path: &Path,
    ) -> Result<Vec<DeclId>, BindError> {
        let mut ids = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let path = parent_path.appended(&argument.name);
            let ty = self.resolve_type(&argument.ty, &path)?;
            ids.push(self.arena.alloc(Decl {
                name: argument.name.clone(),
                doc: None,
                path,
                parent: Some(parent),
                scope: self.env.clone(),
                kind: DeclKind::Field { ty },
            }));
        }
        Ok(ids)
    }

    /// Resolve a type expression against the current scope. `at` is the
    /// path of the declaration carrying the expression, used to locate
    /// errors.
    fn resolve_type(&self, expr: &TypeExpr, at: &Path) -> Result<Type, BindError> {
        match expr {
            TypeExpr::Ident { name, .. } => {
                let object = self.env.search(name).ok_or_else(|| {
                    BindError::new(at.clone(), BindErrorKind::UnknownIdentifier(name.clone()))
                })?;
                object.as_type(&self.arena).ok_or_else(|| {
                    BindError::new(at.clone(), BindErrorKind::NotAType(name.clone()))
                })
            }
            TypeExpr::Array { element, .. } => {
                Ok(Type::array(self.resolve_type(element, at)?))
            }
            TypeExpr::Dictionary { key, value, .. } => {
                let key = self.resolve_type(key, at)?;
                if !key.is_keyable() {
                    return Err(BindError::new(
                        at.clone(),
                        BindErrorKind::KeyNotHashable(key.display(&self.arena)),
                    ));
                }
                let value = self.resolve_type(value, at)?;
                Ok(Type::dictionary(key, value))
            }
            TypeExpr::Optional { inner, .. } => {
                Ok(Type::optional(self.resolve_type(inner, at)?))
            }
            TypeExpr::Member { base, member, .. } => self.resolve_member(base, member, at),
        }
    }

    /// Absent expressions mean "no type" (a void return, nothing thrown).
    fn resolve_type_opt(
        &self,
        expr: Option<&TypeExpr>,
        at: &Path,
    ) -> Result<Option<Type>, BindError> {
        expr.map(|e| self.resolve_type(e, at)).transpose()
    }

    /// Resolve `base.member`.
    ///
    /// A bare-identifier base is looked up as an object, not resolved as a
    /// type, since it may denote an enum or struct used as a namespace, or
    /// an imported module alias. Any other base is a nested type
    /// expression and answers member lookups structurally.
    fn resolve_member(
        &self,
        base: &TypeExpr,
        member: &str,
        at: &Path,
    ) -> Result<Type, BindError> {
        if let TypeExpr::Ident { name, .. } = base {
            let object = self.env.search(name).ok_or_else(|| {
                BindError::new(at.clone(), BindErrorKind::UnknownIdentifier(name.clone()))
            })?;
            return self.member_as_type(object, member, at);
        }

        let base_ty = self.resolve_type(base, at)?;
        match base_ty {
            Type::Named(id) => self.member_as_type(ObjectRef::Decl(id), member, at),
            other => other
                .structural_child(member)
                .cloned()
                .ok_or_else(|| {
                    BindError::new(
                        at.clone(),
                        BindErrorKind::NoSuchMember {
                            base: other.display(&self.arena),
                            member: member.to_owned(),
                        },
                    )
                }),
        }
    }

    fn member_as_type(
        &self,
        object: ObjectRef,
        member: &str,
        at: &Path,
    ) -> Result<Type, BindError> {
        let child = object.child(member, &self.arena).ok_or_else(|| {
            BindError::new(
                at.clone(),
                BindErrorKind::NoSuchMember {
                    base: object.name(&self.arena).to_owned(),
                    member: member.to_owned(),
                },
            )
        })?;
        child.as_type(&self.arena).ok_or_else(|| {
            BindError::new(
                at.clone(),
                BindErrorKind::NotAType(format!(
                    "{}.{member}",
                    object.name(&self.arena)
                )),
            )
        })
    }
}

#[cfg(test)]
mod tests;
