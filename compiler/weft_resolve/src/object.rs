//! The object model: declarations, their arena, and uniform traversal.
//!
//! Every named declaration of a binding run lives in one [`DeclArena`].
//! Parent links, child lists and import tables hold [`DeclId`] indices into
//! the same arena, so the cyclic-looking graph (module owns struct, struct
//! points back at module) has a single owner and no reference cycles.

use std::fmt;
use std::ops::Index;

use crate::env::Env;
use crate::path::Path;
use crate::ty::{Primitive, Type};

/// Index of a declaration in its [`DeclArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// Payload of a module declaration.
#[derive(Clone, Debug, Default)]
pub struct ModuleData {
    pub structs: Vec<DeclId>,
    pub enums: Vec<DeclId>,
    pub flagsets: Vec<DeclId>,
    pub protocols: Vec<DeclId>,
    pub streams: Vec<DeclId>,
    /// Import table: local alias to the imported module, in import order.
    pub imports: Vec<(String, DeclId)>,
}

/// The kind-specific payload of a declaration.
///
/// A closed enumeration: every dispatch over declaration kinds is an
/// exhaustive match, and adding a variant is a compile-time event at each
/// site rather than a runtime surprise.
#[derive(Clone, Debug)]
pub enum DeclKind {
    Module(ModuleData),
    Struct { fields: Vec<DeclId> },
    Field { ty: Type },
    Enum { cases: Vec<DeclId> },
    Case { fields: Vec<DeclId> },
    Protocol {
        funcs: Vec<DeclId>,
        events: Vec<DeclId>,
        signals: Vec<DeclId>,
    },
    Func {
        arguments: Vec<DeclId>,
        returns: Option<Type>,
        throws: Option<Type>,
    },
    Event { arguments: Vec<DeclId> },
    Signal { arguments: Vec<DeclId> },
    Stream {
        events: Vec<DeclId>,
        signals: Vec<DeclId>,
    },
    Flagset { optional: bool, flags: Vec<DeclId> },
    Flag,
}

/// One bound declaration.
///
/// Constructed exactly once during binding and immutable afterwards. The
/// `scope` field is the frame that was active at the point of declaration,
/// kept for documentation symbol-link resolution.
#[derive(Clone, Debug)]
pub struct Decl {
    pub name: String,
    pub doc: Option<String>,
    pub path: Path,
    pub parent: Option<DeclId>,
    pub scope: Env,
    pub kind: DeclKind,
}

/// Arena owning every declaration of a binding run.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> DeclArena {
        DeclArena::default()
    }

    pub(crate) fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = u32::try_from(self.decls.len()).unwrap_or_else(|_| {
            // 4 billion declarations will not fit in one workspace.
            panic!("declaration arena overflow")
        });
        self.decls.push(decl);
        DeclId(id)
    }

    pub(crate) fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// All declarations, in creation (binding) order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d))
    }

    /// Whether `id` is an enum whose cases all have zero payload fields.
    pub fn enum_is_simple(&self, id: DeclId) -> bool {
        match &self[id].kind {
            DeclKind::Enum { cases } => cases.iter().all(|case| {
                matches!(&self[*case].kind, DeclKind::Case { fields } if fields.is_empty())
            }),
            _ => false,
        }
    }

    /// Direct, named-child lookup; no recursive search.
    ///
    /// Module lookup covers declared items only — the import table is not
    /// searched, since qualified access to an imported declaration goes
    /// through the alias in scope first.
    pub fn child_of(&self, id: DeclId, name: &str) -> Option<DeclId> {
        let by_name = |ids: &[DeclId]| ids.iter().copied().find(|c| self[*c].name == name);
        match &self[id].kind {
            DeclKind::Module(m) => by_name(&m.structs)
                .or_else(|| by_name(&m.enums))
                .or_else(|| by_name(&m.protocols))
                .or_else(|| by_name(&m.flagsets))
                .or_else(|| by_name(&m.streams)),
            DeclKind::Struct { fields } | DeclKind::Case { fields } => by_name(fields),
            DeclKind::Enum { cases } => by_name(cases),
            DeclKind::Protocol {
                funcs,
                events,
                signals,
            } => by_name(funcs)
                .or_else(|| by_name(events))
                .or_else(|| by_name(signals)),
            DeclKind::Stream { events, signals } => {
                by_name(events).or_else(|| by_name(signals))
            }
            DeclKind::Func { arguments, .. }
            | DeclKind::Event { arguments }
            | DeclKind::Signal { arguments } => by_name(arguments),
            DeclKind::Flagset { flags, .. } => by_name(flags),
            DeclKind::Field { .. } | DeclKind::Flag => None,
        }
    }
}

impl Index<DeclId> for DeclArena {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        self.get(id)
    }
}

/// Uniform handle to anything the object model can address: a built-in
/// primitive or an arena declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ObjectRef {
    Primitive(Primitive),
    Decl(DeclId),
}

impl ObjectRef {
    pub fn as_decl(self) -> Option<DeclId> {
        match self {
            ObjectRef::Decl(id) => Some(id),
            ObjectRef::Primitive(_) => None,
        }
    }

    pub fn name<'a>(&self, arena: &'a DeclArena) -> &'a str {
        match self {
            ObjectRef::Primitive(p) => p.name(),
            ObjectRef::Decl(id) => &arena[*id].name,
        }
    }

    pub fn path(&self, arena: &DeclArena) -> Path {
        match self {
            ObjectRef::Primitive(p) => Path::builtin(p.name()),
            ObjectRef::Decl(id) => arena[*id].path.clone(),
        }
    }

    pub fn parent(&self, arena: &DeclArena) -> Option<ObjectRef> {
        match self {
            ObjectRef::Primitive(_) => None,
            ObjectRef::Decl(id) => arena[*id].parent.map(ObjectRef::Decl),
        }
    }

    /// The scope in effect at the point of declaration. Primitives live in
    /// the world scope.
    pub fn scope(&self, arena: &DeclArena) -> Env {
        match self {
            ObjectRef::Primitive(_) => Env::world(),
            ObjectRef::Decl(id) => arena[*id].scope.clone(),
        }
    }

    /// Direct, named-child lookup.
    pub fn child(&self, name: &str, arena: &DeclArena) -> Option<ObjectRef> {
        match self {
            ObjectRef::Primitive(_) => None,
            ObjectRef::Decl(id) => arena.child_of(*id, name).map(ObjectRef::Decl),
        }
    }

    /// The type this object denotes when used in a type position, if any.
    ///
    /// Structs, enums, enum cases and flagsets denote themselves; a field
    /// denotes its declared type. Modules, protocols, functions, events,
    /// signals, streams and flags are not types.
    pub fn as_type(&self, arena: &DeclArena) -> Option<Type> {
        match self {
            ObjectRef::Primitive(p) => Some(Type::Primitive(*p)),
            ObjectRef::Decl(id) => match &arena[*id].kind {
                DeclKind::Struct { .. }
                | DeclKind::Enum { .. }
                | DeclKind::Case { .. }
                | DeclKind::Flagset { .. } => Some(Type::Named(*id)),
                DeclKind::Field { ty } => Some(ty.clone()),
                DeclKind::Module(_)
                | DeclKind::Protocol { .. }
                | DeclKind::Func { .. }
                | DeclKind::Event { .. }
                | DeclKind::Signal { .. }
                | DeclKind::Stream { .. }
                | DeclKind::Flag => None,
            },
        }
    }

    /// Whether `self` appears in `other`'s parent chain (strict: an object
    /// is not its own ancestor).
    pub fn is_ancestor_of(&self, other: ObjectRef, arena: &DeclArena) -> bool {
        let mut cursor = other.parent(arena);
        while let Some(obj) = cursor {
            if obj == *self {
                return true;
            }
            cursor = obj.parent(arena);
        }
        false
    }
}
