//! Declaration nodes handed over by the parser.
//!
//! One [`File`] per source file, holding top-level declarations grouped by
//! kind in source order. Documentation comments arrive pre-extracted as plain
//! text (`doc` fields); Markdown interpretation happens downstream.

use crate::Span;

/// A type expression as written in source, before resolution.
///
/// The resolver turns these into concrete types; see `weft_resolve`. The
/// `Member` variant covers qualified references like `Shape.circle`, where
/// the base may denote an enum or struct used as a namespace.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExpr {
    /// A bare identifier: `String`, `User`.
    Ident { name: String, span: Span },
    /// An array: `[T]`.
    Array { element: Box<TypeExpr>, span: Span },
    /// A dictionary: `[K: V]`.
    Dictionary {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    /// An optional: `T?`.
    Optional { inner: Box<TypeExpr>, span: Span },
    /// A qualified reference: `Base.Member`.
    Member {
        base: Box<TypeExpr>,
        member: String,
        span: Span,
    },
}

impl TypeExpr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Ident { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Dictionary { span, .. }
            | TypeExpr::Optional { span, .. }
            | TypeExpr::Member { span, .. } => *span,
        }
    }

    /// A bare identifier with a dummy span.
    pub fn ident(name: impl Into<String>) -> TypeExpr {
        TypeExpr::Ident {
            name: name.into(),
            span: Span::DUMMY,
        }
    }

    /// An array of `element` with a dummy span.
    pub fn array(element: TypeExpr) -> TypeExpr {
        TypeExpr::Array {
            element: Box::new(element),
            span: Span::DUMMY,
        }
    }

    /// A dictionary from `key` to `value` with a dummy span.
    pub fn dictionary(key: TypeExpr, value: TypeExpr) -> TypeExpr {
        TypeExpr::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
            span: Span::DUMMY,
        }
    }

    /// An optional wrapping `inner` with a dummy span.
    pub fn optional(inner: TypeExpr) -> TypeExpr {
        TypeExpr::Optional {
            inner: Box::new(inner),
            span: Span::DUMMY,
        }
    }

    /// A qualified reference `base.member` with a dummy span.
    pub fn member(base: TypeExpr, member: impl Into<String>) -> TypeExpr {
        TypeExpr::Member {
            base: Box::new(base),
            member: member.into(),
            span: Span::DUMMY,
        }
    }
}

/// One parsed source file.
///
/// Top-level declarations are grouped by kind; each group preserves source
/// order. Several files belonging to one module are merged with
/// [`File::combine`] before binding.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct File {
    pub imports: Vec<ImportDecl>,
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub flagsets: Vec<FlagsetDecl>,
    pub protocols: Vec<ProtocolDecl>,
    pub streams: Vec<StreamDecl>,
    pub span: Span,
}

impl File {
    /// Merge several files into a single logical file.
    ///
    /// Per-kind declaration lists are concatenated in the order the files
    /// are given; no deduplication happens here. Cross-file references
    /// therefore behave exactly like same-file references once the merged
    /// file is bound.
    pub fn combine(files: impl IntoIterator<Item = File>) -> File {
        let mut ret = File::default();
        for file in files {
            ret.imports.extend(file.imports);
            ret.structs.extend(file.structs);
            ret.enums.extend(file.enums);
            ret.flagsets.extend(file.flagsets);
            ret.protocols.extend(file.protocols);
            ret.streams.extend(file.streams);
        }
        ret
    }
}

/// `import "path" as alias`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ImportDecl {
    pub path: String,
    pub alias: String,
    pub span: Span,
}

impl ImportDecl {
    pub fn new(path: impl Into<String>, alias: impl Into<String>) -> Self {
        ImportDecl {
            path: path.into(),
            alias: alias.into(),
            span: Span::DUMMY,
        }
    }
}

/// A struct declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StructDecl {
    pub name: String,
    pub doc: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

impl StructDecl {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        StructDecl {
            name: name.into(),
            doc: None,
            fields,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A named, typed struct field.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub doc: Option<String>,
    pub ty: TypeExpr,
    pub span: Span,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        FieldDecl {
            name: name.into(),
            doc: None,
            ty,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// An enum declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EnumDecl {
    pub name: String,
    pub doc: Option<String>,
    pub cases: Vec<CaseDecl>,
    pub span: Span,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>, cases: Vec<CaseDecl>) -> Self {
        EnumDecl {
            name: name.into(),
            doc: None,
            cases,
            span: Span::DUMMY,
        }
    }
}

/// One case of an enum, with an optional payload.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CaseDecl {
    pub name: String,
    pub doc: Option<String>,
    pub values: Vec<ArgumentDecl>,
    pub span: Span,
}

impl CaseDecl {
    pub fn new(name: impl Into<String>, values: Vec<ArgumentDecl>) -> Self {
        CaseDecl {
            name: name.into(),
            doc: None,
            values,
            span: Span::DUMMY,
        }
    }
}

/// A named, typed argument (function/event/signal parameters, case payloads).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ArgumentDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

impl ArgumentDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        ArgumentDecl {
            name: name.into(),
            ty,
            span: Span::DUMMY,
        }
    }
}

/// A flagset declaration: a closed set of named boolean flags.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FlagsetDecl {
    pub name: String,
    pub doc: Option<String>,
    /// Allows an "unset" third state per flag.
    pub optional: bool,
    pub flags: Vec<FlagDecl>,
    pub span: Span,
}

impl FlagsetDecl {
    pub fn new(name: impl Into<String>, optional: bool, flags: Vec<FlagDecl>) -> Self {
        FlagsetDecl {
            name: name.into(),
            doc: None,
            optional,
            flags,
            span: Span::DUMMY,
        }
    }
}

/// One flag of a flagset.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FlagDecl {
    pub name: String,
    pub doc: Option<String>,
    pub span: Span,
}

impl FlagDecl {
    pub fn new(name: impl Into<String>) -> Self {
        FlagDecl {
            name: name.into(),
            doc: None,
            span: Span::DUMMY,
        }
    }
}

/// A protocol declaration: an RPC interface.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ProtocolDecl {
    pub name: String,
    pub doc: Option<String>,
    pub funcs: Vec<FuncDecl>,
    pub events: Vec<EventDecl>,
    pub signals: Vec<SignalDecl>,
    pub span: Span,
}

impl ProtocolDecl {
    pub fn new(name: impl Into<String>, funcs: Vec<FuncDecl>) -> Self {
        ProtocolDecl {
            name: name.into(),
            doc: None,
            funcs,
            events: Vec::new(),
            signals: Vec::new(),
            span: Span::DUMMY,
        }
    }
}

/// A callable function of a protocol.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Option<String>,
    pub arguments: Vec<ArgumentDecl>,
    /// Absent means the function returns nothing.
    pub returns: Option<TypeExpr>,
    /// Absent means the function cannot throw.
    pub throws: Option<TypeExpr>,
    pub span: Span,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>, arguments: Vec<ArgumentDecl>) -> Self {
        FuncDecl {
            name: name.into(),
            doc: None,
            arguments,
            returns: None,
            throws: None,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_returns(mut self, ty: TypeExpr) -> Self {
        self.returns = Some(ty);
        self
    }

    #[must_use]
    pub fn with_throws(mut self, ty: TypeExpr) -> Self {
        self.throws = Some(ty);
        self
    }
}

/// A one-way server-to-client notification.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EventDecl {
    pub name: String,
    pub doc: Option<String>,
    pub arguments: Vec<ArgumentDecl>,
    pub span: Span,
}

impl EventDecl {
    pub fn new(name: impl Into<String>, arguments: Vec<ArgumentDecl>) -> Self {
        EventDecl {
            name: name.into(),
            doc: None,
            arguments,
            span: Span::DUMMY,
        }
    }
}

/// A one-way client-to-server notification.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SignalDecl {
    pub name: String,
    pub doc: Option<String>,
    pub arguments: Vec<ArgumentDecl>,
    pub span: Span,
}

impl SignalDecl {
    pub fn new(name: impl Into<String>, arguments: Vec<ArgumentDecl>) -> Self {
        SignalDecl {
            name: name.into(),
            doc: None,
            arguments,
            span: Span::DUMMY,
        }
    }
}

/// A stream declaration: a bidirectional channel grouping events and signals.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StreamDecl {
    pub name: String,
    pub doc: Option<String>,
    pub events: Vec<EventDecl>,
    pub signals: Vec<SignalDecl>,
    pub span: Span,
}

impl StreamDecl {
    pub fn new(
        name: impl Into<String>,
        events: Vec<EventDecl>,
        signals: Vec<SignalDecl>,
    ) -> Self {
        StreamDecl {
            name: name.into(),
            doc: None,
            events,
            signals,
            span: Span::DUMMY,
        }
    }
}
