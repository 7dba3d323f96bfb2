use std::collections::HashMap;

use pretty_assertions::assert_eq;
use weft_ir::{
    ArgumentDecl, CaseDecl, EnumDecl, EventDecl, FieldDecl, File, FlagDecl, FlagsetDecl,
    FuncDecl, ImportDecl, ProtocolDecl, SignalDecl, StreamDecl, StructDecl, TypeExpr,
};

use super::{BindOptions, Context};
use crate::{BindError, BindErrorKind, DeclId, DeclKind, FileImports, NoImports, Path, Primitive, Type};

fn must_bind(file: File) -> (Context, DeclId) {
    let mut ctx = Context::new();
    match ctx.bind_module(vec![file], &mut NoImports, "test") {
        Ok(module) => (ctx, module),
        Err(err) => panic!("binding failed: {err}"),
    }
}

fn must_fail(file: File) -> BindError {
    let mut ctx = Context::new();
    match ctx.bind_module(vec![file], &mut NoImports, "test") {
        Ok(_) => panic!("binding unexpectedly succeeded"),
        Err(err) => err,
    }
}

fn child(ctx: &Context, parent: DeclId, name: &str) -> DeclId {
    let Some(id) = ctx.arena().child_of(parent, name) else {
        panic!("no child named {name}");
    };
    id
}

/// Type of `module.strukt.field` via child lookups.
fn field_ty(ctx: &Context, module: DeclId, strukt: &str, field: &str) -> Type {
    let s = child(ctx, module, strukt);
    let f = child(ctx, s, field);
    match &ctx.arena()[f].kind {
        DeclKind::Field { ty } => ty.clone(),
        other => panic!("expected field, got {other:?}"),
    }
}

fn one_struct_file(fields: Vec<FieldDecl>) -> File {
    File {
        structs: vec![StructDecl::new("S", fields)],
        ..File::default()
    }
}

#[test]
fn resolves_array_of_string() {
    let file = one_struct_file(vec![FieldDecl::new(
        "xs",
        TypeExpr::array(TypeExpr::ident("String")),
    )]);
    let (ctx, module) = must_bind(file);
    assert_eq!(
        field_ty(&ctx, module, "S", "xs"),
        Type::array(Type::Primitive(Primitive::String))
    );
}

#[test]
fn resolves_dictionary_with_keyable_key() {
    let file = one_struct_file(vec![
        FieldDecl::new(
            "by_name",
            TypeExpr::dictionary(TypeExpr::ident("String"), TypeExpr::ident("Bool")),
        ),
        FieldDecl::new(
            "by_flag",
            TypeExpr::dictionary(TypeExpr::ident("Bool"), TypeExpr::ident("Bool")),
        ),
    ]);
    let (ctx, module) = must_bind(file);
    assert_eq!(
        field_ty(&ctx, module, "S", "by_name"),
        Type::dictionary(
            Type::Primitive(Primitive::String),
            Type::Primitive(Primitive::Bool)
        )
    );
    assert_eq!(
        field_ty(&ctx, module, "S", "by_flag"),
        Type::dictionary(
            Type::Primitive(Primitive::Bool),
            Type::Primitive(Primitive::Bool)
        )
    );
}

#[test]
fn rejects_array_as_dictionary_key() {
    let file = one_struct_file(vec![FieldDecl::new(
        "bad",
        TypeExpr::dictionary(
            TypeExpr::array(TypeExpr::ident("String")),
            TypeExpr::ident("Bool"),
        ),
    )]);
    let err = must_fail(file);
    assert!(
        matches!(&err.kind, BindErrorKind::KeyNotHashable(shown) if shown == "[String]"),
        "unexpected error: {err}"
    );
    assert_eq!(err.path, Path::module("test").appended("S").appended("bad"));
}

#[test]
fn nested_optionals_do_not_collapse() {
    let file = one_struct_file(vec![FieldDecl::new(
        "maybe",
        TypeExpr::optional(TypeExpr::optional(TypeExpr::ident("String"))),
    )]);
    let (ctx, module) = must_bind(file);
    assert_eq!(
        field_ty(&ctx, module, "S", "maybe"),
        Type::optional(Type::optional(Type::Primitive(Primitive::String)))
    );
}

#[test]
fn earlier_sibling_is_visible() {
    let file = File {
        structs: vec![
            StructDecl::new("A", vec![FieldDecl::new("x", TypeExpr::ident("Int32"))]),
            StructDecl::new("B", vec![FieldDecl::new("y", TypeExpr::ident("A"))]),
        ],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let a = child(&ctx, module, "A");
    assert_eq!(field_ty(&ctx, module, "B", "y"), Type::Named(a));
}

#[test]
fn later_sibling_is_not_visible() {
    // Binding is a single pass in source order: use-before-declare fails.
    let file = File {
        structs: vec![
            StructDecl::new("B", vec![FieldDecl::new("y", TypeExpr::ident("A"))]),
            StructDecl::new("A", vec![FieldDecl::new("x", TypeExpr::ident("Int32"))]),
        ],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::UnknownIdentifier(name) if name == "A"));
    assert_eq!(err.path, Path::module("test").appended("B").appended("y"));
}

#[test]
fn structs_bind_before_enums_regardless_of_source_order() {
    // Per-kind binding order: every struct binds before any enum of the
    // same file set, so a struct field cannot name an enum even when the
    // enum appears first in source.
    let file = File {
        enums: vec![EnumDecl::new("Color", vec![CaseDecl::new("red", vec![])])],
        structs: vec![StructDecl::new(
            "Pixel",
            vec![FieldDecl::new("c", TypeExpr::ident("Color"))],
        )],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::UnknownIdentifier(name) if name == "Color"));
    assert_eq!(err.path, Path::module("test").appended("Pixel").appended("c"));
}

#[test]
fn declaration_cannot_reference_itself() {
    let file = File {
        structs: vec![StructDecl::new(
            "Selfish",
            vec![FieldDecl::new("me", TypeExpr::ident("Selfish"))],
        )],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::UnknownIdentifier(name) if name == "Selfish"));
}

#[test]
fn cross_file_references_behave_like_same_file() {
    let defs = File {
        structs: vec![StructDecl::new(
            "User",
            vec![FieldDecl::new("name", TypeExpr::ident("String"))],
        )],
        ..File::default()
    };
    let uses = File {
        structs: vec![StructDecl::new(
            "Message",
            vec![FieldDecl::new("author", TypeExpr::ident("User"))],
        )],
        ..File::default()
    };

    let mut ctx = Context::new();
    let module = match ctx.bind_module(vec![defs.clone(), uses.clone()], &mut NoImports, "test") {
        Ok(module) => module,
        Err(err) => panic!("binding failed: {err}"),
    };
    let user = child(&ctx, module, "User");
    assert_eq!(field_ty(&ctx, module, "Message", "author"), Type::Named(user));

    // Reversed file order puts the use before the declaration.
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![uses, defs], &mut NoImports, "test") else {
        panic!("binding unexpectedly succeeded");
    };
    assert!(matches!(&err.kind, BindErrorKind::UnknownIdentifier(name) if name == "User"));
}

#[test]
fn enum_simplicity() {
    let file = File {
        enums: vec![
            EnumDecl::new(
                "Color",
                vec![
                    CaseDecl::new("red", vec![]),
                    CaseDecl::new(
                        "custom",
                        vec![
                            ArgumentDecl::new("r", TypeExpr::ident("UInt8")),
                            ArgumentDecl::new("g", TypeExpr::ident("UInt8")),
                            ArgumentDecl::new("b", TypeExpr::ident("UInt8")),
                        ],
                    ),
                ],
            ),
            EnumDecl::new(
                "Status",
                vec![CaseDecl::new("on", vec![]), CaseDecl::new("off", vec![])],
            ),
        ],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let color = child(&ctx, module, "Color");
    let status = child(&ctx, module, "Status");
    assert!(!ctx.arena().enum_is_simple(color));
    assert!(ctx.arena().enum_is_simple(status));
}

#[test]
fn qualified_enum_case_is_a_type() {
    // Protocols bind after enums, so a func argument can reference a case.
    let file = File {
        enums: vec![EnumDecl::new(
            "Shape",
            vec![CaseDecl::new(
                "circle",
                vec![ArgumentDecl::new("radius", TypeExpr::ident("Int32"))],
            )],
        )],
        protocols: vec![ProtocolDecl::new(
            "Canvas",
            vec![FuncDecl::new(
                "draw",
                vec![ArgumentDecl::new(
                    "only",
                    TypeExpr::member(TypeExpr::ident("Shape"), "circle"),
                )],
            )],
        )],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let canvas = child(&ctx, module, "Canvas");
    let draw = child(&ctx, canvas, "draw");
    let only = child(&ctx, draw, "only");
    let ty = match &ctx.arena()[only].kind {
        DeclKind::Field { ty } => ty.clone(),
        other => panic!("expected field, got {other:?}"),
    };
    let Type::Named(case) = ty else {
        panic!("expected a named type, got {ty:?}");
    };
    let decl = &ctx.arena()[case];
    assert!(matches!(decl.kind, DeclKind::Case { .. }));
    assert_eq!(
        decl.path,
        Path::module("test").appended("Shape").appended("circle")
    );
    assert!(!Type::Named(case).is_keyable());
}

#[test]
fn qualified_struct_field_denotes_its_declared_type() {
    let file = File {
        structs: vec![
            StructDecl::new("A", vec![FieldDecl::new("x", TypeExpr::ident("Int32"))]),
            StructDecl::new(
                "B",
                vec![FieldDecl::new(
                    "y",
                    TypeExpr::member(TypeExpr::ident("A"), "x"),
                )],
            ),
        ],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    assert_eq!(
        field_ty(&ctx, module, "B", "y"),
        Type::Primitive(Primitive::Int32)
    );
}

#[test]
fn structural_member_on_composite_base() {
    let file = one_struct_file(vec![FieldDecl::new(
        "elem",
        TypeExpr::member(TypeExpr::array(TypeExpr::ident("String")), "Element"),
    )]);
    let (ctx, module) = must_bind(file);
    assert_eq!(
        field_ty(&ctx, module, "S", "elem"),
        Type::Primitive(Primitive::String)
    );
}

#[test]
fn missing_member_is_reported() {
    let file = File {
        enums: vec![EnumDecl::new("Shape", vec![CaseDecl::new("circle", vec![])])],
        protocols: vec![ProtocolDecl::new(
            "Canvas",
            vec![FuncDecl::new(
                "draw",
                vec![ArgumentDecl::new(
                    "bad",
                    TypeExpr::member(TypeExpr::ident("Shape"), "square"),
                )],
            )],
        )],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(
        &err.kind,
        BindErrorKind::NoSuchMember { base, member } if base == "Shape" && member == "square"
    ));
    assert_eq!(
        err.path,
        Path::module("test")
            .appended("Canvas")
            .appended("draw")
            .appended("bad")
    );
}

#[test]
fn protocol_is_not_a_type() {
    // Streams bind after protocols, so the protocol name is in scope here.
    let file = File {
        protocols: vec![ProtocolDecl::new("Account", vec![])],
        streams: vec![StreamDecl::new(
            "Hub",
            vec![EventDecl::new(
                "attached",
                vec![ArgumentDecl::new("p", TypeExpr::ident("Account"))],
            )],
            vec![],
        )],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::NotAType(name) if name == "Account"));
}

#[test]
fn unknown_identifier_is_reported() {
    let file = one_struct_file(vec![FieldDecl::new("x", TypeExpr::ident("Wat"))]);
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::UnknownIdentifier(name) if name == "Wat"));
}

#[test]
fn duplicate_name_is_an_error_by_default() {
    let file = File {
        structs: vec![StructDecl::new("A", vec![]), StructDecl::new("A", vec![])],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(matches!(&err.kind, BindErrorKind::DuplicateName(name) if name == "A"));
    assert_eq!(err.path, Path::module("test").appended("A"));
}

#[test]
fn redeclaration_opt_in_shadows_with_last_write_wins() {
    let file = File {
        structs: vec![
            StructDecl::new("A", vec![]),
            StructDecl::new("A", vec![FieldDecl::new("x", TypeExpr::ident("Bool"))]),
            StructDecl::new("C", vec![FieldDecl::new("a", TypeExpr::ident("A"))]),
        ],
        ..File::default()
    };
    let mut ctx = Context::with_options(BindOptions {
        allow_redeclaration: true,
    });
    let module = match ctx.bind_module(vec![file], &mut NoImports, "test") {
        Ok(module) => module,
        Err(err) => panic!("binding failed: {err}"),
    };

    // The reference after the second declaration resolves to the second one.
    let second = match &ctx.arena()[module].kind {
        DeclKind::Module(m) => m.structs[1],
        _ => unreachable!(),
    };
    assert_eq!(field_ty(&ctx, module, "C", "a"), Type::Named(second));
}

#[test]
fn func_without_returns_or_throws_is_void() {
    let file = File {
        protocols: vec![ProtocolDecl::new(
            "Account",
            vec![
                FuncDecl::new("ping", vec![]),
                FuncDecl::new(
                    "register",
                    vec![ArgumentDecl::new("name", TypeExpr::ident("String"))],
                )
                .with_returns(TypeExpr::ident("String"))
                .with_throws(TypeExpr::ident("String")),
            ],
        )],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let protocol = child(&ctx, module, "Account");
    match &ctx.arena()[child(&ctx, protocol, "ping")].kind {
        DeclKind::Func { returns, throws, .. } => {
            assert_eq!(*returns, None);
            assert_eq!(*throws, None);
        }
        other => panic!("expected func, got {other:?}"),
    }
    match &ctx.arena()[child(&ctx, protocol, "register")].kind {
        DeclKind::Func { returns, throws, .. } => {
            assert_eq!(*returns, Some(Type::Primitive(Primitive::String)));
            assert_eq!(*throws, Some(Type::Primitive(Primitive::String)));
        }
        other => panic!("expected func, got {other:?}"),
    }
}

#[test]
fn streams_bind_events_and_signals() {
    let file = File {
        streams: vec![StreamDecl::new(
            "Chat",
            vec![EventDecl::new(
                "message",
                vec![ArgumentDecl::new("text", TypeExpr::ident("String"))],
            )],
            vec![SignalDecl::new(
                "send",
                vec![ArgumentDecl::new("text", TypeExpr::ident("String"))],
            )],
        )],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let stream = child(&ctx, module, "Chat");
    let event = child(&ctx, stream, "message");
    let _signal = child(&ctx, stream, "send");
    let text = child(&ctx, event, "text");
    assert_eq!(
        ctx.arena()[text].path,
        Path::module("test")
            .appended("Chat")
            .appended("message")
            .appended("text")
    );
}

#[test]
fn flagsets_carry_tristate_and_flags() {
    let file = File {
        flagsets: vec![FlagsetDecl::new(
            "Permissions",
            true,
            vec![FlagDecl::new("read"), FlagDecl::new("write")],
        )],
        protocols: vec![ProtocolDecl::new(
            "Admin",
            vec![FuncDecl::new(
                "grant",
                vec![ArgumentDecl::new("perms", TypeExpr::ident("Permissions"))],
            )],
        )],
        ..File::default()
    };
    let (ctx, module) = must_bind(file);
    let flagset = child(&ctx, module, "Permissions");
    match &ctx.arena()[flagset].kind {
        DeclKind::Flagset { optional, flags } => {
            assert!(*optional);
            assert_eq!(flags.len(), 2);
        }
        other => panic!("expected flagset, got {other:?}"),
    }
    let admin = child(&ctx, module, "Admin");
    let grant = child(&ctx, admin, "grant");
    let perms = child(&ctx, grant, "perms");
    match &ctx.arena()[perms].kind {
        DeclKind::Field { ty } => assert_eq!(*ty, Type::Named(flagset)),
        other => panic!("expected field, got {other:?}"),
    }
    assert!(ctx.arena().child_of(flagset, "read").is_some());
}

#[test]
fn flag_is_not_a_type() {
    let file = File {
        flagsets: vec![FlagsetDecl::new(
            "Permissions",
            false,
            vec![FlagDecl::new("read")],
        )],
        protocols: vec![ProtocolDecl::new(
            "Admin",
            vec![FuncDecl::new(
                "grant",
                vec![ArgumentDecl::new(
                    "bad",
                    TypeExpr::member(TypeExpr::ident("Permissions"), "read"),
                )],
            )],
        )],
        ..File::default()
    };
    let err = must_fail(file);
    assert!(
        matches!(&err.kind, BindErrorKind::NotAType(name) if name == "Permissions.read"),
        "unexpected error: {err}"
    );
}

#[test]
fn child_path_round_trips_from_direct_parent() {
    let file = File {
        structs: vec![StructDecl::new(
            "User",
            vec![FieldDecl::new("name", TypeExpr::ident("String"))],
        )],
        enums: vec![EnumDecl::new(
            "Shape",
            vec![CaseDecl::new(
                "circle",
                vec![ArgumentDecl::new("radius", TypeExpr::ident("Int32"))],
            )],
        )],
        protocols: vec![ProtocolDecl::new(
            "Account",
            vec![FuncDecl::new(
                "register",
                vec![ArgumentDecl::new("who", TypeExpr::ident("String"))],
            )],
        )],
        ..File::default()
    };
    let (ctx, _) = must_bind(file);
    let arena = ctx.arena();
    for (id, decl) in arena.iter() {
        let Some(parent) = decl.parent else { continue };
        let found = arena.child_of(parent, &decl.name);
        assert_eq!(found, Some(id), "child lookup failed for {}", decl.path);
    }
}

// Import resolution through the file strategy.

fn loader_for(files: HashMap<&'static str, File>) -> impl FnMut(&str) -> Result<File, String> {
    move |path: &str| {
        files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("no such file: {path}"))
    }
}

fn common_file() -> File {
    File {
        structs: vec![StructDecl::new(
            "User",
            vec![FieldDecl::new("name", TypeExpr::ident("String"))],
        )],
        ..File::default()
    }
}

#[test]
fn imported_module_resolves_through_alias() {
    let chat = File {
        imports: vec![ImportDecl::new("common", "common")],
        structs: vec![StructDecl::new(
            "Message",
            vec![FieldDecl::new(
                "author",
                TypeExpr::member(TypeExpr::ident("common"), "User"),
            )],
        )],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::from([("common", common_file())])));
    let mut ctx = Context::new();
    let module = match ctx.bind_module(vec![chat], &mut resolver, "chat") {
        Ok(module) => module,
        Err(err) => panic!("binding failed: {err}"),
    };

    let ty = field_ty(&ctx, module, "Message", "author");
    assert_eq!(ty.path(ctx.arena()), Path::module("common").appended("User"));
}

#[test]
fn import_of_missing_file_surfaces_loader_error() {
    let chat = File {
        imports: vec![ImportDecl::new("nowhere", "nowhere")],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::new()));
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![chat], &mut resolver, "chat") else {
        panic!("binding unexpectedly succeeded");
    };

    let BindErrorKind::UnresolvedImport { path, source } = &err.kind else {
        panic!("expected unresolved import, got {err}");
    };
    assert_eq!(path, "nowhere");
    assert!(matches!(
        &source.kind,
        BindErrorKind::ImportFailed { reason, .. } if reason == "no such file: nowhere"
    ));
}

#[test]
fn errors_inside_an_import_chain_to_the_importer() {
    let broken = File {
        structs: vec![StructDecl::new(
            "User",
            vec![FieldDecl::new("name", TypeExpr::ident("Strang"))],
        )],
        ..File::default()
    };
    let chat = File {
        imports: vec![ImportDecl::new("common", "common")],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::from([("common", broken)])));
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![chat], &mut resolver, "chat") else {
        panic!("binding unexpectedly succeeded");
    };

    let BindErrorKind::UnresolvedImport { source, .. } = &err.kind else {
        panic!("expected unresolved import, got {err}");
    };
    assert!(matches!(
        &source.kind,
        BindErrorKind::UnknownIdentifier(name) if name == "Strang"
    ));
    assert_eq!(
        source.path,
        Path::module("common").appended("User").appended("name")
    );
}

#[test]
fn cyclic_imports_fail_fast() {
    let a = File {
        imports: vec![ImportDecl::new("b", "b")],
        ..File::default()
    };
    let b = File {
        imports: vec![ImportDecl::new("a", "a")],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::from([("a", a.clone()), ("b", b)])));
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![a], &mut resolver, "a") else {
        panic!("binding unexpectedly succeeded");
    };

    // a -> b -> a: the innermost error is the cycle.
    let mut kind = &err.kind;
    let mut depth = 0;
    while let BindErrorKind::UnresolvedImport { source, .. } = kind {
        kind = &source.kind;
        depth += 1;
    }
    assert!(matches!(kind, BindErrorKind::ImportCycle(path) if path == "a"));
    assert_eq!(depth, 2);
}

#[test]
fn imported_modules_do_not_see_the_importers_scope() {
    // chat binds `c` into its own frame before importing leaky; leaky's
    // frame sits directly over the world scope, so `c` is unknown there.
    let chat = File {
        imports: vec![
            ImportDecl::new("common", "c"),
            ImportDecl::new("leaky", "leaky"),
        ],
        ..File::default()
    };
    let leaky = File {
        structs: vec![StructDecl::new(
            "S",
            vec![FieldDecl::new(
                "f",
                TypeExpr::member(TypeExpr::ident("c"), "User"),
            )],
        )],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::from([
        ("common", common_file()),
        ("leaky", leaky),
    ])));
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![chat], &mut resolver, "chat") else {
        panic!("binding unexpectedly succeeded");
    };

    let BindErrorKind::UnresolvedImport { path, source } = &err.kind else {
        panic!("expected unresolved import, got {err}");
    };
    assert_eq!(path, "leaky");
    assert!(matches!(
        &source.kind,
        BindErrorKind::UnknownIdentifier(name) if name == "c"
    ));
    assert_eq!(
        source.path,
        Path::module("leaky").appended("S").appended("f")
    );
}

#[test]
fn duplicate_import_alias_is_an_error() {
    let chat = File {
        imports: vec![
            ImportDecl::new("common", "c"),
            ImportDecl::new("common", "c"),
        ],
        ..File::default()
    };
    let mut resolver = FileImports::new(loader_for(HashMap::from([("common", common_file())])));
    let mut ctx = Context::new();
    let Err(err) = ctx.bind_module(vec![chat], &mut resolver, "chat") else {
        panic!("binding unexpectedly succeeded");
    };
    assert!(matches!(&err.kind, BindErrorKind::DuplicateName(name) if name == "c"));
}
