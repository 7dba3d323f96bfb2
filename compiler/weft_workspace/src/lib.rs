//! Weft Workspace - Multi-Module Assembly
//!
//! Composes bound modules into a workspace. Each product of the workspace
//! manifest becomes one module; products are bound in manifest order into a
//! shared declaration arena, and imports between them resolve by product
//! name against the modules bound so far.
//!
//! Manifest parsing and file discovery happen in the surrounding tooling:
//! products arrive here with their source files already parsed.

use rustc_hash::FxHashMap;
use tracing::debug;
use weft_ir::File;
use weft_resolve::{
    BindError, BindErrorKind, BindOptions, Context, DeclArena, DeclId, ImportResolver, Path,
};

/// One product of the workspace manifest: a named module together with its
/// parsed source files and optional module-level documentation.
#[derive(Debug)]
pub struct Product {
    pub name: String,
    pub files: Vec<File>,
    /// Module documentation (the product's `Docs.md`), already read.
    pub doc: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, files: Vec<File>) -> Product {
        Product {
            name: name.into(),
            files,
            doc: None,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Product {
        self.doc = Some(doc.into());
        self
    }
}

/// Import strategy for workspace binding: resolves an import path as a
/// product name against the modules bound so far. Products are bound once;
/// every dependent gets the same module.
struct ProductImports {
    workspace: String,
    bound: FxHashMap<String, DeclId>,
}

impl ImportResolver for ProductImports {
    fn module_for(
        &mut self,
        _ctx: &mut Context,
        path: &str,
        _from: &str,
    ) -> Result<DeclId, BindError> {
        self.bound.get(path).copied().ok_or_else(|| {
            BindError::new(
                Path::module(path),
                BindErrorKind::UnknownProduct {
                    name: path.to_owned(),
                    workspace: self.workspace.clone(),
                },
            )
        })
    }
}

/// A set of bound modules with cross-module import resolution.
///
/// Owns the declaration arena for every module it contains; consumers
/// (code generators, the documentation renderer) traverse it read-only.
#[derive(Debug)]
pub struct Workspace {
    name: String,
    arena: DeclArena,
    modules: FxHashMap<String, DeclId>,
}

impl Workspace {
    /// Bind `products` in manifest order into a workspace named `name`.
    ///
    /// A product can only import products that appear before it in the
    /// manifest; importing a later or unknown product fails with an
    /// `UnknownProduct` cause. The first failing product aborts the whole
    /// build.
    pub fn bind(name: impl Into<String>, products: Vec<Product>) -> Result<Workspace, BindError> {
        Workspace::bind_with_options(name, products, BindOptions::default())
    }

    pub fn bind_with_options(
        name: impl Into<String>,
        products: Vec<Product>,
        options: BindOptions,
    ) -> Result<Workspace, BindError> {
        let name = name.into();
        let mut ctx = Context::with_options(options);
        let mut imports = ProductImports {
            workspace: name.clone(),
            bound: FxHashMap::default(),
        };

        for product in products {
            let module_path = format!("{name}/{}", product.name);
            debug!(product = %product.name, "binding product");
            let module = ctx.bind_module(product.files, &mut imports, &module_path)?;
            if let Some(doc) = product.doc {
                ctx.set_doc(module, doc);
            }
            imports.bound.insert(product.name, module);
        }

        Ok(Workspace {
            name,
            arena: ctx.into_arena(),
            modules: imports.bound,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every declaration of every module in this workspace.
    pub fn arena(&self) -> &DeclArena {
        &self.arena
    }

    /// The bound module of a product, by product name.
    pub fn module(&self, product: &str) -> Option<DeclId> {
        self.modules.get(product).copied()
    }

    /// All bound modules, keyed by product name (unordered).
    pub fn modules(&self) -> impl Iterator<Item = (&str, DeclId)> {
        self.modules.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
