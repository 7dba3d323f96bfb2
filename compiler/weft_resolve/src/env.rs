//! Lexical scope chain.

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;

use crate::object::ObjectRef;
use crate::ty::Primitive;

/// The process-wide root scope, holding the built-in primitive types.
/// Built once and never mutated afterwards, so it is safe to share across
/// threads and across independent binding runs.
static WORLD: LazyLock<Env> = LazyLock::new(|| {
    let mut items = FxHashMap::default();
    for p in Primitive::ALL {
        items.insert(p.name().to_owned(), ObjectRef::Primitive(p));
    }
    Env(Arc::new(EnvInner {
        items,
        parent: None,
    }))
});

#[derive(Clone, Debug)]
struct EnvInner {
    items: FxHashMap<String, ObjectRef>,
    parent: Option<Env>,
}

/// A lexical name-resolution frame.
///
/// Frames form a singly-linked chain ending at the world scope. The
/// structure is persistent: [`Env::child`] allocates a new head and
/// [`Env::bind`] copies on write, so a scope captured by an
/// already-bound declaration keeps exactly the bindings that were visible
/// at its declaration even while binding continues in the live frame.
#[derive(Clone, Debug)]
pub struct Env(Arc<EnvInner>);

impl Env {
    /// The shared root scope of built-in primitives.
    pub fn world() -> Env {
        WORLD.clone()
    }

    /// A new empty frame whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Env {
        Env(Arc::new(EnvInner {
            items: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    /// The enclosing frame, if any.
    pub fn parent(&self) -> Option<Env> {
        self.0.parent.clone()
    }

    /// Bind a name in this frame, shadowing any outer binding.
    pub fn bind(&mut self, name: impl Into<String>, object: ObjectRef) {
        let inner = Arc::make_mut(&mut self.0);
        inner.items.insert(name.into(), object);
    }

    /// Innermost-first lookup through the chain.
    pub fn search(&self, name: &str) -> Option<ObjectRef> {
        if let Some(found) = self.0.items.get(name) {
            return Some(*found);
        }
        self.0.parent.as_ref().and_then(|p| p.search(name))
    }

    /// Whether `name` is bound in this frame itself, ignoring parents.
    pub fn contains_local(&self, name: &str) -> bool {
        self.0.items.contains_key(name)
    }
}
