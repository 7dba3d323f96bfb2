//! Symbol-link resolution for documentation cross-references.
//!
//! Documentation text refers to declarations with short, locally-relative
//! references like `@User` or `@Shape.circle`. Resolution walks up from the
//! documented item: try the item's own subtree and scope, else retry from
//! its parent, until the root is reached. A short reference written next to
//! a declaration therefore resolves the nearest matching declaration, while
//! still being able to reach anything visible workspace-wide.

use crate::object::{DeclArena, ObjectRef};

/// Resolve a dotted symbol reference relative to `from`.
///
/// Returns the referenced object, or `None` if no ancestor of `from` can
/// see a matching declaration.
pub fn resolve_symbol(from: ObjectRef, symbol: &str, arena: &DeclArena) -> Option<ObjectRef> {
    if symbol.is_empty() {
        return None;
    }
    let segments: Vec<&str> = symbol.split('.').collect();
    find_up(from, &segments, arena)
}

/// Resolve `segments` inside `object`: direct children first, then the
/// scope that was active at the object's declaration.
fn find_in(object: ObjectRef, segments: &[&str], arena: &DeclArena) -> Option<ObjectRef> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(object);
    };
    if let Some(c) = object.child(first, arena) {
        return find_in(c, rest, arena);
    }
    if let Some(found) = object.scope(arena).search(first) {
        return find_in(found, rest, arena);
    }
    None
}

fn find_up(object: ObjectRef, segments: &[&str], arena: &DeclArena) -> Option<ObjectRef> {
    if let Some(found) = find_in(object, segments, arena) {
        return Some(found);
    }
    object
        .parent(arena)
        .and_then(|parent| find_up(parent, segments, arena))
}
