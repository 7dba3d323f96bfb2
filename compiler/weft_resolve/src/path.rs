//! Hierarchical declaration addresses.

use std::fmt;

/// The stable address of a declaration.
///
/// Two parts: a module-scoped prefix and an in-module suffix. Every
/// declaration receives its path at creation by appending its name to its
/// parent's path; paths are values and never mutated in place.
///
/// Within one workspace no two distinct declarations share a path. The only
/// exception are composite types (arrays, dictionaries, optionals), which
/// are unnamed values and carry a synthetic, non-unique marker path.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Path {
    pub module_path: String,
    pub in_module_path: String,
}

impl Path {
    /// The root path of a module.
    pub fn module(module_path: impl Into<String>) -> Path {
        Path {
            module_path: module_path.into(),
            in_module_path: String::new(),
        }
    }

    /// The path of a built-in or structural type, outside any module.
    pub fn builtin(marker: impl Into<String>) -> Path {
        Path {
            module_path: String::new(),
            in_module_path: marker.into(),
        }
    }

    /// A new path with `segment` appended to the in-module suffix.
    #[must_use]
    pub fn appended(&self, segment: &str) -> Path {
        Path {
            module_path: self.module_path.clone(),
            in_module_path: format!("{}/{}", self.in_module_path, segment),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.module_path, self.in_module_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn appended_leaves_original_untouched() {
        let module = Path::module("chat");
        let user = module.appended("User");
        assert_eq!(module.in_module_path, "");
        assert_eq!(user.module_path, "chat");
        assert_eq!(user.in_module_path, "/User");
    }

    #[test]
    fn display_concatenates_both_parts() {
        let p = Path::module("ws/chat").appended("Message").appended("body");
        assert_eq!(p.to_string(), "ws/chat/Message/body");
    }

    #[test]
    fn builtin_paths_have_no_module_part() {
        assert_eq!(Path::builtin("String").to_string(), "String");
    }
}
