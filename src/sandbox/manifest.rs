//! The fixed capability allow-lists exposed inside the sandbox namespace.

use std::collections::BTreeSet;

/// Modules pre-imported into the execution namespace.
///
/// General-purpose, I/O-free utility modules only; the scene capability
/// objects are installed by the host bridge, not imported.
pub const DEFAULT_ALLOWED_MODULES: &[&str] = &["math", "random", "json", "re", "time", "datetime"];

/// Builtins copied into the restricted `__builtins__` table.
///
/// Numeric, string, sequence, and light-introspection operations. File I/O,
/// dynamic evaluation, and process control are deliberately absent.
pub const DEFAULT_ALLOWED_BUILTINS: &[&str] = &[
    "abs",
    "all",
    "any",
    "bin",
    "bool",
    "callable",
    "chr",
    "complex",
    "dict",
    "dir",
    "divmod",
    "enumerate",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "hasattr",
    "hash",
    "hex",
    "id",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "list",
    "map",
    "max",
    "min",
    "next",
    "object",
    "oct",
    "ord",
    "pow",
    "print",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "slice",
    "sorted",
    "str",
    "sum",
    "tuple",
    "type",
    "zip",
];

/// The allow-listed set of modules and builtins the executor namespace may
/// expose.
///
/// Configured once at construction and static for the process lifetime; the
/// executor never widens it from candidate input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityManifest {
    modules: BTreeSet<String>,
    builtins: BTreeSet<String>,
}

impl Default for CapabilityManifest {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_MODULES.iter().copied(),
            DEFAULT_ALLOWED_BUILTINS.iter().copied(),
        )
    }
}

impl CapabilityManifest {
    /// Create a manifest from explicit module and builtin allow-lists.
    pub fn new<'a>(
        modules: impl IntoIterator<Item = &'a str>,
        builtins: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            modules: modules.into_iter().map(str::to_string).collect(),
            builtins: builtins.into_iter().map(str::to_string).collect(),
        }
    }

    /// Iterate the allow-listed module names.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    /// Iterate the allow-listed builtin names.
    pub fn builtins(&self) -> impl Iterator<Item = &str> {
        self.builtins.iter().map(String::as_str)
    }

    /// Check whether a module is allow-listed.
    pub fn allows_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    /// Check whether a builtin is allow-listed.
    pub fn allows_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_contents() {
        let manifest = CapabilityManifest::default();
        assert!(manifest.allows_module("math"));
        assert!(manifest.allows_module("random"));
        assert!(manifest.allows_builtin("print"));
        assert!(manifest.allows_builtin("range"));
    }

    #[test]
    fn test_default_manifest_excludes_escape_primitives() {
        let manifest = CapabilityManifest::default();
        for denied in ["open", "eval", "exec", "compile", "input", "__import__"] {
            assert!(!manifest.allows_builtin(denied), "{denied} must not be allowed");
        }
        assert!(!manifest.allows_module("os"));
        assert!(!manifest.allows_module("sys"));
        assert!(!manifest.allows_module("subprocess"));
    }

    #[test]
    fn test_custom_manifest() {
        let manifest = CapabilityManifest::new(["math"], ["print", "len"]);
        assert!(manifest.allows_module("math"));
        assert!(!manifest.allows_module("json"));
        assert_eq!(manifest.builtins().count(), 2);
    }
}
