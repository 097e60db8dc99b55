//! Embedded source modules
//!
//! Modules written in gurk itself, compiled into the runtime so the engine
//! never reads library files from disk. Each one is loaded into its own
//! module frame when an engine is created.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Embedded stdlib files (name -> content)
static STDLIB: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("bool", include_str!("../stdlib/bool.gurk"));
    m
});

/// Get an embedded stdlib module by name
pub fn get_stdlib(name: &str) -> Option<&'static str> {
    STDLIB.get(name).copied()
}

/// Check if a stdlib module exists (embedded)
pub fn has_stdlib(name: &str) -> bool {
    STDLIB.contains_key(name)
}

/// List all embedded stdlib modules, sorted
pub fn list_stdlib() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = STDLIB.keys().copied().collect();
    names.sort_unstable();
    names
}
