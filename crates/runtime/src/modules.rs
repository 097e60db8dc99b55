//! Builtin module tables
//!
//! The prelude is the root of every scope and needs no import. The other
//! native modules are only reachable through `import`.

use crate::builtins::Builtin;
use crate::{arithmetic, bindings, case, cond, coro, io, quotations, stack, string_ops, time_ops};

pub const PRELUDE: &str = "prelude";

/// Everything visible without an import
pub fn prelude() -> Vec<Builtin> {
    [
        stack::BUILTINS,
        quotations::BUILTINS,
        bindings::BUILTINS,
        case::BUILTINS,
        cond::BUILTINS,
        io::BUILTINS,
        string_ops::BUILTINS,
        time_ops::BUILTINS,
    ]
    .concat()
}

/// Importable native modules
pub fn native_modules() -> [(&'static str, &'static [Builtin]); 3] {
    [
        ("math", arithmetic::MATH),
        ("coro", coro::CORO),
        ("strings", string_ops::STRINGS),
    ]
}
