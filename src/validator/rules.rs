//! Deny lists and per-node policy checks.
//!
//! Each rule owns its user-facing reason string via the [`Violation`] enum.
//! The lists are fixed at compile time; they are policy, not configuration.

use rustpython_parser::ast;
use thiserror::Error;

/// Bare-name calls that are always refused, whatever their arguments.
///
/// These are the known escape primitives: dynamic evaluation, file and
/// console I/O, dynamic import, and reflective namespace or attribute
/// manipulation.
pub const DENIED_CALLS: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "open",
    "input",
    "raw_input",
    "__import__",
    "globals",
    "locals",
    "vars",
    "setattr",
    "delattr",
];

/// Reflection helpers that are allowed in general but refused when any
/// string-literal argument names a dunder attribute.
pub const REFLECTION_HELPERS: &[&str] = &["getattr", "hasattr", "setattr", "delattr"];

/// A deny-listed construct found in the candidate AST.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("imports are not allowed")]
    Import,

    #[error("usage of dangerous function '{0}' is not allowed")]
    DangerousCall(String),

    #[error("access to dunder attribute '{0}' is not allowed")]
    DunderAttribute(String),

    #[error("global and nonlocal declarations are not allowed")]
    ScopeEscape,

    #[error("unbounded 'while True' loops are not allowed")]
    InfiniteLoop,

    #[error("reflective access to dunder attribute '{0}' is not allowed")]
    ReflectiveDunder(String),
}

/// Attribute names following the double-underscore convention expose
/// interpreter internals and are categorically refused.
pub fn is_dunder(name: &str) -> bool {
    name.starts_with("__")
}

/// Screen a call expression against the deny lists.
///
/// Only bare-name callees are screened here; calls reached through
/// attributes land on the capability objects, which are the intended
/// surface. Dunder attributes in the callee path are caught by the
/// attribute rule during the walk.
pub fn check_call(call: &ast::ExprCall) -> Result<(), Violation> {
    let ast::Expr::Name(ast::ExprName { id, .. }) = call.func.as_ref() else {
        return Ok(());
    };
    let name = id.as_str();

    if DENIED_CALLS.contains(&name) {
        return Err(Violation::DangerousCall(name.to_string()));
    }

    if REFLECTION_HELPERS.contains(&name) {
        for arg in &call.args {
            if let ast::Expr::Constant(ast::ExprConstant {
                value: ast::Constant::Str(literal),
                ..
            }) = arg
            {
                if is_dunder(literal) {
                    return Err(Violation::ReflectiveDunder(literal.clone()));
                }
            }
        }
    }

    Ok(())
}

/// Screen an attribute access for the dunder convention.
pub fn check_attribute(attribute: &ast::ExprAttribute) -> Result<(), Violation> {
    if is_dunder(attribute.attr.as_str()) {
        return Err(Violation::DunderAttribute(attribute.attr.to_string()));
    }
    Ok(())
}

/// Reject the literal `while True:` pattern.
///
/// Heuristic, not a halting check: truthy spellings such as `while 1:` pass
/// and are left to the execution timeout.
pub fn check_while(stmt: &ast::StmtWhile) -> Result<(), Violation> {
    if let ast::Expr::Constant(ast::ExprConstant {
        value: ast::Constant::Bool(true),
        ..
    }) = stmt.test.as_ref()
    {
        return Err(Violation::InfiniteLoop);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dunder() {
        assert!(is_dunder("__class__"));
        assert!(is_dunder("__import__"));
        assert!(!is_dunder("_private"));
        assert!(!is_dunder("location"));
    }

    #[test]
    fn test_deny_lists_disjoint_from_safe_names() {
        assert!(!DENIED_CALLS.contains(&"print"));
        assert!(!DENIED_CALLS.contains(&"len"));
        assert!(!REFLECTION_HELPERS.contains(&"isinstance"));
    }

    #[test]
    fn test_violation_messages() {
        assert_eq!(Violation::Import.to_string(), "imports are not allowed");
        assert!(Violation::DangerousCall("eval".into())
            .to_string()
            .contains("'eval'"));
        assert!(Violation::DunderAttribute("__class__".into())
            .to_string()
            .contains("'__class__'"));
    }
}
