//! Recursive descent over the candidate AST.
//!
//! The walk visits every statement and expression reachable from the module
//! body and stops at the first deny-listed construct. Statement kinds with no
//! nested expressions (pass, break, continue) fall through the catch-all
//! arms.

use rustpython_parser::ast;

use super::rules::{self, Violation};

/// Walk a parsed module body, returning the first violation found.
pub(crate) fn walk_suite(suite: &[ast::Stmt]) -> Result<(), Violation> {
    for stmt in suite {
        walk_stmt(stmt)?;
    }
    Ok(())
}

fn walk_stmt(stmt: &ast::Stmt) -> Result<(), Violation> {
    match stmt {
        ast::Stmt::Import(_) | ast::Stmt::ImportFrom(_) => Err(Violation::Import),
        ast::Stmt::Global(_) | ast::Stmt::Nonlocal(_) => Err(Violation::ScopeEscape),

        ast::Stmt::While(node) => {
            rules::check_while(node)?;
            walk_expr(&node.test)?;
            walk_suite(&node.body)?;
            walk_suite(&node.orelse)
        }

        ast::Stmt::FunctionDef(node) => {
            walk_arguments(&node.args)?;
            for decorator in &node.decorator_list {
                walk_expr(decorator)?;
            }
            if let Some(returns) = &node.returns {
                walk_expr(returns)?;
            }
            walk_suite(&node.body)
        }
        ast::Stmt::AsyncFunctionDef(node) => {
            walk_arguments(&node.args)?;
            for decorator in &node.decorator_list {
                walk_expr(decorator)?;
            }
            if let Some(returns) = &node.returns {
                walk_expr(returns)?;
            }
            walk_suite(&node.body)
        }
        ast::Stmt::ClassDef(node) => {
            for base in &node.bases {
                walk_expr(base)?;
            }
            for keyword in &node.keywords {
                walk_expr(&keyword.value)?;
            }
            for decorator in &node.decorator_list {
                walk_expr(decorator)?;
            }
            walk_suite(&node.body)
        }

        ast::Stmt::Return(node) => walk_opt_expr(node.value.as_deref()),
        ast::Stmt::Delete(node) => walk_exprs(&node.targets),
        ast::Stmt::Assign(node) => {
            walk_exprs(&node.targets)?;
            walk_expr(&node.value)
        }
        ast::Stmt::AugAssign(node) => {
            walk_expr(&node.target)?;
            walk_expr(&node.value)
        }
        ast::Stmt::AnnAssign(node) => {
            walk_expr(&node.target)?;
            walk_expr(&node.annotation)?;
            walk_opt_expr(node.value.as_deref())
        }

        ast::Stmt::For(node) => {
            walk_expr(&node.target)?;
            walk_expr(&node.iter)?;
            walk_suite(&node.body)?;
            walk_suite(&node.orelse)
        }
        ast::Stmt::AsyncFor(node) => {
            walk_expr(&node.target)?;
            walk_expr(&node.iter)?;
            walk_suite(&node.body)?;
            walk_suite(&node.orelse)
        }
        ast::Stmt::If(node) => {
            walk_expr(&node.test)?;
            walk_suite(&node.body)?;
            walk_suite(&node.orelse)
        }
        ast::Stmt::With(node) => {
            for item in &node.items {
                walk_expr(&item.context_expr)?;
                walk_opt_expr(item.optional_vars.as_deref())?;
            }
            walk_suite(&node.body)
        }
        ast::Stmt::AsyncWith(node) => {
            for item in &node.items {
                walk_expr(&item.context_expr)?;
                walk_opt_expr(item.optional_vars.as_deref())?;
            }
            walk_suite(&node.body)
        }

        ast::Stmt::Raise(node) => {
            walk_opt_expr(node.exc.as_deref())?;
            walk_opt_expr(node.cause.as_deref())
        }
        ast::Stmt::Try(node) => {
            walk_suite(&node.body)?;
            for handler in &node.handlers {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                walk_opt_expr(handler.type_.as_deref())?;
                walk_suite(&handler.body)?;
            }
            walk_suite(&node.orelse)?;
            walk_suite(&node.finalbody)
        }
        ast::Stmt::Assert(node) => {
            walk_expr(&node.test)?;
            walk_opt_expr(node.msg.as_deref())
        }
        ast::Stmt::TryStar(node) => {
            walk_suite(&node.body)?;
            for handler in &node.handlers {
                let ast::ExceptHandler::ExceptHandler(handler) = handler;
                walk_opt_expr(handler.type_.as_deref())?;
                walk_suite(&handler.body)?;
            }
            walk_suite(&node.orelse)?;
            walk_suite(&node.finalbody)
        }
        ast::Stmt::Match(node) => {
            walk_expr(&node.subject)?;
            for case in &node.cases {
                walk_pattern(&case.pattern)?;
                walk_opt_expr(case.guard.as_deref())?;
                walk_suite(&case.body)?;
            }
            Ok(())
        }

        ast::Stmt::Expr(node) => walk_expr(&node.value),

        _ => Ok(()),
    }
}

fn walk_expr(expr: &ast::Expr) -> Result<(), Violation> {
    match expr {
        ast::Expr::Call(node) => {
            rules::check_call(node)?;
            walk_expr(&node.func)?;
            walk_exprs(&node.args)?;
            for keyword in &node.keywords {
                walk_expr(&keyword.value)?;
            }
            Ok(())
        }
        ast::Expr::Attribute(node) => {
            rules::check_attribute(node)?;
            walk_expr(&node.value)
        }

        ast::Expr::BoolOp(node) => walk_exprs(&node.values),
        ast::Expr::NamedExpr(node) => {
            walk_expr(&node.target)?;
            walk_expr(&node.value)
        }
        ast::Expr::BinOp(node) => {
            walk_expr(&node.left)?;
            walk_expr(&node.right)
        }
        ast::Expr::UnaryOp(node) => walk_expr(&node.operand),
        ast::Expr::Lambda(node) => {
            walk_arguments(&node.args)?;
            walk_expr(&node.body)
        }
        ast::Expr::IfExp(node) => {
            walk_expr(&node.test)?;
            walk_expr(&node.body)?;
            walk_expr(&node.orelse)
        }

        ast::Expr::Dict(node) => {
            for key in node.keys.iter().flatten() {
                walk_expr(key)?;
            }
            walk_exprs(&node.values)
        }
        ast::Expr::Set(node) => walk_exprs(&node.elts),
        ast::Expr::List(node) => walk_exprs(&node.elts),
        ast::Expr::Tuple(node) => walk_exprs(&node.elts),

        ast::Expr::ListComp(node) => {
            walk_expr(&node.elt)?;
            walk_comprehensions(&node.generators)
        }
        ast::Expr::SetComp(node) => {
            walk_expr(&node.elt)?;
            walk_comprehensions(&node.generators)
        }
        ast::Expr::DictComp(node) => {
            walk_expr(&node.key)?;
            walk_expr(&node.value)?;
            walk_comprehensions(&node.generators)
        }
        ast::Expr::GeneratorExp(node) => {
            walk_expr(&node.elt)?;
            walk_comprehensions(&node.generators)
        }

        ast::Expr::Await(node) => walk_expr(&node.value),
        ast::Expr::Yield(node) => walk_opt_expr(node.value.as_deref()),
        ast::Expr::YieldFrom(node) => walk_expr(&node.value),
        ast::Expr::Compare(node) => {
            walk_expr(&node.left)?;
            walk_exprs(&node.comparators)
        }

        ast::Expr::FormattedValue(node) => {
            walk_expr(&node.value)?;
            walk_opt_expr(node.format_spec.as_deref())
        }
        ast::Expr::JoinedStr(node) => walk_exprs(&node.values),

        ast::Expr::Subscript(node) => {
            walk_expr(&node.value)?;
            walk_expr(&node.slice)
        }
        ast::Expr::Starred(node) => walk_expr(&node.value),
        ast::Expr::Slice(node) => {
            walk_opt_expr(node.lower.as_deref())?;
            walk_opt_expr(node.upper.as_deref())?;
            walk_opt_expr(node.step.as_deref())
        }

        _ => Ok(()),
    }
}

fn walk_exprs(exprs: &[ast::Expr]) -> Result<(), Violation> {
    for expr in exprs {
        walk_expr(expr)?;
    }
    Ok(())
}

fn walk_opt_expr(expr: Option<&ast::Expr>) -> Result<(), Violation> {
    match expr {
        Some(expr) => walk_expr(expr),
        None => Ok(()),
    }
}

/// Match patterns embed expressions (value patterns, class patterns, mapping
/// keys) that must be screened like any other.
fn walk_pattern(pattern: &ast::Pattern) -> Result<(), Violation> {
    match pattern {
        ast::Pattern::MatchValue(node) => walk_expr(&node.value),
        ast::Pattern::MatchSequence(node) => walk_patterns(&node.patterns),
        ast::Pattern::MatchMapping(node) => {
            walk_exprs(&node.keys)?;
            walk_patterns(&node.patterns)
        }
        ast::Pattern::MatchClass(node) => {
            walk_expr(&node.cls)?;
            walk_patterns(&node.patterns)?;
            walk_patterns(&node.kwd_patterns)
        }
        ast::Pattern::MatchAs(node) => match &node.pattern {
            Some(inner) => walk_pattern(inner),
            None => Ok(()),
        },
        ast::Pattern::MatchOr(node) => walk_patterns(&node.patterns),
        _ => Ok(()),
    }
}

fn walk_patterns(patterns: &[ast::Pattern]) -> Result<(), Violation> {
    for pattern in patterns {
        walk_pattern(pattern)?;
    }
    Ok(())
}

fn walk_comprehensions(generators: &[ast::Comprehension]) -> Result<(), Violation> {
    for generator in generators {
        walk_expr(&generator.target)?;
        walk_expr(&generator.iter)?;
        walk_exprs(&generator.ifs)?;
    }
    Ok(())
}

/// Walk annotations and default values in a parameter list; a denied call in
/// a default argument would run at definition time.
fn walk_arguments(arguments: &ast::Arguments) -> Result<(), Violation> {
    for arg in arguments
        .posonlyargs
        .iter()
        .chain(&arguments.args)
        .chain(&arguments.kwonlyargs)
    {
        walk_opt_expr(arg.def.annotation.as_deref())?;
        walk_opt_expr(arg.default.as_deref())?;
    }
    if let Some(vararg) = &arguments.vararg {
        walk_opt_expr(vararg.annotation.as_deref())?;
    }
    if let Some(kwarg) = &arguments.kwarg {
        walk_opt_expr(kwarg.annotation.as_deref())?;
    }
    Ok(())
}
