//! The action language.
//!
//! Action bodies are written in a small expression/statement language and
//! run by a tree-walking interpreter. Nothing in a body can reach outside of
//! the node it is applied to: the only effects are nested applications of
//! declared operations, which go through the evaluator's cache.
//!
//! ```text
//! letter(c)          c.source
//! number(ds)         int(ds.source)
//! add(l, _, r)       l.eval() + r.eval()
//! list(xs)           let items = xs.eval(); if (len(items) == 0) { throw "empty"; } return items;
//! ```

pub mod ast;
mod diagnostics;
mod interp;
pub mod lexer;
pub mod parser;


pub use diagnostics::{CompileError, DiagnosticsPrinter};
pub use interp::CompiledAction;

const KEYWORDS: &[&str] = &[
    "let", "return", "if", "else", "throw", "true", "false", "null", "self",
];

/// Whether `name` can be used as an operation, formal or parameter name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

/// Compile an action body. `params` are bound to the node's children and
/// `formals` to the operation's arguments when the action runs.
pub fn compile(
    params: &[String],
    formals: &[String],
    body: &str,
) -> Result<CompiledAction, CompileError> {
    for (i, name) in params.iter().enumerate() {
        if !is_identifier(name) {
            return Err(CompileError::new(
                format!("invalid parameter name `{name}`"),
                0..0,
            ));
        }
        if params[..i].contains(name) || formals.contains(name) {
            return Err(CompileError::new(
                format!("duplicate parameter name `{name}`"),
                0..0,
            ));
        }
    }

    let body_ast = parser::parse(body)?;
    Ok(CompiledAction::new(
        params.to_vec(),
        formals.to_vec(),
        body_ast,
    ))
}
