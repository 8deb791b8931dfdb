//! Parser for signature files.
//!
//! # Architecture
//!
//! A hand-written recursive-descent parser over a logos token stream:
//!
//! - Zero-copy lexing: tokens carry spans, text is sliced only when an AST node needs it
//! - Trivia is skipped by lookahead, newlines are consulted only for `private def` prefixes
//! - Type parameters in scope are tracked while parsing, so `Elem` becomes a variable
//!   reference rather than a class name
//!
//! # Error strategy
//!
//! A file stops at its first syntax error: the error is recorded and the file
//! contributes no declarations. Other files are unaffected. Fuel exhaustion
//! (exec_fuel, recursion_fuel) returns an actual error immediately.

pub mod lexer;
pub mod syntax_kind;

mod core;
mod grammar;
mod invariants;

#[cfg(test)]
mod tests;

pub use core::Parser;
pub use syntax_kind::SyntaxKind;

use crate::PassResult;
use crate::ast::Declaration;
use crate::source::SourceId;
use lexer::lex;

/// Main entry point. Returns Err on fuel exhaustion.
pub fn parse(source: &str, source_id: SourceId) -> PassResult<Vec<Declaration>> {
    Parser::new(source, source_id, lex(source)).parse()
}
