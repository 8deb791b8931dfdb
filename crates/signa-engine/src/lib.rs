//! Signa: a static type-signature engine.
//!
//! Parses signature files into a declaration model, merges reopened
//! declarations into one [`Environment`](env::Environment), linearizes
//! ancestor chains, merges method tables over them, and validates every
//! reference in the loaded set.
//!
//! # Example
//!
//! ```
//! use signa_core::TypeName;
//! use signa_engine::SessionBuilder;
//!
//! let session = SessionBuilder::new()
//!     .library("set")
//!     .build()
//!     .expect("bundled signatures parse");
//!
//! let set = TypeName::parse("::Set").unwrap();
//! let chain = session.instance_ancestors(&set).unwrap();
//! assert_eq!(chain.entries().len(), 5);
//! assert!(session.validate().is_empty());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ancestors;
pub mod ast;
pub mod definitions;
pub mod diagnostics;
pub mod env;
pub mod parser;
pub mod resolve;
pub mod session;
pub mod source;
pub mod stdlib;
pub mod subst;
pub mod validate;

#[cfg(test)]
mod ancestors_tests;
#[cfg(test)]
mod resolve_tests;
#[cfg(test)]
mod session_tests;
#[cfg(test)]
mod validate_tests;

use signa_core::TypeName;

/// Result type for passes that produce both output and diagnostics.
///
/// Each pass returns its typed output alongside any diagnostics it collected.
/// Fatal errors (like fuel exhaustion) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use ancestors::{AncestorBuilder, AncestorChain, AncestorEntry, Context, Origin};
pub use definitions::{Definition, DefinitionBuilder, MethodDefinition};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, SignatureError};
pub use env::Environment;
pub use session::{Session, SessionBuilder};
pub use source::{Provenance, SourceId, SourceMap, Span};

/// Errors that abort a whole operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("parsing failed with {} errors", .0.error_count())]
    ParseFailed(Diagnostics),

    /// A bundled library that does not exist was requested.
    #[error("unknown library `{0}`")]
    UnknownSource(String),

    /// A query named an entity that is not declared.
    #[error("`{0}` is not declared")]
    UnknownType(TypeName),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
