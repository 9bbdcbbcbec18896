//! Shared types for the Nuru toolchain.
//!
//! This crate defines the AST node types, source spans and syntax error
//! types shared by the lexer, the parser and the evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorCode, NuruError, SyntaxErrors, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the front end.
pub type Result<T> = std::result::Result<T, NuruError>;
