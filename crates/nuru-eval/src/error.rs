//! Runtime error types for the Nuru evaluator.

use thiserror::Error;

/// Evaluation error. Carried by [`crate::Value::Error`] once it reaches a
/// caller; threaded through the evaluator as [`EvalResult`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    UndefinedIdentifier(String),

    #[error("wrong number of arguments for {name}: expected {expected}, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Operator applied to operands of the wrong kind.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("not a function: {0}")]
    NotCallable(String),

    #[error("division by zero")]
    DivisionByZero,

    /// A `wakati` loop exceeded the configured iteration ceiling.
    #[error("infinite loop detected")]
    InfiniteLoop,

    /// Nested function calls exceeded the configured depth.
    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    /// `vunja` or `endelea` escaped every enclosing loop.
    #[error("{0} outside a loop")]
    StrayControl(&'static str),

    /// Error raised by a builtin; displays exactly its message.
    #[error("{0}")]
    Custom(String),
}

impl RuntimeError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, RuntimeError>;
