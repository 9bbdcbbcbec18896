use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Numeric syntax error code (E100–E199).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const UNEXPECTED_CHARACTER: Self = Self(103);
    pub const INVALID_ESCAPE: Self = Self(104);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(105);
    pub const NESTING_TOO_DEEP: Self = Self(106);
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured syntax error produced by the lexer or parser.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{span}: {code} {message}")]
pub struct NuruError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl NuruError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Every syntax error collected while lexing and parsing one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxErrors {
    pub errors: Vec<NuruError>,
    pub total_errors: usize,
}

impl SyntaxErrors {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn is_empty(&self) -> bool {
        !self.has_errors()
    }

    /// Whether the cap has been reached and scanning should stop.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: NuruError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append another collection (lexer errors followed by parser errors).
    pub fn extend(&mut self, other: SyntaxErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
    }

    pub fn iter(&self) -> impl Iterator<Item = &NuruError> {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(line: u32) -> NuruError {
        NuruError::new(
            "test.nr",
            ErrorCode::UNEXPECTED_TOKEN,
            "expected ')', got '}'",
            Span::new(line, 5, line, 6),
            "kama (x > 1 {",
        )
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.to_string(), "E100");
        assert_eq!(ErrorCode::UNTERMINATED_STRING.to_string(), "E102");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(sample(4).to_string(), "4:5: E100 expected ')', got '}'");
    }

    #[test]
    fn test_error_with_suggestion() {
        let err = sample(1).with_suggestion("close the condition with ')'");
        assert_eq!(err.suggestion.as_deref(), Some("close the condition with ')'"));
    }

    #[test]
    fn test_error_json_serialization() {
        let err = sample(12);
        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"source_line\""));
        assert!(json.contains("\"line\": 12"));
        assert!(json.contains("\"column\": 5"));
        assert!(!json.contains("suggestion"));

        let back: NuruError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn test_syntax_errors_max_limit() {
        let mut errs = SyntaxErrors::empty();
        for i in 0..25 {
            errs.push_error(sample(i + 1));
        }
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.is_full());
    }

    #[test]
    fn test_syntax_errors_extend_keeps_totals() {
        let mut lex = SyntaxErrors::empty();
        lex.push_error(sample(1));
        let mut parse = SyntaxErrors::empty();
        parse.push_error(sample(2));
        parse.push_error(sample(3));
        lex.extend(parse);
        assert_eq!(lex.total_errors, 3);
        assert_eq!(lex.errors[2].span.start_line, 3);
    }
}
