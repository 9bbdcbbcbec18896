//! Core parser infrastructure: token cursor, error reporting, helpers.

use nuru_lexer::{Lexer, Token, TokenKind};
use nuru_types::ast::{Ident, Program};
use nuru_types::{ErrorCode, NuruError, SourceFile, Span, SyntaxErrors, MAX_ERRORS};

/// The Nuru parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and resynchronizes at statement boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    file_name: String,
    errors: SyntaxErrors,
    /// Current expression nesting depth (max [`MAX_NESTING`]).
    pub(crate) expr_depth: u32,
}

/// Deepest expression nesting accepted before the parser gives up.
pub(crate) const MAX_NESTING: u32 = 64;

/// Result of parsing.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: SyntaxErrors,
}

impl ParseResult {
    /// The program, if parsing produced one without any errors.
    pub fn into_program(self) -> Result<Program, SyntaxErrors> {
        match self.program {
            Some(program) if !self.errors.has_errors() => Ok(program),
            _ => Err(self.errors),
        }
    }
}

/// Lex and parse a whole source file. Lexer errors come first, followed by
/// parser errors.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    if lexed.errors.has_errors() {
        let mut errors = lexed.errors;
        errors.extend(result.errors);
        result.errors = errors;
    }
    result
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or(Span::point(1, 1), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, span));
        }
        Self {
            tokens,
            pos: 0,
            file_name: source_file.name.clone(),
            source_file,
            errors: SyntaxErrors::empty(),
            expr_depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, so the stream is never empty.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect the closing half of a delimiter pair opened at `open_span`.
    /// Running out of input is reported against the opening delimiter.
    pub(crate) fn expect_closing(&mut self, closing: &TokenKind, open_span: Span) -> Option<Token> {
        if self.at_end() {
            self.error_at(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("unclosed delimiter, expected '{closing}' before end of file"),
                open_span,
            );
            return None;
        }
        self.expect(closing)
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error = NuruError::new(&self.file_name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until a statement boundary: just past a `;`, or at a
    /// statement keyword or closing brace. Always consumes at least one
    /// token unless already at `}` or end of file.
    pub(crate) fn synchronize(&mut self) {
        let start = self.pos;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::Let
                | TokenKind::Kazi
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                    if self.pos > start =>
                {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program: Some(program),
            errors: self.errors,
        }
    }
}
