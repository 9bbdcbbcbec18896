//! Core Nuru lexer: converts source text to a token stream.
//!
//! Newlines are plain whitespace and `;` is an optional separator, so the
//! parser decides where statements end. Both `//` line comments and
//! `/* */` block comments are skipped. Up to [`MAX_ERRORS`] errors are
//! collected before scanning stops.

use nuru_types::{ErrorCode, NuruError, SourceFile, Span, SyntaxErrors, MAX_ERRORS};

use crate::token::{Token, TokenKind};

/// The Nuru lexer.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    source_file: &'src SourceFile,
    file_name: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    errors: SyntaxErrors,
}

/// Result of lexing: tokens + any errors collected.
#[derive(Debug)]
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: SyntaxErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            file_name: &source_file.name,
            pos: 0,
            line: 1,
            col: 1,
            errors: SyntaxErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if !is_utf8_continuation(ch) {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume the next byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = NuruError::new(self.file_name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    fn emit_error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = NuruError::new(self.file_name, code, message, span, source_line)
            .with_suggestion(suggestion);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace (newlines included) and comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNCLOSED_DELIMITER,
                        "unterminated block comment",
                        span,
                        "close the comment with */",
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            if self.errors.total_errors >= MAX_ERRORS {
                return Token::new(TokenKind::Eof, self.current_span());
            }

            let start_line = self.line;
            let start_col = self.col;
            let start = self.pos;

            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, self.current_span());
            };

            let kind = match ch {
                b'"' | b'\'' => self.scan_string(ch, start_line, start_col),
                b'0'..=b'9' => self.scan_number(start),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start),

                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'%' => TokenKind::Percent,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'{' => TokenKind::LBrace,
                b'}' => TokenKind::RBrace,
                b',' => TokenKind::Comma,
                b';' => TokenKind::Semicolon,

                b'=' if self.eat(b'=') => TokenKind::EqEq,
                b'=' => TokenKind::Eq,
                b'!' if self.eat(b'=') => TokenKind::BangEq,
                b'!' => TokenKind::Bang,
                b'<' if self.eat(b'=') => TokenKind::LessEq,
                b'<' => TokenKind::Less,
                b'>' if self.eat(b'=') => TokenKind::GreaterEq,
                b'>' => TokenKind::Greater,
                b'&' if self.eat(b'&') => TokenKind::AndAnd,
                b'|' if self.eat(b'|') => TokenKind::OrOr,
                b'&' | b'|' => {
                    let span = self.span_from(start_line, start_col);
                    let op = ch as char;
                    self.emit_error_with_suggestion(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character '{op}'"),
                        span,
                        format!("use '{op}{op}' for the logical operator"),
                    );
                    continue;
                }

                _ => {
                    // Skip the rest of a multi-byte character so it is
                    // reported once.
                    while self.peek().is_some_and(is_utf8_continuation) {
                        self.advance();
                    }
                    let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character '{text}'"),
                        span,
                    );
                    continue;
                }
            };

            return Token::new(kind, self.span_from(start_line, start_col));
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Literals & identifiers
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize) -> TokenKind {
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("0");
        TokenKind::NumberLit(text.parse().unwrap_or(0.0))
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }

    /// Scan a string literal after its opening quote. Strings may span
    /// lines; an unterminated one is reported and the text so far kept.
    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf = Vec::new();

        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error_with_suggestion(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                        format!("close the string with {}", quote as char),
                    );
                    break;
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    if let Some(escaped) = self.scan_escape_sequence() {
                        buf.push(escaped);
                    }
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }

        TokenKind::StringLiteral(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Scan an escape sequence starting at the `\`.
    fn scan_escape_sequence(&mut self) -> Option<u8> {
        let start_line = self.line;
        let start_col = self.col;
        self.advance();

        match self.advance() {
            Some(b'n') => Some(b'\n'),
            Some(b't') => Some(b'\t'),
            Some(b'r') => Some(b'\r'),
            Some(b'\\') => Some(b'\\'),
            Some(b'"') => Some(b'"'),
            Some(b'\'') => Some(b'\''),
            Some(ch) => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::INVALID_ESCAPE,
                    format!("invalid escape sequence '\\{}'", ch as char),
                    span,
                );
                Some(ch)
            }
            None => None,
        }
    }
}

fn is_utf8_continuation(byte: u8) -> bool {
    byte & 0b1100_0000 == 0b1000_0000
}
