//! Token types for the Nuru lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language and
//! [`Token`], which pairs a kind with a source [`Span`].

use nuru_types::Span;
use std::fmt;

/// Reserved words. The lexer emits a keyword token for each of these
/// instead of [`TokenKind::Identifier`].
pub const ALL_KEYWORDS: &[&str] = &[
    "fanya", "unda", "kazi", "kweli", "sikweli", "tupu", "kama", "sivyo", "wakati", "rudisha",
    "vunja", "endelea",
];

/// A single token produced by the Nuru lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

/// Every token kind in the Nuru language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`, `3.14`
    NumberLit(f64),
    /// `"habari"` or `'habari'`
    StringLiteral(String),
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────
    /// `fanya`
    Let,
    /// `unda`
    Function,
    /// `kazi`
    Kazi,
    /// `kweli`
    True,
    /// `sikweli`
    False,
    /// `tupu`
    Null,
    /// `kama`
    If,
    /// `sivyo`
    Else,
    /// `wakati`
    While,
    /// `rudisha`
    Return,
    /// `vunja`
    Break,
    /// `endelea`
    Continue,

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Eq,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    Eof,
}

impl TokenKind {
    /// Look up a reserved identifier.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "fanya" => TokenKind::Let,
            "unda" => TokenKind::Function,
            "kazi" => TokenKind::Kazi,
            "kweli" => TokenKind::True,
            "sikweli" => TokenKind::False,
            "tupu" => TokenKind::Null,
            "kama" => TokenKind::If,
            "sivyo" => TokenKind::Else,
            "wakati" => TokenKind::While,
            "rudisha" => TokenKind::Return,
            "vunja" => TokenKind::Break,
            "endelea" => TokenKind::Continue,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Function
                | TokenKind::Kazi
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::NumberLit(n) => write!(f, "{n}"),
            TokenKind::StringLiteral(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(name) => f.write_str(name),

            TokenKind::Let => f.write_str("fanya"),
            TokenKind::Function => f.write_str("unda"),
            TokenKind::Kazi => f.write_str("kazi"),
            TokenKind::True => f.write_str("kweli"),
            TokenKind::False => f.write_str("sikweli"),
            TokenKind::Null => f.write_str("tupu"),
            TokenKind::If => f.write_str("kama"),
            TokenKind::Else => f.write_str("sivyo"),
            TokenKind::While => f.write_str("wakati"),
            TokenKind::Return => f.write_str("rudisha"),
            TokenKind::Break => f.write_str("vunja"),
            TokenKind::Continue => f.write_str("endelea"),

            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::AndAnd => f.write_str("&&"),
            TokenKind::OrOr => f.write_str("||"),

            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Semicolon => f.write_str(";"),

            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_is_recognised() {
        for &kw in ALL_KEYWORDS {
            let kind = TokenKind::from_keyword(kw)
                .unwrap_or_else(|| panic!("'{kw}' should be a keyword"));
            assert!(kind.is_keyword());
            assert_eq!(kind.to_string(), kw, "Display should round-trip '{kw}'");
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(TokenKind::from_keyword("fanya").is_some());
        assert!(TokenKind::from_keyword("Fanya").is_none());
        assert!(TokenKind::from_keyword("KWELI").is_none());
    }

    #[test]
    fn test_identifiers_are_not_keywords() {
        let token = Token::new(TokenKind::Identifier("hakiki".into()), Span::new(1, 1, 1, 6));
        assert!(!token.is_keyword());
        assert!(TokenKind::from_keyword("hakiki").is_none());
    }

    #[test]
    fn test_display_operators() {
        assert_eq!(TokenKind::EqEq.to_string(), "==");
        assert_eq!(TokenKind::BangEq.to_string(), "!=");
        assert_eq!(TokenKind::AndAnd.to_string(), "&&");
        assert_eq!(TokenKind::OrOr.to_string(), "||");
        assert_eq!(TokenKind::NumberLit(3.5).to_string(), "3.5");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
