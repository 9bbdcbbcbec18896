//! AST node types for the Nuru language.
//!
//! Every node carries a [`Span`] for error reporting. Function bodies sit
//! behind an [`Rc`] so a function value can keep its body alive after the
//! program that declared it has been dropped (the REPL parses one line at
//! a time but keeps the functions it defines).

use crate::Span;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Nuru program: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `fanya name = expr`
    Let(LetStmt),
    /// `name = expr`
    Assign(AssignStmt),
    /// `rudisha [expr]`
    Return(ReturnStmt),
    /// `vunja`
    Break(Span),
    /// `endelea`
    Continue(Span),
    /// A bare expression, including `kazi name(...) { ... }` declarations
    /// and `wakati` loops.
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Expr(s) => s.span,
        }
    }

    /// The named function declared by this statement, if it is a
    /// `kazi name(...) { ... }` declaration.
    pub fn as_named_function(&self) -> Option<&FunctionLit> {
        match self {
            Stmt::Expr(ExprStmt {
                expr:
                    Expr {
                        kind: ExprKind::Function(func),
                        ..
                    },
                ..
            }) if func.name.is_some() => Some(func),
            _ => None,
        }
    }

    /// Whether this statement is a bare loop (its `vunja` is consumed by it).
    pub fn is_loop(&self) -> bool {
        matches!(self, Stmt::Expr(s) if s.expr.is_loop())
    }
}

/// `fanya name = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `name = expr`; the name must already be bound in an enclosing scope.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `rudisha [expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// A bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this expression is a `wakati` loop, possibly parenthesized.
    pub fn is_loop(&self) -> bool {
        match &self.kind {
            ExprKind::While(_) => true,
            ExprKind::Paren(inner) => inner.is_loop(),
            _ => false,
        }
    }

    /// A zero-argument call to `name`, as synthesized by the test harness.
    pub fn call_by_name(name: &str) -> Self {
        let span = Span::synthetic();
        Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(ExprKind::Identifier(name.to_string()), span)),
                args: Vec::new(),
            },
            span,
        )
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`, `3.14`
    NumberLit(f64),
    /// `"habari"`
    StringLit(String),
    /// `kweli` / `sikweli`
    BoolLit(bool),
    /// `tupu`
    NullLit,

    /// `jina`
    Identifier(String),
    /// `callee(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `-x`, `!x`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    // ── Control Flow ──
    /// `kama (cond) { ... } [sivyo { ... }]`
    If(Box<IfExpr>),
    /// `wakati (cond) { ... }`
    While(Box<WhileExpr>),

    /// `unda(params) { body }` or `kazi name(params) { body }`
    Function(FunctionLit),

    /// `(expr)`
    Paren(Box<Expr>),
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Binary operators (in precedence order, lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

// ── Control Flow ──────────────────────────────────────────────────────────────

/// `kama (cond) { ... } [sivyo { ... } | sivyo kama ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

/// The `sivyo` branch of a conditional.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// `sivyo kama (cond) { ... }`
    ElseIf(Box<IfExpr>),
    /// `sivyo { ... }`
    Block(Block),
}

/// `wakati (condition) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileExpr {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// A function literal. `name` is set for `kazi name(...)` declarations and
/// for `fanya name = unda(...)` bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub name: Option<Ident>,
    pub params: Vec<Ident>,
    pub body: Rc<Block>,
    pub span: Span,
}
