//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 6. `||`
//! 5. `&&`
//! 4. `==`, `!=`, `<`, `>`, `<=`, `>=`
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `!`
//! 0. `()` (call)

use nuru_lexer::TokenKind;
use nuru_types::ast::*;
use nuru_types::{ErrorCode, Span};
use std::rc::Rc;

use crate::parser::{Parser, MAX_NESTING};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_NESTING {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("expressions nest deeper than {MAX_NESTING} levels"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_or();
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// Build a left-associative binary node.
    fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    /// `OrExpr = AndExpr { "||" AndExpr }`
    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = Self::binary(left, BinOp::Or, right);
        }
        Some(left)
    }

    /// `AndExpr = CompExpr { "&&" CompExpr }`
    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_comparison()?;
            left = Self::binary(left, BinOp::And, right);
        }
        Some(left)
    }

    /// `CompExpr = AddExpr { CompOp AddExpr }`
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_add()?;
        while let Some(op) = self.match_comparison_op() {
            self.advance();
            let right = self.parse_add()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> Option<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    /// `UnaryExpr = ( "!" | "-" ) UnaryExpr | CallExpr`
    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_call(),
        };
        self.advance();

        self.expr_depth += 1;
        let operand = if self.expr_depth > MAX_NESTING {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("expressions nest deeper than {MAX_NESTING} levels"),
            );
            None
        } else {
            self.parse_unary()
        };
        self.expr_depth -= 1;

        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `CallExpr = PrimaryExpr { "(" ArgList ")" }`
    fn parse_call(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        while self.check_exact(&TokenKind::LParen) {
            let open = self.advance().span;
            let args = self.parse_arg_list()?;
            self.expect_closing(&TokenKind::RParen, open)?;
            let span = expr.span.merge(self.previous_span());
            expr = Expr::new(
                ExprKind::Call {
                    callee: Box::new(expr),
                    args,
                },
                span,
            );
        }
        Some(expr)
    }

    /// Parse a comma-separated argument list up to (not including) `)`.
    fn parse_arg_list(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check_exact(&TokenKind::RParen) {
            return Some(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            // Allow trailing comma before `)`
            if self.check_exact(&TokenKind::RParen) {
                break;
            }
        }
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::NumberLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::NumberLit(n), start))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Some(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(false), start))
            }
            TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::NullLit, start))
            }

            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr::new(ExprKind::Identifier(name), start))
            }

            // ── Grouping ────────────────────────────────────────────────
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_closing(&TokenKind::RParen, start)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }

            // ── Control Flow ────────────────────────────────────────────
            TokenKind::If => self.parse_if_expr().map(|ie| {
                let span = ie.span;
                Expr::new(ExprKind::If(Box::new(ie)), span)
            }),
            TokenKind::While => self.parse_while_expr().map(|we| {
                let span = we.span;
                Expr::new(ExprKind::While(Box::new(we)), span)
            }),

            // ── Functions ───────────────────────────────────────────────
            TokenKind::Function => {
                self.advance();
                self.parse_function_rest(None, start)
            }
            TokenKind::Kazi => {
                self.advance();
                let name = self.expect_identifier()?;
                self.parse_function_rest(Some(name), start)
            }

            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `kama (cond) { ... } [ sivyo ( kama ... | { ... } ) ]`
    fn parse_if_expr(&mut self) -> Option<IfExpr> {
        let start = self.advance().span;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check_exact(&TokenKind::If) {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if_expr()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Some(IfExpr {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `wakati (cond) { ... }`
    fn parse_while_expr(&mut self) -> Option<WhileExpr> {
        let start = self.advance().span;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Some(WhileExpr {
            condition,
            body,
            span,
        })
    }

    /// `"(" Expression ")"` after `kama` or `wakati`.
    fn parse_condition(&mut self) -> Option<Expr> {
        let open = self.expect(&TokenKind::LParen)?.span;
        let condition = self.parse_expression()?;
        self.expect_closing(&TokenKind::RParen, open)?;
        Some(condition)
    }

    /// Parameters and body after `unda` or `kazi NAME`.
    fn parse_function_rest(&mut self, name: Option<Ident>, start: Span) -> Option<Expr> {
        let open = self.expect(&TokenKind::LParen)?.span;
        let mut params = Vec::new();
        if !self.check_exact(&TokenKind::RParen) {
            loop {
                let param = self.expect_identifier()?;
                if params.iter().any(|p: &Ident| p.name == param.name) {
                    self.error_at(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("duplicate parameter '{}'", param.name),
                        param.span,
                    );
                }
                params.push(param);
                if !self.eat(&TokenKind::Comma) || self.check_exact(&TokenKind::RParen) {
                    break;
                }
            }
        }
        self.expect_closing(&TokenKind::RParen, open)?;

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Expr::new(
            ExprKind::Function(FunctionLit {
                name,
                params,
                body: Rc::new(body),
                span,
            }),
            span,
        ))
    }
}
