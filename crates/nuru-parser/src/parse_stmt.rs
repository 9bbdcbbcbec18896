//! Program, block and statement parsing.

use crate::parser::Parser;
use nuru_lexer::TokenKind;
use nuru_types::ast::*;
use nuru_types::ErrorCode;

impl<'src> Parser<'src> {
    /// `Program = { Statement }`
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();

        while !self.at_end() && !self.too_many_errors() {
            if self.check_exact(&TokenKind::RBrace) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unexpected '}'");
                self.advance();
                continue;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.synchronize();
            }
        }

        let span = if stmts.is_empty() {
            start
        } else {
            start.merge(self.previous_span())
        };
        Program { stmts, span }
    }

    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            } else {
                self.synchronize();
            }
        }

        self.expect_closing(&TokenKind::RBrace, start)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// Parse a single statement, including its optional trailing `;`.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        let stmt = match self.peek_kind() {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => Some(Stmt::Break(self.advance().span)),
            TokenKind::Continue => Some(Stmt::Continue(self.advance().span)),
            TokenKind::Identifier(_) if *self.look_ahead(1) == TokenKind::Eq => {
                self.parse_assign_stmt()
            }
            _ => self.parse_expr_stmt(),
        }?;
        self.eat(&TokenKind::Semicolon);
        Some(stmt)
    }

    /// `fanya name = expr`
    fn parse_let_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let mut value = self.parse_expression()?;

        // `fanya jina = unda(...) { ... }` names the function after its binding.
        if let ExprKind::Function(func) = &mut value.kind {
            if func.name.is_none() {
                func.name = Some(name.clone());
            }
        }

        let span = start.merge(value.span);
        Some(Stmt::Let(LetStmt { name, value, span }))
    }

    /// `name = expr`
    fn parse_assign_stmt(&mut self) -> Option<Stmt> {
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = name.span.merge(value.span);
        Some(Stmt::Assign(AssignStmt { name, value, span }))
    }

    /// `rudisha [expr]`
    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let value = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = value.as_ref().map_or(start, |v| start.merge(v.span));
        Some(Stmt::Return(ReturnStmt { value, span }))
    }

    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;

        if self.check_exact(&TokenKind::Eq) {
            self.error_at(
                ErrorCode::INVALID_ASSIGNMENT_TARGET,
                "invalid assignment target, only a name can be assigned",
                expr.span,
            );
            return None;
        }

        let span = expr.span;
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }
}
