//! Expression parsing by precedence climbing.

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::expr::*;
use crate::ast::node::Ident;
use crate::ast::{BinaryOp, ParseError, ParseErrorKind, UnaryOp};
use crate::lexer::{Token, TokenKind};

impl<'ast> Parser<'ast> {
    /// Parse an expression whose operators all bind at least as tightly as
    /// `min_bp`. Call with `0` for a full expression.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<&'ast Expr<'ast>, ParseError> {
        let mut lhs = self.parse_prefix()?;

        while let Some(op) = BinaryOp::from_token(self.peek().kind) {
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            let span = lhs.span().merge(rhs.span());
            let id = self.next_id();
            lhs = self.arena.alloc(Expr::Binary(self.arena.alloc(BinaryExpr {
                left: lhs,
                op,
                right: rhs,
                span,
                id,
            })));
        }

        Ok(lhs)
    }

    /// Whether `kind` can begin an expression.
    pub(crate) fn starts_expression(kind: TokenKind) -> bool {
        kind.is_literal()
            || matches!(
                kind,
                TokenKind::Identifier | TokenKind::Minus | TokenKind::LeftParen
            )
    }

    fn parse_prefix(&mut self) -> Result<&'ast Expr<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral
            | TokenKind::True
            | TokenKind::False => {
                self.advance();
                let kind = Self::literal_value(token)?;
                let id = self.next_id();
                Ok(self.arena.alloc(Expr::Literal(LiteralExpr {
                    kind,
                    span: token.span,
                    id,
                })))
            }

            TokenKind::Identifier => {
                let ident = self.parse_ident()?;
                if self.check(TokenKind::LeftParen) {
                    let call = self.parse_call(ident)?;
                    Ok(self.arena.alloc(Expr::Call(call)))
                } else {
                    Ok(self.arena.alloc(Expr::Ident(ident)))
                }
            }

            TokenKind::Minus => {
                self.advance();
                let op = UnaryOp::Neg;
                let operand = self.parse_expr(UnaryOp::binding_power())?;
                let span = token.span.merge(operand.span());
                let id = self.next_id();
                Ok(self
                    .arena
                    .alloc(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span, id }))))
            }

            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(inner)
            }

            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            other => Err(ParseError::expected_expression(token.span, other.description())),
        }
    }

    /// Grammar: `IDENT '(' (EXPR (',' EXPR)*)? ')'`, with the identifier
    /// already consumed.
    pub(crate) fn parse_call(&mut self, callee: Ident<'ast>) -> Result<&'ast CallExpr<'ast>, ParseError> {
        let open = self.expect(TokenKind::LeftParen)?.span;
        let list_id = self.next_id();
        let mut args = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let close = self.expect(TokenKind::RightParen)?.span;
        let args = ExprList {
            exprs: args.into_bump_slice(),
            span: open.merge(close),
            id: list_id,
        };
        let id = self.next_id();
        Ok(self.arena.alloc(CallExpr {
            callee,
            args,
            span: callee.span.merge(close),
            id,
        }))
    }

    /// Decode the value of a literal token.
    fn literal_value(token: Token<'ast>) -> Result<LiteralKind<'ast>, ParseError> {
        let invalid = |detail: &str| {
            ParseError::new(
                ParseErrorKind::InvalidToken,
                token.span,
                format!("invalid {}: {detail}", token.kind.description()),
            )
        };

        Ok(match token.kind {
            TokenKind::True => LiteralKind::Bool(true),
            TokenKind::False => LiteralKind::Bool(false),
            TokenKind::IntLiteral => {
                LiteralKind::Int(token.lexeme.parse().map_err(|_| invalid("out of range"))?)
            }
            TokenKind::FloatLiteral => {
                LiteralKind::Float(token.lexeme.parse().map_err(|_| invalid("malformed"))?)
            }
            TokenKind::StringLiteral => {
                let inner = token
                    .lexeme
                    .strip_prefix('"')
                    .and_then(|s| s.strip_suffix('"'))
                    .ok_or_else(|| invalid("missing quotes"))?;
                LiteralKind::String(inner)
            }
            TokenKind::CharLiteral => {
                let body = token.lexeme.strip_prefix('#').unwrap_or(token.lexeme);
                let ch = match body.strip_prefix('#') {
                    Some(escaped) => escaped.chars().next(),
                    None if body.starts_with(|c: char| c.is_digit(8)) => u32::from_str_radix(body, 8)
                        .ok()
                        .and_then(char::from_u32),
                    None => body.chars().next(),
                };
                LiteralKind::Char(ch.ok_or_else(|| invalid("no character"))?)
            }
            _ => return Err(invalid("not a literal")),
        })
    }
}
