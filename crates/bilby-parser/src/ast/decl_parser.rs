//! Program-level parsing: function definitions, parameters and types.

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::decl::*;
use crate::ast::node::{Ident, PrimitiveType, TypeAnnotation};
use crate::ast::stmt::Block;
use crate::ast::{ParseError, ParseErrorKind, Program};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse a whole program.
    ///
    /// Grammar: `FUNCTION_DEF* 'main' BLOCK EOF`
    ///
    /// Always produces a program; a missing or malformed `main` block is
    /// replaced by an empty one and the error recorded.
    pub fn parse_program(&mut self) -> Program<'ast> {
        let start_span = self.peek().span;
        let id = self.next_id();

        let mut functions = BVec::new_in(self.arena);
        while self.check(TokenKind::Func) {
            match self.parse_function_def() {
                Ok(function) => functions.push(function),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize_item();
                }
            }
        }

        let main = match self.parse_main() {
            Ok(block) => block,
            Err(err) => {
                self.errors.push(err);
                let span = self.peek().span;
                let block_id = self.next_id();
                Block {
                    stmts: &[],
                    span,
                    id: block_id,
                }
            }
        };

        if !self.is_eof() {
            let token = *self.peek();
            self.errors.push(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                token.span,
                format!("expected end of file after main block, found {}", token.kind),
            ));
        }

        Program {
            functions: functions.into_bump_slice(),
            main,
            span: start_span.merge(self.previous_span()),
            id,
            node_count: self.node_count(),
        }
    }

    fn parse_main(&mut self) -> Result<Block<'ast>, ParseError> {
        self.expect(TokenKind::Main)?;
        self.parse_block()
    }

    /// Grammar: `'func' TYPE IDENT '(' PARAMS ')' BLOCK`
    pub fn parse_function_def(&mut self) -> Result<FunctionDef<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Func)?.span;
        let id = self.next_id();
        let return_type = self.parse_type()?;
        let name = self.parse_ident()?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;

        Ok(FunctionDef {
            return_type,
            name,
            params,
            body,
            span: start_span.merge(body.span),
            id,
        })
    }

    /// Grammar: `'(' (PARAM (',' PARAM)*)? ')'`
    fn parse_param_list(&mut self) -> Result<ParamList<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::LeftParen)?.span;
        let id = self.next_id();
        let mut params = BVec::new_in(self.arena);

        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.parse_param()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let end_span = self.expect(TokenKind::RightParen)?.span;
        Ok(ParamList {
            params: params.into_bump_slice(),
            span: start_span.merge(end_span),
            id,
        })
    }

    /// Grammar: `('int' | 'bool') IDENT`
    fn parse_param(&mut self) -> Result<Param<'ast>, ParseError> {
        let id = self.next_id();
        let ty = self.parse_type()?;
        if ty.kind == PrimitiveType::Void {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedType,
                ty.span,
                "parameters must be int or bool",
            ));
        }
        let name = self.parse_ident()?;
        Ok(Param {
            ty,
            name,
            span: ty.span.merge(name.span),
            id,
        })
    }

    pub(crate) fn parse_type(&mut self) -> Result<TypeAnnotation, ParseError> {
        let token = *self.peek();
        let kind = match token.kind {
            TokenKind::Int => PrimitiveType::Int,
            TokenKind::Bool => PrimitiveType::Bool,
            TokenKind::Void => PrimitiveType::Void,
            TokenKind::Eof => return Err(ParseError::unexpected_eof(token.span)),
            other => return Err(ParseError::expected_type(token.span, other.description())),
        };
        self.advance();
        Ok(TypeAnnotation {
            kind,
            span: token.span,
            id: self.next_id(),
        })
    }

    pub(crate) fn parse_ident(&mut self) -> Result<Ident<'ast>, ParseError> {
        let token = *self.peek();
        match token.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(Ident {
                    name: token.lexeme,
                    span: token.span,
                    id: self.next_id(),
                })
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            other => Err(ParseError::expected_identifier(token.span, other.description())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use bumpalo::Bump;

    #[test]
    fn program_with_functions() {
        let arena = Bump::new();
        let source = "func int add(int a, int b) { return a + b; }\n\
                      func void noop() { }\n\
                      main { }";
        let program = Parser::parse(source, &arena).unwrap();
        assert_eq!(program.functions.len(), 2);

        let add = program.function("add").unwrap();
        assert_eq!(add.return_type.kind, PrimitiveType::Int);
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params.params[1].name.name, "b");
        assert_eq!(add.params.params[1].ty.kind, PrimitiveType::Int);

        let noop = program.function("noop").unwrap();
        assert!(noop.params.is_empty());
        assert_eq!(noop.return_type.kind, PrimitiveType::Void);
    }

    #[test]
    fn node_ids_are_unique() {
        let arena = Bump::new();
        let program = Parser::parse("func bool f(int x) { return x > 1; } main { imm y := 2; }", &arena).unwrap();
        let f = program.functions[0];
        let ids = [
            program.id,
            f.id,
            f.return_type.id,
            f.name.id,
            f.params.id,
            f.params.params[0].id,
            f.body.id,
            program.main.id,
        ];
        let mut sorted = ids.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.iter().all(|id| id.0 < program.node_count));
    }

    #[test]
    fn void_parameter_is_rejected() {
        let arena = Bump::new();
        let errors = Parser::parse("func int f(void x) { return 1; } main { }", &arena).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().kind, ParseErrorKind::ExpectedType);
    }

    #[test]
    fn bad_function_recovers_at_next_item() {
        let arena = Bump::new();
        let source = "func 3 broken() { } func int ok() { return 1; } main { }";
        let (program, errors) = Parser::parse_lenient(source, &arena);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name.name, "ok");
    }

    #[test]
    fn missing_main() {
        let arena = Bump::new();
        let (program, errors) = Parser::parse_lenient("func void f() { }", &arena);
        assert_eq!(errors.len(), 1);
        assert!(program.main.stmts.is_empty());
    }

    #[test]
    fn trailing_tokens_after_main() {
        let arena = Bump::new();
        let errors = Parser::parse("main { } extra", &arena).unwrap_err();
        assert_eq!(errors.iter().next().unwrap().kind, ParseErrorKind::UnexpectedToken);
    }
}
