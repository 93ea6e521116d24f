//! Statement and block parsing.

use bumpalo::collections::Vec as BVec;

use super::parser::Parser;
use crate::ast::stmt::*;
use crate::ast::{ParseError, ParseErrorKind};
use crate::lexer::TokenKind;

impl<'ast> Parser<'ast> {
    /// Parse one statement, dispatching on its first token.
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let token = *self.peek();

        match token.kind {
            TokenKind::Imm | TokenKind::Mut => self.parse_declaration(),
            TokenKind::Identifier => self.parse_assignment(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Call => self.parse_call_stmt(),
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            other => Err(ParseError::new(
                ParseErrorKind::ExpectedStatement,
                token.span,
                format!("expected statement, found {other}"),
            )),
        }
    }

    /// Grammar: `'{' STATEMENT* '}'`
    ///
    /// A statement that fails to parse is recorded, replaced by an error
    /// node, and parsing resumes after the next `;` or at the next `}`.
    pub fn parse_block(&mut self) -> Result<Block<'ast>, ParseError> {
        let start_span = match self.expect(TokenKind::LeftBrace) {
            Ok(token) => token.span,
            Err(err) => {
                return Err(ParseError::new(ParseErrorKind::ExpectedBlock, err.span, err.message));
            }
        };
        let id = self.next_id();
        let mut stmts = BVec::new_in(self.arena);

        while !self.check(TokenKind::RightBrace) && !self.is_eof() {
            let stmt_start = self.peek().span;
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                    let span = stmt_start.merge(self.previous_span());
                    stmts.push(Stmt::Error(self.error_node(span)));
                }
            }
        }

        let end_span = self.expect(TokenKind::RightBrace)?.span;

        Ok(Block {
            stmts: stmts.into_bump_slice(),
            span: start_span.merge(end_span),
            id,
        })
    }

    /// Grammar: `('imm' | 'mut') IDENT ':=' EXPR ';'`
    fn parse_declaration(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let keyword = self.advance();
        let mutable = keyword.kind == TokenKind::Mut;
        let id = self.next_id();
        let name = self.parse_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr(0)?;
        let end_span = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::Declaration(self.arena.alloc(DeclarationStmt {
            mutable,
            name,
            value,
            span: keyword.span.merge(end_span),
            id,
        })))
    }

    /// Grammar: `IDENT ':=' EXPR ';'`
    fn parse_assignment(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let id = self.next_id();
        let target = self.parse_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr(0)?;
        let end_span = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::Assignment(self.arena.alloc(AssignmentStmt {
            target,
            value,
            span: target.span.merge(end_span),
            id,
        })))
    }

    /// Grammar: `'print' SEP* (EXPR SEP+)* EXPR? ';'` where
    /// `SEP` is `,`, `\s` or `\n`.
    fn parse_print(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Print)?.span;
        let id = self.next_id();
        let mut items = BVec::new_in(self.arena);

        self.parse_print_separators(&mut items);
        while Self::starts_expression(self.peek().kind) {
            items.push(PrintItem::Expr(self.parse_expr(0)?));
            if self.check(TokenKind::Semicolon) {
                break;
            }
            if !self.parse_print_separators(&mut items) {
                let found = *self.peek();
                return Err(ParseError::expected_token(
                    found.span,
                    "',', '\\s', '\\n' or ';'",
                    found.kind.description(),
                ));
            }
        }

        let end_span = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt::Print(PrintStmt {
            items: items.into_bump_slice(),
            span: start_span.merge(end_span),
            id,
        }))
    }

    /// Consume a run of print separators, returning whether there was one.
    fn parse_print_separators(&mut self, items: &mut BVec<'ast, PrintItem<'ast>>) -> bool {
        let mut any = false;
        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::PrintSpace => items.push(PrintItem::Space(token.span)),
                TokenKind::PrintNewline => items.push(PrintItem::Newline(token.span)),
                _ => return any,
            }
            self.advance();
            any = true;
        }
    }

    /// Grammar: `'call' IDENT '(' ARGS ')' ';'`
    fn parse_call_stmt(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Call)?.span;
        let id = self.next_id();
        let callee = self.parse_ident()?;
        let call = self.parse_call(callee)?;
        let end_span = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::Call(CallStmt {
            call,
            span: start_span.merge(end_span),
            id,
        }))
    }

    /// Grammar: `'if' '(' EXPR ')' BLOCK ('else' BLOCK)?`
    fn parse_if(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::If)?.span;
        let id = self.next_id();
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expr(0)?;
        self.expect(TokenKind::RightParen)?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end_span = else_block.map_or(then_block.span, |block| block.span);
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_block,
            else_block,
            span: start_span.merge(end_span),
            id,
        })))
    }

    /// Grammar: `'return' EXPR? ';'`
    fn parse_return(&mut self) -> Result<Stmt<'ast>, ParseError> {
        let start_span = self.expect(TokenKind::Return)?.span;
        let id = self.next_id();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        let end_span = self.expect(TokenKind::Semicolon)?.span;

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start_span.merge(end_span),
            id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use bumpalo::Bump;

    fn statement<'a>(source: &str, arena: &'a Bump) -> Stmt<'a> {
        let mut parser = Parser::new(source, arena);
        let stmt = parser.parse_statement().unwrap();
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        stmt
    }

    #[test]
    fn declarations() {
        let arena = Bump::new();
        let Stmt::Declaration(decl) = statement("imm x := 4;", &arena) else {
            panic!("expected declaration");
        };
        assert!(!decl.mutable);
        assert_eq!(decl.name.name, "x");

        let Stmt::Declaration(decl) = statement("mut y := true;", &arena) else {
            panic!("expected declaration");
        };
        assert!(decl.mutable);
    }

    #[test]
    fn assignment() {
        let arena = Bump::new();
        let Stmt::Assignment(assign) = statement("total := total + 1;", &arena) else {
            panic!("expected assignment");
        };
        assert_eq!(assign.target.name, "total");
        assert!(matches!(assign.value, Expr::Binary(_)));
    }

    #[test]
    fn print_items() {
        let arena = Bump::new();
        let Stmt::Print(print) = statement(r"print \n a, b \s c \n;", &arena) else {
            panic!("expected print");
        };
        let shape: Vec<&str> = print
            .items
            .iter()
            .map(|item| match item {
                PrintItem::Expr(_) => "expr",
                PrintItem::Space(_) => "space",
                PrintItem::Newline(_) => "newline",
            })
            .collect();
        assert_eq!(shape, ["newline", "expr", "expr", "space", "expr", "newline"]);
    }

    #[test]
    fn empty_print() {
        let arena = Bump::new();
        let Stmt::Print(print) = statement("print;", &arena) else {
            panic!("expected print");
        };
        assert!(print.items.is_empty());
    }

    #[test]
    fn print_requires_separators() {
        let arena = Bump::new();
        let mut parser = Parser::new("print a b;", &arena);
        let err = parser.parse_statement().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ExpectedToken);
    }

    #[test]
    fn call_statement() {
        let arena = Bump::new();
        let Stmt::Call(call) = statement("call report(1, false);", &arena) else {
            panic!("expected call");
        };
        assert_eq!(call.call.callee.name, "report");
        assert_eq!(call.call.args.exprs.len(), 2);
    }

    #[test]
    fn if_with_and_without_else() {
        let arena = Bump::new();
        let Stmt::If(stmt) = statement("if (a > b) { print a; }", &arena) else {
            panic!("expected if");
        };
        assert!(stmt.else_block.is_none());
        assert_eq!(stmt.then_block.stmts.len(), 1);

        let Stmt::If(stmt) = statement("if (a > b) { } else { print b; print a; }", &arena) else {
            panic!("expected if");
        };
        assert_eq!(stmt.else_block.map(|b| b.stmts.len()), Some(2));
    }

    #[test]
    fn returns() {
        let arena = Bump::new();
        assert!(matches!(statement("return;", &arena), Stmt::Return(ReturnStmt { value: None, .. })));
        assert!(matches!(statement("return x * 2;", &arena), Stmt::Return(ReturnStmt { value: Some(_), .. })));
    }

    #[test]
    fn nested_blocks() {
        let arena = Bump::new();
        let Stmt::Block(outer) = statement("{ { { imm x := 1; } } }", &arena) else {
            panic!("expected block");
        };
        let Stmt::Block(middle) = outer.stmts[0] else {
            panic!("expected block");
        };
        let Stmt::Block(inner) = middle.stmts[0] else {
            panic!("expected block");
        };
        assert!(matches!(inner.stmts[0], Stmt::Declaration(_)));
    }

    #[test]
    fn recovery_inserts_error_nodes() {
        let arena = Bump::new();
        let source = "main {\n  imm x := ;\n  print 1;\n  x 5;\n  print 2;\n}";
        let (program, errors) = Parser::parse_lenient(source, &arena);
        assert_eq!(errors.len(), 2);
        let stmts = program.main.stmts;
        assert_eq!(stmts.len(), 4);
        assert!(matches!(stmts[0], Stmt::Error(_)));
        assert!(matches!(stmts[1], Stmt::Print(_)));
        assert!(matches!(stmts[2], Stmt::Error(_)));
        assert!(matches!(stmts[3], Stmt::Print(_)));
        assert_eq!(errors.iter().next().unwrap().span.line, 2);
    }

    #[test]
    fn recovery_at_closing_brace() {
        let arena = Bump::new();
        let (program, errors) = Parser::parse_lenient("main { imm y := 1 }", &arena);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.main.stmts.len(), 1);
        assert!(matches!(program.main.stmts[0], Stmt::Error(_)));
    }
}
