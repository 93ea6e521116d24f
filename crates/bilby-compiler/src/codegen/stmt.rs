//! Statement code generation. Every statement yields a void fragment.

use bilby_parser::ast::{AssignmentStmt, Block, DeclarationStmt, IfStmt, ReturnStmt, Stmt};

use crate::asm::{Fragment, OpCode, store_opcode};

use super::CodeGenerator;

impl<'a> CodeGenerator<'a> {
    pub(super) fn generate_block(&mut self, block: &Block<'_>) -> Fragment {
        let mut code = Fragment::void();
        for stmt in block.stmts {
            code.append(self.generate_stmt(stmt));
        }
        code
    }

    fn generate_stmt(&mut self, stmt: &Stmt<'_>) -> Fragment {
        match stmt {
            Stmt::Declaration(decl) => self.generate_declaration(decl),
            Stmt::Assignment(assign) => self.generate_assignment(assign),
            Stmt::If(if_stmt) => self.generate_if(if_stmt),
            Stmt::Return(ret) => self.generate_return(ret),
            Stmt::Call(call) => {
                let mut code = Fragment::void();
                code.append(self.generate_call(call.call));
                code.add(OpCode::Pop);
                code
            }
            Stmt::Print(print) => self.generate_print(print),
            Stmt::Block(block) => self.generate_block(block),
            Stmt::Error(_) => Fragment::void(),
        }
    }

    /// `[address] [value] Store`
    fn generate_declaration(&mut self, decl: &DeclarationStmt<'_>) -> Fragment {
        let binding = self.binding_of(decl.name.id);
        let mut code = Fragment::void();
        binding.generate_address(&mut code);
        code.append(self.generate_value(decl.value));
        code.add(store_opcode(&binding.ty));
        code
    }

    fn generate_assignment(&mut self, assign: &AssignmentStmt<'_>) -> Fragment {
        let binding = self.binding_of(assign.target.id);
        let mut code = Fragment::void();
        binding.generate_address(&mut code);
        code.append(self.generate_value(assign.value));
        code.add(store_opcode(&binding.ty));
        code
    }

    /// Code layout:
    /// ```text
    /// [condition]
    /// JumpFalse -if-n-else      (-if-n-end without an else block)
    /// [then block]
    /// Jump -if-n-end
    /// Label -if-n-else          (else block only)
    /// [else block]
    /// Label -if-n-end
    /// ```
    fn generate_if(&mut self, if_stmt: &IfStmt<'_>) -> Fragment {
        let labels = self.labeller.family("if");
        let else_label = labels.label("else");
        let end_label = labels.label("end");

        let mut code = Fragment::void();
        code.append(self.generate_value(if_stmt.condition));
        match &if_stmt.else_block {
            Some(else_block) => {
                code.add_label_operand(OpCode::JumpFalse, &else_label);
                code.append(self.generate_block(&if_stmt.then_block));
                code.add_label_operand(OpCode::Jump, &end_label);
                code.label(&else_label);
                code.append(self.generate_block(else_block));
            }
            None => {
                code.add_label_operand(OpCode::JumpFalse, &end_label);
                code.append(self.generate_block(&if_stmt.then_block));
                code.add_label_operand(OpCode::Jump, &end_label);
            }
        }
        code.label(&end_label);
        code
    }

    /// The value, if any, is left on the operand stack for the epilogue.
    fn generate_return(&mut self, ret: &ReturnStmt<'_>) -> Fragment {
        let mut code = Fragment::void();
        if let Some(value) = ret.value {
            code.append(self.generate_value(value));
        }
        if let Some(epilogue) = &self.epilogue {
            code.add_label_operand(OpCode::Jump, epilogue);
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{OpCode, Operand};
    use crate::codegen::tests::generate;

    #[test]
    fn declaration_stores_by_size() {
        let program = generate("main { imm a := 1; imm b := true; }");
        assert_eq!(program.count(OpCode::StoreC), 1);
        let stores = program
            .instructions()
            .iter()
            .skip_while(|i| i.label() != Some("$$main") || i.opcode != OpCode::Label)
            .filter(|i| i.opcode == OpCode::StoreI)
            .count();
        // Two for the stack and frame pointers, one for `a`.
        assert_eq!(stores, 3);
    }

    #[test]
    fn if_without_else_has_only_end_label() {
        let program = generate("main { if (2 > 1) { print 1; } }");
        let labels: Vec<&str> = program.defined_labels().collect();
        assert!(labels.contains(&"-if-0-end"));
        assert!(!labels.iter().any(|l| l.ends_with("-else")));
    }

    #[test]
    fn if_else_layout() {
        let program = generate("main { imm b := true; if (b) { print 1; } else { print 2; } }");
        let labels: Vec<&str> = program.defined_labels().collect();
        assert!(labels.contains(&"-if-0-else"));
        assert!(labels.contains(&"-if-0-end"));
        let jump_false = program
            .instructions()
            .iter()
            .find(|i| i.opcode == OpCode::JumpFalse)
            .unwrap();
        assert_eq!(jump_false.operand, Some(Operand::Label("-if-0-else".into())));
    }

    #[test]
    fn call_statement_discards_value() {
        let program = generate("func int f() { return 1; } main { call f(); }");
        let after_call: Vec<OpCode> = program
            .instructions()
            .iter()
            .skip_while(|i| i.opcode != OpCode::CallV)
            .map(|i| i.opcode)
            .take_while(|op| *op != OpCode::Halt)
            .collect();
        assert_eq!(after_call.last(), Some(&OpCode::Pop));
    }

    #[test]
    fn prefixed_labels() {
        let options = crate::CompileOptions {
            label_prefix: "unit".into(),
            ..crate::CompileOptions::default()
        };
        let program =
            crate::codegen::tests::generate_with("main { if (1 > 0) { } }", &options);
        assert!(program.defined_labels().any(|l| l == "unit-compare-1-join"));
        assert!(program.defined_labels().any(|l| l == "unit-if-0-end"));
    }
}
