//! Code generator for analyzed programs.
//!
//! The [`CodeGenerator`] folds the AST post-order into [`Fragment`]s: each
//! node's fragment is built from its children's and handed to its parent
//! exactly once. It reads everything it needs (types, bindings, frame sizes)
//! from the [`Analysis`] and must only run on programs with no diagnostics.
//!
//! Program layout:
//! ```text
//! [runtime environment]
//! DLabel $global-memory-block
//! DataZ  <program scope size>
//! Label  $$main
//! [stack pointer initialization]
//! [function address stores]
//! [main block]
//! Halt
//! [function code]*
//! ```

mod call;
mod expr;
mod function;
mod print;
mod stmt;

use bilby_core::Type;
use bilby_parser::ast::{NodeId, Program};

use crate::CompileOptions;
use crate::analysis::Analysis;
use crate::asm::{AsmProgram, Fragment, OpCode};
use crate::binding::Binding;
use crate::labeller::Labeller;
use crate::runtime::{self, GLOBAL_MEMORY_BLOCK, MAIN_PROGRAM_LABEL};

pub struct CodeGenerator<'a> {
    analysis: &'a Analysis,
    options: &'a CompileOptions,
    labeller: Labeller,
    /// Epilogue label of the function being generated; `return` jumps here.
    epilogue: Option<String>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(analysis: &'a Analysis, options: &'a CompileOptions) -> Self {
        Self {
            analysis,
            options,
            labeller: Labeller::new(options.label_prefix.clone()),
            epilogue: None,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> AsmProgram {
        let _span = tracing::debug_span!("codegen").entered();

        let mut code = Fragment::void();
        if self.options.emit_prelude {
            code.append(runtime::environment());
        }

        let globals = self
            .analysis
            .scope_of(program.id)
            .map(|scope| self.analysis.scopes.allocated_size(scope))
            .unwrap_or(0);
        code.add_label_operand(OpCode::DLabel, GLOBAL_MEMORY_BLOCK);
        code.add_int(OpCode::DataZ, globals as i32);

        code.label(MAIN_PROGRAM_LABEL);
        if self.options.emit_prelude {
            code.append(runtime::stack_initialization());
        }
        for function in program.functions {
            code.append(self.function_address_store(function));
        }
        code.append(self.generate_block(&program.main));
        code.add(OpCode::Halt);

        for function in program.functions {
            code.append(self.generate_function(function));
        }

        if !self.options.comments {
            code.strip_comments();
        }

        let program = AsmProgram::from(code);
        tracing::debug!(
            instructions = program.len(),
            labels = self.labeller.families(),
            global_bytes = globals,
            "generated program"
        );
        program
    }

    fn type_of(&self, node: NodeId) -> Type {
        self.analysis.type_of(node).cloned().unwrap_or(Type::Error)
    }

    fn binding_of(&self, node: NodeId) -> Binding {
        self.analysis
            .binding_of(node)
            .cloned()
            .unwrap_or_else(Binding::null)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::passes::{CheckPass, DeclarationPass};
    use bilby_parser::Parser;
    use bumpalo::Bump;

    pub(crate) fn generate_with(source: &str, options: &CompileOptions) -> AsmProgram {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        let mut analysis = Analysis::new();
        let mut diagnostics = Diagnostics::new();
        let scope = DeclarationPass::new(&mut analysis, &mut diagnostics).run(&program);
        CheckPass::new(&mut analysis, &mut diagnostics, scope).run(&program);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.errors());
        CodeGenerator::new(&analysis, options).generate(&program)
    }

    pub(crate) fn generate(source: &str) -> AsmProgram {
        generate_with(source, &CompileOptions::default())
    }

    /// Opcodes of the instructions between `start` (exclusive) and the
    /// next `Label` directive.
    pub(crate) fn opcodes_after_label(program: &AsmProgram, start: &str) -> Vec<OpCode> {
        program
            .instructions()
            .iter()
            .skip_while(|i| !(i.opcode == OpCode::Label && i.label() == Some(start)))
            .skip(1)
            .take_while(|i| i.opcode != OpCode::Label)
            .map(|i| i.opcode)
            .collect()
    }

    #[test]
    fn layout_without_functions() {
        let program = generate("main { }");
        let ops: Vec<OpCode> = program.instructions().iter().map(|i| i.opcode).collect();

        assert_eq!(ops[0], OpCode::Jump);
        let main = program
            .instructions()
            .iter()
            .position(|i| i.label() == Some(MAIN_PROGRAM_LABEL) && i.opcode == OpCode::Label)
            .unwrap();
        assert_eq!(program.instructions()[main - 1].opcode, OpCode::DataZ);
        assert_eq!(program.instructions()[main - 1].int(), Some(0));
        assert_eq!(ops.last(), Some(&OpCode::Halt));
    }

    #[test]
    fn global_block_sized_by_program_scope() {
        let program = generate(
            "func int f() { return 1; } main { imm a := 1; imm b := true; { imm c := 2; } }",
        );
        let data = program
            .instructions()
            .iter()
            .skip_while(|i| i.label() != Some(GLOBAL_MEMORY_BLOCK))
            .nth(1)
            .unwrap();
        assert_eq!(data.opcode, OpCode::DataZ);
        assert_eq!(data.int(), Some(13));
    }

    #[test]
    fn without_prelude() {
        let options = CompileOptions {
            emit_prelude: false,
            ..CompileOptions::default()
        };
        let program = generate_with("main { }", &options);
        assert_eq!(program.instructions()[0].opcode, OpCode::DLabel);
        assert_eq!(program.count(OpCode::Memtop), 0);
    }

    #[test]
    fn comments_can_be_disabled() {
        let source = "main { imm x := 1; print x; }";
        assert!(
            generate(source)
                .instructions()
                .iter()
                .any(|i| i.comment.is_some())
        );

        let options = CompileOptions {
            comments: false,
            ..CompileOptions::default()
        };
        assert!(
            generate_with(source, &options)
                .instructions()
                .iter()
                .all(|i| i.comment.is_none())
        );
    }

    #[test]
    fn labels_are_unique() {
        let program = generate(
            "func bool gt(int a, int b) { return a > b; } \
             main { mut a := 2; imm b := 1; \
             if (a > b) { print true; } else { print false; } \
             if (gt(a, b)) { a := 3; } print a > b; }",
        );
        let labels: Vec<&str> = program.defined_labels().collect();
        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(labels.len(), unique.len());
    }
}
