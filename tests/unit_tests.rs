//! End-to-end tests driving complete Bilby programs through `Unit`.
//!
//! Each script under `test_scripts/` is compiled, and the ones that should
//! build are executed in the emulator and checked against their output.

use bilby::vm::MachineConfig;
use bilby::{
    BilbyError, CompileOptions, DiagnosticKind, OpCode, RuntimeError, Unit, UnitError,
};
use std::collections::HashSet;
use std::path::PathBuf;

/// Load a test script from the test_scripts directory.
fn load_script(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn unit_for(filename: &str) -> Unit {
    let mut unit = Unit::new();
    unit.set_source(filename, load_script(filename))
        .expect("Failed to add source");
    unit
}

/// Build and execute a script, returning what it printed.
fn run_script(filename: &str) -> String {
    let mut unit = unit_for(filename);
    unit.build().expect("Failed to build script");
    unit.run().expect("Failed to run script")
}

/// Diagnostic kinds a script produces, in report order.
fn diagnostic_kinds(filename: &str) -> Vec<DiagnosticKind> {
    let mut unit = unit_for(filename);
    let error = unit.build().expect_err("script should not build");
    assert!(error.pipeline().is_some_and(BilbyError::is_compilation));
    assert!(unit.asm().is_none());
    unit.errors().iter().map(|e| e.kind()).collect()
}

// =============================================================================
// Programs That Run
// =============================================================================

#[test]
fn test_add() {
    assert_eq!(run_script("add.bilby"), "5");
}

#[test]
fn test_shadowing() {
    assert_eq!(run_script("shadowing.bilby"), "3 true 1\n");
}

#[test]
fn test_factorial() {
    assert_eq!(run_script("factorial.bilby"), "1 120 3628800\n");
}

#[test]
fn test_control_flow() {
    assert_eq!(run_script("control_flow.bilby"), "12 9 9\n1\n");
}

#[test]
fn test_booleans() {
    assert_eq!(run_script("booleans.bilby"), "true false false true\n");
}

#[test]
fn test_functions() {
    assert_eq!(run_script("functions.bilby"), "20 true\n-5 false\n");
}

#[test]
fn test_deep_nesting() {
    assert_eq!(run_script("deep_nesting.bilby"), "3 3 3 9\n");
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_assign_mismatch() {
    assert_eq!(
        diagnostic_kinds("assign_mismatch.bilby"),
        [DiagnosticKind::TypeMismatch]
    );
}

#[test]
fn test_diagnostics_are_collected() {
    assert_eq!(
        diagnostic_kinds("diagnostics.bilby"),
        [
            DiagnosticKind::ImmutabilityViolation,
            DiagnosticKind::Redefinition,
            DiagnosticKind::UseBeforeDefine,
            DiagnosticKind::TypeMismatch,
        ]
    );
}

#[test]
fn test_parse_errors_stop_the_pipeline() {
    let mut unit = Unit::new();
    unit.set_source("broken.bilby", "main { imm := 3; }").unwrap();
    let error = unit.build().unwrap_err();
    assert!(error.pipeline().is_some_and(BilbyError::is_parse));
    assert!(unit.errors().is_empty());
}

#[test]
fn test_runaway_recursion_hits_step_limit() {
    let mut unit = Unit::new();
    unit.set_source(
        "loop.bilby",
        "func int spin(int n) { return spin(n); } main { print spin(1); }",
    )
    .unwrap();
    unit.set_machine_config(MachineConfig {
        step_limit: 10_000,
        ..MachineConfig::default()
    });

    let error = unit.run().unwrap_err();
    assert!(matches!(
        error,
        UnitError::Failed(BilbyError::Runtime(RuntimeError::StepLimitExceeded {
            limit: 10_000
        }))
    ));
}

// =============================================================================
// Generated Code
// =============================================================================

#[test]
fn test_comparison_labels_are_unique() {
    for count in [1, 4, 9] {
        let body: String = (0..count)
            .map(|i| format!("if ({i} > 2) {{ print {i}; }} "))
            .collect();
        let source = format!("main {{ {body} }}");
        let asm = bilby::compile(&source, &CompileOptions::default()).unwrap();

        let compare_labels = asm
            .defined_labels()
            .filter(|label| label.contains("-compare-"))
            .count();
        assert_eq!(compare_labels, 6 * count);

        let mut seen = HashSet::new();
        for label in asm.defined_labels() {
            assert!(seen.insert(label), "label {label} defined twice");
        }
    }
}

#[test]
fn test_label_prefix() {
    let options = CompileOptions {
        label_prefix: "unit".to_string(),
        ..CompileOptions::default()
    };
    let asm = bilby::compile(&load_script("control_flow.bilby"), &options).unwrap();
    assert!(
        asm.defined_labels()
            .filter(|label| label.contains("-if-"))
            .all(|label| label.starts_with("unit-"))
    );
}

#[test]
fn test_without_prelude() {
    let options = CompileOptions {
        emit_prelude: false,
        ..CompileOptions::default()
    };
    let asm = bilby::compile(&load_script("add.bilby"), &options).unwrap();
    assert_eq!(asm.count(OpCode::Memtop), 0);
    assert_eq!(asm.count(OpCode::DataS), 0);
    assert_eq!(asm.count(OpCode::Halt), 1);
    assert!(asm.defined_labels().any(|label| label == "$$main"));
}

#[test]
fn test_comments_can_be_dropped() {
    let source = load_script("factorial.bilby");
    let with = bilby::compile(&source, &CompileOptions::default()).unwrap();
    let without = bilby::compile(
        &source,
        &CompileOptions {
            comments: false,
            ..CompileOptions::default()
        },
    )
    .unwrap();

    assert!(with.to_string().contains("%%"));
    assert!(!without.to_string().contains("%%"));
    assert_eq!(with.len(), without.len());
}
