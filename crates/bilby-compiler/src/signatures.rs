//! Operator signature tables.
//!
//! Operators are looked up by operator and arity; the first signature that
//! accepts the operand types wins.

use std::sync::LazyLock;

use bilby_core::{FunctionSignature, Type};
use bilby_parser::ast::{BinaryOp, UnaryOp};
use rustc_hash::FxHashMap;

static BINARY: LazyLock<FxHashMap<BinaryOp, Vec<FunctionSignature>>> = LazyLock::new(|| {
    let int_int = |result: Type| FunctionSignature::new(vec![Type::Integer, Type::Integer], result);
    let mut table = FxHashMap::default();
    table.insert(BinaryOp::Add, vec![int_int(Type::Integer)]);
    table.insert(BinaryOp::Sub, vec![int_int(Type::Integer)]);
    table.insert(BinaryOp::Mul, vec![int_int(Type::Integer)]);
    table.insert(BinaryOp::Greater, vec![int_int(Type::Boolean)]);
    table
});

static UNARY: LazyLock<FxHashMap<UnaryOp, Vec<FunctionSignature>>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    table.insert(
        UnaryOp::Neg,
        vec![FunctionSignature::new(vec![Type::Integer], Type::Integer)],
    );
    table
});

pub fn binary_signatures(op: BinaryOp) -> &'static [FunctionSignature] {
    BINARY.get(&op).map(Vec::as_slice).unwrap_or(&[])
}

pub fn unary_signatures(op: UnaryOp) -> &'static [FunctionSignature] {
    UNARY.get(&op).map(Vec::as_slice).unwrap_or(&[])
}

/// Result type of `left op right`, or `None` when no signature accepts them.
pub fn resolve_binary(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    let args = [left.clone(), right.clone()];
    binary_signatures(op)
        .iter()
        .find(|sig| sig.accepts(&args))
        .map(|sig| sig.result.clone())
}

pub fn resolve_unary(op: UnaryOp, operand: &Type) -> Option<Type> {
    let args = [operand.clone()];
    unary_signatures(op)
        .iter()
        .find(|sig| sig.accepts(&args))
        .map(|sig| sig.result.clone())
}
