//! Static types of the Bilby language.
//!
//! The language has two value types (`int`, `bool`), the `void` result type,
//! function signatures, and [`Type::Error`], which marks a node whose type
//! could not be determined. `Error` is absorbing: operators and calls
//! involving it produce `Error` again without a second diagnostic.

use std::fmt;
use std::sync::Arc;

/// Size in bytes of an `int` value.
pub const INTEGER_SIZE: u32 = 4;
/// Size in bytes of a `bool` value.
pub const BOOLEAN_SIZE: u32 = 1;
/// Size in bytes of a code address stored in a function cell.
pub const ADDRESS_SIZE: u32 = 4;

/// A static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Boolean,
    Void,
    /// Poison type for nodes that failed to type check.
    Error,
    /// The type of a function name.
    Function(Arc<FunctionSignature>),
}

impl Type {
    /// Build a function type from a signature.
    pub fn function(params: Vec<Type>, result: Type) -> Self {
        Type::Function(Arc::new(FunctionSignature::new(params, result)))
    }

    /// Number of bytes a binding of this type occupies.
    pub fn size(&self) -> u32 {
        match self {
            Type::Integer => INTEGER_SIZE,
            Type::Boolean => BOOLEAN_SIZE,
            Type::Void | Type::Error => 0,
            Type::Function(_) => ADDRESS_SIZE,
        }
    }

    /// Whether a value of this type can be stored, printed or passed.
    pub fn is_value(&self) -> bool {
        matches!(self, Type::Integer | Type::Boolean)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// The signature of a function type, if this is one.
    pub fn signature(&self) -> Option<&FunctionSignature> {
        match self {
            Type::Function(sig) => Some(sig),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "int"),
            Type::Boolean => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "<error>"),
            Type::Function(sig) => write!(f, "{sig}"),
        }
    }
}

/// Ordered parameter types plus a result type.
///
/// Equality is structural: two signatures are equal when their parameter
/// lists and result types are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub result: Type,
}

impl FunctionSignature {
    pub fn new(params: Vec<Type>, result: Type) -> Self {
        Self { params, result }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the argument types match the parameter types pairwise.
    pub fn accepts(&self, args: &[Type]) -> bool {
        self.params.len() == args.len() && self.params.iter().zip(args).all(|(p, a)| p == a)
    }

    /// Total bytes the arguments of a call occupy on the call stack.
    pub fn argument_size(&self) -> u32 {
        self.params.iter().map(Type::size).sum()
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_shareable<T: Send + Sync>() {}

    #[test]
    fn types_can_live_in_statics() {
        assert_shareable::<Type>();
        assert_shareable::<FunctionSignature>();
        let f = Type::function(vec![Type::Integer], Type::Boolean);
        let copy = f.clone();
        std::thread::spawn(move || assert_eq!(copy.signature().map(|s| s.params.len()), Some(1)))
            .join()
            .unwrap();
        assert_eq!(f.signature().map(|s| s.result.clone()), Some(Type::Boolean));
    }

    #[test]
    fn sizes() {
        assert_eq!(Type::Integer.size(), 4);
        assert_eq!(Type::Boolean.size(), 1);
        assert_eq!(Type::Void.size(), 0);
        assert_eq!(Type::Error.size(), 0);
        assert_eq!(Type::function(vec![], Type::Void).size(), 4);
    }

    #[test]
    fn only_int_and_bool_are_values() {
        assert!(Type::Integer.is_value());
        assert!(Type::Boolean.is_value());
        assert!(!Type::Void.is_value());
        assert!(!Type::Error.is_value());
        assert!(!Type::function(vec![Type::Integer], Type::Integer).is_value());
    }

    #[test]
    fn signatures_compare_structurally() {
        let a = Type::function(vec![Type::Integer, Type::Boolean], Type::Integer);
        let b = Type::function(vec![Type::Integer, Type::Boolean], Type::Integer);
        let c = Type::function(vec![Type::Integer], Type::Integer);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn accepts_checks_arity_and_types() {
        let sig = FunctionSignature::new(vec![Type::Integer, Type::Boolean], Type::Void);
        assert!(sig.accepts(&[Type::Integer, Type::Boolean]));
        assert!(!sig.accepts(&[Type::Boolean, Type::Integer]));
        assert!(!sig.accepts(&[Type::Integer]));
        assert_eq!(sig.argument_size(), 5);
    }

    #[test]
    fn display() {
        let sig = FunctionSignature::new(vec![Type::Integer, Type::Integer], Type::Boolean);
        assert_eq!(sig.to_string(), "(int, int) -> bool");
        assert_eq!(Type::function(vec![], Type::Void).to_string(), "() -> void");
    }
}
