//! Bindings: what a name refers to and where it lives in memory.

use bilby_core::Type;

use crate::asm::{Fragment, OpCode};
use crate::runtime::{FRAME_POINTER, GLOBAL_MEMORY_BLOCK};

/// The base a [`MemoryLocation`] offset is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryBase {
    /// The `$global-memory-block` data label.
    GlobalBlock,
    /// The value held in `$frame-pointer`.
    FramePointer,
    /// Location of the null binding; never addressed by generated code.
    Null,
}

/// Where a binding's storage lives: a base plus a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryLocation {
    pub base: MemoryBase,
    pub offset: i32,
}

impl MemoryLocation {
    pub fn new(base: MemoryBase, offset: i32) -> Self {
        Self { base, offset }
    }

    pub fn null() -> Self {
        Self {
            base: MemoryBase::Null,
            offset: 0,
        }
    }

    /// Append code pushing the absolute address of this location.
    pub fn generate_address(&self, code: &mut Fragment, comment: &str) {
        match self.base {
            MemoryBase::GlobalBlock => {
                code.add_label_operand(OpCode::PushD, GLOBAL_MEMORY_BLOCK);
                code.comment(comment);
                code.add_int(OpCode::PushI, self.offset);
                code.add(OpCode::Add);
            }
            MemoryBase::FramePointer => {
                code.add_label_operand(OpCode::PushD, FRAME_POINTER);
                code.comment(comment);
                code.add(OpCode::LoadI);
                code.add_int(OpCode::PushI, self.offset);
                code.add(OpCode::Add);
            }
            MemoryBase::Null => {
                code.add_int(OpCode::PushI, 0);
                code.comment(comment);
            }
        }
    }
}

/// What a resolved name refers to.
///
/// Bindings are immutable once created; a scope never replaces one.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub ty: Type,
    pub location: MemoryLocation,
    pub lexeme: String,
    /// Declared with `mut`. Parameters and function names are immutable.
    pub mutable: bool,
}

impl Binding {
    pub fn new(ty: Type, location: MemoryLocation, lexeme: impl Into<String>, mutable: bool) -> Self {
        Self {
            ty,
            location,
            lexeme: lexeme.into(),
            mutable,
        }
    }

    /// The binding given to names that fail to resolve or to declare.
    pub fn null() -> Self {
        Self {
            ty: Type::Error,
            location: MemoryLocation::null(),
            lexeme: "the-null-binding".to_string(),
            mutable: false,
        }
    }

    pub fn is_null(&self) -> bool {
        self.location.base == MemoryBase::Null
    }

    /// Append code pushing the address of this binding's storage.
    pub fn generate_address(&self, code: &mut Fragment) {
        self.location.generate_address(code, &format!("%% {}", self.lexeme));
    }
}
