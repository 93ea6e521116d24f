//! Lexical scopes and memory allocation.
//!
//! Scopes form a tree stored in a [`ScopeTree`] arena and addressed by
//! [`ScopeId`]. Each scope owns a name table and allocates storage for its
//! bindings from a [`MemoryAllocator`]:
//!
//! | kind      | parent         | allocator                                 |
//! |-----------|----------------|-------------------------------------------|
//! | program   | none           | own, upward from `$global-memory-block`+0 |
//! | parameter | program scope  | own, upward from frame pointer +0         |
//! | procedure | parameter scope| own, downward from frame pointer -8       |
//! | subscope  | any            | shares its parent's allocator             |
//!
//! A subscope bookmarks the shared allocator when it is entered and rewinds
//! it when left, so sibling blocks reuse the same storage while the owner's
//! allocated size tracks the high-water mark.

use bilby_core::{CompilationError, Span, Type};
use rustc_hash::FxHashMap;

use crate::binding::{Binding, MemoryBase, MemoryLocation};

/// Bytes between the frame pointer and the first local: the saved frame
/// pointer and the return address.
pub const FRAME_LINKAGE_SIZE: i32 = 8;

// ============================================================================
// Memory allocation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Offsets grow from the start; a binding sits at the offset before advancing.
    Positive,
    /// Offsets shrink from the start; a binding sits at the offset after retreating.
    Negative,
}

/// Hands out offsets relative to a fixed base.
#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    base: MemoryBase,
    direction: Direction,
    start: i32,
    current: i32,
    /// Largest number of bytes simultaneously allocated.
    max_size: u32,
    bookmarks: Vec<i32>,
}

impl MemoryAllocator {
    fn positive(base: MemoryBase, start: i32) -> Self {
        Self::new(base, Direction::Positive, start)
    }

    fn negative(base: MemoryBase, start: i32) -> Self {
        Self::new(base, Direction::Negative, start)
    }

    fn new(base: MemoryBase, direction: Direction, start: i32) -> Self {
        Self {
            base,
            direction,
            start,
            current: start,
            max_size: 0,
            bookmarks: Vec::new(),
        }
    }

    pub fn allocate(&mut self, size: u32) -> MemoryLocation {
        let size = size as i32;
        let offset = match self.direction {
            Direction::Positive => {
                let offset = self.current;
                self.current += size;
                offset
            }
            Direction::Negative => {
                self.current -= size;
                self.current
            }
        };
        self.max_size = self.max_size.max(self.current.abs_diff(self.start));
        MemoryLocation::new(self.base, offset)
    }

    pub fn save_state(&mut self) {
        self.bookmarks.push(self.current);
    }

    pub fn restore_state(&mut self) {
        if let Some(offset) = self.bookmarks.pop() {
            self.current = offset;
        }
    }

    /// High-water mark of bytes allocated.
    pub fn max_allocated_size(&self) -> u32 {
        self.max_size
    }
}

// ============================================================================
// Scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Program,
    Parameter,
    Procedure,
    Subscope,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Enclosing scope, used only for lookup.
    pub parent: Option<ScopeId>,
    bindings: FxHashMap<String, Binding>,
    allocator: usize,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Arena of every scope created while analyzing one program.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    allocators: Vec<MemoryAllocator>,
    entered: usize,
    left: usize,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_program_scope(&mut self) -> ScopeId {
        let allocator = self.push_allocator(MemoryAllocator::positive(MemoryBase::GlobalBlock, 0));
        self.push_scope(ScopeKind::Program, None, allocator)
    }

    pub fn create_parameter_scope(&mut self, program: ScopeId) -> ScopeId {
        let allocator = self.push_allocator(MemoryAllocator::positive(MemoryBase::FramePointer, 0));
        self.push_scope(ScopeKind::Parameter, Some(program), allocator)
    }

    pub fn create_procedure_scope(&mut self, parameters: ScopeId) -> ScopeId {
        let allocator = self.push_allocator(MemoryAllocator::negative(
            MemoryBase::FramePointer,
            -FRAME_LINKAGE_SIZE,
        ));
        self.push_scope(ScopeKind::Procedure, Some(parameters), allocator)
    }

    /// Nested block scope sharing the parent's storage.
    pub fn create_subscope(&mut self, parent: ScopeId) -> ScopeId {
        let allocator = self.scopes[parent.index()].allocator;
        self.allocators[allocator].save_state();
        self.push_scope(ScopeKind::Subscope, Some(parent), allocator)
    }

    /// Close a scope. Leaving a subscope releases its storage for reuse.
    pub fn leave(&mut self, id: ScopeId) {
        let scope = &self.scopes[id.index()];
        if scope.kind == ScopeKind::Subscope {
            self.allocators[scope.allocator].restore_state();
        }
        self.left += 1;
    }

    /// Bind `name` in `scope`, allocating storage for `ty`.
    ///
    /// A name already bound in this exact scope is a redefinition: the
    /// existing binding is kept and nothing is allocated.
    pub fn create_binding(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        mutable: bool,
        span: Span,
    ) -> Result<Binding, CompilationError> {
        let entry = &self.scopes[scope.index()];
        if entry.bindings.contains_key(name) {
            return Err(CompilationError::Redefinition {
                name: name.to_string(),
                span,
            });
        }

        let location = self.allocators[entry.allocator].allocate(ty.size());
        let binding = Binding::new(ty, location, name, mutable);
        self.scopes[scope.index()]
            .bindings
            .insert(name.to_string(), binding.clone());
        Ok(binding)
    }

    /// Find the nearest binding of `name`, walking outward from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(binding) = scope.get(name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Bytes of storage the scope's allocator has handed out at its peak.
    /// For a subscope this is the figure of the allocator it shares.
    pub fn allocated_size(&self, id: ScopeId) -> u32 {
        self.allocators[self.scopes[id.index()].allocator].max_allocated_size()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of scopes entered so far.
    pub fn entered(&self) -> usize {
        self.entered
    }

    /// Number of scopes left so far.
    pub fn left(&self) -> usize {
        self.left
    }

    fn push_allocator(&mut self, allocator: MemoryAllocator) -> usize {
        self.allocators.push(allocator);
        self.allocators.len() - 1
    }

    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, allocator: usize) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            bindings: FxHashMap::default(),
            allocator,
        });
        self.entered += 1;
        id
    }
}
