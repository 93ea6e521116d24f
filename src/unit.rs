//! Compilation unit API.
//!
//! A [`Unit`] owns one Bilby source file and drives it through the whole
//! pipeline: parse, analyze, generate and optionally execute.
//!
//! # Example
//!
//! ```
//! use bilby::Unit;
//!
//! let mut unit = Unit::new();
//! unit.set_source("add.bilby", "func int add(int a, int b) { return a + b; } main { print add(2, 3); }")?;
//! unit.build()?;
//! assert_eq!(unit.run()?, "5");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use bilby_compiler::{AsmProgram, CompileOptions, Compiler};
use bilby_core::{BilbyError, CompilationError};
use bilby_parser::Parser;
use bumpalo::Bump;

use crate::vm::{Machine, MachineConfig};

/// A single-file compilation unit.
#[derive(Debug, Default)]
pub struct Unit {
    /// Name used in diagnostics.
    name: String,
    source: Option<String>,
    /// Hash of the source for change detection.
    source_hash: u64,
    options: CompileOptions,
    machine_config: MachineConfig,
    asm: Option<AsmProgram>,
    /// Diagnostics from the last build.
    errors: Vec<CompilationError>,
    dirty: bool,
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn set_machine_config(&mut self, config: MachineConfig) {
        self.machine_config = config;
    }

    fn hash_source(source: &str) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = rustc_hash::FxHasher::default();
        source.hash(&mut hasher);
        hasher.finish()
    }

    /// Set the unit's source.
    ///
    /// # Errors
    ///
    /// Returns an error if a source was already set. Use `update_source()`
    /// to change it, or `clear()` to start over.
    pub fn set_source(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), UnitError> {
        if self.source.is_some() {
            return Err(UnitError::SourceAlreadySet);
        }
        let source = source.into();
        self.name = name.into();
        self.source_hash = Self::hash_source(&source);
        self.source = Some(source);
        self.dirty = true;
        Ok(())
    }

    /// Replace the source, returning whether it actually changed.
    pub fn update_source(&mut self, source: impl Into<String>) -> Result<bool, UnitError> {
        if self.source.is_none() {
            return Err(UnitError::NoSource);
        }
        let source = source.into();
        let hash = Self::hash_source(&source);
        let changed = hash != self.source_hash;
        if changed {
            self.source_hash = hash;
            self.source = Some(source);
            self.asm = None;
            self.dirty = true;
        }
        Ok(changed)
    }

    /// Parse, analyze and generate code.
    ///
    /// # Errors
    ///
    /// Returns the parse errors, or every semantic diagnostic when analysis
    /// reported any. No code is kept in either case.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&mut self) -> Result<&AsmProgram, UnitError> {
        let _span = tracing::info_span!("build", unit = %self.name).entered();

        let source = self.source.as_deref().ok_or(UnitError::NoSource)?;
        let arena = Bump::new();

        self.asm = None;
        self.errors.clear();

        let program = Parser::parse(source, &arena).map_err(BilbyError::from)?;
        let result = Compiler::compile(&program, &self.options);
        self.dirty = false;

        match result.asm {
            Some(asm) if result.errors.is_empty() => {
                tracing::info!(instructions = asm.len(), "built unit");
                Ok(self.asm.insert(asm))
            }
            _ => {
                self.errors = result.errors.clone();
                Err(BilbyError::Compilation(result.errors).into())
            }
        }
    }

    /// Build if needed, then execute and return the printed output.
    pub fn run(&mut self) -> Result<String, UnitError> {
        if self.dirty || self.asm.is_none() {
            self.build()?;
        }
        let asm = self.asm.as_ref().ok_or(UnitError::NotBuilt)?;
        let mut machine = Machine::new(self.machine_config);
        machine.run(asm).map_err(BilbyError::from)?;
        Ok(machine.take_output())
    }

    pub fn is_built(&self) -> bool {
        self.asm.is_some() && !self.dirty
    }

    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Generated assembly (available after a successful build).
    pub fn asm(&self) -> Option<&AsmProgram> {
        self.asm.as_ref()
    }

    /// Diagnostics from the last build.
    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    /// Reset to an empty unit, keeping the options.
    pub fn clear(&mut self) {
        self.name.clear();
        self.source = None;
        self.source_hash = 0;
        self.asm = None;
        self.errors.clear();
        self.dirty = false;
    }
}

/// Errors that can occur when managing, building or running a unit.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("unit already has a source; use update_source() or clear()")]
    SourceAlreadySet,
    #[error("unit has no source")]
    NoSource,
    #[error("unit has not been built")]
    NotBuilt,
    /// The pipeline itself failed.
    #[error(transparent)]
    Failed(#[from] BilbyError),
}

impl UnitError {
    /// The pipeline error, if this is one.
    pub fn pipeline(&self) -> Option<&BilbyError> {
        match self {
            UnitError::Failed(error) => Some(error),
            _ => None,
        }
    }
}
