//! Diagnostics sink shared by the semantic passes.

use bilby_core::CompilationError;

/// Collects semantic diagnostics. Reporting never stops analysis.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompilationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: CompilationError) {
        tracing::warn!(
            target: "bilby::semantic",
            kind = %error.kind(),
            "{error}"
        );
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompilationError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bilby_core::{DiagnosticKind, Span};

    #[test]
    fn collects_in_order() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.report(CompilationError::UseBeforeDefine {
            name: "x".into(),
            span: Span::point(1, 1),
        });
        diagnostics.report(CompilationError::ReturnOutsideFunction {
            span: Span::point(2, 1),
        });

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.errors()[0].kind(), DiagnosticKind::UseBeforeDefine);
        assert_eq!(
            diagnostics.into_errors()[1].kind(),
            DiagnosticKind::MisplacedStatement
        );
    }
}
