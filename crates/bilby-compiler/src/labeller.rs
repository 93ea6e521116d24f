//! Unique label generation.
//!
//! A [`Labeller`] is owned by one code generator, so label numbering restarts
//! for every compilation and never leaks between them.

/// Hands out numbered label families.
#[derive(Debug, Default)]
pub struct Labeller {
    prefix: String,
    counter: u32,
}

impl Labeller {
    /// `prefix` is prepended to every generated label; it may be empty.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Start a new family for one construct, e.g. one comparison.
    pub fn family(&mut self, name: &str) -> LabelFamily {
        let number = self.counter;
        self.counter += 1;
        let base = if self.prefix.is_empty() {
            format!("-{name}-{number}-")
        } else {
            format!("{}-{name}-{number}-", self.prefix)
        };
        LabelFamily { base }
    }

    /// Number of families handed out so far.
    pub fn families(&self) -> u32 {
        self.counter
    }
}

/// Labels sharing one family number. Distinct suffixes give distinct labels.
#[derive(Debug, Clone)]
pub struct LabelFamily {
    base: String,
}

impl LabelFamily {
    pub fn label(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.base)
    }
}
