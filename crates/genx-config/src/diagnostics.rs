//! Developer-facing diagnostics
//!
//! Malformed notations never fail a resolve. They are logged through
//! `tracing` and kept in a bounded log the host can inspect.

use std::collections::VecDeque;
use std::fmt;

use crate::{ConfigError, cardinality};

/// One rejected notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Module name, e.g. `fmtX`
    pub module: String,
    /// Attribute that carried the input, e.g. `fx-opts`
    pub attribute: String,
    /// Element selector
    pub selector: String,
    /// Offending raw value
    pub raw: String,
    /// Parser message
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(prefix: &str, error: &ConfigError) -> Self {
        Self {
            module: cardinality::module_name(prefix).to_string(),
            attribute: error.attribute().to_string(),
            selector: error.selector().to_string(),
            raw: error.raw().to_string(),
            message: error.reason(),
        }
    }

    /// Emit as a `tracing` warning
    pub fn log(&self) {
        tracing::warn!(
            module = %self.module,
            attribute = %self.attribute,
            selector = %self.selector,
            raw = %self.raw,
            "{}",
            self
        );
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] invalid {} on {}: {:?} ({})",
            self.module, self.attribute, self.selector, self.raw, self.message
        )
    }
}

/// Bounded diagnostics log, oldest entries dropped first
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    dropped: u64,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(64)
    }
}

impl DiagnosticLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            dropped: 0,
        }
    }

    /// Log and keep a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries evicted or refused so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dropped = 0;
    }
}
