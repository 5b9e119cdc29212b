//! Recovered-issue collection
//!
//! Failures local to one field, operation, argument default, union member,
//! pagination spec or data-loader spec are logged and recorded here instead
//! of aborting the compilation. The caller decides whether recorded issues
//! should fail the run.

use crate::error::GeneratorError;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use tracing::warn;

/// One recovered issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Element the issue was found on (e.g. `com.example.Book.author`)
    pub location: String,
    /// What went wrong
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Per-run collector shared by all resolvers
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recovered error
    pub fn report(&self, location: impl Into<String>, error: &GeneratorError) {
        self.warn(location, error.to_string());
    }

    /// Record a recovered issue described by a message
    pub fn warn(&self, location: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            location: location.into(),
            message: message.into(),
        };
        warn!(location = %diagnostic.location, "{}", diagnostic.message);
        self.entries.borrow_mut().push(diagnostic);
    }

    /// Number of recorded issues
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Copy of the recorded issues, in report order
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Consume the collector
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries.into_inner()
    }
}
