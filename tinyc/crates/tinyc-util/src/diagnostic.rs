//! Diagnostic collection shared by every pipeline stage.
//!
//! The toolchain's error policy is set-flag-and-continue: a stage keeps
//! reporting for as long as it can make progress, so the user sees every
//! problem in one run, and the driver refuses to start a stage when an
//! earlier one has reported. The `Handler` here is that shared flag
//! state, with the per-stage booleans of a classic implementation
//! replaced by one collector that remembers which `Phase` each
//! diagnostic came from.

use std::cell::RefCell;
use std::fmt;

use crate::location::TokenLocation;

/// The pipeline stage a diagnostic originated from.
///
/// Renders as the user-visible error kind.
///
/// # Example
///
/// ```
/// use tinyc_util::Phase;
///
/// assert_eq!(format!("{}", Phase::Token), "Token Error");
/// assert_eq!(format!("{}", Phase::VmRuntime), "VM Runtime Error");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Source lexer.
    Token,
    /// Parser.
    Syntax,
    /// Semantic analyzer.
    Semantic,
    /// Code generator.
    Codegen,
    /// TM assembly lexer.
    VmToken,
    /// TM assembler.
    VmSyntax,
    /// TM execution.
    VmRuntime,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Phase::Token => "Token Error",
            Phase::Syntax => "Syntax Error",
            Phase::Semantic => "Semantic Error",
            Phase::Codegen => "Codegen Error",
            Phase::VmToken => "VM Token Error",
            Phase::VmSyntax => "VM Syntax Error",
            Phase::VmRuntime => "VM Runtime Error",
        };
        f.write_str(kind)
    }
}

/// A single reported problem: which stage saw it, where, and what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Originating stage.
    pub phase: Phase,
    /// Source location, when one is known. VM diagnostics have none.
    pub location: Option<TokenLocation>,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic with a source location.
    pub fn new(phase: Phase, location: TokenLocation, message: impl Into<String>) -> Self {
        Self {
            phase,
            location: Some(location),
            message: message.into(),
        }
    }

    /// Creates a diagnostic without a source location.
    pub fn bare(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            location: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {} {}", self.phase, location, self.message),
            None => write!(f, "{}: {}", self.phase, self.message),
        }
    }
}

/// Collector for diagnostics, shared by reference across the stages.
///
/// # Example
///
/// ```
/// use tinyc_util::{Handler, Phase, TokenLocation};
///
/// let handler = Handler::new();
/// handler.report(Phase::Syntax, TokenLocation::new("t.tiny", 2, 5), "Expected ';'");
///
/// assert!(handler.has_errors());
/// assert!(handler.has_errors_in(Phase::Syntax));
/// assert!(!handler.has_errors_in(Phase::Token));
/// ```
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a diagnostic with a source location.
    pub fn report(&self, phase: Phase, location: TokenLocation, message: impl Into<String>) {
        self.emit(Diagnostic::new(phase, location, message));
    }

    /// Reports a diagnostic that has no source location.
    pub fn report_bare(&self, phase: Phase, message: impl Into<String>) {
        self.emit(Diagnostic::bare(phase, message));
    }

    /// Records a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// True if any stage has reported.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }

    /// True if the given stage has reported.
    pub fn has_errors_in(&self, phase: Phase) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.phase == phase)
    }

    /// Total number of diagnostics recorded so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    /// A snapshot of everything recorded, in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drops all recorded diagnostics.
    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}
