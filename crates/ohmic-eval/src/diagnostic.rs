//! User-facing diagnostics.
//!
//! Every evaluator entry point returns its diagnostics alongside a usable
//! value; nothing in this list aborts evaluation. A diagnostic carries a
//! kind, a severity, an optional primary span, labelled secondary spans and
//! free-form notes.
//!
//! # Examples
//!
//! ```
//! # use ohmic_eval::diagnostic::*;
//! # use ohmic_eval::Span;
//! let diag = Diagnostic::error(
//!     DiagnosticKind::UndefinedSymbol,
//!     Some(Span::new(0, 4, 5, 1)),
//!     "symbol 'r' not yet defined".to_string(),
//! );
//! assert_eq!(diag.to_string(), "error: undefined symbol: symbol 'r' not yet defined");
//! ```

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Primary location, when the failing construct has one
    pub span: Option<Span>,
    pub message: String,
    /// Secondary locations with explanations
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

/// Category of a diagnostic.
///
/// Discriminants index `DIAGNOSTIC_KIND_NAMES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticKind {
    // Symbols
    UndefinedSymbol = 0,

    // Operators
    InvalidOperands = 1,
    UnknownAttribute = 2,
    InvalidIndex = 3,
    DivisionByZero = 4,
    IndeterminateType = 5,

    // Calls
    NotCallable = 6,
    DuplicateArgument = 7,
    UnknownArgument = 8,
    MissingArgument = 9,
    TooManyArguments = 10,
    ArgumentType = 11,
    CallFailed = 12,

    // Scheduling
    CyclicDependency = 13,
    DuplicateDefinition = 14,
    DuplicateExport = 15,

    Internal = 16,
}

const DIAGNOSTIC_KIND_NAMES: &[&str] = &[
    "undefined symbol",       // 0: UndefinedSymbol
    "invalid operands",       // 1: InvalidOperands
    "unknown attribute",      // 2: UnknownAttribute
    "invalid index",          // 3: InvalidIndex
    "division by zero",       // 4: DivisionByZero
    "indeterminate type",     // 5: IndeterminateType
    "not callable",           // 6: NotCallable
    "duplicate argument",     // 7: DuplicateArgument
    "unknown argument",       // 8: UnknownArgument
    "missing argument",       // 9: MissingArgument
    "too many arguments",     // 10: TooManyArguments
    "argument type mismatch", // 11: ArgumentType
    "call failed",            // 12: CallFailed
    "dependency cycle",       // 13: CyclicDependency
    "duplicate definition",   // 14: DuplicateDefinition
    "duplicate export",       // 15: DuplicateExport
    "internal error",         // 16: Internal
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// Secondary location inside a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, span: Option<Span>, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, span, message)
    }

    pub fn warning(kind: DiagnosticKind, span: Option<Span>, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, span, message)
    }

    pub fn note(kind: DiagnosticKind, span: Option<Span>, message: String) -> Self {
        Self::with_severity(kind, Severity::Note, span, message)
    }

    fn with_severity(
        kind: DiagnosticKind,
        severity: Severity,
        span: Option<Span>,
        message: String,
    ) -> Self {
        Self {
            kind,
            severity,
            span,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_label(mut self, span: Span, message: String) -> Self {
        self.labels.push(Label { span, message });
        self
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl DiagnosticKind {
    pub fn name(self) -> &'static str {
        DIAGNOSTIC_KIND_NAMES[self as usize]
    }
}

/// True if any diagnostic in the list is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_cover_every_variant() {
        assert_eq!(DiagnosticKind::UndefinedSymbol.name(), "undefined symbol");
        assert_eq!(DiagnosticKind::CyclicDependency.name(), "dependency cycle");
        assert_eq!(DiagnosticKind::Internal.name(), "internal error");
        assert_eq!(
            DIAGNOSTIC_KIND_NAMES.len(),
            DiagnosticKind::Internal as usize + 1
        );
    }

    #[test]
    fn test_builders() {
        let span = Span::new(0, 0, 3, 1);
        let diag = Diagnostic::warning(DiagnosticKind::IndeterminateType, None, "x".to_string())
            .with_label(span, "here".to_string())
            .with_note("try a literal key".to_string());
        assert!(!diag.is_error());
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.notes, vec!["try a literal key".to_string()]);
        assert!(!has_errors(&[diag.clone()]));
        assert!(has_errors(&[
            diag,
            Diagnostic::error(DiagnosticKind::Internal, None, "boom".to_string())
        ]));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Note);
    }
}
