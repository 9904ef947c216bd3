//! The diagnostic log (spec §3 Diagnostic log, §4.7, §7): severity-categorized,
//! appendable, with an `initial` flag distinguishing pre-existing loader errors from
//! engine-produced ones. Grounded on `raya-checker/src/diagnostic.rs`'s `Diagnostic`
//! wrapper over `codespan_reporting`, its `ErrorCode` newtype, and its JSON shape.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{self, termcolor::Buffer};
use godoctor_text::{Extent, File};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The abstract error categories spec.md §7 names. Internal variants (`OverlappingEdit`,
/// `OutOfRange`) should never reach a user; they exist so engine bugs surface as a
/// recognizable code rather than a bare message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    InvalidSelection,
    InvalidArguments,
    NameInvalid,
    NameReserved,
    NamePredeclared,
    Conflict,
    NotExtractable,
    OverlappingEdit,
    OutOfRange,
    InstallationRoot,
    IoFailure,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub code: Option<ErrorCode>,
    pub file: Option<File>,
    pub extent: Option<Extent>,
    pub initial: bool,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            code: None,
            file: None,
            extent: None,
            initial: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn at(mut self, file: File, extent: Extent) -> Self {
        self.file = Some(file);
        self.extent = Some(extent);
        self
    }

    pub fn to_json(&self) -> JsonDiagnostic {
        JsonDiagnostic {
            severity: self.severity.to_string(),
            message: self.message.clone(),
            code: self.code.map(|c| c.to_string()),
            initial: self.initial,
            label: self.file.as_ref().map(|f| JsonLabel {
                path: f.path().display().to_string(),
                offset: self.extent.map(|e| e.offset).unwrap_or(0),
                length: self.extent.map(|e| e.length).unwrap_or(0),
            }),
        }
    }

    fn to_codespan(&self, file_id: usize) -> CsDiagnostic<usize> {
        let base = match self.severity {
            Severity::Info => CsDiagnostic::note(),
            Severity::Warning => CsDiagnostic::warning(),
            Severity::Error => CsDiagnostic::error(),
        };
        let mut d = base.with_message(self.message.clone());
        if let Some(extent) = self.extent {
            d = d.with_labels(vec![Label::primary(file_id, extent.offset..extent.end())]);
        }
        d
    }
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: String,
    pub message: String,
    pub code: Option<String>,
    pub initial: bool,
    pub label: Option<JsonLabel>,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub path: String,
    pub offset: usize,
    pub length: usize,
}

/// Ordered, appendable log of diagnostics (§4.7). `mark_initial` is called once after
/// the loader produces its errors; everything pushed afterward is non-initial.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
    past_initial: bool,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        DiagnosticLog::default()
    }

    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.initial = !self.past_initial;
        self.entries.push(diagnostic);
    }

    /// Marks every diagnostic pushed so far as `initial`; everything pushed after this
    /// call is not.
    pub fn mark_initial(&mut self) {
        self.past_initial = true;
    }

    /// Downgrades initial errors to warnings, per each refactoring's choice at the start
    /// of its run (spec.md §7).
    pub fn downgrade_initial_errors_to_warnings(&mut self) {
        for e in &mut self.entries {
            if e.initial && e.severity == Severity::Error {
                e.severity = Severity::Warning;
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn to_json(&self) -> Vec<JsonDiagnostic> {
        self.entries.iter().map(Diagnostic::to_json).collect()
    }

    /// Renders every diagnostic with source context using `codespan-reporting`, matching
    /// the teacher's terminal-output convention.
    pub fn emit_pretty(&self) -> String {
        let mut files = SimpleFiles::new();
        let mut buffer = Buffer::no_color();
        let config = codespan_reporting::term::Config::default();
        for diagnostic in &self.entries {
            let file_id = match &diagnostic.file {
                Some(f) => files.add(
                    f.path().display().to_string(),
                    String::from_utf8_lossy(f.content()).into_owned(),
                ),
                None => files.add("<unknown>".to_string(), String::new()),
            };
            let cs = diagnostic.to_codespan(file_id);
            let _ = term::emit(&mut buffer, &config, &files, &cs);
        }
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_initial_splits_log() {
        let mut log = DiagnosticLog::new();
        log.push(Diagnostic::error("loader error"));
        log.mark_initial();
        log.push(Diagnostic::error("engine error"));
        assert!(log.entries()[0].initial);
        assert!(!log.entries()[1].initial);
    }

    #[test]
    fn downgrade_only_touches_initial_errors() {
        let mut log = DiagnosticLog::new();
        log.push(Diagnostic::error("loader error"));
        log.mark_initial();
        log.push(Diagnostic::error("engine error"));
        log.downgrade_initial_errors_to_warnings();
        assert_eq!(log.entries()[0].severity, Severity::Warning);
        assert_eq!(log.entries()[1].severity, Severity::Error);
    }

    #[test]
    fn has_errors_reflects_current_severities() {
        let mut log = DiagnosticLog::new();
        log.push(Diagnostic::warning("fyi"));
        assert!(!log.has_errors());
        log.push(Diagnostic::error("bad").with_code(ErrorCode::Conflict));
        assert!(log.has_errors());
    }
}
