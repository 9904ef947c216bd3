//! The six refactorings built on the analysis primitives from the other crates (§4.6):
//! rename, extract-function, extract-local-variable, toggle var/short assignment,
//! add-documentation-comment, and debug. Each refactoring appends to a
//! `DiagnosticLog` and returns a per-file `EditSet` rather than aborting on error,
//! per spec.md §7's propagation policy.

pub mod description;
mod ident;
mod locate;
pub mod refactorings;
mod statement_range;

pub use description::{ArgValue, Description, ParamDefault, ParamDescription};
pub use locate::{innermost_expr_at, object_at, type_switch_at};
pub use statement_range::{LocalsReferenced, RangeError, StatementRange};

use godoctor_diagnostic::DiagnosticLog;
use godoctor_text::{EditError, EditSet, Extent};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// What a refactoring invocation produces (§6): a diagnostic log plus a per-file edit
/// set. File-system changes (create/delete/rename) are not modeled here since none of
/// the six refactorings in this crate need them.
#[derive(Debug, Default)]
pub struct RefactoringResult {
    pub log: DiagnosticLog,
    pub edits: FxHashMap<PathBuf, EditSet>,
}

impl RefactoringResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edit(&mut self, path: PathBuf, extent: Extent, replacement: impl Into<Vec<u8>>) -> Result<(), EditError> {
        self.edits.entry(path).or_default().add(extent, replacement)
    }
}
