use crate::locate::{enclosing_function, stmt_at};
use crate::message::{ArgSpec, Reply, SelectionSpec};
use crate::session::Session;
use godoctor_diagnostic::DiagnosticLog;
use godoctor_refactor::refactorings::{add_doc_comments, debug_dump, extract_function, extract_local, rename, toggle_var};
use godoctor_refactor::RefactoringResult;
use godoctor_sema::{InMemoryLoader, Loader};
use godoctor_text::{unified_diff, Extent};
use rustc_hash::FxHashMap;
use serde_json::json;
use std::path::PathBuf;

/// `xrun` (§6): loads every file visible to the session, resolves `file`/`selection`
/// against it, dispatches to the named refactoring, and turns the result into a
/// unified-diff-per-file reply (the "persisted output" default, §6) or an `Error` reply
/// if the run's diagnostic log carries any error — callers must not apply edits then.
pub fn xrun(
    session: &Session,
    refactoring: &str,
    file: &str,
    selection: SelectionSpec,
    args: &[ArgSpec],
) -> Reply {
    let sources = session.visible_sources();
    let mut log = DiagnosticLog::new();
    let program = InMemoryLoader.load(sources.clone(), &mut log);
    if log.has_errors() {
        return Reply::error("source failed to parse; see diagnostics").with_diagnostics(&log);
    }

    let Some((pkg_name, file_id, source)) = find_file(&program, file) else {
        return Reply::error(format!("{file:?} is not part of the loaded program"));
    };
    let pkg = &program.packages[&pkg_name];
    let ast = pkg.ast_of(file_id).expect("file_id came from this package");

    let Some(start) = source.line_col_to_offset(selection.start_line, selection.start_col) else {
        return Reply::error("selection start is out of range");
    };
    let Some(end) = source.line_col_to_offset(selection.end_line, selection.end_col) else {
        return Reply::error("selection end is out of range");
    };
    if end < start {
        return Reply::error("selection end precedes selection start");
    }
    let extent = Extent::new(start, end - start);

    let new_name = args.first().and_then(ArgSpec::as_text).unwrap_or("");

    let result = match refactoring {
        "rename" => {
            let Some(object) = godoctor_refactor::object_at(ast, &pkg.table, file_id, extent) else {
                return Reply::error("selection does not denote a named object");
            };
            rename(&program, &pkg_name, object, new_name, None)
        }
        "extract_function" => {
            let Some((func_decl, body, siblings)) = enclosing_function(ast, extent.offset) else {
                return Reply::error("selection is not inside a function body");
            };
            extract_function(&program, &pkg_name, file_id, &func_decl, body, &siblings, extent, new_name, None)
        }
        "extract_local" => {
            let Some((_, body, _)) = enclosing_function(ast, extent.offset) else {
                return Reply::error("selection is not inside a function body");
            };
            extract_local(&program, &pkg_name, file_id, body, extent, new_name)
        }
        "toggle_var" => {
            let Some((_, body, _)) = enclosing_function(ast, extent.offset) else {
                return Reply::error("selection is not inside a function body");
            };
            let Some(stmt) = stmt_at(ast, body, extent.offset) else {
                return Reply::error("selection does not denote a statement");
            };
            toggle_var(&program, &pkg_name, file_id, stmt)
        }
        "add_doc" => add_doc_comments(&program, &pkg_name, file_id),
        "debug" => {
            let dump = debug_dump(&program);
            return Reply::ok(Some(json!({ "dump": dump })));
        }
        other => return Reply::error(format!("unknown refactoring {other:?}")),
    };

    reply_for(&result, &sources)
}

fn find_file<'p>(program: &'p godoctor_sema::Program, path: &str) -> Option<(String, godoctor_sema::FileId, &'p godoctor_text::File)> {
    for (pkg_name, pkg) in program.all_packages() {
        for (file_id, source, _) in &pkg.files {
            if source.path().display().to_string() == path {
                return Some((pkg_name.clone(), *file_id, source));
            }
        }
    }
    None
}

fn reply_for(result: &RefactoringResult, sources: &[(String, godoctor_text::File)]) -> Reply {
    if result.log.has_errors() {
        return Reply::error(first_error_message(result)).with_diagnostics(&result.log);
    }

    let content_by_path: FxHashMap<PathBuf, Vec<u8>> =
        sources.iter().map(|(_, f)| (f.path().to_path_buf(), f.content().to_vec())).collect();

    let mut diffs = serde_json::Map::new();
    let mut files = serde_json::Map::new();
    for (path, edits) in &result.edits {
        let original = content_by_path.get(path).map(Vec::as_slice).unwrap_or(&[]);
        let key = path.display().to_string();
        match unified_diff(&key, original, edits) {
            Ok(diff) => {
                diffs.insert(key.clone(), json!(diff));
            }
            Err(e) => return Reply::error(format!("failed to render diff for {key}: {e}")),
        }
        match edits.apply_to(original) {
            Ok(updated) => {
                files.insert(key, json!(String::from_utf8_lossy(&updated).into_owned()));
            }
            Err(e) => return Reply::error(format!("failed to apply edits for {}: {e}", path.display())),
        }
    }

    Reply::ok(Some(json!({ "diffs": diffs, "files": files }))).with_diagnostics(&result.log)
}

fn first_error_message(result: &RefactoringResult) -> String {
    result
        .log
        .iter()
        .find(|d| d.severity == godoctor_diagnostic::Severity::Error)
        .map(|d| d.message.clone())
        .unwrap_or_else(|| "refactoring failed".to_string())
}
