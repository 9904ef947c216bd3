use crate::RefactoringResult;
use godoctor_ast::DeclKind;
use godoctor_diagnostic::{Diagnostic, ErrorCode};
use godoctor_sema::{FileId, Program};
use godoctor_text::Extent;

/// Inserts a `// Name TODO` placeholder doc comment above every exported top-level
/// function or type declaration in `file` that doesn't already have one (§4.6 Add
/// documentation comment). A declaration sharing a source line with a preceding one
/// (separated by `;`) is first pushed onto its own line so the inserted comment binds
/// to it alone, matching Go's doc-comment convention that a comment must immediately
/// precede the declaration it documents with nothing else on the line.
pub fn add_doc_comments(program: &Program, package: &str, file: FileId) -> RefactoringResult {
    let mut result = RefactoringResult::new();
    let Some(pkg) = program.all_packages().get(package) else {
        result.log.push(Diagnostic::error(format!("unknown package {package:?}")).with_code(ErrorCode::InvalidArguments));
        return result;
    };
    let Some(ast) = pkg.ast_of(file) else {
        result.log.push(Diagnostic::error("unknown file".to_string()).with_code(ErrorCode::InvalidArguments));
        return result;
    };
    let Some(source) = pkg.file_of(file) else {
        result.log.push(Diagnostic::error("unknown file".to_string()).with_code(ErrorCode::InvalidArguments));
        return result;
    };
    let content = source.content();

    for &decl_id in &ast.file().decls {
        let decl = ast.decl(decl_id);
        if !decl.is_exported() {
            continue;
        }
        let has_doc = match &decl.kind {
            DeclKind::Func(f) => f.doc.is_some(),
            DeclKind::Type(t) => t.doc.is_some(),
            _ => true,
        };
        if has_doc {
            continue;
        }
        let Some(name) = decl.name() else { continue };
        let offset = decl.span().start;

        let mut line_start = offset;
        while line_start > 0 && content[line_start - 1] != b'\n' {
            line_start -= 1;
        }
        let prefix_is_blank = content[line_start..offset].iter().all(|&b| b == b' ' || b == b'\t');

        let (insert_at, insertion) = if prefix_is_blank {
            (line_start, format!("// {name} TODO\n"))
        } else {
            (offset, format!("\n// {name} TODO\n"))
        };
        let _ = result.add_edit(source.path().to_path_buf(), Extent::new(insert_at, 0), insertion.into_bytes());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    #[test]
    fn adds_a_placeholder_comment_above_an_undocumented_exported_function() {
        let src = "package main\nfunc Run() {\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let result = add_doc_comments(&program, "main", 0);
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().expect("one file edited");
        let out = String::from_utf8(edits.apply_to(src.as_bytes()).unwrap()).unwrap();
        assert!(out.contains("// Run TODO\nfunc Run()"));
    }

    #[test]
    fn leaves_unexported_declarations_alone() {
        let src = "package main\nfunc run() {\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let result = add_doc_comments(&program, "main", 0);
        assert!(!result.log.has_errors());
        assert!(result.edits.is_empty());
    }
}
