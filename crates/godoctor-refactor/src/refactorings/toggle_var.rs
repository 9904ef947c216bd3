use crate::RefactoringResult;
use godoctor_ast::{Ast, DeclKind, StmtKind};
use godoctor_diagnostic::{Diagnostic, ErrorCode};
use godoctor_sema::{FileId, Program};
use godoctor_text::{Extent, File};

/// Toggles a local declaration between short (`x := e`) and long (`var x T = e`) form
/// (§4.6 Toggle var ↔ short assignment). When converting to long form, the printed type
/// is kept only when every value's inferred type agrees — a mixed tuple omits the type
/// and lets the compiler infer it, per spec.md's rule.
pub fn toggle_var(program: &Program, package: &str, file: FileId, stmt: godoctor_ast::StmtId) -> RefactoringResult {
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

    let span = ast.stmt(stmt).span();
    let extent = Extent::new(span.start, span.end - span.start);

    let replacement = match &ast.stmt(stmt).kind {
        StmtKind::ShortVarDecl { names, values } => {
            let value_texts: Vec<String> = values.iter().map(|&v| source_text(source, ast.expr(v).span())).collect();
            let types: Vec<Option<String>> = values.iter().map(|&v| pkg.type_of(ast, v)).collect();
            let uniform_type = if values.len() == names.len() && !types.is_empty() && types.iter().all(|t| t.is_some()) {
                let first = &types[0];
                if types.iter().all(|t| t == first) {
                    first.clone()
                } else {
                    None
                }
            } else {
                None
            };
            match uniform_type {
                Some(ty) => format!("var {} {} = {}", names.join(", "), ty, value_texts.join(", ")),
                None => format!("var {} = {}", names.join(", "), value_texts.join(", ")),
            }
        }
        StmtKind::Decl(decl_id) => match &ast.decl(*decl_id).kind {
            DeclKind::Var(v) => {
                if v.values.is_empty() {
                    result.log.push(
                        Diagnostic::error("variable declaration has no initializer to convert".to_string())
                            .with_code(ErrorCode::NotExtractable),
                    );
                    return result;
                }
                let value_texts: Vec<String> = v.values.iter().map(|&e| source_text(source, ast.expr(e).span())).collect();
                format!("{} := {}", v.names.join(", "), value_texts.join(", "))
            }
            _ => {
                result.log.push(
                    Diagnostic::error("selection is not a variable declaration".to_string()).with_code(ErrorCode::InvalidSelection),
                );
                return result;
            }
        },
        _ => {
            result.log.push(Diagnostic::error("selection is not a variable declaration".to_string()).with_code(ErrorCode::InvalidSelection));
            return result;
        }
    };

    let _ = result.add_edit(source.path().to_path_buf(), extent, replacement.into_bytes());
    result
}

fn source_text(source: &File, span: godoctor_ast::Span) -> String {
    String::from_utf8_lossy(&source.content()[span.start..span.end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::DeclKind as AstDeclKind;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File as SrcFile;

    fn first_stmt(ast: &Ast) -> godoctor_ast::StmtId {
        let decl_id = ast.file().decls.iter().copied().find(|&d| matches!(&ast.decl(d).kind, AstDeclKind::Func(_))).unwrap();
        let body = match &ast.decl(decl_id).kind {
            AstDeclKind::Func(f) => f.body.unwrap(),
            _ => unreachable!(),
        };
        match &ast.stmt(body).kind {
            StmtKind::Block(stmts) => stmts[0],
            _ => unreachable!(),
        }
    }

    #[test]
    fn converts_short_decl_to_long_form_with_inferred_type() {
        let src = "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let file = SrcFile::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let stmt = first_stmt(ast);
        let result = toggle_var(&program, "main", 0, stmt);
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().unwrap();
        let out = String::from_utf8(edits.apply_to(src.as_bytes()).unwrap()).unwrap();
        assert!(out.contains("var x int = 1"));
    }

    #[test]
    fn converts_long_form_back_to_short_decl() {
        let src = "package main\nfunc main() {\n\tvar x = 1\n\t_ = x\n}\n";
        let file = SrcFile::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let stmt = first_stmt(ast);
        let result = toggle_var(&program, "main", 0, stmt);
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().unwrap();
        let out = String::from_utf8(edits.apply_to(src.as_bytes()).unwrap()).unwrap();
        assert!(out.contains("x := 1"));
    }
}
