use crate::ident::is_valid_identifier;
use crate::statement_range::StatementRange;
use crate::RefactoringResult;
use godoctor_ast::{Ast, DeclKind, FuncDecl, StmtId, TypeId, TypeKind};
use godoctor_diagnostic::{Diagnostic, ErrorCode};
use godoctor_sema::{FileId, ObjectId, PackageInfo, Program, Site};
use godoctor_text::Extent;
use rustc_hash::FxHashSet;

/// Extracts the statements covered by `selection` into a new function (§4.6 Extract
/// function): builds the statement range, classifies its variables per §4.5, composes
/// the new function and a call-site expression, and emits both as edits. `receiver` is
/// the object bound to the enclosing function's receiver, if any — it is never a
/// parameter, local, or return of the extracted function since it stays in scope at the
/// call site through the method receiver itself.
pub fn extract_function(
    program: &Program,
    package: &str,
    file: FileId,
    func_decl: &FuncDecl,
    func_body: StmtId,
    siblings: &[StmtId],
    selection: Extent,
    new_name: &str,
    receiver: Option<ObjectId>,
) -> RefactoringResult {
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

    if !is_valid_identifier(new_name) {
        result.log.push(Diagnostic::error(format!("{new_name:?} is not a valid identifier")).with_code(ErrorCode::NameInvalid));
        return result;
    }

    let range = match StatementRange::new(ast, file, func_body, siblings, selection) {
        Ok(r) => r,
        Err(e) => {
            result.log.push(Diagnostic::error(format!("cannot extract: {e}")).with_code(ErrorCode::InvalidSelection));
            return result;
        }
    };

    if range.entry_points().len() != 1 || range.exit_destinations().len() != 1 {
        result.log.push(
            Diagnostic::error("selection has more than one entry or exit point".to_string())
                .with_code(ErrorCode::NotExtractable),
        );
        return result;
    }
    if let Some(reason) = range.check_extractable() {
        result.log.push(Diagnostic::error(reason.to_string()).with_code(ErrorCode::NotExtractable));
        return result;
    }

    let locals = range.locals_referenced(&pkg.table);
    let live_in = range.locals_live_at_entry(&pkg.table);
    let live_out = range.locals_live_after_exit(&pkg.table);

    let mut params: FxHashSet<ObjectId> = live_in.intersection(&locals.used).copied().collect();

    let only_updated: FxHashSet<ObjectId> = locals
        .updated
        .iter()
        .copied()
        .filter(|o| !locals.assigned.contains(o) && !locals.declared.contains(o))
        .collect();
    let ret_candidates: FxHashSet<ObjectId> = locals
        .assigned
        .union(&locals.updated)
        .copied()
        .chain(locals.declared.iter().copied())
        .filter(|o| live_out.contains(o))
        .collect();
    let mut returns: FxHashSet<ObjectId> = ret_candidates.difference(&only_updated).copied().collect();

    let redeclared_assigned: FxHashSet<ObjectId> = locals.assigned.difference(&params).copied().collect();
    let redeclared_used: FxHashSet<ObjectId> = locals.used.difference(&live_in).copied().collect();
    let mut locals_to_redeclare: FxHashSet<ObjectId> = redeclared_assigned
        .union(&redeclared_used)
        .copied()
        .filter(|o| !locals.declared.contains(o))
        .collect();

    if let Some(recv) = receiver {
        params.remove(&recv);
        returns.remove(&recv);
        locals_to_redeclare.remove(&recv);
    }

    let mut param_ids: Vec<ObjectId> = params.into_iter().collect();
    param_ids.sort_by_key(|o| o.0);
    let mut return_ids: Vec<ObjectId> = returns.into_iter().collect();
    return_ids.sort_by_key(|o| o.0);
    let mut local_ids: Vec<ObjectId> = locals_to_redeclare.into_iter().collect();
    local_ids.sort_by_key(|o| o.0);

    let param_sigs: Vec<(String, String)> = param_ids
        .iter()
        .map(|&id| (pkg.objects.get(id).name.clone(), object_declared_type(pkg, ast, file, func_decl, id)))
        .collect();
    let return_sigs: Vec<(String, String)> = return_ids
        .iter()
        .map(|&id| (pkg.objects.get(id).name.clone(), object_declared_type(pkg, ast, file, func_decl, id)))
        .collect();

    // `:=` at the call site iff some returned variable is first declared inside the range.
    let declares_at_call_site = return_ids.iter().any(|id| locals.declared.contains(id));

    let body_bytes = &source.content()[selection.offset..selection.end()];
    let body_text = String::from_utf8_lossy(body_bytes);

    let mut header = String::new();
    header.push_str("\nfunc ");
    if let Some(recv) = receiver {
        let recv_name = pkg.objects.get(recv).name.clone();
        let recv_ty = func_decl.receiver.as_ref().map(|r| render_receiver_type(ast, r)).unwrap_or_default();
        header.push_str(&format!("({recv_name} {recv_ty}) "));
    }
    header.push_str(new_name);
    header.push('(');
    header.push_str(
        &param_sigs.iter().map(|(n, t)| format!("{n} {t}")).collect::<Vec<_>>().join(", "),
    );
    header.push(')');
    match return_sigs.len() {
        0 => {}
        1 => header.push_str(&format!(" {}", return_sigs[0].1)),
        _ => header.push_str(&format!(" ({})", return_sigs.iter().map(|(_, t)| t.clone()).collect::<Vec<_>>().join(", "))),
    }
    header.push_str(" {\n");
    for (name, ty) in &local_ids.iter().map(|&id| (pkg.objects.get(id).name.clone(), object_declared_type(pkg, ast, file, func_decl, id))).collect::<Vec<_>>() {
        header.push_str(&format!("\tvar {name} {ty}\n"));
    }
    header.push_str(body_text.trim_end());
    header.push('\n');
    if !return_sigs.is_empty() {
        header.push_str(&format!(
            "\treturn {}\n",
            return_sigs.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>().join(", ")
        ));
    }
    header.push_str("}\n");

    let args = param_sigs.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>().join(", ");
    let callee = if let Some(recv) = receiver {
        format!("{}.{}", pkg.objects.get(recv).name, new_name)
    } else {
        new_name.to_string()
    };
    let call_expr = format!("{callee}({args})");
    let call_site = if return_sigs.is_empty() {
        call_expr
    } else {
        let lhs = return_sigs.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>().join(", ");
        let op = if declares_at_call_site { ":=" } else { "=" };
        format!("{lhs} {op} {call_expr}")
    };

    let _ = result.add_edit(source.path().to_path_buf(), selection, call_site.into_bytes());
    let end = Extent::new(source.content().len(), 0);
    let _ = result.add_edit(source.path().to_path_buf(), end, header.into_bytes());

    result
}

fn render_receiver_type(ast: &Ast, recv: &godoctor_ast::Receiver) -> String {
    let rendered = type_to_string(ast, recv.ty);
    if recv.pointer && !rendered.starts_with('*') {
        format!("*{rendered}")
    } else {
        rendered
    }
}

fn type_to_string(ast: &Ast, ty: TypeId) -> String {
    match &ast.ty(ty).kind {
        TypeKind::Named { path } => path.join("."),
        TypeKind::Pointer(inner) => format!("*{}", type_to_string(ast, *inner)),
        TypeKind::Slice(inner) => format!("[]{}", type_to_string(ast, *inner)),
        TypeKind::Array { len, elem } => format!("[{}]{}", len.clone().unwrap_or_default(), type_to_string(ast, *elem)),
        TypeKind::Map { key, value } => format!("map[{}]{}", type_to_string(ast, *key), type_to_string(ast, *value)),
        TypeKind::Chan { elem, dir } => match dir {
            godoctor_ast::ChanDir::Both => format!("chan {}", type_to_string(ast, *elem)),
            godoctor_ast::ChanDir::Send => format!("chan<- {}", type_to_string(ast, *elem)),
            godoctor_ast::ChanDir::Recv => format!("<-chan {}", type_to_string(ast, *elem)),
        },
        TypeKind::Interface { methods } => {
            if methods.is_empty() {
                "interface{}".to_string()
            } else {
                "interface{ /* ... */ }".to_string()
            }
        }
        TypeKind::Struct { .. } => "struct{ /* ... */ }".to_string(),
        TypeKind::Function(sig) => {
            format!(
                "func({}) ({})",
                sig.params.iter().map(|p| type_to_string(ast, p.ty)).collect::<Vec<_>>().join(", "),
                sig.results.iter().map(|p| type_to_string(ast, p.ty)).collect::<Vec<_>>().join(", ")
            )
        }
    }
}

/// Best-effort type lookup for a variable that needs printing in the new signature:
/// first check whether it's the receiver or an ordinary parameter/result of the
/// enclosing function (exact, since those carry a declared `TypeId`); otherwise look up
/// its single recorded definition site in this file and infer from its initializer.
/// Falls back to `any` when nothing more precise is known (§12's type-checker stand-in).
fn object_declared_type(pkg: &PackageInfo, ast: &Ast, file: FileId, func_decl: &FuncDecl, obj: ObjectId) -> String {
    let name = &pkg.objects.get(obj).name;

    if let Some(recv) = &func_decl.receiver {
        if recv.name.as_deref() == Some(name.as_str()) {
            return render_receiver_type(ast, recv);
        }
    }
    for p in func_decl.params.iter().chain(func_decl.results.iter()) {
        if p.name.as_deref() == Some(name.as_str()) {
            return type_to_string(ast, p.ty);
        }
    }

    for occ in pkg.table.defs_of(obj) {
        if occ.file != file {
            continue;
        }
        match occ.site {
            Site::ShortVarName(stmt, idx) => {
                if let godoctor_ast::StmtKind::ShortVarDecl { values, .. } = &ast.stmt(stmt).kind {
                    if let Some(&v) = values.get(idx as usize) {
                        if let Some(t) = pkg.type_of(ast, v) {
                            return t;
                        }
                    }
                }
            }
            Site::DeclName(decl_id) => {
                if let DeclKind::Var(v) | DeclKind::Const(v) = &ast.decl(decl_id).kind {
                    if let Some(ty) = v.ty {
                        return type_to_string(ast, ty);
                    }
                    if let Some(&val) = v.values.first() {
                        if let Some(t) = pkg.type_of(ast, val) {
                            return t;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    "any".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::{Parser, StmtKind};
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    fn func_decl_and_body(ast: &Ast) -> (FuncDecl, StmtId, Vec<StmtId>) {
        let decl_id = ast
            .file()
            .decls
            .iter()
            .copied()
            .find(|&d| matches!(&ast.decl(d).kind, DeclKind::Func(_)))
            .unwrap();
        let f = match &ast.decl(decl_id).kind {
            DeclKind::Func(f) => f.clone(),
            _ => unreachable!(),
        };
        let body = f.body.unwrap();
        let siblings = match &ast.stmt(body).kind {
            StmtKind::Block(stmts) => stmts.clone(),
            _ => unreachable!(),
        };
        (f, body, siblings)
    }

    #[test]
    fn extracts_a_straight_line_block_with_one_param_and_one_return() {
        let src = "package main\nfunc main() {\n\ta := 1\n\tb := a + 1\n\t_ = b\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let (func_decl, body, siblings) = func_decl_and_body(ast);
        let span = ast.stmt(siblings[1]).span();
        let selection = Extent::new(span.start, span.end - span.start);
        let result = extract_function(&program, "main", 0, &func_decl, body, &siblings, selection, "compute", None);
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().expect("one file edited");
        let out = edits.apply_to(src.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("func compute(a int) int"));
        assert!(out.contains("b := compute(a)") || out.contains("b = compute(a)"));
        assert!(out.contains("return b"));
    }

    #[test]
    fn rejects_a_selection_containing_a_return() {
        let src = "package main\nfunc f() int {\n\ta := 1\n\treturn a\n}\n";
        let file = File::new("p.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("p.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let (func_decl, body, siblings) = func_decl_and_body(ast);
        let start = ast.stmt(siblings[0]).span().start;
        let end = ast.stmt(siblings[1]).span().end;
        let selection = Extent::new(start, end - start);
        let result = extract_function(&program, "main", 0, &func_decl, body, &siblings, selection, "helper", None);
        assert!(result.log.has_errors());
        assert!(result.edits.is_empty());
    }
}
