use crate::ident::is_valid_identifier;
use crate::locate::innermost_expr_at;
use crate::RefactoringResult;
use godoctor_ast::{Ast, ExprId, ExprKind, Literal, Span, StmtId, StmtKind};
use godoctor_diagnostic::{Diagnostic, ErrorCode};
use godoctor_sema::{FileId, Program};
use godoctor_text::Extent;

/// Extracts the expression covered by `selection` into a new local variable declared
/// immediately before the statement that contains it (§4.6 Extract local variable):
/// `name := <expression>` is inserted, and the selection is replaced with `name`.
pub fn extract_local(
    program: &Program,
    package: &str,
    file: FileId,
    func_body: StmtId,
    selection: Extent,
    new_name: &str,
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

    let Some(expr) = innermost_expr_at(ast, selection) else {
        result.log.push(Diagnostic::error("selection does not denote an expression".to_string()).with_code(ErrorCode::InvalidSelection));
        return result;
    };
    let expr_span = ast.expr(expr).span();
    if expr_span.start != selection.offset || expr_span.end != selection.end() {
        result.log.push(
            Diagnostic::error("selection must exactly cover a single expression".to_string())
                .with_code(ErrorCode::InvalidSelection),
        );
        return result;
    }
    if matches!(ast.expr(expr).kind, ExprKind::Literal(Literal::Nil)) {
        result.log.push(Diagnostic::error("untyped nil cannot be extracted".to_string()).with_code(ErrorCode::InvalidSelection));
        return result;
    }
    if is_assignment_target(ast, func_body, expr) {
        result.log.push(
            Diagnostic::error("cannot extract an assignment target".to_string()).with_code(ErrorCode::InvalidSelection),
        );
        return result;
    }

    let top_stmts: Vec<StmtId> = match &ast.stmt(func_body).kind {
        StmtKind::Block(stmts) => stmts.clone(),
        _ => vec![func_body],
    };
    let Some((idx, siblings)) = locate_insertion(ast, &top_stmts, expr) else {
        result.log.push(
            Diagnostic::error("could not find a statement to insert the new declaration before".to_string())
                .with_code(ErrorCode::InvalidSelection),
        );
        return result;
    };
    let insertion_stmt_start = ast.stmt(siblings[idx]).span().start;
    let indent = indent_of(source.content(), insertion_stmt_start);
    let line_start = insertion_stmt_start - indent.len();

    let expr_text = String::from_utf8_lossy(&source.content()[expr_span.start..expr_span.end]).into_owned();
    let decl_line = format!("{indent}{new_name} := {expr_text}\n");

    let _ = result.add_edit(source.path().to_path_buf(), Extent::new(line_start, 0), decl_line.into_bytes());
    let _ = result.add_edit(source.path().to_path_buf(), selection, new_name.as_bytes().to_vec());

    result
}

fn indent_of(source: &[u8], stmt_start: usize) -> String {
    let mut start = stmt_start;
    while start > 0 && source[start - 1] != b'\n' {
        start -= 1;
    }
    String::from_utf8_lossy(&source[start..stmt_start]).into_owned()
}

fn contains_span(outer: Span, inner: Span) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

fn expr_contains(ast: &Ast, root: ExprId, target: ExprId) -> bool {
    contains_span(ast.expr(root).span(), ast.expr(target).span())
}

fn is_assignment_target(ast: &Ast, stmt: StmtId, target: ExprId) -> bool {
    match &ast.stmt(stmt).kind {
        StmtKind::Block(stmts) => stmts.iter().any(|&s| is_assignment_target(ast, s, target)),
        StmtKind::Assign { lhs, .. } => lhs.contains(&target),
        StmtKind::IncDec { target: t, .. } => *t == target,
        StmtKind::If { init, then_branch, else_branch, .. } => {
            init.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || is_assignment_target(ast, *then_branch, target)
                || else_branch.map(|e| is_assignment_target(ast, e, target)).unwrap_or(false)
        }
        StmtKind::For { init, post, body, .. } => {
            init.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || post.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || is_assignment_target(ast, *body, target)
        }
        StmtKind::ForRange { body, .. } => is_assignment_target(ast, *body, target),
        StmtKind::Switch { init, cases, .. } => {
            init.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || cases.iter().any(|c| c.body.iter().any(|&s| is_assignment_target(ast, s, target)))
        }
        StmtKind::TypeSwitch { init, cases, .. } => {
            init.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || cases.iter().any(|c| c.body.iter().any(|&s| is_assignment_target(ast, s, target)))
        }
        StmtKind::Select { comms, .. } => comms.iter().any(|c| {
            c.comm.map(|s| is_assignment_target(ast, s, target)).unwrap_or(false)
                || c.body.iter().any(|&s| is_assignment_target(ast, s, target))
        }),
        StmtKind::Labeled { stmt: inner, .. } => is_assignment_target(ast, *inner, target),
        _ => false,
    }
}

/// Resolves a selection nested inside an `else if`'s own subtree (`eb`, itself an `If`
/// statement), returning a real `(index, siblings)` pair only when `target` is found
/// deeper inside `eb`'s own then/else blocks. Returns `None` when `target` sits in
/// `eb`'s own header (cond/init) or isn't found — in either case the caller must fall
/// back to the position of the outer if-chain in its own real sibling list, never to an
/// index into the synthetic single-element slice `eb` would otherwise be searched as.
fn locate_insertion_in_nested_if(ast: &Ast, eb: StmtId, target: ExprId) -> Option<(usize, Vec<StmtId>)> {
    let target_span = ast.expr(target).span();
    let StmtKind::If { init, cond, then_branch, else_branch } = &ast.stmt(eb).kind else {
        return None;
    };
    let in_header = init.map(|x| contains_span(ast.stmt(x).span(), target_span)).unwrap_or(false)
        || expr_contains(ast, *cond, target);
    if in_header {
        return None;
    }
    if contains_span(ast.stmt(*then_branch).span(), target_span) {
        if let StmtKind::Block(inner) = &ast.stmt(*then_branch).kind {
            return locate_insertion(ast, inner, target);
        }
        return None;
    }
    if let Some(eb2) = else_branch {
        if contains_span(ast.stmt(*eb2).span(), target_span) {
            return match &ast.stmt(*eb2).kind {
                StmtKind::Block(inner) => locate_insertion(ast, inner, target),
                StmtKind::If { .. } => locate_insertion_in_nested_if(ast, *eb2, target),
                _ => None,
            };
        }
    }
    None
}

/// Finds the index, within some list of sibling statements, of the statement that must
/// precede the new declaration: the innermost block statement fully containing `target`,
/// unless `target` sits in a control statement's header (condition/init/post/tag), in
/// which case the insertion point is the control statement itself. Returns that index
/// together with the sibling list it indexes into.
fn locate_insertion(ast: &Ast, stmts: &[StmtId], target: ExprId) -> Option<(usize, Vec<StmtId>)> {
    let target_span = ast.expr(target).span();
    for (i, &s) in stmts.iter().enumerate() {
        let stmt = ast.stmt(s);
        if !contains_span(stmt.span(), target_span) {
            continue;
        }
        match &stmt.kind {
            StmtKind::Block(inner) => {
                return locate_insertion(ast, inner, target).or(Some((i, stmts.to_vec())));
            }
            StmtKind::If { init, cond, then_branch, else_branch } => {
                let in_header = init.map(|x| contains_span(ast.stmt(x).span(), target_span)).unwrap_or(false)
                    || expr_contains(ast, *cond, target);
                if !in_header {
                    if contains_span(ast.stmt(*then_branch).span(), target_span) {
                        if let StmtKind::Block(inner) = &ast.stmt(*then_branch).kind {
                            if let Some(found) = locate_insertion(ast, inner, target) {
                                return Some(found);
                            }
                        }
                    } else if let Some(eb) = else_branch {
                        if contains_span(ast.stmt(*eb).span(), target_span) {
                            match &ast.stmt(*eb).kind {
                                StmtKind::Block(inner) => {
                                    if let Some(found) = locate_insertion(ast, inner, target) {
                                        return Some(found);
                                    }
                                }
                                StmtKind::If { .. } => {
                                    if let Some(found) = locate_insertion_in_nested_if(ast, *eb, target) {
                                        return Some(found);
                                    }
                                    // `target` sits in `eb`'s own header (cond/init): the
                                    // insertion point is the whole outer if-chain's position,
                                    // not a spot inside the nested `else if` construct. Fall
                                    // through to the outer `(i, stmts)` below.
                                }
                                _ => {}
                            }
                        }
                    }
                }
                return Some((i, stmts.to_vec()));
            }
            StmtKind::For { init, cond, post, body, .. } => {
                let in_header = init.map(|x| contains_span(ast.stmt(x).span(), target_span)).unwrap_or(false)
                    || cond.map(|c| expr_contains(ast, c, target)).unwrap_or(false)
                    || post.map(|x| contains_span(ast.stmt(x).span(), target_span)).unwrap_or(false);
                if !in_header {
                    if let StmtKind::Block(inner) = &ast.stmt(*body).kind {
                        if let Some(found) = locate_insertion(ast, inner, target) {
                            return Some(found);
                        }
                    }
                }
                return Some((i, stmts.to_vec()));
            }
            StmtKind::ForRange { key, value, range_expr, body, .. } => {
                let in_header = key.map(|k| expr_contains(ast, k, target)).unwrap_or(false)
                    || value.map(|v| expr_contains(ast, v, target)).unwrap_or(false)
                    || expr_contains(ast, *range_expr, target);
                if !in_header {
                    if let StmtKind::Block(inner) = &ast.stmt(*body).kind {
                        if let Some(found) = locate_insertion(ast, inner, target) {
                            return Some(found);
                        }
                    }
                }
                return Some((i, stmts.to_vec()));
            }
            StmtKind::Labeled { stmt: inner, .. } => {
                return locate_insertion(ast, std::slice::from_ref(inner), target).or(Some((i, stmts.to_vec())));
            }
            _ => return Some((i, stmts.to_vec())),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::DeclKind;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    fn func_body(ast: &Ast) -> StmtId {
        let decl_id = ast.file().decls.iter().copied().find(|&d| matches!(&ast.decl(d).kind, DeclKind::Func(_))).unwrap();
        match &ast.decl(decl_id).kind {
            DeclKind::Func(f) => f.body.unwrap(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn extracts_a_binary_expression_into_a_new_local() {
        let src = "package main\nfunc main() {\n\tx := 1 + 2\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let body = func_body(ast);
        let offset = src.find("1 + 2").unwrap();
        let selection = Extent::new(offset, "1 + 2".len());
        let result = extract_local(&program, "main", 0, body, selection, "sum");
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().unwrap();
        let out = String::from_utf8(edits.apply_to(src.as_bytes()).unwrap()).unwrap();
        assert!(out.contains("sum := 1 + 2"));
        assert!(out.contains("x := sum"));
    }

    #[test]
    fn extracting_from_a_nested_else_if_header_inserts_before_the_whole_chain() {
        let src = "package main\nfunc main() {\n\ty := 0\n\tif y == 1 {\n\t\ty = 2\n\t} else if y == 3+4 {\n\t\ty = 5\n\t}\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let body = func_body(ast);
        let offset = src.find("3+4").unwrap();
        let selection = Extent::new(offset, "3+4".len());
        let result = extract_local(&program, "main", 0, body, selection, "sum");
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().unwrap();
        let out = String::from_utf8(edits.apply_to(src.as_bytes()).unwrap()).unwrap();
        // the declaration must land before the whole `if`/`else if` chain, not inside it.
        let decl_pos = out.find("sum := 3+4").unwrap();
        let if_pos = out.find("if y == 1").unwrap();
        assert!(decl_pos < if_pos, "declaration must precede the whole if-chain, got:\n{out}");
        assert!(out.contains("else if y == sum"));
    }

    #[test]
    fn rejects_a_partial_expression_selection() {
        let src = "package main\nfunc main() {\n\tx := 1 + 2\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let ast = pkg.ast_of(0).unwrap();
        let body = func_body(ast);
        let offset = src.find("1 +").unwrap();
        let selection = Extent::new(offset, "1 +".len());
        let result = extract_local(&program, "main", 0, body, selection, "sum");
        assert!(result.log.has_errors());
    }
}
