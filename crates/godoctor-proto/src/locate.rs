use godoctor_ast::{Ast, DeclKind, FuncDecl, StmtId, StmtKind};

/// Finds the top-level function declaration whose body contains `offset`, returning its
/// declaration, body statement, and the body's immediate statement list — the shape
/// `extract_function`/`extract_local` need (§4.6). Functions are not nested in Go, so a
/// single pass over top-level decls is enough.
pub fn enclosing_function(ast: &Ast, offset: usize) -> Option<(FuncDecl, StmtId, Vec<StmtId>)> {
    for &decl_id in &ast.file().decls {
        let DeclKind::Func(f) = &ast.decl(decl_id).kind else { continue };
        let Some(body) = f.body else { continue };
        let span = ast.stmt(body).span();
        if span.start <= offset && offset <= span.end {
            let siblings = match &ast.stmt(body).kind {
                StmtKind::Block(stmts) => stmts.clone(),
                _ => vec![body],
            };
            return Some((f.clone(), body, siblings));
        }
    }
    None
}

/// The innermost statement containing `offset`, descending through control-flow bodies
/// but not through the expressions inside a statement. Used by `toggle_var`, which
/// needs the exact declaration statement at a selection rather than an expression.
pub fn stmt_at(ast: &Ast, root: StmtId, offset: usize) -> Option<StmtId> {
    let span = ast.stmt(root).span();
    if !(span.start <= offset && offset <= span.end) {
        return None;
    }
    match &ast.stmt(root).kind {
        StmtKind::Block(stmts) => stmts.iter().find_map(|&s| stmt_at(ast, s, offset)).or(Some(root)),
        StmtKind::If { init, then_branch, else_branch, .. } => init
            .and_then(|s| stmt_at(ast, s, offset))
            .or_else(|| stmt_at(ast, *then_branch, offset))
            .or_else(|| else_branch.and_then(|e| stmt_at(ast, e, offset)))
            .or(Some(root)),
        StmtKind::For { init, post, body, .. } => init
            .and_then(|s| stmt_at(ast, s, offset))
            .or_else(|| post.and_then(|s| stmt_at(ast, s, offset)))
            .or_else(|| stmt_at(ast, *body, offset))
            .or(Some(root)),
        StmtKind::ForRange { body, .. } => stmt_at(ast, *body, offset).or(Some(root)),
        StmtKind::Labeled { stmt: inner, .. } => stmt_at(ast, *inner, offset).or(Some(root)),
        _ => Some(root),
    }
}
