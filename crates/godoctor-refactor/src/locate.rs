use godoctor_ast::{Ast, ExprId, StmtId, StmtKind};
use godoctor_sema::{FileId, ObjectId, ObjectTable, Occurrence, Site};
use godoctor_text::Extent;

/// The innermost expression whose span contains `selection`, found by walking every
/// declaration's body (§6 `Program.path_enclosing_interval`, narrowed to "smallest
/// enclosing expression" since that is all the refactorings in this crate need).
pub fn innermost_expr_at(ast: &Ast, selection: Extent) -> Option<ExprId> {
    let mut best: Option<ExprId> = None;
    for &decl_id in &ast.file().decls {
        if let godoctor_ast::DeclKind::Func(f) = &ast.decl(decl_id).kind {
            if let Some(body) = f.body {
                find_in_stmt(ast, body, selection, &mut best);
            }
        }
    }
    best
}

fn find_in_stmt(ast: &Ast, stmt: StmtId, selection: Extent, best: &mut Option<ExprId>) {
    struct Finder<'a> {
        ast: &'a Ast,
        selection: Extent,
        best: &'a mut Option<ExprId>,
    }
    impl<'a> godoctor_ast::Visitor for Finder<'a> {
        fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
            let span = ast.expr(id).span();
            let extent = Extent::new(span.start, span.end - span.start);
            if extent.offset <= self.selection.offset && self.selection.end() <= extent.end() {
                *self.best = Some(id);
            }
            godoctor_ast::walk_expr(self, ast, id);
        }
    }
    let mut finder = Finder { ast, selection, best };
    godoctor_ast::Visitor::visit_stmt(&mut finder, ast, stmt);
}

/// Resolves the identifier at `selection` to its semantic object, by finding the
/// smallest enclosing `Ident` expression and looking it up in the object table.
pub fn object_at(ast: &Ast, table: &ObjectTable, file: FileId, selection: Extent) -> Option<ObjectId> {
    let expr = innermost_expr_at(ast, selection)?;
    if !matches!(ast.expr(expr).kind, godoctor_ast::ExprKind::Ident(_)) {
        return None;
    }
    table.object_of(Occurrence::new(file, Site::Expr(expr)))
}

/// Finds the statement at `selection` that binds a type-switch (`v := e.(type)`), if
/// the selection lands anywhere within it.
pub fn type_switch_at(ast: &Ast, selection: Extent) -> Option<StmtId> {
    fn search(ast: &Ast, stmt: StmtId, selection: Extent) -> Option<StmtId> {
        match &ast.stmt(stmt).kind {
            StmtKind::TypeSwitch { .. } => {
                let span = ast.stmt(stmt).span();
                let extent = Extent::new(span.start, span.end - span.start);
                if extent.contains(selection.offset) {
                    return Some(stmt);
                }
                None
            }
            StmtKind::Block(stmts) => stmts.iter().find_map(|&s| search(ast, s, selection)),
            StmtKind::If { then_branch, else_branch, .. } => search(ast, *then_branch, selection)
                .or_else(|| else_branch.and_then(|e| search(ast, e, selection))),
            StmtKind::For { body, .. } | StmtKind::ForRange { body, .. } => search(ast, *body, selection),
            StmtKind::Labeled { stmt: inner, .. } => search(ast, *inner, selection),
            _ => None,
        }
    }
    for &decl_id in &ast.file().decls {
        if let godoctor_ast::DeclKind::Func(f) = &ast.decl(decl_id).kind {
            if let Some(body) = f.body {
                if let Some(found) = search(ast, body, selection) {
                    return Some(found);
                }
            }
        }
    }
    None
}
