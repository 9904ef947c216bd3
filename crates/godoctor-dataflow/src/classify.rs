use godoctor_ast::{Ast, AssignOp, ExprId, ExprKind, StmtId, StmtKind};
use godoctor_sema::{FileId, ObjectId, ObjectTable, Occurrence, Site};

/// What one statement contributes to a dataflow analysis (§4.3 classification rules).
#[derive(Debug, Default, Clone)]
pub struct StmtEffect {
    pub def: Vec<ObjectId>,
    pub uses: Vec<ObjectId>,
    /// Variables whose underlying storage is mutated through an index/field write
    /// without rebinding the variable itself (§4.3, §4.5's "updated" set).
    pub updated: Vec<ObjectId>,
}

/// Computes the def/use/updated sets for one statement, given the object table that
/// resolved its identifier occurrences. `file` identifies which file's occurrences to
/// look up (an `Occurrence` is file + site).
pub fn classify_stmt(ast: &Ast, table: &ObjectTable, file: FileId, stmt: StmtId) -> StmtEffect {
    let mut eff = StmtEffect::default();
    match &ast.stmt(stmt).kind {
        StmtKind::ShortVarDecl { names, values } => {
            for i in 0..names.len() {
                if let Some(obj) =
                    table.object_of(Occurrence::new(file, Site::ShortVarName(stmt, i as u32)))
                {
                    eff.def.push(obj);
                }
            }
            for &v in values {
                collect_uses(ast, table, file, v, &mut eff.uses);
            }
        }
        StmtKind::Decl(decl_id) => {
            if let godoctor_ast::DeclKind::Var(v) | godoctor_ast::DeclKind::Const(v) =
                &ast.decl(*decl_id).kind
            {
                // The binder records one def occurrence per DeclId (last name wins for
                // multi-name decls); mirror that here rather than per-name lookup.
                if let Some(obj) = table.object_of(Occurrence::new(file, Site::DeclName(*decl_id))) {
                    eff.def.push(obj);
                }
                for &val in &v.values {
                    collect_uses(ast, table, file, val, &mut eff.uses);
                }
            }
        }
        StmtKind::Assign { lhs, rhs, op } => {
            for &l in lhs {
                classify_assign_target(ast, table, file, l, *op, &mut eff);
            }
            for &r in rhs {
                collect_uses(ast, table, file, r, &mut eff.uses);
            }
        }
        StmtKind::IncDec { target, .. } => {
            if let Some(obj) = resolve_expr_object(table, file, *target) {
                eff.def.push(obj);
                eff.uses.push(obj);
            } else {
                collect_uses(ast, table, file, *target, &mut eff.uses);
            }
        }
        StmtKind::ExprStmt(e) | StmtKind::Defer(e) | StmtKind::Go(e) => {
            collect_uses(ast, table, file, *e, &mut eff.uses);
        }
        StmtKind::Return(vals) => {
            for &v in vals {
                collect_uses(ast, table, file, v, &mut eff.uses);
            }
        }
        StmtKind::If { cond, .. } => {
            collect_uses(ast, table, file, *cond, &mut eff.uses);
        }
        StmtKind::For { cond, .. } => {
            if let Some(c) = cond {
                collect_uses(ast, table, file, *c, &mut eff.uses);
            }
        }
        StmtKind::ForRange { key, value, range_expr, define, .. } => {
            collect_uses(ast, table, file, *range_expr, &mut eff.uses);
            if *define {
                if let Some(k) = key {
                    if let Some(obj) = resolve_expr_object(table, file, *k) {
                        eff.def.push(obj);
                    }
                }
                if let Some(v) = value {
                    if let Some(obj) = resolve_expr_object(table, file, *v) {
                        eff.def.push(obj);
                    }
                }
            } else {
                if let Some(k) = key {
                    collect_uses(ast, table, file, *k, &mut eff.uses);
                }
                if let Some(v) = value {
                    collect_uses(ast, table, file, *v, &mut eff.uses);
                }
            }
        }
        StmtKind::Switch { tag, .. } => {
            if let Some(t) = tag {
                collect_uses(ast, table, file, *t, &mut eff.uses);
            }
        }
        StmtKind::TypeSwitch { subject, .. } => {
            collect_uses(ast, table, file, *subject, &mut eff.uses);
        }
        StmtKind::Labeled { .. }
        | StmtKind::Block(_)
        | StmtKind::Select { .. }
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Goto(_)
        | StmtKind::Fallthrough => {}
    }
    eff
}

/// The synthesized implicit variable of a type-switch case clause is a def of that
/// clause (§4.3). Callers invoke this for the synthetic block representing a case's
/// head, separate from `classify_stmt`'s per-statement walk.
pub fn type_switch_implicit_def(
    implicits: &godoctor_sema::ImplicitsTable,
    file: FileId,
    stmt: StmtId,
    case_index: u32,
) -> Option<ObjectId> {
    implicits.get(file, stmt, case_index)
}

fn classify_assign_target(
    ast: &Ast,
    table: &ObjectTable,
    file: FileId,
    target: ExprId,
    op: AssignOp,
    eff: &mut StmtEffect,
) {
    match &ast.expr(target).kind {
        ExprKind::Index { base, index } => {
            if let Some(obj) = resolve_expr_object(table, file, *base) {
                eff.updated.push(obj);
                // `x[i] op= e` reads the prior value of `x` through the index
                // expression before storing into it (conservative reading, §9).
                if op.is_compound() {
                    eff.uses.push(obj);
                }
            } else {
                collect_uses(ast, table, file, *base, &mut eff.uses);
            }
            collect_uses(ast, table, file, *index, &mut eff.uses);
        }
        ExprKind::Selector { base, .. } => {
            if let Some(obj) = resolve_expr_object(table, file, *base) {
                eff.updated.push(obj);
            } else {
                collect_uses(ast, table, file, *base, &mut eff.uses);
            }
        }
        _ => {
            if let Some(obj) = resolve_expr_object(table, file, target) {
                eff.def.push(obj);
                if op.is_compound() {
                    eff.uses.push(obj);
                }
            } else {
                collect_uses(ast, table, file, target, &mut eff.uses);
            }
        }
    }
}

fn resolve_expr_object(table: &ObjectTable, file: FileId, expr: ExprId) -> Option<ObjectId> {
    table.object_of(Occurrence::new(file, Site::Expr(expr)))
}

fn collect_uses(ast: &Ast, table: &ObjectTable, file: FileId, expr: ExprId, out: &mut Vec<ObjectId>) {
    if let Some(obj) = resolve_expr_object(table, file, expr) {
        out.push(obj);
        return;
    }
    match &ast.expr(expr).kind {
        ExprKind::Binary { left, right, .. } => {
            collect_uses(ast, table, file, *left, out);
            collect_uses(ast, table, file, *right, out);
        }
        ExprKind::Unary { operand, .. } | ExprKind::Star(operand) | ExprKind::AddressOf(operand) | ExprKind::Paren(operand) => {
            collect_uses(ast, table, file, *operand, out);
        }
        ExprKind::Call { callee, args, .. } => {
            collect_uses(ast, table, file, *callee, out);
            for &a in args {
                collect_uses(ast, table, file, a, out);
            }
        }
        ExprKind::Selector { base, .. } => collect_uses(ast, table, file, *base, out),
        ExprKind::Index { base, index } => {
            collect_uses(ast, table, file, *base, out);
            collect_uses(ast, table, file, *index, out);
        }
        ExprKind::Slice { base, low, high, max } => {
            collect_uses(ast, table, file, *base, out);
            for e in [low, high, max].into_iter().flatten() {
                collect_uses(ast, table, file, *e, out);
            }
        }
        ExprKind::TypeAssert { base, .. } => collect_uses(ast, table, file, *base, out),
        ExprKind::CompositeLit { elements, .. } => {
            for (key, value) in elements {
                if let Some(k) = key {
                    collect_uses(ast, table, file, *k, out);
                }
                collect_uses(ast, table, file, *value, out);
            }
        }
        ExprKind::FuncLit { .. } | ExprKind::Ident(_) | ExprKind::Literal(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::Parser;
    use godoctor_sema::Binder;

    fn classify_first_stmt(src: &str) -> StmtEffect {
        let ast = Parser::parse_file(src).unwrap();
        let decl_id = ast.file().decls[0];
        let body = match &ast.decl(decl_id).kind {
            godoctor_ast::DeclKind::Func(fd) => fd.body.unwrap(),
            _ => unreachable!(),
        };
        let stmt = match &ast.stmt(body).kind {
            StmtKind::Block(stmts) => stmts[0],
            _ => unreachable!(),
        };
        let file: FileId = 0;
        let bound = Binder::bind("p", &[(file, ast.clone())]);
        classify_stmt(&ast, &bound.table, file, stmt)
    }

    #[test]
    fn plain_index_assignment_only_updates() {
        let eff = classify_first_stmt("package p\nfunc f(a []int, i int) {\n\ta[i] = 1\n}\n");
        assert_eq!(eff.updated.len(), 1);
        assert!(eff.uses.is_empty(), "a plain `=` must not mark the base as used");
    }

    #[test]
    fn compound_index_assignment_both_uses_and_updates() {
        let eff = classify_first_stmt("package p\nfunc f(a []int, i int) {\n\ta[i] += 1\n}\n");
        assert_eq!(eff.updated.len(), 1);
        assert_eq!(eff.uses.len(), 1);
        assert_eq!(eff.updated[0], eff.uses[0], "the compound read and the update target are the same object");
    }
}
