use crate::ast::Ast;
use crate::expr::ExprKind;
use crate::ids::{ExprId, StmtId};
use crate::stmt::StmtKind;

/// Read-only tree walk over an `Ast`, mirroring the teacher's `Visitor` trait shape
/// (`raya-parser/src/ast/visitor.rs`): one method per node category, default bodies
/// recurse into children so callers override only what they need.
pub trait Visitor {
    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        walk_stmt(self, ast, id);
    }

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        walk_expr(self, ast, id);
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, id: StmtId) {
    match &ast.stmt(id).kind {
        StmtKind::Block(stmts) => {
            for &s in stmts {
                v.visit_stmt(ast, s);
            }
        }
        StmtKind::Assign { lhs, rhs, .. } => {
            for &e in lhs.iter().chain(rhs.iter()) {
                v.visit_expr(ast, e);
            }
        }
        StmtKind::ShortVarDecl { values, .. } => {
            for &e in values {
                v.visit_expr(ast, e);
            }
        }
        StmtKind::Decl(_) => {}
        StmtKind::IncDec { target, .. } => v.visit_expr(ast, *target),
        StmtKind::ExprStmt(e) => v.visit_expr(ast, *e),
        StmtKind::If { init, cond, then_branch, else_branch } => {
            if let Some(s) = init {
                v.visit_stmt(ast, *s);
            }
            v.visit_expr(ast, *cond);
            v.visit_stmt(ast, *then_branch);
            if let Some(s) = else_branch {
                v.visit_stmt(ast, *s);
            }
        }
        StmtKind::For { init, cond, post, body, .. } => {
            if let Some(s) = init {
                v.visit_stmt(ast, *s);
            }
            if let Some(e) = cond {
                v.visit_expr(ast, *e);
            }
            if let Some(s) = post {
                v.visit_stmt(ast, *s);
            }
            v.visit_stmt(ast, *body);
        }
        StmtKind::ForRange { key, value, range_expr, body, .. } => {
            if let Some(e) = key {
                v.visit_expr(ast, *e);
            }
            if let Some(e) = value {
                v.visit_expr(ast, *e);
            }
            v.visit_expr(ast, *range_expr);
            v.visit_stmt(ast, *body);
        }
        StmtKind::Switch { init, tag, cases, .. } => {
            if let Some(s) = init {
                v.visit_stmt(ast, *s);
            }
            if let Some(e) = tag {
                v.visit_expr(ast, *e);
            }
            for case in cases {
                for &e in &case.values {
                    v.visit_expr(ast, e);
                }
                for &s in &case.body {
                    v.visit_stmt(ast, s);
                }
            }
        }
        StmtKind::TypeSwitch { init, subject, cases, .. } => {
            if let Some(s) = init {
                v.visit_stmt(ast, *s);
            }
            v.visit_expr(ast, *subject);
            for case in cases {
                for &s in &case.body {
                    v.visit_stmt(ast, s);
                }
            }
        }
        StmtKind::Select { comms, .. } => {
            for comm in comms {
                if let Some(s) = comm.comm {
                    v.visit_stmt(ast, s);
                }
                for &s in &comm.body {
                    v.visit_stmt(ast, s);
                }
            }
        }
        StmtKind::Defer(e) | StmtKind::Go(e) => v.visit_expr(ast, *e),
        StmtKind::Return(exprs) => {
            for &e in exprs {
                v.visit_expr(ast, e);
            }
        }
        StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Goto(_)
        | StmtKind::Fallthrough => {}
        StmtKind::Labeled { stmt, .. } => v.visit_stmt(ast, *stmt),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, ast: &Ast, id: ExprId) {
    match &ast.expr(id).kind {
        ExprKind::Ident(_) | ExprKind::Literal(_) => {}
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(ast, *left);
            v.visit_expr(ast, *right);
        }
        ExprKind::Unary { operand, .. } | ExprKind::Star(operand) | ExprKind::AddressOf(operand) | ExprKind::Paren(operand) => {
            v.visit_expr(ast, *operand);
        }
        ExprKind::Call { callee, args, .. } => {
            v.visit_expr(ast, *callee);
            for &a in args {
                v.visit_expr(ast, a);
            }
        }
        ExprKind::Selector { base, .. } => v.visit_expr(ast, *base),
        ExprKind::Index { base, index } => {
            v.visit_expr(ast, *base);
            v.visit_expr(ast, *index);
        }
        ExprKind::Slice { base, low, high, max } => {
            v.visit_expr(ast, *base);
            for e in [low, high, max].into_iter().flatten() {
                v.visit_expr(ast, *e);
            }
        }
        ExprKind::TypeAssert { base, .. } => v.visit_expr(ast, *base),
        ExprKind::CompositeLit { elements, .. } => {
            for (k, val) in elements {
                if let Some(k) = k {
                    v.visit_expr(ast, *k);
                }
                v.visit_expr(ast, *val);
            }
        }
        ExprKind::FuncLit { body, .. } => v.visit_stmt(ast, *body),
    }
}
