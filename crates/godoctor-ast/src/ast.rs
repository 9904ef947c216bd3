use crate::decl::{Comment, CommentGroup, Decl, FileNode};
use crate::expr::Expr;
use crate::ids::{DeclId, ExprId, StmtId, TypeId};
use crate::stmt::Stmt;
use crate::types::TypeNode;

/// Arena-allocated AST for one file, per spec.md §9's recommendation: nodes referenced
/// by dense index rather than shared pointers, with side tables (built by
/// `godoctor-sema`) keyed by these ids.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    pub stmts: Vec<Stmt>,
    pub exprs: Vec<Expr>,
    pub types: Vec<TypeNode>,
    pub decls: Vec<Decl>,
    pub file: Option<FileNode>,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn alloc_type(&mut self, ty: TypeNode) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn ty(&self, id: TypeId) -> &TypeNode {
        &self.types[id.index()]
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn file(&self) -> &FileNode {
        self.file.as_ref().expect("Ast::file set after parsing")
    }

    pub fn group_comments(raw: Vec<crate::token::Token>, src: &str) -> Vec<CommentGroup> {
        let mut groups = Vec::new();
        let mut current: Vec<Comment> = Vec::new();
        let mut last_end: Option<usize> = None;
        for tok in raw {
            let crate::token::TokenKind::Comment(text) = tok.kind else { continue };
            let start = tok.span.start;
            let blank_line_between = match last_end {
                Some(end) => src[end..start].matches('\n').count() > 1,
                None => false,
            };
            if blank_line_between && !current.is_empty() {
                groups.push(CommentGroup { comments: std::mem::take(&mut current) });
            }
            current.push(Comment { text, span: tok.span });
            last_end = Some(tok.span.end);
        }
        if !current.is_empty() {
            groups.push(CommentGroup { comments: current });
        }
        groups
    }
}
