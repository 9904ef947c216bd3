use crate::ids::{ExprId, StmtId, TypeId};
use crate::token::Span;
use crate::types::Param;

/// A top-level or block-scoped declaration. Mirrors the teacher's declaration-statement
/// sub-structs (`raya-parser/src/ast/statement.rs`'s decl variants), generalized to this
/// language's `func`/`var`/`const`/`type`/`import` forms.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
}

impl Decl {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_exported(&self) -> bool {
        self.name()
            .and_then(|n| n.chars().next())
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Func(f) => Some(&f.name),
            DeclKind::Type(t) => Some(&t.name),
            DeclKind::Var(v) if v.names.len() == 1 => Some(&v.names[0]),
            DeclKind::Const(c) if c.names.len() == 1 => Some(&c.names[0]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Func(FuncDecl),
    Var(VarDecl),
    Const(VarDecl),
    Type(TypeDecl),
    Import(ImportDecl),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// `None` for a forward declaration / external function.
    pub body: Option<StmtId>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Receiver {
    pub name: Option<String>,
    pub ty: TypeId,
    pub pointer: bool,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub names: Vec<String>,
    pub ty: Option<TypeId>,
    pub values: Vec<ExprId>,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub ty: TypeId,
    pub doc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub alias: Option<String>,
}

/// The file's top-level node: package clause, declarations, and comment groups (§3).
#[derive(Debug, Clone)]
pub struct FileNode {
    pub package_name: String,
    pub decls: Vec<DeclId>,
    pub comment_groups: Vec<CommentGroup>,
}

#[derive(Debug, Clone)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}
