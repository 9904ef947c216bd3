use crate::ids::{DeclId, ExprId, StmtId, TypeId};
use crate::token::Span;

/// One statement node. Mirrors the teacher's `Statement` enum shape
/// (`raya-parser/src/ast/statement.rs`): a flat sum with nested clause structs for
/// control-flow constructs, each block of statements stored as a `Vec<StmtId>` rather
/// than inlined so the CFG builder can treat "one statement = one block" uniformly per
/// spec.md §4.2.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_declaration(&self) -> bool {
        matches!(self.kind, StmtKind::Decl(_))
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(Vec<StmtId>),

    Assign {
        lhs: Vec<ExprId>,
        rhs: Vec<ExprId>,
        op: AssignOp,
    },
    ShortVarDecl {
        names: Vec<String>,
        values: Vec<ExprId>,
    },
    Decl(DeclId),
    IncDec {
        target: ExprId,
        inc: bool,
    },
    ExprStmt(ExprId),

    If {
        init: Option<StmtId>,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
        label: Option<String>,
    },
    ForRange {
        key: Option<ExprId>,
        value: Option<ExprId>,
        define: bool,
        range_expr: ExprId,
        body: StmtId,
        label: Option<String>,
    },
    Switch {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        cases: Vec<CaseClause>,
        label: Option<String>,
    },
    TypeSwitch {
        init: Option<StmtId>,
        /// Name bound by `v := e.(type)`, if any.
        binding: Option<String>,
        subject: ExprId,
        cases: Vec<TypeCaseClause>,
        label: Option<String>,
    },
    Select {
        comms: Vec<CommClause>,
        label: Option<String>,
    },

    Defer(ExprId),
    Go(ExprId),
    Return(Vec<ExprId>),
    Break(Option<String>),
    Continue(Option<String>),
    Goto(String),
    Fallthrough,
    Labeled {
        label: String,
        stmt: StmtId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Plain,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn is_compound(self) -> bool {
        !matches!(self, AssignOp::Plain)
    }
}

#[derive(Debug, Clone)]
pub struct CaseClause {
    /// Empty means `default`.
    pub values: Vec<ExprId>,
    pub body: Vec<StmtId>,
    pub fallthrough: bool,
}

#[derive(Debug, Clone)]
pub struct TypeCaseClause {
    /// Empty means `default`.
    pub types: Vec<TypeId>,
    pub body: Vec<StmtId>,
    /// The implicit variable synthesized for this clause (§3 Implicit variable), filled
    /// in by `godoctor-sema`'s binder; `None` until then.
    pub implicit_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommClause {
    pub comm: Option<StmtId>,
    pub body: Vec<StmtId>,
}
