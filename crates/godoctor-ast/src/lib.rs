//! Lexer, token, and AST definitions for the target language, plus a recursive-descent
//! parser producing an arena-allocated tree (spec §3 AST node, §9 design notes).

mod ast;
mod decl;
mod expr;
mod ids;
mod lexer;
mod parser;
mod stmt;
mod token;
mod types;
mod visitor;

pub use ast::Ast;
pub use decl::{Comment, CommentGroup, Decl, DeclKind, FileNode, FuncDecl, ImportDecl, Receiver, TypeDecl, VarDecl};
pub use expr::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
pub use ids::{DeclId, ExprId, StmtId, TypeId};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use stmt::{AssignOp, CaseClause, CommClause, Stmt, StmtKind, TypeCaseClause};
pub use token::{Keyword, Span, Token, TokenKind};
pub use types::{ChanDir, FunctionSig, MethodSig, Param, StructField, TypeKind, TypeNode};
pub use visitor::{walk_expr, walk_stmt, Visitor};
