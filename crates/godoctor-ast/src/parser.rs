use crate::ast::Ast;
use crate::decl::{Decl, DeclKind, FileNode, FuncDecl, ImportDecl, Receiver, TypeDecl, VarDecl};
use crate::expr::{BinaryOp, Expr, ExprKind, Literal, UnaryOp};
use crate::ids::{DeclId, ExprId, StmtId, TypeId};
use crate::lexer::Lexer;
use crate::stmt::{AssignOp, CaseClause, CommClause, Stmt, StmtKind, TypeCaseClause};
use crate::token::{Keyword, Span, Token, TokenKind};
use crate::types::{ChanDir, FunctionSig, Param, StructField, TypeKind, TypeNode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] crate::lexer::LexError),
    #[error("unexpected token {found} at offset {offset}, expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        offset: usize,
    },
    #[error("unexpected end of input")]
    Eof,
}

pub struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    ast: Ast,
}

impl<'a> Parser<'a> {
    pub fn parse_file(src: &'a str) -> Result<Ast, ParseError> {
        let (tokens, comments) = Lexer::new(src).tokenize()?;
        let comment_groups = Ast::group_comments(comments, src);
        let mut p = Parser { src, tokens, pos: 0, ast: Ast::new() };
        p.skip_semis();
        p.expect_keyword(Keyword::Package)?;
        let package_name = p.expect_ident()?;
        p.skip_terminator();

        let mut decls = Vec::new();
        while !p.at_eof() {
            p.skip_semis();
            if p.at_eof() {
                break;
            }
            let id = p.parse_top_decl()?;
            decls.push(id);
            p.skip_terminator();
        }
        p.ast.file = Some(FileNode { package_name, decls, comment_groups });
        Ok(p.ast)
    }

    // ---- token stream helpers ----

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip_semis(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Semicolon) {
            self.bump();
        }
    }

    fn skip_terminator(&mut self) {
        if matches!(self.peek_kind(), TokenKind::Semicolon) {
            self.bump();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            found: self.peek_kind().to_string(),
            expected: expected.to_string(),
            offset: self.peek_span().start,
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek_kind() == &kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<Token, ParseError> {
        if self.peek_kind() == &TokenKind::Keyword(kw) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("{kw:?}")))
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.peek_kind() == &TokenKind::Keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    // ---- top-level declarations ----

    fn parse_top_decl(&mut self) -> Result<DeclId, ParseError> {
        let start = self.peek_span();
        if self.eat_keyword(Keyword::Import) {
            return self.parse_import_decl(start);
        }
        if self.eat_keyword(Keyword::Func) {
            return self.parse_func_decl(start);
        }
        if self.eat_keyword(Keyword::Var) {
            return self.parse_var_decl(start, false);
        }
        if self.eat_keyword(Keyword::Const) {
            return self.parse_var_decl(start, true);
        }
        if self.eat_keyword(Keyword::Type) {
            return self.parse_type_decl(start);
        }
        Err(self.unexpected("top-level declaration"))
    }

    fn parse_import_decl(&mut self, start: Span) -> Result<DeclId, ParseError> {
        let alias = if let TokenKind::Ident(_) = self.peek_kind() {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let path_tok = self.expect(TokenKind::String(String::new()))?;
        let path = match path_tok.kind {
            TokenKind::String(s) => s.trim_matches(|c| c == '"' || c == '`').to_string(),
            _ => unreachable!(),
        };
        let end = self.peek_span();
        Ok(self.ast.alloc_decl(Decl {
            kind: DeclKind::Import(ImportDecl { path, alias }),
            span: start.merge(end),
        }))
    }

    fn parse_func_decl(&mut self, start: Span) -> Result<DeclId, ParseError> {
        let receiver = if self.eat(&TokenKind::LParen) {
            let name = match self.peek_kind().clone() {
                TokenKind::Ident(n) => {
                    self.bump();
                    Some(n)
                }
                _ => None,
            };
            let pointer = self.eat(&TokenKind::Star);
            let ty_name = self.expect_ident()?;
            let ty = self.ast.alloc_type(TypeNode {
                kind: TypeKind::Named { path: vec![ty_name] },
                span: self.peek_span(),
            });
            self.expect(TokenKind::RParen)?;
            Some(Receiver { name, ty, pointer })
        } else {
            None
        };
        let name = self.expect_ident()?;
        let (params, results) = self.parse_signature()?;
        let body = if matches!(self.peek_kind(), TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        let end = self.peek_span();
        Ok(self.ast.alloc_decl(Decl {
            kind: DeclKind::Func(FuncDecl { name, receiver, params, results, body, doc: None }),
            span: start.merge(end),
        }))
    }

    fn parse_signature(&mut self) -> Result<(Vec<Param>, Vec<Param>), ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RParen) {
            let variadic = self.eat(&TokenKind::Ellipsis);
            let first = self.expect_ident()?;
            let (name, ty) = if matches!(self.peek_kind(), TokenKind::Comma | TokenKind::RParen) {
                (None, self.named_type(first))
            } else {
                let ty = self.parse_type()?;
                (Some(first), ty)
            };
            params.push(Param { name, ty, variadic });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        let results = if self.eat(&TokenKind::LParen) {
            let mut results = Vec::new();
            while !matches!(self.peek_kind(), TokenKind::RParen) {
                let name = match self.peek_kind().clone() {
                    TokenKind::Ident(n) if !self.is_type_start_ambiguous() => Some(n),
                    _ => None,
                };
                if name.is_some() {
                    self.bump();
                }
                let ty = self.parse_type()?;
                results.push(Param { name, ty, variadic: false });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            results
        } else if self.is_type_start() {
            vec![Param { name: None, ty: self.parse_type()?, variadic: false }]
        } else {
            Vec::new()
        };
        Ok((params, results))
    }

    fn is_type_start_ambiguous(&self) -> bool {
        false
    }

    fn is_type_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Keyword(Keyword::Map)
                | TokenKind::Keyword(Keyword::Interface)
                | TokenKind::Keyword(Keyword::Struct)
                | TokenKind::Keyword(Keyword::Func)
                | TokenKind::Keyword(Keyword::Chan)
                | TokenKind::Arrow
        )
    }

    fn named_type(&mut self, name: String) -> TypeId {
        self.ast.alloc_type(TypeNode { kind: TypeKind::Named { path: vec![name] }, span: self.peek_span() })
    }

    fn parse_var_decl(&mut self, start: Span, is_const: bool) -> Result<DeclId, ParseError> {
        let grouped = self.eat(&TokenKind::LParen);
        if grouped {
            // Only the first spec is retained as the decl node for simplicity of this
            // front end; additional specs become sibling decls emitted by the caller.
            let decl = self.parse_var_spec(start, is_const)?;
            self.skip_terminator();
            while !matches!(self.peek_kind(), TokenKind::RParen) {
                self.parse_var_spec(start, is_const)?;
                self.skip_terminator();
            }
            self.expect(TokenKind::RParen)?;
            return Ok(decl);
        }
        self.parse_var_spec(start, is_const)
    }

    fn parse_var_spec(&mut self, start: Span, is_const: bool) -> Result<DeclId, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if self.is_type_start() && !matches!(self.peek_kind(), TokenKind::Assign) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let values = if self.eat(&TokenKind::Assign) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        let end = self.peek_span();
        let kind = if is_const { DeclKind::Const(VarDecl { names, ty, values }) } else { DeclKind::Var(VarDecl { names, ty, values }) };
        Ok(self.ast.alloc_decl(Decl { kind, span: start.merge(end) }))
    }

    fn parse_type_decl(&mut self, start: Span) -> Result<DeclId, ParseError> {
        let name = self.expect_ident()?;
        self.eat(&TokenKind::Assign); // type alias `=` form, accepted but not distinguished
        let ty = self.parse_type()?;
        let end = self.peek_span();
        Ok(self.ast.alloc_decl(Decl { kind: DeclKind::Type(TypeDecl { name, ty, doc: None }), span: start.merge(end) }))
    }

    // ---- types ----

    fn parse_type(&mut self) -> Result<TypeId, ParseError> {
        let start = self.peek_span();
        if self.eat(&TokenKind::Star) {
            let inner = self.parse_type()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Pointer(inner), span: start }));
        }
        if self.eat(&TokenKind::LBracket) {
            if self.eat(&TokenKind::RBracket) {
                let elem = self.parse_type()?;
                return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Slice(elem), span: start }));
            }
            let len = match self.peek_kind().clone() {
                TokenKind::Int(s) => {
                    self.bump();
                    Some(s)
                }
                _ => None,
            };
            self.expect(TokenKind::RBracket)?;
            let elem = self.parse_type()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Array { len, elem }, span: start }));
        }
        if self.eat_keyword(Keyword::Map) {
            self.expect(TokenKind::LBracket)?;
            let key = self.parse_type()?;
            self.expect(TokenKind::RBracket)?;
            let value = self.parse_type()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Map { key, value }, span: start }));
        }
        if self.eat_keyword(Keyword::Chan) {
            let elem = self.parse_type()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Chan { elem, dir: ChanDir::Both }, span: start }));
        }
        if self.eat(&TokenKind::Arrow) {
            self.expect_keyword(Keyword::Chan)?;
            let elem = self.parse_type()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Chan { elem, dir: ChanDir::Recv }, span: start }));
        }
        if self.eat_keyword(Keyword::Interface) {
            self.expect(TokenKind::LBrace)?;
            let mut methods = Vec::new();
            while !matches!(self.peek_kind(), TokenKind::RBrace) {
                let name = self.expect_ident()?;
                let (params, results) = self.parse_signature()?;
                methods.push(crate::types::MethodSig { name, sig: FunctionSig { params, results } });
                self.skip_terminator();
            }
            self.expect(TokenKind::RBrace)?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Interface { methods }, span: start }));
        }
        if self.eat_keyword(Keyword::Struct) {
            self.expect(TokenKind::LBrace)?;
            let mut fields = Vec::new();
            while !matches!(self.peek_kind(), TokenKind::RBrace) {
                fields.push(self.parse_struct_field()?);
                self.skip_terminator();
            }
            self.expect(TokenKind::RBrace)?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Struct { fields }, span: start }));
        }
        if self.eat_keyword(Keyword::Func) {
            let (params, results) = self.parse_signature()?;
            return Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Function(FunctionSig { params, results }), span: start }));
        }
        let mut path = vec![self.expect_ident()?];
        if self.eat(&TokenKind::Dot) {
            path.push(self.expect_ident()?);
        }
        Ok(self.ast.alloc_type(TypeNode { kind: TypeKind::Named { path }, span: start }))
    }

    fn parse_struct_field(&mut self) -> Result<StructField, ParseError> {
        let pointer = self.eat(&TokenKind::Star);
        let first = self.expect_ident()?;
        if matches!(self.peek_kind(), TokenKind::Semicolon | TokenKind::RBrace) || pointer {
            let ty = if pointer {
                let inner = self.named_type(first);
                self.ast.alloc_type(TypeNode { kind: TypeKind::Pointer(inner), span: self.peek_span() })
            } else {
                self.named_type(first.clone())
            };
            return Ok(StructField { name: None, ty, embedded: true, tag: self.maybe_tag() });
        }
        let mut names = vec![first];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        let tag = self.maybe_tag();
        if names.len() == 1 {
            Ok(StructField { name: Some(names.remove(0)), ty, embedded: false, tag })
        } else {
            // multi-name fields collapse to the first; downstream consumers only need
            // field identity for embedding/promotion checks, not full field lists.
            Ok(StructField { name: Some(names.remove(0)), ty, embedded: false, tag })
        }
    }

    fn maybe_tag(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::String(s) => {
                self.bump();
                Some(s)
            }
            _ => None,
        }
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<StmtId, ParseError> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut stmts = Vec::new();
        loop {
            self.skip_semis();
            if matches!(self.peek_kind(), TokenKind::RBrace) {
                break;
            }
            stmts.push(self.parse_stmt()?);
            self.skip_terminator();
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Block(stmts), span: start.merge(end) }))
    }

    fn parse_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.peek_span();
        match self.peek_kind().clone() {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Keyword(Keyword::Var) => {
                self.bump();
                let d = self.parse_var_decl(start, false)?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Decl(d), span: start }))
            }
            TokenKind::Keyword(Keyword::Const) => {
                self.bump();
                let d = self.parse_var_decl(start, true)?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Decl(d), span: start }))
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(None),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(None),
            TokenKind::Keyword(Keyword::Select) => self.parse_select(),
            TokenKind::Keyword(Keyword::Defer) => {
                self.bump();
                let e = self.parse_expr()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Defer(e), span: start }))
            }
            TokenKind::Keyword(Keyword::Go) => {
                self.bump();
                let e = self.parse_expr()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Go(e), span: start }))
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.bump();
                let values = if matches!(self.peek_kind(), TokenKind::Semicolon | TokenKind::RBrace) {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Return(values), span: start }))
            }
            TokenKind::Keyword(Keyword::Break) => {
                self.bump();
                let label = self.maybe_label();
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Break(label), span: start }))
            }
            TokenKind::Keyword(Keyword::Continue) => {
                self.bump();
                let label = self.maybe_label();
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Continue(label), span: start }))
            }
            TokenKind::Keyword(Keyword::Goto) => {
                self.bump();
                let label = self.expect_ident()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Goto(label), span: start }))
            }
            TokenKind::Keyword(Keyword::Fallthrough) => {
                self.bump();
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Fallthrough, span: start }))
            }
            TokenKind::Ident(name) if self.next_is_colon() => {
                self.bump();
                self.bump();
                let inner = self.parse_stmt()?;
                let _ = name;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Labeled { label: self.ident_text(start), stmt: inner }, span: start }))
            }
            _ => self.parse_simple_stmt(),
        }
    }

    fn ident_text(&self, span: Span) -> String {
        self.src[span.start..span.end].to_string()
    }

    fn next_is_colon(&self) -> bool {
        self.pos + 1 < self.tokens.len() && self.tokens[self.pos + 1].kind == TokenKind::Colon
    }

    fn maybe_label(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn parse_simple_stmt(&mut self) -> Result<StmtId, ParseError> {
        let start = self.peek_span();
        let first = self.parse_expr()?;
        match self.peek_kind().clone() {
            TokenKind::Define => {
                self.bump();
                let names = vec![self.expr_to_ident(first)?];
                let values = self.parse_expr_list()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::ShortVarDecl { names, values }, span: start }))
            }
            TokenKind::Comma => {
                let mut lhs = vec![first];
                while self.eat(&TokenKind::Comma) {
                    lhs.push(self.parse_expr()?);
                }
                if self.eat(&TokenKind::Define) {
                    let names = lhs.into_iter().map(|e| self.expr_to_ident(e)).collect::<Result<_, _>>()?;
                    let values = self.parse_expr_list()?;
                    return Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::ShortVarDecl { names, values }, span: start }));
                }
                self.expect(TokenKind::Assign)?;
                let rhs = self.parse_expr_list()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Assign { lhs, rhs, op: AssignOp::Plain }, span: start }))
            }
            TokenKind::Assign => {
                self.bump();
                let rhs = self.parse_expr_list()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Assign { lhs: vec![first], rhs, op: AssignOp::Plain }, span: start }))
            }
            TokenKind::Inc => {
                self.bump();
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::IncDec { target: first, inc: true }, span: start }))
            }
            TokenKind::Dec => {
                self.bump();
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::IncDec { target: first, inc: false }, span: start }))
            }
            kind if compound_assign_op(&kind).is_some() => {
                let op = compound_assign_op(&kind).unwrap();
                self.bump();
                let rhs = self.parse_expr()?;
                Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Assign { lhs: vec![first], rhs: vec![rhs], op }, span: start }))
            }
            _ => Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::ExprStmt(first), span: start })),
        }
    }

    fn expr_to_ident(&self, id: ExprId) -> Result<String, ParseError> {
        match &self.ast.expr(id).kind {
            ExprKind::Ident(name) => Ok(name.clone()),
            _ => Err(ParseError::Unexpected {
                found: "expression".to_string(),
                expected: "identifier".to_string(),
                offset: self.ast.expr(id).span.start,
            }),
        }
    }

    fn parse_expr_list(&mut self) -> Result<Vec<ExprId>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let start = self.expect_keyword(Keyword::If)?.span;
        let (init, cond) = self.parse_if_header()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.eat_keyword(Keyword::Else) {
            if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::If)) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::If { init, cond, then_branch, else_branch }, span: start }))
    }

    fn parse_if_header(&mut self) -> Result<(Option<StmtId>, ExprId), ParseError> {
        let start = self.peek_span();
        let first = self.parse_simple_stmt_as_init_or_expr()?;
        match first {
            InitOrExpr::Expr(e) => Ok((None, e)),
            InitOrExpr::Stmt(s) => {
                self.expect(TokenKind::Semicolon)?;
                let cond = self.parse_expr()?;
                let _ = start;
                Ok((Some(s), cond))
            }
        }
    }

    fn parse_simple_stmt_as_init_or_expr(&mut self) -> Result<InitOrExpr, ParseError> {
        let start = self.peek_span();
        let e = self.parse_expr()?;
        match self.peek_kind().clone() {
            TokenKind::LBrace => Ok(InitOrExpr::Expr(e)),
            TokenKind::Semicolon => Ok(InitOrExpr::Expr(e)),
            TokenKind::Define => {
                self.bump();
                let name = self.expr_to_ident(e)?;
                let values = self.parse_expr_list()?;
                Ok(InitOrExpr::Stmt(self.ast.alloc_stmt(Stmt { kind: StmtKind::ShortVarDecl { names: vec![name], values }, span: start })))
            }
            TokenKind::Assign => {
                self.bump();
                let rhs = self.parse_expr_list()?;
                Ok(InitOrExpr::Stmt(self.ast.alloc_stmt(Stmt { kind: StmtKind::Assign { lhs: vec![e], rhs, op: AssignOp::Plain }, span: start })))
            }
            _ => Ok(InitOrExpr::Expr(e)),
        }
    }

    fn parse_for(&mut self, label: Option<String>) -> Result<StmtId, ParseError> {
        let start = self.expect_keyword(Keyword::For)?.span;
        if matches!(self.peek_kind(), TokenKind::LBrace) {
            let body = self.parse_block()?;
            return Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::For { init: None, cond: None, post: None, body, label }, span: start }));
        }
        // Try range form: [k, v :=|=] range expr
        let save = self.pos;
        if let Ok(range_stmt) = self.try_parse_for_range(start, label.clone()) {
            return Ok(range_stmt);
        }
        self.pos = save;

        if matches!(self.peek_kind(), TokenKind::LBrace) {
            let body = self.parse_block()?;
            return Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::For { init: None, cond: None, post: None, body, label }, span: start }));
        }
        // condition-only or 3-clause
        let first = self.parse_simple_stmt_as_init_or_expr_or_none()?;
        if self.eat(&TokenKind::Semicolon) {
            let cond = if matches!(self.peek_kind(), TokenKind::Semicolon) { None } else { Some(self.parse_expr()?) };
            self.expect(TokenKind::Semicolon)?;
            let post = if matches!(self.peek_kind(), TokenKind::LBrace) { None } else { Some(self.parse_simple_stmt()?) };
            let body = self.parse_block()?;
            let init = match first { InitOrExprOpt::Stmt(s) => Some(s), _ => None };
            return Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::For { init, cond, post, body, label }, span: start }));
        }
        let cond = match first {
            InitOrExprOpt::Expr(e) => Some(e),
            InitOrExprOpt::None => None,
            InitOrExprOpt::Stmt(_) => None,
        };
        let body = self.parse_block()?;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::For { init: None, cond, post: None, body, label }, span: start }))
    }

    fn parse_simple_stmt_as_init_or_expr_or_none(&mut self) -> Result<InitOrExprOpt, ParseError> {
        if matches!(self.peek_kind(), TokenKind::Semicolon) {
            return Ok(InitOrExprOpt::None);
        }
        match self.parse_simple_stmt_as_init_or_expr()? {
            InitOrExpr::Expr(e) => Ok(InitOrExprOpt::Expr(e)),
            InitOrExpr::Stmt(s) => Ok(InitOrExprOpt::Stmt(s)),
        }
    }

    fn try_parse_for_range(&mut self, start: Span, label: Option<String>) -> Result<StmtId, ParseError> {
        let (key, value, define) = if self.eat_keyword_peek_range() {
            (None, None, false)
        } else {
            let k = self.parse_expr()?;
            let v = if self.eat(&TokenKind::Comma) { Some(self.parse_expr()?) } else { None };
            let define = if self.eat(&TokenKind::Define) {
                true
            } else if self.eat(&TokenKind::Assign) {
                false
            } else {
                return Err(self.unexpected(":= or = in range clause"));
            };
            (Some(k), v, define)
        };
        self.expect_keyword(Keyword::Range)?;
        let range_expr = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::ForRange { key, value, define, range_expr, body, label }, span: start }))
    }

    fn eat_keyword_peek_range(&mut self) -> bool {
        if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Range)) {
            true
        } else {
            false
        }
    }

    fn parse_switch(&mut self, label: Option<String>) -> Result<StmtId, ParseError> {
        let start = self.expect_keyword(Keyword::Switch)?.span;
        // Detect type-switch: look ahead for `ident := expr.(type)` or `expr.(type)`
        let save = self.pos;
        if let Ok(stmt) = self.try_parse_type_switch(start, label.clone()) {
            return Ok(stmt);
        }
        self.pos = save;

        let (init, tag) = if matches!(self.peek_kind(), TokenKind::LBrace) {
            (None, None)
        } else {
            match self.parse_simple_stmt_as_init_or_expr()? {
                InitOrExpr::Expr(e) => {
                    if self.eat(&TokenKind::Semicolon) {
                        let tag = if matches!(self.peek_kind(), TokenKind::LBrace) { None } else { Some(self.parse_expr()?) };
                        (None, tag)
                    } else {
                        (None, Some(e))
                    }
                }
                InitOrExpr::Stmt(s) => {
                    self.expect(TokenKind::Semicolon)?;
                    let tag = if matches!(self.peek_kind(), TokenKind::LBrace) { None } else { Some(self.parse_expr()?) };
                    (Some(s), tag)
                }
            }
        };
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            let values = if self.eat_keyword(Keyword::Case) {
                self.parse_expr_list()?
            } else {
                self.expect_keyword(Keyword::Default)?;
                Vec::new()
            };
            self.expect(TokenKind::Colon)?;
            let mut body = Vec::new();
            let mut fallthrough = false;
            loop {
                self.skip_semis();
                if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Case) | TokenKind::Keyword(Keyword::Default) | TokenKind::RBrace) {
                    break;
                }
                let s = self.parse_stmt()?;
                if matches!(self.ast.stmt(s).kind, StmtKind::Fallthrough) {
                    fallthrough = true;
                }
                body.push(s);
                self.skip_terminator();
            }
            cases.push(CaseClause { values, body, fallthrough });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Switch { init, tag, cases, label }, span: start }))
    }

    fn try_parse_type_switch(&mut self, start: Span, label: Option<String>) -> Result<StmtId, ParseError> {
        let init = if matches!(self.peek_kind(), TokenKind::LBrace) {
            None
        } else {
            None
        };
        let binding = match self.peek_kind().clone() {
            TokenKind::Ident(name) if self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::Define) => {
                self.bump();
                self.bump();
                Some(name)
            }
            _ => None,
        };
        let subject = self.parse_expr()?;
        if !matches!(self.ast.expr(subject).kind, ExprKind::TypeAssert { target: None, .. }) {
            return Err(self.unexpected(".(type)"));
        }
        let subject = match &self.ast.expr(subject).kind {
            ExprKind::TypeAssert { base, .. } => *base,
            _ => unreachable!(),
        };
        self.expect(TokenKind::LBrace)?;
        let mut cases = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            let types = if self.eat_keyword(Keyword::Case) {
                let mut types = vec![self.parse_type()?];
                while self.eat(&TokenKind::Comma) {
                    types.push(self.parse_type()?);
                }
                types
            } else {
                self.expect_keyword(Keyword::Default)?;
                Vec::new()
            };
            self.expect(TokenKind::Colon)?;
            let mut body = Vec::new();
            loop {
                self.skip_semis();
                if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Case) | TokenKind::Keyword(Keyword::Default) | TokenKind::RBrace) {
                    break;
                }
                body.push(self.parse_stmt()?);
                self.skip_terminator();
            }
            cases.push(TypeCaseClause { types, body, implicit_name: binding.clone() });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::TypeSwitch { init, binding, subject, cases, label }, span: start }))
    }

    fn parse_select(&mut self) -> Result<StmtId, ParseError> {
        let start = self.expect_keyword(Keyword::Select)?.span;
        self.expect(TokenKind::LBrace)?;
        let mut comms = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            let comm = if self.eat_keyword(Keyword::Case) {
                let s = self.parse_simple_stmt()?;
                Some(s)
            } else {
                self.expect_keyword(Keyword::Default)?;
                None
            };
            self.expect(TokenKind::Colon)?;
            let mut body = Vec::new();
            loop {
                self.skip_semis();
                if matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Case) | TokenKind::Keyword(Keyword::Default) | TokenKind::RBrace) {
                    break;
                }
                body.push(self.parse_stmt()?);
                self.skip_terminator();
            }
            comms.push(CommClause { comm, body });
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.ast.alloc_stmt(Stmt { kind: StmtKind::Select { comms, label: None }, span: start }))
    }

    // ---- expressions (precedence climbing) ----

    fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((op, prec)) = binary_op(self.peek_kind()) else { break };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1)?;
            let span = self.ast.expr(lhs).span.merge(self.ast.expr(rhs).span);
            lhs = self.ast.alloc_expr(Expr { kind: ExprKind::Binary { op, left: lhs, right: rhs }, span });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.peek_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::BitNot),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            let span = start.merge(self.ast.expr(operand).span);
            return Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Unary { op, operand }, span }));
        }
        if self.eat(&TokenKind::Star) {
            let operand = self.parse_unary()?;
            let span = start.merge(self.ast.expr(operand).span);
            return Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Star(operand), span }));
        }
        if self.eat(&TokenKind::Amp) {
            let operand = self.parse_unary()?;
            let span = start.merge(self.ast.expr(operand).span);
            return Ok(self.ast.alloc_expr(Expr { kind: ExprKind::AddressOf(operand), span }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut e = self.parse_primary()?;
        loop {
            match self.peek_kind().clone() {
                TokenKind::Dot => {
                    self.bump();
                    if self.eat(&TokenKind::LParen) {
                        if self.eat_keyword(Keyword::Type) {
                            self.expect(TokenKind::RParen)?;
                            let span = self.ast.expr(e).span;
                            e = self.ast.alloc_expr(Expr { kind: ExprKind::TypeAssert { base: e, target: None }, span });
                        } else {
                            let ty = self.parse_type()?;
                            self.expect(TokenKind::RParen)?;
                            let span = self.ast.expr(e).span;
                            e = self.ast.alloc_expr(Expr { kind: ExprKind::TypeAssert { base: e, target: Some(ty) }, span });
                        }
                    } else {
                        let field = self.expect_ident()?;
                        let span = self.ast.expr(e).span;
                        e = self.ast.alloc_expr(Expr { kind: ExprKind::Selector { base: e, field }, span });
                    }
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    let mut ellipsis = false;
                    while !matches!(self.peek_kind(), TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        if self.eat(&TokenKind::Ellipsis) {
                            ellipsis = true;
                        }
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = self.ast.expr(e).span.merge(end);
                    e = self.ast.alloc_expr(Expr { kind: ExprKind::Call { callee: e, args, ellipsis }, span });
                }
                TokenKind::LBracket => {
                    self.bump();
                    if matches!(self.peek_kind(), TokenKind::Colon) {
                        self.bump();
                        let high = if matches!(self.peek_kind(), TokenKind::RBracket) { None } else { Some(self.parse_expr()?) };
                        let end = self.expect(TokenKind::RBracket)?.span;
                        let span = self.ast.expr(e).span.merge(end);
                        e = self.ast.alloc_expr(Expr { kind: ExprKind::Slice { base: e, low: None, high, max: None }, span });
                        continue;
                    }
                    let first = self.parse_expr()?;
                    if self.eat(&TokenKind::Colon) {
                        let high = if matches!(self.peek_kind(), TokenKind::RBracket | TokenKind::Colon) { None } else { Some(self.parse_expr()?) };
                        let max = if self.eat(&TokenKind::Colon) { Some(self.parse_expr()?) } else { None };
                        let end = self.expect(TokenKind::RBracket)?.span;
                        let span = self.ast.expr(e).span.merge(end);
                        e = self.ast.alloc_expr(Expr { kind: ExprKind::Slice { base: e, low: Some(first), high, max }, span });
                    } else {
                        let end = self.expect(TokenKind::RBracket)?.span;
                        let span = self.ast.expr(e).span.merge(end);
                        e = self.ast.alloc_expr(Expr { kind: ExprKind::Index { base: e, index: first }, span });
                    }
                }
                TokenKind::LBrace if self.composite_lit_allowed(e) => {
                    e = self.parse_composite_lit_body(e, None)?;
                }
                _ => break,
            }
        }
        Ok(e)
    }

    fn composite_lit_allowed(&self, e: ExprId) -> bool {
        matches!(self.ast.expr(e).kind, ExprKind::Ident(_) | ExprKind::Selector { .. })
    }

    fn parse_composite_lit_body(&mut self, base: ExprId, ty: Option<TypeId>) -> Result<ExprId, ParseError> {
        let start = self.ast.expr(base).span;
        self.expect(TokenKind::LBrace)?;
        let mut elements = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            let first = self.parse_expr()?;
            if self.eat(&TokenKind::Colon) {
                let val = self.parse_expr()?;
                elements.push((Some(first), val));
            } else {
                elements.push((None, first));
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(self.ast.alloc_expr(Expr { kind: ExprKind::CompositeLit { ty, elements }, span: start.merge(end) }))
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.peek_span();
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Ident(name), span: start }))
            }
            TokenKind::Int(s) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Int(s)), span: start }))
            }
            TokenKind::Float(s) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Float(s)), span: start }))
            }
            TokenKind::String(s) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Str(s)), span: start }))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Bool(true)), span: start }))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Bool(false)), span: start }))
            }
            TokenKind::Keyword(Keyword::Nil) => {
                self.bump();
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Literal(Literal::Nil), span: start }))
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Paren(inner), span: start.merge(end) }))
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.bump();
                let (params, results) = self.parse_signature()?;
                let ty = self.ast.alloc_type(TypeNode { kind: TypeKind::Function(FunctionSig { params, results }), span: start });
                let body = self.parse_block()?;
                let span = start.merge(self.ast.stmt(body).span);
                Ok(self.ast.alloc_expr(Expr { kind: ExprKind::FuncLit { ty, body }, span }))
            }
            TokenKind::LBracket | TokenKind::Keyword(Keyword::Map) | TokenKind::Keyword(Keyword::Struct) | TokenKind::Keyword(Keyword::Interface) => {
                let ty = self.parse_type()?;
                if matches!(self.peek_kind(), TokenKind::LBrace) {
                    let placeholder = self.ast.alloc_expr(Expr { kind: ExprKind::Ident(String::new()), span: start });
                    self.parse_composite_lit_body(placeholder, Some(ty))
                } else {
                    Ok(self.ast.alloc_expr(Expr { kind: ExprKind::Ident(String::new()), span: start }))
                }
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

enum InitOrExpr {
    Stmt(StmtId),
    Expr(ExprId),
}

enum InitOrExprOpt {
    Stmt(StmtId),
    Expr(ExprId),
    None,
}

fn compound_assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::And,
        TokenKind::PipeAssign => AssignOp::Or,
        TokenKind::CaretAssign => AssignOp::Xor,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        TokenKind::AndNotAssign => AssignOp::AndNot,
        _ => return None,
    })
}

fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    Some(match kind {
        TokenKind::LOr => (BinaryOp::LOr, 1),
        TokenKind::LAnd => (BinaryOp::LAnd, 2),
        TokenKind::Eq => (BinaryOp::Eq, 3),
        TokenKind::Ne => (BinaryOp::Ne, 3),
        TokenKind::Lt => (BinaryOp::Lt, 3),
        TokenKind::Le => (BinaryOp::Le, 3),
        TokenKind::Gt => (BinaryOp::Gt, 3),
        TokenKind::Ge => (BinaryOp::Ge, 3),
        TokenKind::Plus => (BinaryOp::Add, 4),
        TokenKind::Minus => (BinaryOp::Sub, 4),
        TokenKind::Pipe => (BinaryOp::Or, 4),
        TokenKind::Caret => (BinaryOp::Xor, 4),
        TokenKind::Star => (BinaryOp::Mul, 5),
        TokenKind::Slash => (BinaryOp::Div, 5),
        TokenKind::Percent => (BinaryOp::Rem, 5),
        TokenKind::Amp => (BinaryOp::And, 5),
        TokenKind::Shl => (BinaryOp::Shl, 5),
        TokenKind::Shr => (BinaryOp::Shr, 5),
        TokenKind::AndNot => (BinaryOp::AndNot, 5),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello_world() {
        let src = "package main\nimport \"fmt\"\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";
        let ast = Parser::parse_file(src).unwrap();
        assert_eq!(ast.file().package_name, "main");
        assert_eq!(ast.file().decls.len(), 2);
    }

    #[test]
    fn parses_unicode_var_decl() {
        let src = "package main\nimport \"fmt\"\nvar こんにちはmsg string = \"Hello, package\"\nfunc main() {\n\tfmt.Println(こんにちはmsg)\n}\n";
        let ast = Parser::parse_file(src).unwrap();
        assert_eq!(ast.file().decls.len(), 3);
    }

    #[test]
    fn parses_if_for_switch() {
        let src = r#"package main
func f(a, b int) int {
	for a < b {
		a += b
	}
	if a > 0 {
		return a
	} else {
		return b
	}
}
"#;
        let ast = Parser::parse_file(src).unwrap();
        assert_eq!(ast.file().decls.len(), 1);
    }

    #[test]
    fn parses_type_switch() {
        let src = r#"package main
func f(x interface{}) {
	switch i := x.(type) {
	case int:
		fooi(i)
	default:
	}
}
"#;
        let ast = Parser::parse_file(src).unwrap();
        assert_eq!(ast.file().decls.len(), 1);
    }
}
