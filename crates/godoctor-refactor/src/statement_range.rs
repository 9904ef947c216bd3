use godoctor_ast::{Ast, StmtId, StmtKind};
use godoctor_cfg::{BlockId, Cfg, CfgBuilder};
use godoctor_dataflow::{classify_stmt, live_variables, StmtEffect};
use godoctor_sema::{FileId, ObjectId, ObjectTable};
use godoctor_text::Extent;
use rustc_hash::FxHashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("selection is empty")]
    Empty,
    #[error("selection overlaps only part of a control statement's init header")]
    PartialInitHeaderOverlap,
    #[error("selection lies inside an anonymous function literal")]
    InsideFuncLiteral,
    #[error("selection does not align with a contiguous run of statements")]
    NotContiguous,
}

/// The four disjoint-ish variable sets `locals_referenced()` computes by scanning a
/// range's statements (§4.5).
#[derive(Debug, Default, Clone)]
pub struct LocalsReferenced {
    pub assigned: FxHashSet<ObjectId>,
    pub updated: FxHashSet<ObjectId>,
    pub declared: FxHashSet<ObjectId>,
    pub used: FxHashSet<ObjectId>,
}

/// A contiguous run of sibling statements covering a selection, plus the CFG of the
/// enclosing function body needed to answer the entry/exit/liveness queries extract-
/// function depends on (§4.5).
pub struct StatementRange<'a> {
    ast: &'a Ast,
    file: FileId,
    stmts: Vec<StmtId>,
    cfg: Cfg,
    blocks: FxHashSet<BlockId>,
}

impl<'a> StatementRange<'a> {
    /// `siblings` is the `Vec<StmtId>` of the block/case/comm-clause body that contains
    /// the selection; `func_body` is the enclosing function's top-level statement,
    /// used to build the CFG the entry/exit queries walk.
    pub fn new(
        ast: &'a Ast,
        file: FileId,
        func_body: StmtId,
        siblings: &[StmtId],
        selection: Extent,
    ) -> Result<Self, RangeError> {
        if selection.length == 0 {
            return Err(RangeError::Empty);
        }

        let mut selected = Vec::new();
        for &s in siblings {
            let span = ast.stmt(s).span();
            let stmt_extent = Extent::new(span.start, span.end - span.start);
            if stmt_extent.is_disjoint_from(&selection) {
                continue;
            }
            let fully_contained = selection.offset <= stmt_extent.offset && stmt_extent.end() <= selection.end();
            if !fully_contained {
                return Err(RangeError::PartialInitHeaderOverlap);
            }
            selected.push(s);
        }

        if selected.is_empty() {
            return Err(RangeError::Empty);
        }

        if contains_func_literal_boundary(ast, &selected, selection) {
            return Err(RangeError::InsideFuncLiteral);
        }

        let cfg = CfgBuilder::build(ast, func_body).map_err(|_| RangeError::NotContiguous)?;
        let blocks: FxHashSet<BlockId> = selected.iter().filter_map(|&s| cfg.block_of(s)).collect();

        Ok(StatementRange { ast, file, stmts: selected, cfg, blocks })
    }

    pub fn stmts(&self) -> &[StmtId] {
        &self.stmts
    }

    pub fn cfg(&self) -> &Cfg {
        &self.cfg
    }

    /// Blocks in the range with at least one CFG predecessor outside the range.
    pub fn entry_points(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .copied()
            .filter(|&b| self.cfg.preds(b).iter().any(|p| !self.blocks.contains(p)))
            .collect()
    }

    /// Blocks outside the range that are CFG successors of some block in the range.
    pub fn exit_destinations(&self) -> Vec<BlockId> {
        let mut out = FxHashSet::default();
        for &b in &self.blocks {
            for &s in self.cfg.succs(b) {
                if !self.blocks.contains(&s) {
                    out.insert(s);
                }
            }
        }
        out.into_iter().collect()
    }

    /// ⋃ IN[b] for b ∈ entry_points, via live-variable analysis over the whole function.
    pub fn locals_live_at_entry(&self, table: &ObjectTable) -> FxHashSet<ObjectId> {
        let lv = self.live_variables(table);
        let tracked: Vec<ObjectId> = lv.tracked_objects().collect();
        let mut out = FxHashSet::default();
        for b in self.entry_points() {
            for &obj in &tracked {
                if lv.is_live_in(b, obj) {
                    out.insert(obj);
                }
            }
        }
        out
    }

    /// ⋃ IN[b] for b ∈ exit_destinations.
    pub fn locals_live_after_exit(&self, table: &ObjectTable) -> FxHashSet<ObjectId> {
        let lv = self.live_variables(table);
        let tracked: Vec<ObjectId> = lv.tracked_objects().collect();
        let mut out = FxHashSet::default();
        for b in self.exit_destinations() {
            for &obj in &tracked {
                if lv.is_live_in(b, obj) {
                    out.insert(obj);
                }
            }
        }
        out
    }

    /// Scans the range's statements to build the four §4.5 sets.
    pub fn locals_referenced(&self, table: &ObjectTable) -> LocalsReferenced {
        let mut out = LocalsReferenced::default();
        for &s in &self.stmts {
            let eff = classify_stmt(self.ast, table, self.file, s);
            out.assigned.extend(eff.def.iter().copied());
            out.updated.extend(eff.updated.iter().copied());
            out.used.extend(eff.uses.iter().copied());
            if matches!(self.ast.stmt(s).kind, StmtKind::ShortVarDecl { .. } | StmtKind::Decl(_)) {
                out.declared.extend(eff.def.iter().copied());
            }
            if let StmtKind::ForRange { define: true, .. } = &self.ast.stmt(s).kind {
                out.declared.extend(eff.def.iter().copied());
            }
        }
        out
    }

    /// Non-extractable constructs inside the range (§4.5): `return`, `defer`, a
    /// `break`/`continue`/`goto` whose target lies outside the range, a `fallthrough`
    /// that would cross the boundary, or a nested function literal that captures a
    /// local. Returns a description of the first violation found, if any.
    pub fn check_extractable(&self) -> Option<&'static str> {
        for &s in &self.stmts {
            if let Some(reason) = check_stmt_extractable(self.ast, s, &self.blocks, &self.cfg) {
                return Some(reason);
            }
        }
        None
    }

    fn live_variables(&self, table: &ObjectTable) -> godoctor_dataflow::LiveVariables {
        let effect_of = |b: BlockId| match self.cfg.block(b).stmt {
            Some(s) => classify_stmt(self.ast, table, self.file, s),
            None => StmtEffect::default(),
        };
        let defer_effects: Vec<StmtEffect> = self
            .cfg
            .blocks()
            .filter_map(|b| self.cfg.block(b).stmt)
            .filter(|&s| matches!(self.ast.stmt(s).kind, StmtKind::Defer(_)))
            .map(|s| classify_stmt(self.ast, table, self.file, s))
            .collect();
        live_variables(&self.cfg, effect_of, &defer_effects)
    }
}

fn contains_func_literal_boundary(ast: &Ast, stmts: &[StmtId], selection: Extent) -> bool {
    struct Finder {
        selection: Extent,
        found: bool,
    }
    impl godoctor_ast::Visitor for Finder {
        fn visit_expr(&mut self, ast: &Ast, id: godoctor_ast::ExprId) {
            if let godoctor_ast::ExprKind::FuncLit { body, .. } = &ast.expr(id).kind {
                let span = ast.stmt(*body).span();
                let inner = Extent::new(span.start, span.end - span.start);
                if !inner.is_disjoint_from(&self.selection) {
                    self.found = true;
                    return;
                }
            }
            godoctor_ast::walk_expr(self, ast, id);
        }
    }
    let mut finder = Finder { selection, found: false };
    for &s in stmts {
        godoctor_ast::Visitor::visit_stmt(&mut finder, ast, s);
    }
    finder.found
}

fn check_stmt_extractable(
    ast: &Ast,
    stmt: StmtId,
    range_blocks: &FxHashSet<BlockId>,
    cfg: &Cfg,
) -> Option<&'static str> {
    match &ast.stmt(stmt).kind {
        StmtKind::Return(_) => Some("return statement inside the selection changes meaning if moved"),
        StmtKind::Defer(_) => Some("defer statement inside the selection would change side-effect timing"),
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Goto(_) => {
            let targets_outside = cfg
                .block_of(stmt)
                .map(|b| cfg.succs(b).iter().any(|s| !range_blocks.contains(s)))
                .unwrap_or(false);
            if targets_outside {
                Some("break/continue/goto target lies outside the selection")
            } else {
                None
            }
        }
        StmtKind::Fallthrough => {
            let targets_outside = cfg
                .block_of(stmt)
                .map(|b| cfg.succs(b).iter().any(|s| !range_blocks.contains(s)))
                .unwrap_or(false);
            if targets_outside {
                Some("fallthrough would cross the selection boundary")
            } else {
                None
            }
        }
        StmtKind::Block(inner) => {
            inner.iter().find_map(|&s| check_stmt_extractable(ast, s, range_blocks, cfg))
        }
        StmtKind::If { then_branch, else_branch, .. } => check_stmt_extractable(ast, *then_branch, range_blocks, cfg)
            .or_else(|| else_branch.and_then(|e| check_stmt_extractable(ast, e, range_blocks, cfg))),
        StmtKind::For { body, .. } | StmtKind::ForRange { body, .. } => {
            check_stmt_extractable(ast, *body, range_blocks, cfg)
        }
        StmtKind::Labeled { stmt: inner, .. } => check_stmt_extractable(ast, *inner, range_blocks, cfg),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::{DeclKind, Parser};
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    fn func_body_and_siblings(ast: &Ast) -> (StmtId, Vec<StmtId>) {
        let decl_id = ast
            .file()
            .decls
            .iter()
            .copied()
            .find(|&d| matches!(&ast.decl(d).kind, DeclKind::Func(_)))
            .unwrap();
        let body = match &ast.decl(decl_id).kind {
            DeclKind::Func(f) => f.body.unwrap(),
            _ => unreachable!(),
        };
        let siblings = match &ast.stmt(body).kind {
            StmtKind::Block(stmts) => stmts.clone(),
            _ => unreachable!(),
        };
        (body, siblings)
    }

    #[test]
    fn straight_line_selection_has_one_entry_and_one_exit() {
        let src = "package p\nfunc f() {\n\ta := 1\n\tb := a + 1\n\t_ = b\n}\n";
        let ast = Parser::parse_file(src).unwrap();
        let (body, siblings) = func_body_and_siblings(&ast);
        // select the middle statement `b := a + 1`
        let target = siblings[1];
        let span = ast.stmt(target).span();
        let selection = Extent::new(span.start, span.end - span.start);
        let range = StatementRange::new(&ast, 0, body, &siblings, selection).unwrap();
        assert_eq!(range.entry_points().len(), 1);
        assert_eq!(range.exit_destinations().len(), 1);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let src = "package p\nfunc f() {\n\ta := 1\n}\n";
        let ast = Parser::parse_file(src).unwrap();
        let (body, siblings) = func_body_and_siblings(&ast);
        let err = StatementRange::new(&ast, 0, body, &siblings, Extent::new(0, 0)).unwrap_err();
        assert_eq!(err, RangeError::Empty);
    }

    #[test]
    fn return_inside_selection_is_not_extractable() {
        let src = "package p\nfunc f() int {\n\ta := 1\n\treturn a\n}\n";
        let file = File::new("p.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("p.go".to_string(), file)], &mut log);
        let pkg = &program.packages["p"];
        let ast = pkg.ast_of(0).unwrap();
        let (body, siblings) = func_body_and_siblings(ast);
        let start = ast.stmt(siblings[0]).span().start;
        let end = ast.stmt(siblings[1]).span().end;
        let selection = Extent::new(start, end - start);
        let range = StatementRange::new(ast, 0, body, &siblings, selection).unwrap();
        assert!(range.check_extractable().is_some());
    }
}
