use crate::cfg::{Block, BlockId, Cfg};
use godoctor_ast::{Ast, StmtId, StmtKind};
use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CfgError {
    #[error("break/continue/goto target label {0:?} is not defined in this function")]
    UnresolvedLabel(String),
    #[error("break or continue used outside any enclosing loop/switch")]
    UnenclosedBreakContinue,
}

#[derive(Clone)]
struct LoopCtx {
    label: Option<String>,
    break_target: BlockId,
    continue_target: Option<BlockId>,
}

/// Builds the CFG for one function body, grounded on the edge-construction rules of
/// spec.md §4.2. Uses a continuation-passing recursive walk: `build_stmt` returns the
/// entry block for a statement's subgraph and wires its fall-through edges to the
/// caller-supplied continuation block.
pub struct CfgBuilder<'a> {
    ast: &'a Ast,
    blocks: Vec<Block>,
    succs: Vec<Vec<BlockId>>,
    preds: Vec<Vec<BlockId>>,
    stmt_to_block: FxHashMap<StmtId, BlockId>,
    defers: Vec<StmtId>,
    loop_stack: Vec<LoopCtx>,
    labels: FxHashMap<String, BlockId>,
    pending_gotos: Vec<(BlockId, String)>,
    pending_labeled_breaks: Vec<(BlockId, String, bool)>, // (block, label, is_continue)
    exit: BlockId,
}

impl<'a> CfgBuilder<'a> {
    pub fn build(ast: &'a Ast, body: StmtId) -> Result<Cfg, CfgError> {
        let mut b = CfgBuilder {
            ast,
            blocks: vec![Block { stmt: None }, Block { stmt: None }],
            succs: vec![Vec::new(), Vec::new()],
            preds: vec![Vec::new(), Vec::new()],
            stmt_to_block: FxHashMap::default(),
            defers: Vec::new(),
            loop_stack: Vec::new(),
            labels: FxHashMap::default(),
            pending_gotos: Vec::new(),
            pending_labeled_breaks: Vec::new(),
            exit: BlockId(1),
        };
        let entry_id = BlockId(0);
        let exit_id = BlockId(1);
        let body_entry = b.build_stmt(body, exit_id)?;
        b.add_edge(entry_id, body_entry);
        b.resolve_pending()?;
        Ok(Cfg {
            blocks: b.blocks,
            succs: b.succs,
            preds: b.preds,
            entry: entry_id,
            exit: exit_id,
            defers: b.defers,
            stmt_to_block: b.stmt_to_block,
        })
    }

    fn new_block(&mut self, stmt: StmtId) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block { stmt: Some(stmt) });
        self.succs.push(Vec::new());
        self.preds.push(Vec::new());
        self.stmt_to_block.insert(stmt, id);
        id
    }

    fn add_edge(&mut self, from: BlockId, to: BlockId) {
        if !self.succs[from.0 as usize].contains(&to) {
            self.succs[from.0 as usize].push(to);
            self.preds[to.0 as usize].push(from);
        }
    }

    fn resolve_pending(&mut self) -> Result<(), CfgError> {
        let gotos = std::mem::take(&mut self.pending_gotos);
        for (block, label) in gotos {
            let target = *self
                .labels
                .get(&label)
                .ok_or_else(|| CfgError::UnresolvedLabel(label.clone()))?;
            self.add_edge(block, target);
        }
        Ok(())
    }

    /// Builds the subgraph for `stmt`, threading fall-through to `cont`. Returns the
    /// block that should receive control when flow reaches this statement.
    fn build_stmt(&mut self, stmt: StmtId, cont: BlockId) -> Result<BlockId, CfgError> {
        let kind = self.ast.stmt(stmt).kind.clone();
        match kind {
            StmtKind::Block(stmts) => self.build_seq(&stmts, cont),
            StmtKind::Defer(_) => {
                self.defers.push(stmt);
                Ok(cont)
            }
            StmtKind::Return(_) => {
                let b = self.new_block(stmt);
                self.add_edge(b, self.exit);
                Ok(b)
            }
            StmtKind::Goto(ref label) => {
                let b = self.new_block(stmt);
                self.pending_gotos.push((b, label.clone()));
                Ok(b)
            }
            StmtKind::Break(ref label) => {
                let b = self.new_block(stmt);
                match label {
                    Some(l) => self.pending_labeled_breaks.push((b, l.clone(), false)),
                    None => {
                        let target = self
                            .loop_stack
                            .last()
                            .map(|c| c.break_target)
                            .ok_or(CfgError::UnenclosedBreakContinue)?;
                        self.add_edge(b, target);
                    }
                }
                Ok(b)
            }
            StmtKind::Continue(ref label) => {
                let b = self.new_block(stmt);
                match label {
                    Some(l) => self.pending_labeled_breaks.push((b, l.clone(), true)),
                    None => {
                        let target = self
                            .loop_stack
                            .iter()
                            .rev()
                            .find_map(|c| c.continue_target)
                            .ok_or(CfgError::UnenclosedBreakContinue)?;
                        self.add_edge(b, target);
                    }
                }
                Ok(b)
            }
            StmtKind::Fallthrough => Ok(self.new_block(stmt)),
            StmtKind::Labeled { label, stmt: inner } => {
                let entry = self.build_stmt(inner, cont)?;
                self.labels.insert(label, entry);
                Ok(entry)
            }
            StmtKind::If { init, cond, then_branch, else_branch } => {
                self.build_if(stmt, init, then_branch, else_branch, cont)
            }
            StmtKind::For { init, post, body, label, .. } => {
                self.build_for(stmt, init, post, body, label, cont)
            }
            StmtKind::ForRange { body, label, .. } => {
                self.build_for(stmt, None, None, body, label, cont)
            }
            StmtKind::Switch { init, cases, label, .. } => {
                self.build_switch(stmt, init, &cases, label, cont)
            }
            StmtKind::TypeSwitch { init, cases, label, .. } => {
                self.build_type_switch(stmt, init, &cases, label, cont)
            }
            StmtKind::Select { comms, label } => self.build_select(stmt, &comms, label, cont),
            // straight-line statements: assignment, short-var-decl, decl, inc/dec,
            // expr-stmt, go
            _ => {
                let b = self.new_block(stmt);
                self.add_edge(b, cont);
                Ok(b)
            }
        }
    }

    /// Builds a sequence of sibling statements (a block's body), each edging to the
    /// next; the final statement edges to `cont`.
    fn build_seq(&mut self, stmts: &[StmtId], cont: BlockId) -> Result<BlockId, CfgError> {
        if stmts.is_empty() {
            return Ok(cont);
        }
        let mut next = cont;
        for &s in stmts.iter().rev() {
            next = self.build_stmt(s, next)?;
        }
        Ok(next)
    }

    fn build_if(
        &mut self,
        stmt: StmtId,
        init: Option<StmtId>,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        cont: BlockId,
    ) -> Result<BlockId, CfgError> {
        let cond_block = self.new_block(stmt);
        let then_entry = self.build_stmt(then_branch, cont)?;
        self.add_edge(cond_block, then_entry);
        let else_entry = match else_branch {
            Some(e) => self.build_stmt(e, cont)?,
            None => cont,
        };
        self.add_edge(cond_block, else_entry);
        match init {
            Some(i) => self.build_stmt(i, cond_block),
            None => Ok(cond_block),
        }
    }

    fn build_for(
        &mut self,
        stmt: StmtId,
        init: Option<StmtId>,
        post: Option<StmtId>,
        body: StmtId,
        label: Option<String>,
        cont: BlockId,
    ) -> Result<BlockId, CfgError> {
        let cond_block = self.new_block(stmt);
        self.add_edge(cond_block, cont);

        self.loop_stack.push(LoopCtx { label: label.clone(), break_target: cont, continue_target: None });
        let post_entry = match post {
            Some(p) => self.build_stmt(p, cond_block)?,
            None => cond_block,
        };
        if let Some(top) = self.loop_stack.last_mut() {
            top.continue_target = Some(post_entry);
        }
        let body_entry = self.build_stmt(body, post_entry)?;
        self.loop_stack.pop();
        self.add_edge(cond_block, body_entry);

        self.resolve_labeled_loop_jumps(&label, cont, post_entry);

        match init {
            Some(i) => self.build_stmt(i, cond_block),
            None => Ok(cond_block),
        }
    }

    fn resolve_labeled_loop_jumps(&mut self, label: &Option<String>, break_target: BlockId, continue_target: BlockId) {
        let Some(label) = label else { return };
        let mut remaining = Vec::new();
        for (block, l, is_continue) in std::mem::take(&mut self.pending_labeled_breaks) {
            if &l == label {
                let target = if is_continue { continue_target } else { break_target };
                self.add_edge(block, target);
            } else {
                remaining.push((block, l, is_continue));
            }
        }
        self.pending_labeled_breaks = remaining;
    }

    fn build_switch(
        &mut self,
        stmt: StmtId,
        init: Option<StmtId>,
        cases: &[godoctor_ast::CaseClause],
        label: Option<String>,
        cont: BlockId,
    ) -> Result<BlockId, CfgError> {
        let tag_block = self.new_block(stmt);
        let mut has_default = false;
        self.loop_stack.push(LoopCtx { label: label.clone(), break_target: cont, continue_target: None });

        let mut case_entries = Vec::new();
        for case in cases.iter().rev() {
            if case.values.is_empty() {
                has_default = true;
            }
            case_entries.push(self.build_seq(&case.body, cont)?);
        }
        case_entries.reverse();
        for (i, case) in cases.iter().enumerate() {
            if case.fallthrough && i + 1 < case_entries.len() {
                // `fallthrough` is a statement in its own right (parser requires it to
                // be the case's final statement), so its own block — not the case's
                // entry block — is what needs the edge to the next case. Using the
                // entry block here would skip the rest of the case body for any case
                // with more than one statement.
                let fallthrough_stmt = *case.body.last().expect("case.fallthrough implies a non-empty body");
                let fallthrough_block = self.stmt_to_block[&fallthrough_stmt];
                self.add_edge(fallthrough_block, case_entries[i + 1]);
            }
            self.add_edge(tag_block, case_entries[i]);
        }
        if !has_default {
            self.add_edge(tag_block, cont);
        }
        self.loop_stack.pop();
        self.resolve_labeled_loop_jumps(&label, cont, cont);

        match init {
            Some(i) => self.build_stmt(i, tag_block),
            None => Ok(tag_block),
        }
    }

    fn build_type_switch(
        &mut self,
        stmt: StmtId,
        init: Option<StmtId>,
        cases: &[godoctor_ast::TypeCaseClause],
        label: Option<String>,
        cont: BlockId,
    ) -> Result<BlockId, CfgError> {
        let tag_block = self.new_block(stmt);
        let mut has_default = false;
        self.loop_stack.push(LoopCtx { label: label.clone(), break_target: cont, continue_target: None });
        for case in cases {
            if case.types.is_empty() {
                has_default = true;
            }
            let entry = self.build_seq(&case.body, cont)?;
            self.add_edge(tag_block, entry);
        }
        if !has_default {
            self.add_edge(tag_block, cont);
        }
        self.loop_stack.pop();
        self.resolve_labeled_loop_jumps(&label, cont, cont);
        match init {
            Some(i) => self.build_stmt(i, tag_block),
            None => Ok(tag_block),
        }
    }

    fn build_select(
        &mut self,
        stmt: StmtId,
        comms: &[godoctor_ast::CommClause],
        label: Option<String>,
        cont: BlockId,
    ) -> Result<BlockId, CfgError> {
        let tag_block = self.new_block(stmt);
        let mut has_default = false;
        self.loop_stack.push(LoopCtx { label: label.clone(), break_target: cont, continue_target: None });
        for comm in comms {
            if comm.comm.is_none() {
                has_default = true;
            }
            let entry = self.build_seq(&comm.body, cont)?;
            self.add_edge(tag_block, entry);
        }
        if !has_default {
            self.add_edge(tag_block, cont);
        }
        self.loop_stack.pop();
        self.resolve_labeled_loop_jumps(&label, cont, cont);
        Ok(tag_block)
    }
}
