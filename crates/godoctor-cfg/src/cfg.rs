use godoctor_ast::StmtId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// A single CFG block: exactly one source statement, or `None` for the synthetic Entry
/// and Exit blocks (§3 CFG).
#[derive(Debug, Clone, Copy)]
pub struct Block {
    pub stmt: Option<StmtId>,
}

/// The CFG for one function or method body (§4.2). Built once per function and
/// discarded when the refactoring run ends (§3 Lifecycle).
#[derive(Debug)]
pub struct Cfg {
    pub(crate) blocks: Vec<Block>,
    pub(crate) succs: Vec<Vec<BlockId>>,
    pub(crate) preds: Vec<Vec<BlockId>>,
    pub entry: BlockId,
    pub exit: BlockId,
    pub defers: Vec<StmtId>,
    pub(crate) stmt_to_block: FxHashMap<StmtId, BlockId>,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> Block {
        self.blocks[id.0 as usize]
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len() as u32).map(BlockId)
    }

    pub fn succs(&self, id: BlockId) -> &[BlockId] {
        &self.succs[id.0 as usize]
    }

    pub fn preds(&self, id: BlockId) -> &[BlockId] {
        &self.preds[id.0 as usize]
    }

    pub fn block_of(&self, stmt: StmtId) -> Option<BlockId> {
        self.stmt_to_block.get(&stmt).copied()
    }

    /// `true` iff `to` is reachable from `from` via the transitive successor relation
    /// (§8 CFG/dataflow round-trip property).
    pub fn reachable(&self, from: BlockId, to: BlockId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![false; self.blocks.len()];
        let mut stack = vec![from];
        seen[from.0 as usize] = true;
        while let Some(b) = stack.pop() {
            for &s in self.succs(b) {
                if s == to {
                    return true;
                }
                if !seen[s.0 as usize] {
                    seen[s.0 as usize] = true;
                    stack.push(s);
                }
            }
        }
        false
    }

    pub fn reachable_from_entry(&self, id: BlockId) -> bool {
        self.reachable(self.entry, id)
    }

    pub fn reaches_exit(&self, id: BlockId) -> bool {
        self.reachable(id, self.exit)
    }

    /// Renders the CFG as GraphViz DOT, used by the `debug` refactoring (spec.md §4.6).
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph cfg {\n");
        for id in self.blocks() {
            let label = match self.block(id).stmt {
                Some(s) => format!("{s:?}"),
                None if id == self.entry => "Entry".to_string(),
                None if id == self.exit => "Exit".to_string(),
                None => "?".to_string(),
            };
            out.push_str(&format!("  n{} [label=\"{}\"];\n", id.0, label));
        }
        for id in self.blocks() {
            for &s in self.succs(id) {
                out.push_str(&format!("  n{} -> n{};\n", id.0, s.0));
            }
        }
        out.push_str("}\n");
        out
    }
}
