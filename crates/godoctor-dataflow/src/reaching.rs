use crate::bitset::BitSet;
use crate::classify::StmtEffect;
use godoctor_cfg::{BlockId, Cfg};
use rustc_hash::FxHashMap;

/// Reaching-definitions (forward, may), per §4.3: `gen(B)` is the singleton set
/// containing B iff B assigns or declares any variable, `kill(B)` is every other block
/// that defines a variable also defined by B. Here a "definition" is identified by the
/// defining block id itself (one statement per block, per the CFG model), so the index
/// space is block ids rather than variable ids.
pub struct ReachingDefinitions {
    pub in_sets: FxHashMap<BlockId, BitSet>,
    pub out_sets: FxHashMap<BlockId, BitSet>,
}

/// `effect_of` classifies each block's statement; blocks with no statement (Entry/Exit)
/// contribute nothing.
pub fn reaching_definitions(
    cfg: &Cfg,
    effect_of: impl Fn(BlockId) -> StmtEffect,
) -> ReachingDefinitions {
    let n = cfg.block_count();
    let blocks: Vec<BlockId> = cfg.blocks().collect();

    let effects: FxHashMap<BlockId, StmtEffect> =
        blocks.iter().map(|&b| (b, effect_of(b))).collect();

    let mut gen = FxHashMap::default();
    for &b in &blocks {
        let mut g = BitSet::new(n);
        if !effects[&b].def.is_empty() {
            g.insert(b.0 as usize);
        }
        gen.insert(b, g);
    }

    // Pre-pass: kill(B) = every other block C whose def set intersects B's def set.
    let mut kill: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, BitSet::new(n))).collect();
    for &b in &blocks {
        if effects[&b].def.is_empty() {
            continue;
        }
        for &c in &blocks {
            if c == b || effects[&c].def.is_empty() {
                continue;
            }
            if effects[&c].def.iter().any(|o| effects[&b].def.contains(o)) {
                kill.get_mut(&b).unwrap().insert(c.0 as usize);
            }
        }
    }

    let mut in_sets: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, BitSet::new(n))).collect();
    let mut out_sets: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, BitSet::new(n))).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for &b in &blocks {
            if b == cfg.entry {
                continue;
            }
            let mut new_in = BitSet::new(n);
            for &p in cfg.preds(b) {
                new_in.union_with(&out_sets[&p]);
            }
            if new_in != in_sets[&b] {
                in_sets.insert(b, new_in.clone());
                changed = true;
            }

            let mut new_out = new_in.difference(&kill[&b]);
            new_out.union_with(&gen[&b]);
            if new_out != out_sets[&b] {
                out_sets.insert(b, new_out);
                changed = true;
            }
        }
    }

    ReachingDefinitions { in_sets, out_sets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_stmt;
    use godoctor_ast::Parser;
    use godoctor_cfg::CfgBuilder;
    use godoctor_sema::{Binder, FileId};

    #[test]
    fn straight_line_defs_reach_the_end() {
        let src = "package p\nfunc f() {\n\tx := 1\n\ty := x + 1\n\t_ = y\n}\n";
        let ast = Parser::parse_file(src).unwrap();
        let decl_id = ast.file().decls[0];
        let body = match &ast.decl(decl_id).kind {
            godoctor_ast::DeclKind::Func(fd) => fd.body.unwrap(),
            _ => unreachable!(),
        };
        let cfg = CfgBuilder::build(&ast, body).unwrap();
        let file: FileId = 0;
        let bound = Binder::bind("p", &[(file, ast.clone())]);
        let rd = reaching_definitions(&cfg, |b| match cfg.block(b).stmt {
            Some(s) => classify_stmt(&ast, &bound.table, file, s),
            None => StmtEffect::default(),
        });
        // The exit block's IN set should not be empty: some definition reaches it.
        assert!(!rd.in_sets[&cfg.exit].is_empty());
    }
}
