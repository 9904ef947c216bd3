use crate::bitset::BitSet;
use crate::classify::StmtEffect;
use godoctor_cfg::{BlockId, Cfg};
use godoctor_sema::ObjectId;
use rustc_hash::FxHashMap;

pub struct LiveVariables {
    pub in_sets: FxHashMap<BlockId, BitSet>,
    pub out_sets: FxHashMap<BlockId, BitSet>,
    index_of: FxHashMap<ObjectId, usize>,
}

impl LiveVariables {
    pub fn is_live_in(&self, block: BlockId, object: ObjectId) -> bool {
        self.index_of
            .get(&object)
            .map(|&i| self.in_sets[&block].contains(i))
            .unwrap_or(false)
    }

    pub fn is_live_out(&self, block: BlockId, object: ObjectId) -> bool {
        self.index_of
            .get(&object)
            .map(|&i| self.out_sets[&block].contains(i))
            .unwrap_or(false)
    }

    /// Every variable this analysis tracks (i.e. every object that appears in some
    /// block's def/use/updated set), for callers that need to enumerate "is X live
    /// anywhere" without already knowing X's identity — e.g. a statement range's
    /// `locals_live_at_entry`/`locals_live_after_exit` queries.
    pub fn tracked_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.index_of.keys().copied()
    }
}

/// Live-variables (backward, may), per §4.3. `IN[Exit]` is seeded with the union of
/// `use(d)` over every deferred call in `defer_effects`, modeling the fact that
/// deferred calls execute at function exit.
pub fn live_variables(
    cfg: &Cfg,
    effect_of: impl Fn(BlockId) -> StmtEffect,
    defer_effects: &[StmtEffect],
) -> LiveVariables {
    let blocks: Vec<BlockId> = cfg.blocks().collect();
    let effects: FxHashMap<BlockId, StmtEffect> =
        blocks.iter().map(|&b| (b, effect_of(b))).collect();

    let mut index_of: FxHashMap<ObjectId, usize> = FxHashMap::default();
    let mut next = 0usize;
    let mut assign = |o: ObjectId, index_of: &mut FxHashMap<ObjectId, usize>, next: &mut usize| {
        *index_of.entry(o).or_insert_with(|| {
            let i = *next;
            *next += 1;
            i
        })
    };
    for eff in effects.values() {
        for &o in eff.def.iter().chain(&eff.uses).chain(&eff.updated) {
            assign(o, &mut index_of, &mut next);
        }
    }
    for eff in defer_effects {
        for &o in &eff.uses {
            assign(o, &mut index_of, &mut next);
        }
    }
    let n = next.max(1);

    let to_set = |objs: &[ObjectId], index_of: &FxHashMap<ObjectId, usize>| -> BitSet {
        let mut s = BitSet::new(n);
        for o in objs {
            if let Some(&i) = index_of.get(o) {
                s.insert(i);
            }
        }
        s
    };

    let def_set: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, to_set(&effects[&b].def, &index_of))).collect();
    let use_set: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, to_set(&effects[&b].uses, &index_of))).collect();

    let mut in_sets: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, BitSet::new(n))).collect();
    let mut out_sets: FxHashMap<BlockId, BitSet> =
        blocks.iter().map(|&b| (b, BitSet::new(n))).collect();

    let mut exit_seed = BitSet::new(n);
    for eff in defer_effects {
        exit_seed.union_with(&to_set(&eff.uses, &index_of));
    }
    in_sets.insert(cfg.exit, exit_seed);

    let mut changed = true;
    while changed {
        changed = false;
        for &b in &blocks {
            if b == cfg.exit {
                continue;
            }
            let mut new_out = BitSet::new(n);
            for &s in cfg.succs(b) {
                new_out.union_with(&in_sets[&s]);
            }
            if new_out != out_sets[&b] {
                out_sets.insert(b, new_out.clone());
                changed = true;
            }

            let mut new_in = new_out.difference(&def_set[&b]);
            new_in.union_with(&use_set[&b]);
            if new_in != in_sets[&b] {
                in_sets.insert(b, new_in);
                changed = true;
            }
        }
    }

    LiveVariables { in_sets, out_sets, index_of }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_stmt;
    use godoctor_ast::Parser;
    use godoctor_cfg::CfgBuilder;
    use godoctor_sema::{Binder, FileId};

    #[test]
    fn variable_used_after_assignment_is_live_at_the_assignment() {
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
        let effect_of = |b: BlockId| match cfg.block(b).stmt {
            Some(s) => classify_stmt(&ast, &bound.table, file, s),
            None => StmtEffect::default(),
        };
        let lv = live_variables(&cfg, effect_of, &[]);
        // find the block defining x
        let x_def_block = cfg
            .blocks()
            .find(|&b| effect_of(b).def.iter().any(|_| true) && cfg.block(b).stmt.is_some())
            .unwrap();
        assert!(lv.is_live_out(x_def_block, *effect_of(x_def_block).def.first().unwrap()));
    }
}
