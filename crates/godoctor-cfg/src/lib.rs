//! Control-flow graphs for Go function bodies (§3 CFG, §4.2 construction rules).

mod builder;
mod cfg;

pub use builder::{CfgBuilder, CfgError};
pub use cfg::{Block, BlockId, Cfg};

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_ast::Parser;

    fn build_first_func_cfg(src: &str) -> Cfg {
        let ast = Parser::parse_file(src).expect("parse");
        let decl_id = ast
            .file()
            .decls
            .iter()
            .copied()
            .find(|&d| matches!(&ast.decl(d).kind, godoctor_ast::DeclKind::Func(_)))
            .expect("a func decl");
        let body = match &ast.decl(decl_id).kind {
            godoctor_ast::DeclKind::Func(f) => f.body.expect("func body"),
            _ => unreachable!(),
        };
        CfgBuilder::build(&ast, body).expect("cfg builds")
    }

    #[test]
    fn straight_line_body_every_block_reaches_exit() {
        let src = "package p\nfunc f() {\n\tx := 1\n\ty := x + 1\n\t_ = y\n}\n";
        let cfg = build_first_func_cfg(src);
        assert!(cfg.preds(cfg.entry).is_empty());
        assert!(cfg.succs(cfg.exit).is_empty());
        for b in cfg.blocks() {
            if cfg.reachable_from_entry(b) {
                assert!(cfg.reaches_exit(b), "block {b:?} should reach exit");
            }
        }
    }

    #[test]
    fn if_else_both_branches_reach_exit() {
        let src = "package p\nfunc f(x int) {\n\tif x > 0 {\n\t\tx = 1\n\t} else {\n\t\tx = 2\n\t}\n\tx = 3\n}\n";
        let cfg = build_first_func_cfg(src);
        for b in cfg.blocks() {
            if cfg.reachable_from_entry(b) {
                assert!(cfg.reaches_exit(b));
            }
        }
    }

    #[test]
    fn for_loop_has_back_edge_to_condition() {
        let src = "package p\nfunc f() {\n\tfor i := 0; i < 10; i++ {\n\t\tg()\n\t}\n}\n";
        let cfg = build_first_func_cfg(src);
        // cond block should be reachable from itself through body+post (a cycle).
        let cond = cfg
            .blocks()
            .find(|&b| {
                cfg.block(b).stmt.is_some()
                    && cfg.succs(b).len() == 2
            })
            .expect("a branching (cond) block");
        assert!(cfg.succs(cond).iter().any(|&s| cfg.reachable(s, cond)));
    }

    #[test]
    fn defer_statements_are_collected_and_not_edged() {
        let src = "package p\nfunc f() {\n\tdefer g()\n\th()\n}\n";
        let cfg = build_first_func_cfg(src);
        assert_eq!(cfg.defers.len(), 1);
        assert!(cfg.block_of(cfg.defers[0]).is_none());
    }

    #[test]
    fn return_statement_edges_to_exit() {
        let src = "package p\nfunc f() int {\n\treturn 1\n}\n";
        let cfg = build_first_func_cfg(src);
        let ret_block = cfg
            .blocks()
            .find(|&b| cfg.block(b).stmt.is_some())
            .expect("a statement block");
        assert!(cfg.succs(ret_block).contains(&cfg.exit));
    }

    #[test]
    fn break_targets_loop_exit() {
        let src = "package p\nfunc f() {\n\tfor {\n\t\tbreak\n\t}\n\tdone()\n}\n";
        let cfg = build_first_func_cfg(src);
        for b in cfg.blocks() {
            if cfg.reachable_from_entry(b) {
                assert!(cfg.reaches_exit(b));
            }
        }
    }

    #[test]
    fn fallthrough_wires_from_its_own_statement_not_the_case_entry() {
        let src = "package p\nfunc f(x int) {\n\tswitch x {\n\tcase 1:\n\t\ta()\n\t\tb()\n\t\tfallthrough\n\tcase 2:\n\t\tc()\n\t}\n}\n";
        let cfg = build_first_func_cfg(src);

        // Every reachable block must reach exit; this alone fails if the fallthrough
        // statement's own block is left with no outgoing edge.
        for b in cfg.blocks() {
            if cfg.reachable_from_entry(b) {
                assert!(cfg.reaches_exit(b), "block {b:?} should reach exit");
            }
        }

        let ast = Parser::parse_file(src).expect("parse");
        let decl_id = ast
            .file()
            .decls
            .iter()
            .copied()
            .find(|&d| matches!(&ast.decl(d).kind, godoctor_ast::DeclKind::Func(_)))
            .expect("a func decl");
        let body = match &ast.decl(decl_id).kind {
            godoctor_ast::DeclKind::Func(f) => f.body.expect("func body"),
            _ => unreachable!(),
        };
        let switch_stmt = match &ast.stmt(body).kind {
            godoctor_ast::StmtKind::Block(stmts) => stmts[0],
            _ => unreachable!(),
        };
        let cases = match &ast.stmt(switch_stmt).kind {
            godoctor_ast::StmtKind::Switch { cases, .. } => cases.clone(),
            _ => unreachable!(),
        };
        let a_stmt = cases[0].body[0];
        let fallthrough_stmt = *cases[0].body.last().unwrap();
        let c_stmt = cases[1].body[0];

        let a_block = cfg.block_of(a_stmt).expect("a() has a block");
        let fallthrough_block = cfg.block_of(fallthrough_stmt).expect("fallthrough has a block");
        let c_block = cfg.block_of(c_stmt).expect("c() has a block");

        assert!(!cfg.succs(a_block).contains(&c_block), "a() must not jump straight past b() into the next case");
        assert!(cfg.succs(fallthrough_block).contains(&c_block), "fallthrough must edge into the next case");
    }
}
