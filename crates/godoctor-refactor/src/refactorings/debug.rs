use godoctor_ast::{Ast, DeclKind, StmtKind};
use godoctor_cfg::CfgBuilder;
use godoctor_sema::Program;

/// The non-transforming Debug refactoring (§4.6): dumps the loaded package list, each
/// function's CFG as GraphViz DOT, and every semantic object with its definition and use
/// occurrence counts. Produces no edits — it exists purely to inspect what the engine
/// sees, the way a reflowed-format listing would.
pub fn debug_dump(program: &Program) -> String {
    let mut out = String::new();

    out.push_str("packages:\n");
    for name in program.all_packages().keys() {
        out.push_str(&format!("  {name}\n"));
    }

    for (pkg_name, pkg) in program.all_packages() {
        out.push_str(&format!("\npackage {pkg_name}\n"));

        for (file_id, file, ast) in &pkg.files {
            out.push_str(&format!("  file {} (id {file_id})\n", file.path().display()));
            for &decl_id in &ast.file().decls {
                if let DeclKind::Func(f) = &ast.decl(decl_id).kind {
                    out.push_str(&format!("    func {}\n", f.name));
                    if let Some(body) = f.body {
                        match CfgBuilder::build(ast, body) {
                            Ok(cfg) => {
                                out.push_str("      cfg:\n");
                                for line in cfg.to_dot().lines() {
                                    out.push_str(&format!("      {line}\n"));
                                }
                            }
                            Err(e) => out.push_str(&format!("      cfg build failed: {e}\n")),
                        }
                    }
                }
            }
        }

        out.push_str("  objects:\n");
        for (id, obj) in pkg.objects.iter() {
            let defs = pkg.table.defs_of(id).len();
            let uses = pkg.table.uses_of(id).len();
            out.push_str(&format!(
                "    {:?} {:?} {:?} defs={} uses={}\n",
                id, obj.kind, obj.name, defs, uses
            ));
        }
    }

    out
}

/// Annotates each statement in `body` with the objects it defines and uses, for the
/// same Debug refactoring when a caller wants a single function's def/use table rather
/// than the whole-program dump `debug_dump` produces.
pub fn debug_annotate_function(ast: &Ast, table: &godoctor_sema::ObjectTable, file: godoctor_sema::FileId, body: godoctor_ast::StmtId) -> String {
    let mut out = String::new();
    annotate_stmt(ast, table, file, body, &mut out);
    out
}

fn annotate_stmt(ast: &Ast, table: &godoctor_sema::ObjectTable, file: godoctor_sema::FileId, stmt: godoctor_ast::StmtId, out: &mut String) {
    let effect = godoctor_dataflow::classify_stmt(ast, table, file, stmt);
    out.push_str(&format!(
        "{:?}: def={} use={} updated={}\n",
        stmt,
        effect.def.len(),
        effect.uses.len(),
        effect.updated.len()
    ));
    match &ast.stmt(stmt).kind {
        StmtKind::Block(stmts) => {
            for &s in stmts {
                annotate_stmt(ast, table, file, s, out);
            }
        }
        StmtKind::If { then_branch, else_branch, .. } => {
            annotate_stmt(ast, table, file, *then_branch, out);
            if let Some(e) = else_branch {
                annotate_stmt(ast, table, file, *e, out);
            }
        }
        StmtKind::For { body, .. } | StmtKind::ForRange { body, .. } => {
            annotate_stmt(ast, table, file, *body, out);
        }
        StmtKind::Labeled { stmt: inner, .. } => annotate_stmt(ast, table, file, *inner, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    #[test]
    fn dump_mentions_the_loaded_package_and_function() {
        let src = "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let dump = debug_dump(&program);
        assert!(dump.contains("package main"));
        assert!(dump.contains("func main"));
        assert!(dump.contains("digraph cfg"));
    }
}
