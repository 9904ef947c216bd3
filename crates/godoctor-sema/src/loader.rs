use crate::binder::Binder;
use crate::object::{ObjectId, Objects};
use crate::scope::ScopeTree;
use crate::table::{FileId, ImplicitsTable, ObjectTable};
use godoctor_ast::{Ast, ExprId, Parser};
use godoctor_diagnostic::{Diagnostic, DiagnosticLog};
use godoctor_text::File;
use rustc_hash::FxHashMap;

/// One loaded package: its files, the shared object arena, scope tree, object table,
/// and implicits table produced by `Binder`. Mirrors §6's `PackageInfo` surface.
pub struct PackageInfo {
    pub name: String,
    pub files: Vec<(FileId, File, Ast)>,
    pub objects: Objects,
    pub scopes: ScopeTree,
    pub table: ObjectTable,
    pub implicits: ImplicitsTable,
    pub package_objects: FxHashMap<String, ObjectId>,
}

impl PackageInfo {
    pub fn object_of(&self, file: FileId, site: crate::table::Site) -> Option<ObjectId> {
        self.table.object_of(crate::table::Occurrence::new(file, site))
    }

    pub fn ast_of(&self, file: FileId) -> Option<&Ast> {
        self.files.iter().find(|(id, _, _)| *id == file).map(|(_, _, ast)| ast)
    }

    pub fn file_of(&self, file: FileId) -> Option<&File> {
        self.files.iter().find(|(id, _, _)| *id == file).map(|(_, f, _)| f)
    }

    /// A crude best-effort type inference, standing in for the real type-checker that
    /// spec.md §6 treats as an external collaborator (see SPEC_FULL.md §12). Enough for
    /// toggle-var's need to print a type for a short assignment's RHS.
    pub fn type_of(&self, ast: &Ast, expr: ExprId) -> Option<String> {
        infer_type(ast, expr)
    }
}

fn infer_type(ast: &Ast, expr: ExprId) -> Option<String> {
    use godoctor_ast::{ExprKind, Literal};
    match &ast.expr(expr).kind {
        ExprKind::Literal(Literal::Int(_)) => Some("int".to_string()),
        ExprKind::Literal(Literal::Float(_)) => Some("float64".to_string()),
        ExprKind::Literal(Literal::Str(_)) => Some("string".to_string()),
        ExprKind::Literal(Literal::Bool(_)) => Some("bool".to_string()),
        ExprKind::Literal(Literal::Nil) => None,
        ExprKind::Paren(inner) => infer_type(ast, *inner),
        ExprKind::Unary { operand, .. } => infer_type(ast, *operand),
        ExprKind::Binary { left, .. } => infer_type(ast, *left),
        _ => None,
    }
}

/// `Program.all_packages()` plus `path_enclosing_interval` (§6).
pub struct Program {
    pub packages: FxHashMap<String, PackageInfo>,
}

impl Program {
    pub fn all_packages(&self) -> &FxHashMap<String, PackageInfo> {
        &self.packages
    }
}

/// The abstract loader collaborator (§6): `load(sources, file_system, error_handler) ->
/// Program`. `godoctor-sema` ships one concrete implementation, `InMemoryLoader`, which
/// parses with `godoctor-ast` and binds with `Binder` — enough to make the refactorings
/// runnable without a real Go type-checker attached (SPEC_FULL.md §12).
pub trait Loader {
    fn load(&self, sources: Vec<(String, File)>, log: &mut DiagnosticLog) -> Program;
}

#[derive(Default)]
pub struct InMemoryLoader;

impl Loader for InMemoryLoader {
    fn load(&self, sources: Vec<(String, File)>, log: &mut DiagnosticLog) -> Program {
        let mut by_package: FxHashMap<String, Vec<(FileId, File, Ast)>> = FxHashMap::default();
        let mut next_file_id: FileId = 0;
        for (_path, file) in sources {
            let text = String::from_utf8_lossy(file.content()).into_owned();
            match Parser::parse_file(&text) {
                Ok(ast) => {
                    let package = ast.file().package_name.clone();
                    let file_id = next_file_id;
                    next_file_id += 1;
                    by_package.entry(package).or_default().push((file_id, file, ast));
                }
                Err(e) => {
                    log.push(Diagnostic::error(format!("parse error: {e}")));
                }
            }
        }
        log.mark_initial();

        let mut packages = FxHashMap::default();
        for (package_name, files) in by_package {
            let binder_input: Vec<(FileId, Ast)> =
                files.iter().map(|(id, _, ast)| (*id, ast.clone())).collect();
            let bound = Binder::bind(&package_name, &binder_input);
            packages.insert(
                package_name.clone(),
                PackageInfo {
                    name: package_name,
                    files,
                    objects: bound.objects,
                    scopes: bound.scopes,
                    table: bound.table,
                    implicits: bound.implicits,
                    package_objects: bound.package_objects,
                },
            );
        }
        Program { packages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_binds_a_simple_package() {
        let src = "package main\nimport \"fmt\"\nfunc main() {\n\tx := 1\n\tfmt.Println(x)\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        assert!(!log.has_errors());
        assert!(program.packages.contains_key("main"));
        let pkg = &program.packages["main"];
        assert!(pkg.objects.iter().any(|(_, o)| o.name == "main"));
        assert!(pkg.objects.iter().any(|(_, o)| o.name == "x"));
    }
}
