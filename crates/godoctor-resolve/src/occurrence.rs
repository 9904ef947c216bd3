use godoctor_sema::{FileId, Object, ObjectId, ObjectTable, Occurrence, PackageInfo, Program, Site};

/// One identifier occurrence, resolved to a file-local site, tagged def vs use (§4.4
/// Occurrence search).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub file: FileId,
    pub site: Site,
    pub is_def: bool,
}

/// All occurrences across the program that resolve to `object`, split by definition
/// vs use. Exported objects are searched for across every loaded package; unexported
/// objects only need their declaring package searched (§4.4).
pub fn occurrences_of(program: &Program, object: ObjectId) -> Vec<Found> {
    let owner = program
        .all_packages()
        .values()
        .find(|p| p.objects.iter().any(|(id, _)| id == object))
        .map(|p| p.objects.get(object));

    let exported = owner.map(Object::is_exported).unwrap_or(false);

    let mut found = Vec::new();
    for pkg in program.all_packages().values() {
        if !exported && !owns(pkg, object) {
            continue;
        }
        collect_from_table(&pkg.table, object, &mut found);
    }
    found
}

fn owns(pkg: &PackageInfo, object: ObjectId) -> bool {
    pkg.objects.iter().any(|(id, _)| id == object)
}

fn collect_from_table(table: &ObjectTable, object: ObjectId, out: &mut Vec<Found>) {
    for (occ, &o) in table.all_defs() {
        if o == object {
            out.push(Found { file: occ.file, site: occ.site, is_def: true });
        }
    }
    for (occ, &o) in table.all_uses() {
        if o == object {
            out.push(Found { file: occ.file, site: occ.site, is_def: false });
        }
    }
}

/// Package-name occurrence search (§4.4): identifiers whose resolved object is `None`
/// but whose spelling equals a loaded package name, plus the package-name position in
/// every import declaration that references it (by alias-or-path-segment).
pub fn package_name_occurrences(pkg: &PackageInfo, package_name: &str) -> Vec<(FileId, godoctor_ast::DeclId)> {
    let mut out = Vec::new();
    for (file_id, _file, ast) in &pkg.files {
        for &decl_id in &ast.file().decls {
            if let godoctor_ast::DeclKind::Import(imp) = &ast.decl(decl_id).kind {
                let local = imp
                    .alias
                    .clone()
                    .unwrap_or_else(|| imp.path.rsplit('/').next().unwrap_or(&imp.path).to_string());
                if local == package_name {
                    out.push((*file_id, decl_id));
                }
            }
        }
    }
    out
}

/// Type-switch occurrence search (§4.4): the binding identifier plus every case
/// clause's implicit variable. All share the spelling of the binding but are distinct
/// objects that must be renamed together.
pub fn type_switch_occurrence_set(
    pkg: &PackageInfo,
    file: FileId,
    stmt: godoctor_ast::StmtId,
) -> Vec<ObjectId> {
    let mut objs = Vec::new();
    if let Some(binding) = pkg.object_of(file, Site::TypeSwitchBinding(stmt)) {
        objs.push(binding);
    }
    let mut case_index = 0u32;
    while let Some(implicit) = pkg.implicits.get(file, stmt, case_index) {
        objs.push(implicit);
        case_index += 1;
    }
    objs
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_sema::InMemoryLoader;
    use godoctor_sema::Loader;
    use godoctor_text::File;
    use godoctor_diagnostic::DiagnosticLog;

    #[test]
    fn finds_def_and_use_of_a_local_variable() {
        let src = "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let (_, obj) = pkg.objects.iter().find(|(_, o)| o.name == "x").unwrap();
        let found = occurrences_of(&program, obj_id(pkg, "x"));
        assert!(found.iter().any(|f| f.is_def));
        assert!(found.iter().any(|f| !f.is_def));
    }

    fn obj_id(pkg: &PackageInfo, name: &str) -> ObjectId {
        pkg.objects.iter().find(|(_, o)| o.name == name).unwrap().0
    }
}
