use crate::ident::is_valid_identifier;
use crate::RefactoringResult;
use godoctor_ast::{Ast, DeclKind};
use godoctor_diagnostic::{Diagnostic, ErrorCode};
use godoctor_resolve::{
    check_rename_conflict, find_whole_word_occurrences, method_rename_set, occurrences_of,
    package_name_occurrences, type_switch_occurrence_set, ConflictReason,
};
use godoctor_sema::{is_predeclared, is_reserved, FileId, ObjectId, ObjectKind, PackageInfo, Program, Site};
use godoctor_text::Extent;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Renames `object` (found in `package`) to `new_name`, following spec.md §4.6's
/// Rename recipe: validate the name, reject the program entry point, widen to the
/// interface-closure or type-switch family where applicable, run conflict detection,
/// collect occurrences plus comment-text matches, and turn them into edits. Files
/// under `installation_root` are never edited — an occurrence there becomes a
/// Warning instead.
pub fn rename(
    program: &Program,
    package: &str,
    object: ObjectId,
    new_name: &str,
    installation_root: Option<&Path>,
) -> RefactoringResult {
    let mut result = RefactoringResult::new();
    let Some(pkg) = program.all_packages().get(package) else {
        result.log.push(Diagnostic::error(format!("unknown package {package:?}")).with_code(ErrorCode::InvalidArguments));
        return result;
    };

    if !is_valid_identifier(new_name) {
        result.log.push(Diagnostic::error(format!("{new_name:?} is not a valid identifier")).with_code(ErrorCode::NameInvalid));
        return result;
    }
    if is_reserved(new_name) {
        result.log.push(Diagnostic::error(format!("{new_name:?} is a reserved word")).with_code(ErrorCode::NameReserved));
        return result;
    }
    if is_predeclared(new_name) {
        result.log.push(Diagnostic::error(format!("{new_name:?} is a predeclared identifier")).with_code(ErrorCode::NamePredeclared));
        return result;
    }

    let obj = pkg.objects.get(object);
    if obj.kind == ObjectKind::Function && obj.name == "main" && package == "main" {
        result.log.push(
            Diagnostic::error("cannot rename the program entry point".to_string()).with_code(ErrorCode::InvalidSelection),
        );
        return result;
    }
    if obj.is_param {
        result.log.push(
            Diagnostic::error("cannot rename a function parameter or receiver".to_string())
                .with_code(ErrorCode::InvalidSelection),
        );
        return result;
    }
    let old_name = obj.name.clone();

    let family: Vec<ObjectId> = if obj.kind == ObjectKind::Method {
        method_rename_set(pkg, object).into_iter().collect()
    } else if let Some(ts) = type_switch_family(pkg, object) {
        ts
    } else {
        vec![object]
    };

    for &id in &family {
        let o = pkg.objects.get(id);
        if let Some(reason) = check_rename_conflict(pkg, id, o.scope, new_name) {
            result.log.push(
                Diagnostic::error(format!("renaming {old_name:?} to {new_name:?}: {}", describe_conflict(&reason)))
                    .with_code(ErrorCode::Conflict),
            );
            return result;
        }
    }

    let mut seen_sites: FxHashSet<(FileId, Site)> = FxHashSet::default();
    for &id in &family {
        for found in occurrences_of(program, id) {
            if !seen_sites.insert((found.file, found.site)) {
                continue;
            }
            emit_site_edit(&mut result, pkg, found.file, found.site, &old_name, new_name, installation_root);
        }
    }

    if obj.kind == ObjectKind::Package {
        for (file, decl_id) in package_name_occurrences(pkg, &old_name) {
            if !seen_sites.insert((file, Site::ImportAlias(decl_id))) {
                continue;
            }
            emit_site_edit(&mut result, pkg, file, Site::ImportAlias(decl_id), &old_name, new_name, installation_root);
        }
    }

    for candidate_pkg in program.all_packages().values() {
        for (_, file, ast) in &candidate_pkg.files {
            if is_under_root(file.path(), installation_root) {
                continue;
            }
            for group in &ast.file().comment_groups {
                for comment in &group.comments {
                    for offset in find_whole_word_occurrences(&comment.text, &old_name) {
                        let extent = Extent::new(comment.span.start + offset, old_name.len());
                        let _ = result.add_edit(file.path().to_path_buf(), extent, new_name.as_bytes().to_vec());
                    }
                }
            }
        }
    }

    result
}

fn describe_conflict(reason: &ConflictReason) -> &'static str {
    match reason {
        ConflictReason::ReservedWord => "reserved word",
        ConflictReason::PredeclaredIdentifier => "predeclared identifier",
        ConflictReason::AlreadyDeclared { .. } => "already declared in this scope or a nested one",
        ConflictReason::AmbiguousPromotedMethod => "would collide with another method on the same receiver type",
    }
}

/// If `object` is the binding or an implicit of some type-switch, returns every
/// object in that type-switch's family (the binding plus every case's implicit),
/// since they all share the bound name and must be renamed together.
fn type_switch_family(pkg: &PackageInfo, object: ObjectId) -> Option<Vec<ObjectId>> {
    for (occ, &o) in pkg.table.all_defs() {
        if o == object {
            if let Site::TypeSwitchBinding(stmt) = occ.site {
                return Some(type_switch_occurrence_set(pkg, occ.file, stmt));
            }
        }
    }
    for (&(file, stmt, _), &o) in pkg.implicits.all() {
        if o == object {
            return Some(type_switch_occurrence_set(pkg, file, stmt));
        }
    }
    None
}

fn is_under_root(path: &Path, root: Option<&Path>) -> bool {
    root.map(|r| path.starts_with(r)).unwrap_or(false)
}

fn emit_site_edit(
    result: &mut RefactoringResult,
    pkg: &PackageInfo,
    file: FileId,
    site: Site,
    old_name: &str,
    new_name: &str,
    installation_root: Option<&Path>,
) {
    let Some(ast) = pkg.ast_of(file) else { return };
    let Some(source_file) = pkg.file_of(file) else { return };

    if is_under_root(source_file.path(), installation_root) {
        result.log.push(
            Diagnostic::warning(format!("{} is under the installation root; not modified", source_file.path().display()))
                .with_code(ErrorCode::InstallationRoot),
        );
        return;
    }

    let Some(extent) = site_extent(ast, source_file.content(), site, old_name) else { return };
    let _ = result.add_edit(source_file.path().to_path_buf(), extent, new_name.as_bytes().to_vec());
}

/// Resolves a semantic `Site` to the exact byte extent of its identifier text. Most
/// sites (`Expr`) already span exactly the identifier. Sites recorded against a whole
/// declaration or statement (`DeclName`, `ShortVarName`, `TypeSwitchBinding`, `Label`,
/// an aliased `ImportAlias`) are narrowed via a whole-word text search within that
/// node's span — the AST does not carry a standalone span for a declared name.
/// `TypeSwitchImplicit` sites have no text of their own. `Param` sites are never
/// reached here: `rename` rejects parameter/receiver targets before collecting edits.
fn site_extent(ast: &Ast, file_bytes: &[u8], site: Site, name: &str) -> Option<Extent> {
    let span = match site {
        Site::Expr(e) => ast.expr(e).span(),
        Site::DeclName(d) => ast.decl(d).span(),
        Site::ShortVarName(s, _) => ast.stmt(s).span(),
        Site::TypeSwitchBinding(s) => ast.stmt(s).span(),
        Site::Label(s) => ast.stmt(s).span(),
        Site::ImportAlias(d) => {
            let has_alias = matches!(&ast.decl(d).kind, DeclKind::Import(imp) if imp.alias.is_some());
            if !has_alias {
                return None;
            }
            ast.decl(d).span()
        }
        Site::TypeSwitchImplicit(_, _) | Site::Param(_, _) => return None,
    };
    if matches!(site, Site::Expr(_)) {
        return Some(Extent::new(span.start, span.end - span.start));
    }
    find_name_in_span(file_bytes, span.start, span.end, name)
}

fn find_name_in_span(bytes: &[u8], start: usize, end: usize, name: &str) -> Option<Extent> {
    let text = std::str::from_utf8(&bytes[start..end]).ok()?;
    let hits = find_whole_word_occurrences(text, name);
    hits.first().map(|&offset| Extent::new(start + offset, name.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    #[test]
    fn renames_a_local_variable_and_its_uses() {
        let src = "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let (x_id, _) = pkg.objects.iter().find(|(_, o)| o.name == "x").unwrap();
        let result = rename(&program, "main", x_id, "count", None);
        assert!(!result.log.has_errors());
        let edits = result.edits.values().next().expect("one file edited");
        let out = edits.apply_to(src.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("count := 1"));
        assert!(out.contains("_ = count"));
    }

    #[test]
    fn rejects_renaming_the_entry_point() {
        let src = "package main\nfunc main() {\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let (main_id, _) = pkg.objects.iter().find(|(_, o)| o.name == "main" && o.kind == ObjectKind::Function).unwrap();
        let result = rename(&program, "main", main_id, "run", None);
        assert!(result.log.has_errors());
        assert!(result.edits.is_empty());
    }

    #[test]
    fn rejects_renaming_a_function_parameter() {
        let src = "package main\nfunc f(x int) int {\n\treturn x\n}\nfunc main() {\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let (x_id, _) = pkg.objects.iter().find(|(_, o)| o.name == "x").unwrap();
        let result = rename(&program, "main", x_id, "y", None);
        assert!(result.log.has_errors());
        assert!(result.edits.is_empty(), "a rejected rename must not touch the body reference either");
    }

    #[test]
    fn rejects_renaming_to_a_reserved_word() {
        let src = "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";
        let file = File::new("main.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("main.go".to_string(), file)], &mut log);
        let pkg = &program.packages["main"];
        let (x_id, _) = pkg.objects.iter().find(|(_, o)| o.name == "x").unwrap();
        let result = rename(&program, "main", x_id, "for", None);
        assert!(result.log.has_errors());
    }
}
