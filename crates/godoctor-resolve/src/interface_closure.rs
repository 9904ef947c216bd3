use godoctor_ast::{Ast, DeclKind, FunctionSig, TypeKind};
use godoctor_sema::{ObjectId, ObjectKind, PackageInfo};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// One interface type declared in the package, with its explicitly declared method
/// signatures (§4.4 step 1).
struct InterfaceDecl {
    methods: Vec<(String, FunctionSig)>,
}

/// Computes the method-rename set for `method` via the bipartite methods×interfaces
/// closure (§4.4 "Method reachability through interfaces"). Returns every `ObjectId`
/// of kind `Method` that must be renamed in lockstep with `method` so every interface
/// implementation relation in the package survives the rename.
pub fn method_rename_set(pkg: &PackageInfo, method: ObjectId) -> FxHashSet<ObjectId> {
    let Some(target_sig) = method_signature(pkg, method) else {
        return [method].into_iter().collect();
    };

    let interfaces = collect_interfaces(pkg);

    // Step 2: every method in the package with the same signature modulo name.
    let mut candidates: Vec<(ObjectId, String, Option<String>)> = Vec::new();
    for (id, obj) in pkg.objects.iter() {
        if obj.kind != ObjectKind::Method {
            continue;
        }
        if let Some(sig) = method_signature(pkg, id) {
            if sig.same_signature(&target_sig) {
                candidates.push((id, obj.name.clone(), obj.receiver_type.clone()));
            }
        }
    }

    // Step 3: bipartite edges (method, interface) iff receiver(method) implements
    // interface, i.e. the receiver's method set is a superset of the interface's.
    let mut method_to_interfaces: FxHashMap<ObjectId, Vec<usize>> = FxHashMap::default();
    let mut interface_to_methods: FxHashMap<usize, Vec<ObjectId>> = FxHashMap::default();
    for (i, iface) in interfaces.iter().enumerate() {
        for &(cand_id, ref cand_name, ref cand_recv) in &candidates {
            let Some(recv) = cand_recv else { continue };
            if receiver_implements(pkg, recv, iface) {
                // only an edge if this candidate's name matches one of the
                // interface's declared method names (else it cannot be the method
                // fulfilling that interface slot).
                if iface.methods.iter().any(|(n, _)| n == cand_name) {
                    method_to_interfaces.entry(cand_id).or_default().push(i);
                    interface_to_methods.entry(i).or_default().push(cand_id);
                }
            }
        }
    }

    // Step 4: BFS from `method` through the bipartite graph.
    let mut visited_methods: FxHashSet<ObjectId> = [method].into_iter().collect();
    let mut visited_interfaces: FxHashSet<usize> = FxHashSet::default();
    let mut queue: VecDeque<ObjectId> = VecDeque::new();
    queue.push_back(method);

    while let Some(m) = queue.pop_front() {
        if let Some(ifaces) = method_to_interfaces.get(&m) {
            for &i in ifaces {
                if visited_interfaces.insert(i) {
                    if let Some(ms) = interface_to_methods.get(&i) {
                        for &m2 in ms {
                            if visited_methods.insert(m2) {
                                queue.push_back(m2);
                            }
                        }
                    }
                }
            }
        }
    }

    visited_methods
}

fn method_signature(pkg: &PackageInfo, method: ObjectId) -> Option<FunctionSig> {
    let obj = pkg.objects.get(method);
    for (_, _, ast) in &pkg.files {
        for &decl_id in &ast.file().decls {
            if let DeclKind::Func(f) = &ast.decl(decl_id).kind {
                if f.name == obj.name && f.receiver.as_ref().map(|r| receiver_type_name(ast, r)) == obj.receiver_type {
                    return Some(FunctionSig { params: f.params.clone(), results: f.results.clone() });
                }
            }
        }
    }
    None
}

fn receiver_type_name(ast: &Ast, recv: &godoctor_ast::Receiver) -> String {
    type_name(ast, recv.ty)
}

fn type_name(ast: &Ast, ty: godoctor_ast::TypeId) -> String {
    match &ast.ty(ty).kind {
        TypeKind::Named { path } => path.last().cloned().unwrap_or_default(),
        TypeKind::Pointer(inner) => type_name(ast, *inner),
        _ => String::new(),
    }
}

fn collect_interfaces(pkg: &PackageInfo) -> Vec<InterfaceDecl> {
    let mut out = Vec::new();
    for (_, _, ast) in &pkg.files {
        for &decl_id in &ast.file().decls {
            if let DeclKind::Type(t) = &ast.decl(decl_id).kind {
                if let TypeKind::Interface { methods: sigs } = &ast.ty(t.ty).kind {
                    out.push(InterfaceDecl {
                        methods: sigs.iter().map(|m| (m.name.clone(), m.sig.clone())).collect(),
                    });
                }
            }
        }
    }
    out
}

/// Whether `receiver_type`'s method set is a superset of `iface`'s declared methods,
/// by name *and* signature — a pragmatic stand-in for true structural typing, since a
/// full method-set computation (including embedded fields) needs the type-checker
/// that §6 treats as an external collaborator.
fn receiver_implements(pkg: &PackageInfo, receiver_type: &str, iface: &InterfaceDecl) -> bool {
    iface.methods.iter().all(|(name, sig)| {
        pkg.objects.iter().any(|(id, o)| {
            o.kind == ObjectKind::Method
                && o.name == *name
                && o.receiver_type.as_deref() == Some(receiver_type)
                && method_signature(pkg, id).map(|s| s.same_signature(sig)).unwrap_or(false)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_diagnostic::DiagnosticLog;
    use godoctor_sema::{InMemoryLoader, Loader};
    use godoctor_text::File;

    #[test]
    fn method_on_type_implementing_interface_pulls_in_the_interface_signature() {
        let src = r#"package p

type Speaker interface {
	Speak() string
}

type Dog struct{}

func (d Dog) Speak() string {
	return "woof"
}
"#;
        let file = File::new("p.go", src.as_bytes().to_vec());
        let mut log = DiagnosticLog::new();
        let program = InMemoryLoader.load(vec![("p.go".to_string(), file)], &mut log);
        let pkg = &program.packages["p"];
        let (speak_id, _) = pkg.objects.iter().find(|(_, o)| o.name == "Speak").unwrap();
        let set = method_rename_set(pkg, speak_id);
        assert!(set.contains(&speak_id));
    }
}
