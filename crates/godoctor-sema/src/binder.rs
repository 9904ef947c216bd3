use crate::object::{Object, ObjectId, ObjectKind};
use crate::scope::ScopeTree;
use crate::table::{FileId, ImplicitsTable, ObjectTable, Occurrence, Site};
use godoctor_ast::{
    Ast, DeclId, DeclKind, ExprId, ExprKind, StmtId, StmtKind,
};
use rustc_hash::FxHashMap;

/// Binds every file of one package to a shared scope tree and object table, grounded on
/// `raya-checker/src/binder.rs`'s `Binder<'a>`: one method per declaration/statement
/// category, pushing and popping scopes around each nested construct.
pub struct Binder<'a> {
    package: &'a str,
    files: &'a [(FileId, Ast)],
    objects: crate::object::Objects,
    scopes: ScopeTree,
    table: ObjectTable,
    implicits: ImplicitsTable,
    package_objects: FxHashMap<String, ObjectId>,
}

pub struct BoundPackage {
    pub objects: crate::object::Objects,
    pub scopes: ScopeTree,
    pub table: ObjectTable,
    pub implicits: ImplicitsTable,
    pub package_objects: FxHashMap<String, ObjectId>,
}

impl<'a> Binder<'a> {
    pub fn bind(package: &'a str, files: &'a [(FileId, Ast)]) -> BoundPackage {
        let mut binder = Binder {
            package,
            files,
            objects: crate::object::Objects::new(),
            scopes: ScopeTree::new(),
            table: ObjectTable::new(),
            implicits: ImplicitsTable::new(),
            package_objects: FxHashMap::default(),
        };
        binder.bind_top_levels();
        binder.bind_bodies();
        BoundPackage {
            objects: binder.objects,
            scopes: binder.scopes,
            table: binder.table,
            implicits: binder.implicits,
            package_objects: binder.package_objects,
        }
    }

    fn define_top(&mut self, name: &str, kind: ObjectKind, receiver_type: Option<String>) -> ObjectId {
        let scope = self.scopes.global_scope();
        let obj = self.objects.define(Object {
            kind,
            name: name.to_string(),
            package: self.package.to_string(),
            scope,
            receiver_type,
            is_param: false,
        });
        self.scopes.define_in(scope, name, obj);
        obj
    }

    fn bind_top_levels(&mut self) {
        for (file_id, ast) in self.files {
            for &decl_id in &ast.file().decls {
                self.bind_top_decl(*file_id, ast, decl_id);
            }
        }
    }

    fn bind_top_decl(&mut self, file: FileId, ast: &Ast, decl_id: DeclId) {
        let decl = ast.decl(decl_id);
        match &decl.kind {
            DeclKind::Func(f) => {
                let receiver_type = f.receiver.as_ref().map(|r| type_name(ast, r.ty));
                let kind = if receiver_type.is_some() { ObjectKind::Method } else { ObjectKind::Function };
                let obj = self.define_top(&f.name, kind, receiver_type);
                self.table.record_def(Occurrence::new(file, Site::DeclName(decl_id)), obj);
            }
            DeclKind::Type(t) => {
                let kind = if is_interface(ast, t.ty) { ObjectKind::Interface } else { ObjectKind::NamedType };
                let obj = self.define_top(&t.name, kind, None);
                self.table.record_def(Occurrence::new(file, Site::DeclName(decl_id)), obj);
            }
            DeclKind::Var(v) | DeclKind::Const(v) => {
                for name in &v.names {
                    let obj = self.define_top(name, ObjectKind::Variable, None);
                    self.table.record_def(Occurrence::new(file, Site::DeclName(decl_id)), obj);
                }
            }
            DeclKind::Import(imp) => {
                let local_name = imp.alias.clone().unwrap_or_else(|| {
                    imp.path.rsplit('/').next().unwrap_or(&imp.path).to_string()
                });
                let obj = self.objects.define(Object {
                    kind: ObjectKind::Package,
                    name: local_name.clone(),
                    package: imp.path.clone(),
                    scope: self.scopes.global_scope(),
                    receiver_type: None,
                    is_param: false,
                });
                self.package_objects.insert(local_name.clone(), obj);
                self.table.record_def(Occurrence::new(file, Site::ImportAlias(decl_id)), obj);
            }
        }
    }

    fn bind_bodies(&mut self) {
        let files = self.files;
        for (file_id, ast) in files {
            for &decl_id in &ast.file().decls {
                if let DeclKind::Func(f) = &ast.decl(decl_id).kind {
                    self.bind_function(*file_id, ast, decl_id, f);
                }
            }
        }
    }

    fn bind_function(&mut self, file: FileId, ast: &Ast, decl_id: DeclId, f: &godoctor_ast::FuncDecl) {
        self.scopes.push_scope();
        let mut param_index = 0u32;
        if let Some(recv) = &f.receiver {
            if let Some(name) = &recv.name {
                let obj = self.objects.define(Object {
                    kind: ObjectKind::Variable,
                    name: name.clone(),
                    package: self.package.to_string(),
                    scope: self.scopes.current_scope_id(),
                    receiver_type: None,
                    is_param: true,
                });
                self.scopes.define(name, obj);
                self.table.record_def(Occurrence::new(file, Site::Param(decl_id, param_index)), obj);
                param_index += 1;
            }
        }
        for p in f.params.iter().chain(f.results.iter()) {
            if let Some(name) = &p.name {
                let obj = self.objects.define(Object {
                    kind: ObjectKind::Variable,
                    name: name.clone(),
                    package: self.package.to_string(),
                    scope: self.scopes.current_scope_id(),
                    receiver_type: None,
                    is_param: true,
                });
                self.scopes.define(name, obj);
                self.table.record_def(Occurrence::new(file, Site::Param(decl_id, param_index)), obj);
            }
            param_index += 1;
        }
        if let Some(body) = f.body {
            self.bind_stmt(file, ast, body);
        }
        self.scopes.pop_scope();
    }

    fn bind_stmt(&mut self, file: FileId, ast: &Ast, id: StmtId) {
        match &ast.stmt(id).kind {
            StmtKind::Block(stmts) => {
                self.scopes.push_scope();
                for &s in stmts {
                    self.bind_stmt(file, ast, s);
                }
                self.scopes.pop_scope();
            }
            StmtKind::ShortVarDecl { names, values } => {
                for &v in values {
                    self.resolve_expr(file, ast, v);
                }
                for (i, name) in names.iter().enumerate() {
                    let obj = self.objects.define(Object {
                        kind: ObjectKind::Variable,
                        name: name.clone(),
                        package: self.package.to_string(),
                        scope: self.scopes.current_scope_id(),
                        receiver_type: None,
                        is_param: false,
                    });
                    self.scopes.define(name, obj);
                    self.table.record_def(Occurrence::new(file, Site::ShortVarName(id, i as u32)), obj);
                }
            }
            StmtKind::Decl(decl_id) => {
                let decl = ast.decl(*decl_id).clone();
                if let DeclKind::Var(v) | DeclKind::Const(v) = &decl.kind {
                    for &val in &v.values {
                        self.resolve_expr(file, ast, val);
                    }
                    for (i, name) in v.names.iter().enumerate() {
                        let obj = self.objects.define(Object {
                            kind: ObjectKind::Variable,
                            name: name.clone(),
                            package: self.package.to_string(),
                            scope: self.scopes.current_scope_id(),
                            receiver_type: None,
                            is_param: false,
                        });
                        self.scopes.define(name, obj);
                        let _ = i;
                        self.table.record_def(Occurrence::new(file, Site::DeclName(*decl_id)), obj);
                    }
                }
            }
            StmtKind::Assign { lhs, rhs, .. } => {
                for &e in lhs.iter().chain(rhs.iter()) {
                    self.resolve_expr(file, ast, e);
                }
            }
            StmtKind::IncDec { target, .. } => self.resolve_expr(file, ast, *target),
            StmtKind::ExprStmt(e) => self.resolve_expr(file, ast, *e),
            StmtKind::If { init, cond, then_branch, else_branch } => {
                self.scopes.push_scope();
                if let Some(s) = init {
                    self.bind_stmt(file, ast, *s);
                }
                self.resolve_expr(file, ast, *cond);
                self.bind_stmt(file, ast, *then_branch);
                if let Some(s) = else_branch {
                    self.bind_stmt(file, ast, *s);
                }
                self.scopes.pop_scope();
            }
            StmtKind::For { init, cond, post, body, .. } => {
                self.scopes.push_scope();
                if let Some(s) = init {
                    self.bind_stmt(file, ast, *s);
                }
                if let Some(e) = cond {
                    self.resolve_expr(file, ast, *e);
                }
                if let Some(s) = post {
                    self.bind_stmt(file, ast, *s);
                }
                self.bind_stmt(file, ast, *body);
                self.scopes.pop_scope();
            }
            StmtKind::ForRange { key, value, range_expr, body, define, .. } => {
                self.scopes.push_scope();
                self.resolve_expr(file, ast, *range_expr);
                for e in [key, value].into_iter().flatten() {
                    if let ExprKind::Ident(name) = &ast.expr(*e).kind {
                        if *define {
                            let obj = self.objects.define(Object {
                                kind: ObjectKind::Variable,
                                name: name.clone(),
                                package: self.package.to_string(),
                                scope: self.scopes.current_scope_id(),
                                receiver_type: None,
                                is_param: false,
                            });
                            self.scopes.define(name, obj);
                            self.table.record_def(Occurrence::new(file, Site::Expr(*e)), obj);
                        } else {
                            self.resolve_expr(file, ast, *e);
                        }
                    }
                }
                self.bind_stmt(file, ast, *body);
                self.scopes.pop_scope();
            }
            StmtKind::Switch { init, tag, cases, .. } => {
                self.scopes.push_scope();
                if let Some(s) = init {
                    self.bind_stmt(file, ast, *s);
                }
                if let Some(e) = tag {
                    self.resolve_expr(file, ast, *e);
                }
                for case in cases {
                    self.scopes.push_scope();
                    for &v in &case.values {
                        self.resolve_expr(file, ast, v);
                    }
                    for &s in &case.body {
                        self.bind_stmt(file, ast, s);
                    }
                    self.scopes.pop_scope();
                }
                self.scopes.pop_scope();
            }
            StmtKind::TypeSwitch { init, binding, subject, cases, .. } => {
                self.scopes.push_scope();
                if let Some(s) = init {
                    self.bind_stmt(file, ast, *s);
                }
                self.resolve_expr(file, ast, *subject);
                let binding_obj = binding.as_ref().map(|name| {
                    let obj = self.objects.define(Object {
                        kind: ObjectKind::Variable,
                        name: name.clone(),
                        package: self.package.to_string(),
                        scope: self.scopes.current_scope_id(),
                        receiver_type: None,
                        is_param: false,
                    });
                    self.table.record_def(Occurrence::new(file, Site::TypeSwitchBinding(id)), obj);
                    (name.clone(), obj)
                });
                for (case_idx, case) in cases.iter().enumerate() {
                    self.scopes.push_scope();
                    if let Some((name, _)) = &binding_obj {
                        let implicit = self.objects.define(Object {
                            kind: ObjectKind::Variable,
                            name: name.clone(),
                            package: self.package.to_string(),
                            scope: self.scopes.current_scope_id(),
                            receiver_type: None,
                            is_param: false,
                        });
                        self.scopes.define(name, implicit);
                        self.implicits.record(file, id, case_idx as u32, implicit);
                        self.table.record_def(
                            Occurrence::new(file, Site::TypeSwitchImplicit(id, case_idx as u32)),
                            implicit,
                        );
                    }
                    for &s in &case.body {
                        self.bind_stmt(file, ast, s);
                    }
                    self.scopes.pop_scope();
                }
                self.scopes.pop_scope();
            }
            StmtKind::Select { comms, .. } => {
                for comm in comms {
                    self.scopes.push_scope();
                    if let Some(s) = comm.comm {
                        self.bind_stmt(file, ast, s);
                    }
                    for &s in &comm.body {
                        self.bind_stmt(file, ast, s);
                    }
                    self.scopes.pop_scope();
                }
            }
            StmtKind::Defer(e) | StmtKind::Go(e) => self.resolve_expr(file, ast, *e),
            StmtKind::Return(exprs) => {
                for &e in exprs {
                    self.resolve_expr(file, ast, e);
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Goto(_) | StmtKind::Fallthrough => {}
            StmtKind::Labeled { label, stmt } => {
                let obj = self.objects.define(Object {
                    kind: ObjectKind::Label,
                    name: label.clone(),
                    package: self.package.to_string(),
                    scope: self.scopes.global_scope(),
                    receiver_type: None,
                    is_param: false,
                });
                self.table.record_def(Occurrence::new(file, Site::Label(id)), obj);
                self.bind_stmt(file, ast, *stmt);
            }
        }
    }

    fn resolve_expr(&mut self, file: FileId, ast: &Ast, id: ExprId) {
        match &ast.expr(id).kind {
            ExprKind::Ident(name) => {
                if let Some(obj) = self.scopes.resolve(name).or_else(|| self.package_objects.get(name).copied()) {
                    self.table.record_use(Occurrence::new(file, Site::Expr(id)), obj);
                }
            }
            ExprKind::Literal(_) => {}
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(file, ast, *left);
                self.resolve_expr(file, ast, *right);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Star(operand)
            | ExprKind::AddressOf(operand)
            | ExprKind::Paren(operand) => self.resolve_expr(file, ast, *operand),
            ExprKind::Call { callee, args, .. } => {
                self.resolve_expr(file, ast, *callee);
                for &a in args {
                    self.resolve_expr(file, ast, a);
                }
            }
            ExprKind::Selector { base, .. } => self.resolve_expr(file, ast, *base),
            ExprKind::Index { base, index } => {
                self.resolve_expr(file, ast, *base);
                self.resolve_expr(file, ast, *index);
            }
            ExprKind::Slice { base, low, high, max } => {
                self.resolve_expr(file, ast, *base);
                for e in [low, high, max].into_iter().flatten() {
                    self.resolve_expr(file, ast, *e);
                }
            }
            ExprKind::TypeAssert { base, .. } => self.resolve_expr(file, ast, *base),
            ExprKind::CompositeLit { elements, .. } => {
                for (k, v) in elements {
                    if let Some(k) = k {
                        self.resolve_expr(file, ast, *k);
                    }
                    self.resolve_expr(file, ast, *v);
                }
            }
            ExprKind::FuncLit { body, .. } => {
                self.scopes.push_scope();
                self.bind_stmt(file, ast, *body);
                self.scopes.pop_scope();
            }
        }
    }
}

fn type_name(ast: &Ast, ty: godoctor_ast::TypeId) -> String {
    match &ast.ty(ty).kind {
        godoctor_ast::TypeKind::Named { path } => path.join("."),
        godoctor_ast::TypeKind::Pointer(inner) => format!("*{}", type_name(ast, *inner)),
        _ => String::from("<anonymous>"),
    }
}

fn is_interface(ast: &Ast, ty: godoctor_ast::TypeId) -> bool {
    matches!(ast.ty(ty).kind, godoctor_ast::TypeKind::Interface { .. })
}
