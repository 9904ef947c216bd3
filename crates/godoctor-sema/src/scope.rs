use crate::object::{ObjectId, ScopeId};
use rustc_hash::FxHashMap;

/// Lexical scope tree plus a scope stack, grounded directly on the teacher's
/// `SymbolTable` (`raya-checker/src/symbols.rs`): `push_scope`/`pop_scope`/`define`/
/// `resolve` walking parent links to the package (global) scope.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
    stack: Vec<ScopeId>,
}

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    bindings: FxHashMap<String, ObjectId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut tree = ScopeTree { scopes: vec![ScopeData::default()], stack: Vec::new() };
        tree.stack.push(ScopeId(0));
        tree
    }

    pub fn global_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current_scope_id(&self) -> ScopeId {
        *self.stack.last().expect("scope stack never empties")
    }

    pub fn push_scope(&mut self) -> ScopeId {
        let parent = self.current_scope_id();
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData { parent: Some(parent), bindings: FxHashMap::default() });
        self.stack.push(id);
        id
    }

    pub fn pop_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }

    /// Defines `name` in the current scope. Returns the existing object if already
    /// bound directly in this scope (a same-scope duplicate is a conflict for the
    /// caller to report, not this table's job to prevent).
    pub fn define(&mut self, name: &str, object: ObjectId) -> Option<ObjectId> {
        let scope = self.current_scope_id();
        self.define_in(scope, name, object)
    }

    pub fn define_in(&mut self, scope: ScopeId, name: &str, object: ObjectId) -> Option<ObjectId> {
        self.scopes[scope.0 as usize].bindings.insert(name.to_string(), object)
    }

    /// Resolves `name` starting at the current scope, walking to parents.
    pub fn resolve(&self, name: &str) -> Option<ObjectId> {
        self.resolve_from_scope(self.current_scope_id(), name)
    }

    pub fn resolve_from_scope(&self, scope: ScopeId, name: &str) -> Option<ObjectId> {
        let mut cur = Some(scope);
        while let Some(s) = cur {
            if let Some(&obj) = self.scopes[s.0 as usize].bindings.get(name) {
                return Some(obj);
            }
            cur = self.scopes[s.0 as usize].parent;
        }
        None
    }

    /// `true` iff `name` is bound directly in `scope` (not a parent) — used by conflict
    /// detection's "enclosing scope already declares newName" rule.
    pub fn declares_directly(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0 as usize].bindings.contains_key(name)
    }

    /// All scopes whose parent chain passes through `scope` — i.e. `scope` and every
    /// descendant, used by conflict detection's "or any child scope" rule.
    pub fn descendants_including(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut result = vec![scope];
        let mut changed = true;
        while changed {
            changed = false;
            for (i, data) in self.scopes.iter().enumerate() {
                let id = ScopeId(i as u32);
                if result.contains(&id) {
                    continue;
                }
                if let Some(p) = data.parent {
                    if result.contains(&p) {
                        result.push(id);
                        changed = true;
                    }
                }
            }
        }
        result
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_walks_to_parent() {
        let mut tree = ScopeTree::new();
        tree.define("x", ObjectId(0));
        tree.push_scope();
        assert_eq!(tree.resolve("x"), Some(ObjectId(0)));
        tree.pop_scope();
    }

    #[test]
    fn shadowing_in_child_scope() {
        let mut tree = ScopeTree::new();
        tree.define("x", ObjectId(0));
        tree.push_scope();
        tree.define("x", ObjectId(1));
        assert_eq!(tree.resolve("x"), Some(ObjectId(1)));
        tree.pop_scope();
        assert_eq!(tree.resolve("x"), Some(ObjectId(0)));
    }
}
