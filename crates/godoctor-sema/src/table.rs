use crate::object::ObjectId;
use godoctor_ast::{ExprId, StmtId};
use rustc_hash::FxHashMap;

/// A file-local identifier occurrence site: either an `ExprKind::Ident` node (the vast
/// majority of uses) or a syntactic binding position that has no standalone expression
/// node of its own (a declared name, a short-var-decl name, a type-switch binding, a
/// label, an import alias, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Expr(ExprId),
    DeclName(godoctor_ast::DeclId),
    Param(godoctor_ast::DeclId, u32),
    ShortVarName(StmtId, u32),
    TypeSwitchBinding(StmtId),
    TypeSwitchImplicit(StmtId, u32),
    Label(StmtId),
    ImportAlias(godoctor_ast::DeclId),
}

pub type FileId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub file: FileId,
    pub site: Site,
}

impl Occurrence {
    pub fn new(file: FileId, site: Site) -> Self {
        Occurrence { file, site }
    }
}

/// Maps each identifier occurrence to either a definition or a use of a semantic object
/// (§3 Semantic object). Grounded on the binder/table split in
/// `raya-checker/src/binder.rs` + `symbols.rs`.
#[derive(Debug, Default)]
pub struct ObjectTable {
    defs: FxHashMap<Occurrence, ObjectId>,
    uses: FxHashMap<Occurrence, ObjectId>,
}

impl ObjectTable {
    pub fn new() -> Self {
        ObjectTable::default()
    }

    pub fn record_def(&mut self, occ: Occurrence, object: ObjectId) {
        self.defs.insert(occ, object);
    }

    pub fn record_use(&mut self, occ: Occurrence, object: ObjectId) {
        self.uses.insert(occ, object);
    }

    pub fn object_of(&self, occ: Occurrence) -> Option<ObjectId> {
        self.defs.get(&occ).or_else(|| self.uses.get(&occ)).copied()
    }

    pub fn is_def(&self, occ: Occurrence) -> bool {
        self.defs.contains_key(&occ)
    }

    pub fn defs_of(&self, object: ObjectId) -> Vec<Occurrence> {
        self.defs.iter().filter(|(_, &o)| o == object).map(|(occ, _)| *occ).collect()
    }

    pub fn uses_of(&self, object: ObjectId) -> Vec<Occurrence> {
        self.uses.iter().filter(|(_, &o)| o == object).map(|(occ, _)| *occ).collect()
    }

    pub fn all_defs(&self) -> impl Iterator<Item = (&Occurrence, &ObjectId)> {
        self.defs.iter()
    }

    pub fn all_uses(&self) -> impl Iterator<Item = (&Occurrence, &ObjectId)> {
        self.uses.iter()
    }
}

/// Maps each type-switch case clause to its synthesized implicit variable (§3 Implicit
/// variable): `(file, stmt, case index) -> ObjectId`.
#[derive(Debug, Default)]
pub struct ImplicitsTable {
    implicits: FxHashMap<(FileId, StmtId, u32), ObjectId>,
}

impl ImplicitsTable {
    pub fn new() -> Self {
        ImplicitsTable::default()
    }

    pub fn record(&mut self, file: FileId, stmt: StmtId, case_index: u32, object: ObjectId) {
        self.implicits.insert((file, stmt, case_index), object);
    }

    pub fn get(&self, file: FileId, stmt: StmtId, case_index: u32) -> Option<ObjectId> {
        self.implicits.get(&(file, stmt, case_index)).copied()
    }

    pub fn all(&self) -> impl Iterator<Item = (&(FileId, StmtId, u32), &ObjectId)> {
        self.implicits.iter()
    }
}
