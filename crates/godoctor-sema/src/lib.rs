//! The semantic model consumed from the loader (§3 Semantic object, Implicit variable;
//! §6 Loader interface): semantic objects, the object/implicits tables, scopes, the
//! `Loader` trait, and an in-memory reference implementation.

mod binder;
mod loader;
mod object;
mod scope;
mod table;

pub use binder::{BoundPackage, Binder};
pub use loader::{InMemoryLoader, Loader, PackageInfo, Program};
pub use object::{
    is_predeclared, is_reserved, Object, ObjectId, ObjectKind, Objects, ScopeId,
    PREDECLARED_IDENTIFIERS, RESERVED_WORDS,
};
pub use scope::ScopeTree;
pub use table::{FileId, ImplicitsTable, ObjectTable, Occurrence, Site};
