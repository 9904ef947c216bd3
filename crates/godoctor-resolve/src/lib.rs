//! Name-resolution services consumed by the refactorings (§4.4): occurrence search,
//! interface-implementation closure for method rename, type-switch and package-name
//! occurrence search, KMP comment search, and conflict detection.

mod comment_search;
mod conflict;
mod interface_closure;
mod occurrence;

pub use comment_search::find_whole_word_occurrences;
pub use conflict::{check_rename_conflict, ConflictReason};
pub use interface_closure::method_rename_set;
pub use occurrence::{occurrences_of, package_name_occurrences, type_switch_occurrence_set, Found};
