//! Shared text/position/edit model: the leaf layer every other crate in this workspace
//! builds on (spec §2.1, §3, §4.1).

mod diff;
mod edit;
mod file;

pub use diff::unified_diff;
pub use edit::{EditError, EditSet};
pub use file::{Extent, File, Position};
