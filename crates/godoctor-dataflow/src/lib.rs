//! Bit-vector dataflow engines over a `godoctor_cfg::Cfg` (§4.3): reaching definitions
//! and live variables, plus the per-statement def/use/updated classifier they share.

mod bitset;
mod classify;
mod live;
mod reaching;

pub use bitset::BitSet;
pub use classify::{classify_stmt, type_switch_implicit_def, StmtEffect};
pub use live::{live_variables, LiveVariables};
pub use reaching::{reaching_definitions, ReachingDefinitions};
