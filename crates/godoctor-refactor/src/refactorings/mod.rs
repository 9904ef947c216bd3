pub mod add_doc;
pub mod debug;
pub mod extract_function;
pub mod extract_local;
pub mod rename;
pub mod toggle_var;

pub use add_doc::add_doc_comments;
pub use debug::{debug_annotate_function, debug_dump};
pub use extract_function::extract_function;
pub use extract_local::extract_local;
pub use rename::rename;
pub use toggle_var::toggle_var;
