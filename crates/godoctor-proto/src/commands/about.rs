use crate::message::Reply;
use crate::registry;
use serde_json::json;

/// `about` (§6): always legal, even in a fresh session — identifies the engine and
/// lists what it can do, the way a client probes capabilities before doing anything
/// stateful.
pub fn about() -> Reply {
    let names: Vec<&str> = registry::descriptions().into_iter().map(|d| d.name).collect();
    Reply::ok(Some(json!({
        "name": "godoctor",
        "version": env!("CARGO_PKG_VERSION"),
        "refactorings": names,
    })))
}
