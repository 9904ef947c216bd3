use crate::message::Reply;
use crate::registry;
use serde_json::json;

/// `list` (§6): advertises every refactoring's name and synopsis.
pub fn list() -> Reply {
    let items: Vec<serde_json::Value> = registry::descriptions()
        .into_iter()
        .map(|d| json!({ "name": d.name, "synopsis": d.synopsis }))
        .collect();
    Reply::ok(Some(json!({ "refactorings": items })))
}
