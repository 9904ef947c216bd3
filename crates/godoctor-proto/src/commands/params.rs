use crate::message::Reply;
use crate::registry;
use godoctor_refactor::ParamDefault;
use serde_json::json;

/// `params` (§6): the parameter list a client must prompt for (or default) before
/// calling `xrun` with this refactoring.
pub fn params(refactoring: &str) -> Reply {
    let Some(desc) = registry::find(refactoring) else {
        return Reply::error(format!("unknown refactoring {refactoring:?}"));
    };
    let params: Vec<serde_json::Value> = desc
        .params
        .iter()
        .map(|p| {
            let default = match &p.default_value {
                ParamDefault::Bool(b) => json!(b),
                ParamDefault::Text(s) => json!(s),
            };
            json!({ "label": p.label, "prompt": p.prompt, "default": default })
        })
        .collect();
    Reply::ok(Some(json!({ "params": params })))
}
