use godoctor_refactor::{Description, ParamDefault, ParamDescription};

/// The static advertisement for every refactoring this engine exposes over `list`/
/// `params` (§6). Order matches `refactorings/mod.rs`.
pub fn descriptions() -> Vec<Description> {
    vec![
        Description {
            name: "rename",
            synopsis: "Rename a variable, function, method, type, or package",
            params: vec![ParamDescription {
                label: "name".to_string(),
                prompt: "New name".to_string(),
                default_value: ParamDefault::Text(String::new()),
            }],
        },
        Description {
            name: "extract_function",
            synopsis: "Extract the selected statements into a new function",
            params: vec![ParamDescription {
                label: "name".to_string(),
                prompt: "Name of the new function".to_string(),
                default_value: ParamDefault::Text(String::new()),
            }],
        },
        Description {
            name: "extract_local",
            synopsis: "Extract the selected expression into a new local variable",
            params: vec![ParamDescription {
                label: "name".to_string(),
                prompt: "Name of the new variable".to_string(),
                default_value: ParamDefault::Text(String::new()),
            }],
        },
        Description {
            name: "toggle_var",
            synopsis: "Toggle a declaration between short assignment and var form",
            params: vec![],
        },
        Description {
            name: "add_doc",
            synopsis: "Insert placeholder doc comments above undocumented exported declarations",
            params: vec![],
        },
        Description {
            name: "debug",
            synopsis: "Dump the loaded program's CFGs and object table (no edits)",
            params: vec![],
        },
    ]
}

pub fn find(name: &str) -> Option<Description> {
    descriptions().into_iter().find(|d| d.name == name)
}
