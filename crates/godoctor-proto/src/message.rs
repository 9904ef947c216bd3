use serde::{Deserialize, Serialize};

/// One request from the client, tagged by its `command` field (§6 JSON protocol).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Request {
    About,
    Open {
        path: String,
    },
    Setdir {
        dir: String,
        #[serde(default)]
        web: bool,
    },
    List,
    Params {
        refactoring: String,
    },
    Put {
        path: String,
        text: String,
    },
    Xrun {
        refactoring: String,
        file: String,
        selection: SelectionSpec,
        #[serde(default)]
        scope: Vec<String>,
        #[serde(default)]
        args: Vec<ArgSpec>,
    },
}

/// A 1-based line/column selection, the wire form of an `Extent` before it is resolved
/// against a particular file's line table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectionSpec {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    Bool(bool),
    Text(String),
}

impl ArgSpec {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgSpec::Text(s) => Some(s),
            ArgSpec::Bool(_) => None,
        }
    }
}

/// A single-line reply: `OK` with an optional payload, or `Error` with a message
/// (§6: "replies are single-line JSON objects with a `reply` field OK/Error").
#[derive(Debug, Serialize)]
pub struct Reply {
    pub reply: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Reply {
    pub fn ok(payload: Option<serde_json::Value>) -> Self {
        Reply { reply: "OK", message: None, payload }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Reply { reply: "Error", message: Some(message.into()), payload: None }
    }

    /// Folds a run's diagnostic log into the reply payload under `"diagnostics"`,
    /// whether the reply itself is `OK` (warnings the caller should still see) or
    /// `Error` (the diagnostics explaining why).
    pub fn with_diagnostics(mut self, log: &godoctor_diagnostic::DiagnosticLog) -> Self {
        if log.entries().is_empty() {
            return self;
        }
        let diagnostics = serde_json::to_value(log.to_json()).unwrap_or(serde_json::Value::Null);
        let mut obj = match self.payload.take() {
            Some(serde_json::Value::Object(m)) => m,
            _ => serde_json::Map::new(),
        };
        obj.insert("diagnostics".to_string(), diagnostics);
        self.payload = Some(serde_json::Value::Object(obj));
        self
    }
}
