//! The stateful JSON protocol (§6): a conversation over stdin/stdout with `about`,
//! `open`, `setdir`, `list`, `params`, `put`, `xrun`, plus a single-object batch mode
//! taking an array of commands. Each reply is a single-line JSON object with a `reply`
//! field of `OK` or `Error`.

mod commands;
mod locate;
pub mod message;
pub mod registry;
pub mod session;

pub use commands::dispatch;
pub use message::{ArgSpec, Reply, Request, SelectionSpec};
pub use session::{Session, State};

use std::io::{BufRead, Write};

/// One line of the conversation: either a single request object or a JSON array of
/// requests processed in order, each producing its own reply line — batch mode never
/// merges replies into one, since a client needs to tell which command failed.
pub fn handle_line(session: &mut Session, line: &str) -> Vec<Reply> {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match serde_json::from_value::<Request>(item) {
                Ok(req) => dispatch(session, req),
                Err(e) => Reply::error(format!("malformed command: {e}")),
            })
            .collect(),
        Ok(value) => match serde_json::from_value::<Request>(value) {
            Ok(req) => vec![dispatch(session, req)],
            Err(e) => vec![Reply::error(format!("malformed command: {e}"))],
        },
        Err(e) => vec![Reply::error(format!("malformed JSON: {e}"))],
    }
}

/// Drives the protocol over arbitrary reader/writer pairs (stdin/stdout in practice):
/// one request per input line, one reply per output line.
pub fn run<R: BufRead, W: Write>(session: &mut Session, mut input: R, mut output: W) -> std::io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = input.read_line(&mut line)?;
        if n == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        for reply in handle_line(session, trimmed) {
            let text = serde_json::to_string(&reply).unwrap_or_else(|_| "{\"reply\":\"Error\"}".to_string());
            writeln!(output, "{text}")?;
        }
        output.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use godoctor_fs::RealFileSystem;

    #[test]
    fn about_is_legal_in_a_fresh_session() {
        let mut session = Session::new(Box::new(RealFileSystem));
        let replies = handle_line(&mut session, r#"{"command":"about"}"#);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].reply, "OK");
    }

    #[test]
    fn xrun_before_setdir_is_rejected() {
        let mut session = Session::new(Box::new(RealFileSystem));
        let replies = handle_line(
            &mut session,
            r#"{"command":"xrun","refactoring":"rename","file":"a.go","selection":{"start_line":1,"start_col":1,"end_line":1,"end_col":1},"args":["x"]}"#,
        );
        assert_eq!(replies[0].reply, "Error");
    }

    #[test]
    fn batch_mode_runs_each_command_and_replies_in_order() {
        let mut session = Session::new(Box::new(RealFileSystem));
        let replies = handle_line(&mut session, r#"[{"command":"about"},{"command":"list"}]"#);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].reply, "OK");
        assert_eq!(replies[1].reply, "OK");
    }
}
