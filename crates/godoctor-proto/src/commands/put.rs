use crate::message::Reply;
use crate::session::{Session, State};
use std::path::PathBuf;

/// `put` (§6): overlays `path` with client-supplied text without touching disk — how a
/// client streams unsaved editor buffers into the session before running a refactoring
/// against them. Available once a session has opened at least one file.
pub fn put(session: &mut Session, path: String, text: String) -> Reply {
    session.put_overlay(PathBuf::from(path), text.into_bytes());
    session.raise_state(State::Opened);
    Reply::ok(None)
}
