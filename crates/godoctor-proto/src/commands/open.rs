use crate::message::Reply;
use crate::session::{Session, State};
use godoctor_fs::FileSystem;
use std::path::PathBuf;

/// `open` (§6): reads `path` through the session's file system and overlays it,
/// advancing the session to `Opened`. Available from `Fresh`.
pub fn open(session: &mut Session, path: String) -> Reply {
    let path = PathBuf::from(path);
    match session.fs().open_file(&path) {
        Ok(content) => {
            session.put_overlay(path, content);
            session.raise_state(State::Opened);
            Reply::ok(None)
        }
        Err(e) => Reply::error(format!("could not open {}: {e}", path.display())),
    }
}
