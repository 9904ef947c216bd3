use crate::message::Reply;
use crate::session::{Session, State};
use godoctor_fs::FileSystem;
use std::path::PathBuf;

/// `setdir` (§6): configures the working directory a subsequent `list`/`params`/`xrun`
/// resolves scopes against. `web` selects the variant where the directory is a virtual
/// workspace assembled entirely from prior `put` calls rather than real disk contents —
/// both modes share this same state transition, since either way the session now has a
/// directory to load packages from.
pub fn setdir(session: &mut Session, dir: String, web: bool) -> Reply {
    let dir = PathBuf::from(dir);
    if !web {
        match session.fs().read_dir(&dir) {
            Ok(_) => {}
            Err(e) => return Reply::error(format!("could not read directory {}: {e}", dir.display())),
        }
    }
    session.set_dir(dir);
    session.raise_state(State::DirConfigured);
    Reply::ok(None)
}
