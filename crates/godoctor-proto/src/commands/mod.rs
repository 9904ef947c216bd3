mod about;
mod list;
mod open;
mod params;
mod put;
mod setdir;
mod xrun;

use crate::message::{Reply, Request};
use crate::session::{Session, State};

fn required_state(request: &Request) -> State {
    match request {
        Request::About => State::Fresh,
        Request::Open { .. } => State::Fresh,
        Request::Setdir { .. } => State::Fresh,
        Request::List => State::DirConfigured,
        Request::Params { .. } => State::DirConfigured,
        Request::Put { .. } => State::Opened,
        Request::Xrun { .. } => State::DirConfigured,
    }
}

/// Runs one request against `session`, rejecting it with an `Error` reply if the
/// session hasn't reached the state level it requires (§6).
pub fn dispatch(session: &mut Session, request: Request) -> Reply {
    let need = required_state(&request);
    if session.state() < need {
        return Reply::error(format!(
            "this command requires state {need:?} or later, session is at {:?}",
            session.state()
        ));
    }
    match request {
        Request::About => about::about(),
        Request::Open { path } => open::open(session, path),
        Request::Setdir { dir, web } => setdir::setdir(session, dir, web),
        Request::List => list::list(),
        Request::Params { refactoring } => params::params(&refactoring),
        Request::Put { path, text } => put::put(session, path, text),
        Request::Xrun { refactoring, file, selection, scope: _scope, args } => {
            xrun::xrun(session, &refactoring, &file, selection, &args)
        }
    }
}
