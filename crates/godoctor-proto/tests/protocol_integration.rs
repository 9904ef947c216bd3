use godoctor_fs::RealFileSystem;
use godoctor_proto::{handle_line, Session};

fn write_fixture(dir: &std::path::Path) {
    std::fs::write(dir.join("a.go"), b"package a\n\nfunc F() {\n\treturn\n}\n").unwrap();
}

#[test]
fn setdir_then_list_then_debug_xrun_round_trips_over_json() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let mut session = Session::new(Box::new(RealFileSystem));

    let setdir = format!(r#"{{"command":"setdir","dir":{:?}}}"#, dir.path().display().to_string());
    let replies = handle_line(&mut session, &setdir);
    assert_eq!(replies[0].reply, "OK");

    let replies = handle_line(&mut session, r#"{"command":"list"}"#);
    assert_eq!(replies[0].reply, "OK");

    let file = dir.path().join("a.go").display().to_string();
    let xrun = format!(
        r#"{{"command":"xrun","refactoring":"debug","file":{:?},"selection":{{"start_line":1,"start_col":1,"end_line":1,"end_col":1}},"args":[]}}"#,
        file
    );
    let replies = handle_line(&mut session, &xrun);
    assert_eq!(replies[0].reply, "OK");
}

#[test]
fn xrun_before_setdir_is_rejected_over_json() {
    let mut session = Session::new(Box::new(RealFileSystem));
    let replies = handle_line(
        &mut session,
        r#"{"command":"xrun","refactoring":"debug","file":"a.go","selection":{"start_line":1,"start_col":1,"end_line":1,"end_col":1},"args":[]}"#,
    );
    assert_eq!(replies[0].reply, "Error");
}

#[test]
fn batch_mode_processes_every_command_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let mut session = Session::new(Box::new(RealFileSystem));

    let batch = format!(
        r#"[{{"command":"about"}},{{"command":"setdir","dir":{:?}}},{{"command":"list"}}]"#,
        dir.path().display().to_string()
    );
    let replies = handle_line(&mut session, &batch);
    assert_eq!(replies.len(), 3);
    for reply in &replies {
        assert_eq!(reply.reply, "OK");
    }
}
