use crate::args::parse_selection;
use crate::cli::Cli;
use crate::output::print_error;
use anyhow::Context;
use godoctor_fs::{FileSystem, RealFileSystem};
use godoctor_proto::message::ArgSpec;
use godoctor_proto::session::{Session, State};
use godoctor_proto::{registry, Reply, Request};
use godoctor_refactor::ParamDefault;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_OK: u8 = 0;
const EXIT_ARGS: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_REFACTORING_ERROR: u8 = 3;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    run_inner(cli).map(ExitCode::from)
}

fn run_inner(cli: Cli) -> anyhow::Result<u8> {
    if cli.list {
        print_list();
        return Ok(EXIT_USAGE);
    }

    if cli.man {
        print_man(cli.refactoring.as_deref());
        return Ok(EXIT_USAGE);
    }

    let Some(refactoring) = cli.refactoring.clone() else {
        <Cli as clap::CommandFactory>::command().print_help().ok();
        return Ok(EXIT_USAGE);
    };

    if registry::find(&refactoring).is_none() {
        print_error(&format!("unknown refactoring {refactoring:?}"));
        return Ok(EXIT_ARGS);
    }

    let Some(file_arg) = cli.file.clone() else {
        print_error("-file is required");
        return Ok(EXIT_ARGS);
    };

    let pos = match &cli.pos {
        Some(pos) => pos.clone(),
        None => {
            print_error("-pos is required");
            return Ok(EXIT_ARGS);
        }
    };
    let selection = match parse_selection(&pos) {
        Ok(s) => s,
        Err(e) => {
            print_error(&e);
            return Ok(EXIT_ARGS);
        }
    };

    let fs = RealFileSystem;
    let from_stdin = file_arg == "-";
    let (file_path, dir) = if from_stdin {
        let synthetic_dir = cli
            .scope
            .as_deref()
            .and_then(|s| s.split(',').next())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        (synthetic_dir.join("stdin.go"), synthetic_dir)
    } else {
        let path = PathBuf::from(&file_arg);
        let dir = cli
            .scope
            .as_deref()
            .and_then(|s| s.split(',').next())
            .map(PathBuf::from)
            .unwrap_or_else(|| path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")));
        let Some(file_name) = path.file_name() else {
            print_error("-file has no file name component");
            return Ok(EXIT_ARGS);
        };
        (dir.join(file_name), dir)
    };

    let mut session = Session::new(Box::new(fs));
    if from_stdin {
        let mut content = Vec::new();
        std::io::stdin().read_to_end(&mut content).context("reading source from stdin")?;
        session.put_overlay(file_path.clone(), content);
    } else {
        match session.fs().open_file(&file_path) {
            Ok(content) => session.put_overlay(file_path.clone(), content),
            Err(e) => {
                print_error(&format!("reading {}: {e}", file_path.display()));
                return Ok(EXIT_ARGS);
            }
        }
    }
    session.set_dir(dir);
    session.raise_state(State::DirConfigured);

    let args = cli.args.iter().cloned().map(ArgSpec::Text).collect();
    let request = Request::Xrun {
        refactoring,
        file: file_path.display().to_string(),
        selection,
        scope: Vec::new(),
        args,
    };

    let reply = godoctor_proto::dispatch(&mut session, request);

    if cli.json {
        println!("{}", serde_json::to_string(&reply)?);
        return Ok(exit_for(&reply));
    }

    render(&reply, &cli, from_stdin, &file_path)
}

fn exit_for(reply: &Reply) -> u8 {
    if reply.reply == "Error" {
        EXIT_REFACTORING_ERROR
    } else {
        EXIT_OK
    }
}

fn render(reply: &Reply, cli: &Cli, from_stdin: bool, source_path: &PathBuf) -> anyhow::Result<u8> {
    if reply.reply == "Error" {
        print_error(reply.message.as_deref().unwrap_or("refactoring failed"));
        return Ok(EXIT_REFACTORING_ERROR);
    }

    let payload = reply.payload.as_ref();
    if let Some(dump) = payload.and_then(|p| p.get("dump")).and_then(|v| v.as_str()) {
        println!("{dump}");
        return Ok(EXIT_OK);
    }

    let files = payload.and_then(|p| p.get("files")).and_then(|v| v.as_object());
    let diffs = payload.and_then(|p| p.get("diffs")).and_then(|v| v.as_object());

    if from_stdin {
        if let Some(files) = files {
            let source_key = source_path.display().to_string();
            if files.keys().any(|k| k != &source_key) {
                print_error("refactoring produced edits to a file other than the one read from stdin");
                return Ok(EXIT_REFACTORING_ERROR);
            }
        }
    }

    if cli.write {
        let fs = RealFileSystem;
        if let Some(files) = files {
            for (path, content) in files {
                let Some(text) = content.as_str() else { continue };
                fs.overwrite_file(&PathBuf::from(path), text.as_bytes())
                    .with_context(|| format!("writing {path}"))?;
            }
        }
        return Ok(EXIT_OK);
    }

    if cli.complete {
        if let Some(files) = files {
            for (path, content) in files {
                let Some(text) = content.as_str() else { continue };
                println!("@@@@@ {path} @@@@@ {} @@@@@", text.len());
                print!("{text}");
            }
        }
        return Ok(EXIT_OK);
    }

    if let Some(diffs) = diffs {
        for diff in diffs.values() {
            if let Some(text) = diff.as_str() {
                print!("{text}");
            }
        }
    }
    Ok(EXIT_OK)
}

fn print_list() {
    for desc in registry::descriptions() {
        println!("{}\t{}", desc.name, desc.synopsis);
    }
}

fn print_man(only: Option<&str>) {
    for desc in registry::descriptions() {
        if let Some(only) = only {
            if desc.name != only {
                continue;
            }
        }
        println!("{} - {}", desc.name, desc.synopsis);
        for param in &desc.params {
            let default = match &param.default_value {
                ParamDefault::Bool(b) => b.to_string(),
                ParamDefault::Text(s) => s.clone(),
            };
            println!("  {} ({}): {}", param.label, param.prompt, default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            file: None,
            pos: None,
            scope: None,
            write: false,
            complete: false,
            list: false,
            verbose: 0,
            json: false,
            man: false,
            refactoring: None,
            args: Vec::new(),
        }
    }

    #[test]
    fn no_refactoring_shows_usage() {
        assert_eq!(run_inner(base_cli()).unwrap(), EXIT_USAGE);
    }

    #[test]
    fn list_exits_with_usage_code() {
        let mut cli = base_cli();
        cli.list = true;
        assert_eq!(run_inner(cli).unwrap(), EXIT_USAGE);
    }

    #[test]
    fn man_exits_with_usage_code() {
        let mut cli = base_cli();
        cli.man = true;
        assert_eq!(run_inner(cli).unwrap(), EXIT_USAGE);
    }

    #[test]
    fn unknown_refactoring_is_an_argument_error() {
        let mut cli = base_cli();
        cli.refactoring = Some("not_a_real_refactoring".to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_ARGS);
    }

    #[test]
    fn missing_file_is_an_argument_error() {
        let mut cli = base_cli();
        cli.refactoring = Some("rename".to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_ARGS);
    }

    #[test]
    fn missing_pos_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.go");
        std::fs::write(&file, b"package a\n").unwrap();

        let mut cli = base_cli();
        cli.refactoring = Some("rename".to_string());
        cli.file = Some(file.display().to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_ARGS);
    }

    #[test]
    fn malformed_pos_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.go");
        std::fs::write(&file, b"package a\n").unwrap();

        let mut cli = base_cli();
        cli.refactoring = Some("rename".to_string());
        cli.file = Some(file.display().to_string());
        cli.pos = Some("not-a-position".to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_ARGS);
    }

    #[test]
    fn nonexistent_file_is_an_argument_error() {
        let mut cli = base_cli();
        cli.refactoring = Some("rename".to_string());
        cli.file = Some("/no/such/file.go".to_string());
        cli.pos = Some("1,1:1,1".to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_ARGS);
    }

    #[test]
    fn debug_dump_runs_without_touching_real_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.go");
        std::fs::write(&file, b"package a\n\nfunc F() {}\n").unwrap();

        let mut cli = base_cli();
        cli.refactoring = Some("debug".to_string());
        cli.file = Some(file.display().to_string());
        cli.pos = Some("1,1:1,1".to_string());
        assert_eq!(run_inner(cli).unwrap(), EXIT_OK);
    }
}
