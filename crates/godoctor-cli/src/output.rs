use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolves the stream's color behaviour the way terminal tools conventionally do:
/// `NO_COLOR` always wins, a bare TTY check otherwise.
fn resolve_color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Prints a CLI-level error (exit 1/3 paths) to stderr in red, mirroring how refactoring
/// diagnostics are reported elsewhere in the engine.
pub fn print_error(message: &str) {
    let mut stderr = StandardStream::stderr(resolve_color_choice());
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error: ");
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{message}");
}
