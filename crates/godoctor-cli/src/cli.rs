use clap::Parser;

/// `godoctor [flags] <refactoring> [args…]` (§6 CLI surface).
#[derive(Parser)]
#[command(name = "godoctor")]
#[command(about = "A source-to-source refactoring tool for Go")]
#[command(version)]
pub struct Cli {
    /// Source file the selection is within; `-` reads the file from stdin
    #[arg(long = "file")]
    pub file: Option<String>,

    /// Selection as `startLine,startCol:endLine,endCol` (1-based)
    #[arg(long = "pos")]
    pub pos: Option<String>,

    /// Comma-separated package scope; defaults to the selected file's directory
    #[arg(long = "scope")]
    pub scope: Option<String>,

    /// Write edits back to disk instead of printing a diff
    #[arg(short = 'w', long = "write")]
    pub write: bool,

    /// Print whole updated files instead of a unified diff
    #[arg(long = "complete")]
    pub complete: bool,

    /// List the available refactorings and exit
    #[arg(long = "list")]
    pub list: bool,

    /// Increase verbosity (`-v` info, `-vv` debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit the reply as JSON instead of a diff/text rendering
    #[arg(long = "json")]
    pub json: bool,

    /// Print each refactoring's parameter list and exit
    #[arg(long = "man")]
    pub man: bool,

    /// Refactoring to run (`rename`, `extract_function`, `extract_local`,
    /// `toggle_var`, `add_doc`, `debug`)
    pub refactoring: Option<String>,

    /// Positional arguments for the refactoring (e.g. the new name for `rename`)
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}
