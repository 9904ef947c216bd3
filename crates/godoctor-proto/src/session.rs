use godoctor_fs::FileSystem;
use godoctor_text::File;
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// The state a session has reached (§6): commands declare a minimum level and fail
/// with an `Error` reply below it. Each level is a strict superset of what the one
/// before it configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum State {
    /// Nothing opened yet; only `about` and `setdir` make sense.
    Fresh = 0,
    /// At least one file has been opened or `put`.
    Opened = 1,
    /// A working directory has been configured; `list`/`params`/`xrun` become legal.
    DirConfigured = 2,
}

/// The conversation's mutable state: which level it has reached, the configured
/// directory (if any), and an overlay of file contents supplied via `open`/`put` that
/// takes precedence over whatever is on disk — mirroring `godoctor-fs`'s edited-file
/// overlay but scoped to one session rather than one refactoring invocation.
pub struct Session {
    fs: Box<dyn FileSystem>,
    state: State,
    dir: Option<PathBuf>,
    overlays: FxHashMap<PathBuf, Vec<u8>>,
}

impl Session {
    pub fn new(fs: Box<dyn FileSystem>) -> Self {
        Session { fs, state: State::Fresh, dir: None, overlays: FxHashMap::default() }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn raise_state(&mut self, level: State) {
        if level > self.state {
            self.state = level;
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn dir(&self) -> Option<&PathBuf> {
        self.dir.as_ref()
    }

    pub fn set_dir(&mut self, dir: PathBuf) {
        self.dir = Some(dir);
    }

    pub fn put_overlay(&mut self, path: PathBuf, content: Vec<u8>) {
        self.overlays.insert(path, content);
    }

    pub fn overlay(&self, path: &PathBuf) -> Option<&Vec<u8>> {
        self.overlays.get(path)
    }

    /// Every file this session can see right now: the configured directory's `.go`
    /// files (read through the overlay where one exists) plus any overlaid path that
    /// isn't under that directory (an `open`ed file before `setdir` was ever called).
    pub fn visible_sources(&self) -> Vec<(String, File)> {
        let mut out = Vec::new();
        let mut seen = rustc_hash::FxHashSet::default();

        if let Some(dir) = &self.dir {
            if let Ok(entries) = self.fs.read_dir(dir) {
                for entry in entries {
                    if entry.is_dir {
                        continue;
                    }
                    if entry.path.extension().and_then(|e| e.to_str()) != Some("go") {
                        continue;
                    }
                    let content = self
                        .overlays
                        .get(&entry.path)
                        .cloned()
                        .or_else(|| self.fs.open_file(&entry.path).ok())
                        .unwrap_or_default();
                    seen.insert(entry.path.clone());
                    out.push((entry.path.display().to_string(), File::new(entry.path, content)));
                }
            }
        }

        for (path, content) in &self.overlays {
            if seen.contains(path) {
                continue;
            }
            out.push((path.display().to_string(), File::new(path.clone(), content.clone())));
        }

        out
    }
}
