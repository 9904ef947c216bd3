use crate::error::FsError;
use crate::trait_def::{DirEntry, FileSystem};
use godoctor_text::EditSet;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// Serves an in-memory string for one path and delegates to `inner` for everything
/// else (§6: "a 'single edited file' view that serves an in-memory string for one
/// path"). Used when the CLI reads source from standard input.
pub struct SingleFileOverlay<FS> {
    inner: FS,
    path: PathBuf,
    content: Vec<u8>,
}

impl<FS: FileSystem> SingleFileOverlay<FS> {
    pub fn new(inner: FS, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        SingleFileOverlay { inner, path: path.into(), content: content.into() }
    }
}

impl<FS: FileSystem> FileSystem for SingleFileOverlay<FS> {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        if path == self.path {
            Ok(self.content.clone())
        } else {
            self.inner.open_file(path)
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        self.inner.read_dir(path)
    }

    fn overwrite_file(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        self.inner.overwrite_file(path, content)
    }
}

/// Applies a map of per-path `EditSet`s on top of `inner` (§6: "an 'edited' view that
/// applies a map of edit sets on top of another file system"). `open_file` for a path
/// with a registered edit set returns the edited content; writes are forwarded as-is.
pub struct EditedOverlay<FS> {
    inner: FS,
    edits: FxHashMap<PathBuf, EditSet>,
}

impl<FS: FileSystem> EditedOverlay<FS> {
    pub fn new(inner: FS, edits: FxHashMap<PathBuf, EditSet>) -> Self {
        EditedOverlay { inner, edits }
    }
}

impl<FS: FileSystem> FileSystem for EditedOverlay<FS> {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let original = self.inner.open_file(path)?;
        match self.edits.get(path) {
            Some(edit_set) => edit_set
                .apply_to(&original)
                .map_err(|_| FsError::NotAFile { path: path.to_path_buf() }),
            None => Ok(original),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        self.inner.read_dir(path)
    }

    fn overwrite_file(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        self.inner.overwrite_file(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::real::RealFileSystem;
    use godoctor_text::Extent;

    #[test]
    fn single_file_overlay_serves_in_memory_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stdin.go");
        let overlay = SingleFileOverlay::new(RealFileSystem, &path, b"package main\n".to_vec());
        assert_eq!(overlay.open_file(&path).unwrap(), b"package main\n");
    }

    #[test]
    fn edited_overlay_applies_registered_edit_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.go");
        std::fs::write(&path, b"0123456789").unwrap();
        let mut edit_set = EditSet::new();
        edit_set.add(Extent::new(2, 0), "A").unwrap();
        let mut edits = FxHashMap::default();
        edits.insert(path.clone(), edit_set);
        let overlay = EditedOverlay::new(RealFileSystem, edits);
        assert_eq!(overlay.open_file(&path).unwrap(), b"01A23456789");
    }
}
