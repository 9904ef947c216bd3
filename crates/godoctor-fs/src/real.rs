use crate::error::FsError;
use crate::trait_def::{DirEntry, FileSystem};
use std::path::Path;

/// Delegates straight to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        std::fs::read(path).map_err(|source| FsError::Io { path: path.to_path_buf(), source })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError> {
        let entries = std::fs::read_dir(path).map_err(|source| FsError::Io { path: path.to_path_buf(), source })?;
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FsError::Io { path: path.to_path_buf(), source })?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            out.push(DirEntry { path: entry.path(), is_dir });
        }
        Ok(out)
    }

    fn overwrite_file(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        std::fs::write(path, content).map_err(|source| FsError::Io { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_writes_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.go");
        let fs = RealFileSystem;
        fs.overwrite_file(&path, b"package main\n").unwrap();
        let content = fs.open_file(&path).unwrap();
        assert_eq!(content, b"package main\n");
    }

    #[test]
    fn lists_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.go"), b"package main\n").unwrap();
        let fs = RealFileSystem;
        let entries = fs.read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_dir);
    }
}
