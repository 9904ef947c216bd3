use crate::error::FsError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// The file-system collaborator consumed by refactorings (§6 File-system interface):
/// read a file, list a directory, and write a file's new content.
pub trait FileSystem {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FsError>;
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>, FsError>;
    fn overwrite_file(&self, path: &Path, content: &[u8]) -> Result<(), FsError>;
}
