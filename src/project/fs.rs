//! File system access for the pipeline.
//!
//! The pipeline never touches `std::fs` directly. [`OsFileSystem`] is the
//! real disk; [`MemoryFileSystem`] keeps everything in a map, for tests and
//! for callers that want to inspect results before anything is written.

use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Minimal file operations the pipeline needs.
pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Write `contents`, creating the file and its parent directories.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Move a file. The default copies then removes.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let contents = self.read(from)?;
        self.write(to, &contents)?;
        self.remove(from)
    }
}

/// The real file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(from, to)
    }
}

/// An in-memory file system. Insertion order is preserved.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<IndexMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.write().insert(path.into(), contents.into());
        self
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.read().get(path).cloned()
    }

    /// All paths currently present, in insertion order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }

    /// A copy of every file.
    pub fn snapshot(&self) -> IndexMap<PathBuf, String> {
        self.files.read().clone()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.contents(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files
            .write()
            .insert(path.to_owned(), contents.to_owned());
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.files
            .write()
            .shift_remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_rename_moves_contents() {
        let fs = MemoryFileSystem::new().with_file("a.php", "<?php");
        fs.rename(Path::new("a.php"), Path::new("b/a.php")).unwrap();

        assert!(!fs.exists(Path::new("a.php")));
        assert_eq!(fs.contents(Path::new("b/a.php")).as_deref(), Some("<?php"));
    }

    #[test]
    fn test_memory_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read(Path::new("missing.php")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.remove(Path::new("missing.php")).is_err());
    }

    #[test]
    fn test_os_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/File.php");

        OsFileSystem.write(&path, "<?php\n").unwrap();

        assert!(OsFileSystem.exists(&path));
        assert_eq!(OsFileSystem.read(&path).unwrap(), "<?php\n");

        let moved = dir.path().join("moved/File.php");
        OsFileSystem.rename(&path, &moved).unwrap();
        assert!(!OsFileSystem.exists(&path));
        assert!(OsFileSystem.exists(&moved));
    }
}
