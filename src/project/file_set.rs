//! Paths and original contents of the files of one run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use crate::base::FileId;

/// Directories never descended into when collecting sources.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", "node_modules", "vendor", "target"];

/// The files of one run.
///
/// A file's id is its position among the distinct paths seen so far, so the
/// ids of a batch follow the batch order and a repeated path keeps its id.
#[derive(Debug, Default)]
pub struct FileSet {
    paths: IndexSet<PathBuf>,
    /// Contents as read during parsing; files that failed to read have none.
    contents: FxHashMap<FileId, Arc<str>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of `path`, assigning the next one on first sight.
    pub fn file_id(&mut self, path: &Path) -> FileId {
        if let Some(index) = self.paths.get_index_of(path) {
            return file_id_at(index);
        }
        let (index, _) = self.paths.insert_full(path.to_owned());
        file_id_at(index)
    }

    /// The id of `path` if the run has seen it.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.paths.get_index_of(path).map(file_id_at)
    }

    pub fn path(&self, file: FileId) -> Option<&Path> {
        self.paths.get_index(file.index() as usize).map(PathBuf::as_path)
    }

    pub fn set_contents(&mut self, file: FileId, contents: impl Into<Arc<str>>) {
        self.contents.insert(file, contents.into());
    }

    /// Original contents of a parsed file.
    pub fn contents(&self, file: FileId) -> Option<&str> {
        self.contents.get(&file).map(|contents| &**contents)
    }

    /// Number of distinct paths seen, parsed or not.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn file_id_at(index: usize) -> FileId {
    FileId::new(index as u32)
}

/// Every file under `root` whose extension is in `extensions`, sorted.
///
/// Version-control and dependency directories are skipped. A `root` that is
/// itself a file is returned as is.
pub fn collect_source_paths(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_owned()];
    }

    let walker = walkdir::WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && entry.depth() > 0 {
                let name = entry.file_name().to_string_lossy();
                return !SKIPPED_DIRS.contains(&name.as_ref());
            }
            true
        });

    let mut paths: Vec<PathBuf> = walker
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}
