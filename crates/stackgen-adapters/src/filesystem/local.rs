//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use stackgen_core::{
    application::{ApplicationError, ports::{DirEntry, Filesystem}},
    error::{StackgenError, StackgenResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> StackgenResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read"))
    }

    fn read_bytes(&self, path: &Path) -> StackgenResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read"))
    }

    fn list_dir(&self, path: &Path) -> StackgenResult<Vec<DirEntry>> {
        let read_dir = std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "list"))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| map_io_error(path, e, "list"))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| map_io_error(&entry.path(), e, "inspect"))?
                .is_dir();
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read_dir_recursive(&self, path: &Path) -> StackgenResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                map_io_error(&at, io::Error::other(e), "walk")
            })?;
            // Symlinks and other special types are skipped.
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn write_file(&self, path: &Path, content: &str) -> StackgenResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write"))
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> StackgenResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write"))
    }

    fn create_dir_all(&self, path: &Path) -> StackgenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> StackgenResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &'static str) -> StackgenError {
    ApplicationError::filesystem(path, operation, e).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_reads_back() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let file = temp.path().join("a/b/c.txt");

        fs.create_dir_all(file.parent().unwrap()).unwrap();
        fs.write_file(&file, "hello").unwrap();

        assert!(fs.exists(&file));
        assert!(!fs.is_dir(&file));
        assert_eq!(fs.read_to_string(&file).unwrap(), "hello");
        assert_eq!(fs.read_bytes(&file).unwrap(), b"hello");
    }

    #[test]
    fn missing_file_keeps_io_kind() {
        let temp = TempDir::new().unwrap();
        let err = LocalFilesystem
            .read_to_string(&temp.path().join("nope"))
            .unwrap_err();

        match err {
            StackgenError::Application(e) => {
                assert_eq!(e.io_kind(), Some(io::ErrorKind::NotFound));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_dir_is_sorted_and_flags_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("b")).unwrap();
        std::fs::write(temp.path().join("a.txt"), "").unwrap();
        std::fs::write(temp.path().join("c.txt"), "").unwrap();

        let entries = LocalFilesystem.list_dir(temp.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| (e.path.file_name().unwrap().to_string_lossy().into_owned(), e.is_dir))
            .collect();
        assert_eq!(
            names,
            [
                (String::from("a.txt"), false),
                (String::from("b"), true),
                (String::from("c.txt"), false)
            ]
        );
    }

    #[test]
    fn recursive_listing_returns_only_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("x/y")).unwrap();
        std::fs::write(temp.path().join("x/y/deep.txt"), "").unwrap();
        std::fs::write(temp.path().join("top.txt"), "").unwrap();

        let files = LocalFilesystem.read_dir_recursive(temp.path()).unwrap();
        assert_eq!(
            files,
            vec![temp.path().join("top.txt"), temp.path().join("x/y/deep.txt")]
        );
    }

    #[test]
    fn remove_file_deletes() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("gone.txt");
        std::fs::write(&file, "x").unwrap();

        LocalFilesystem.remove_file(&file).unwrap();
        assert!(!file.exists());
        assert!(LocalFilesystem.remove_file(&file).is_err());
    }
}
