//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use stackgen_core::{
    application::{
        ApplicationError,
        ports::{DirEntry, Filesystem},
    },
    error::{StackgenError, StackgenResult},
};

/// In-memory filesystem for testing.
///
/// Writes require the parent directory to exist, as on a real filesystem;
/// [`MemoryFilesystem::add_file`] seeds files together with their parents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystemInner {
    fn add_ancestors(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) {
        let path = path.as_ref();
        if let Ok(mut inner) = self.inner.write() {
            if let Some(parent) = path.parent() {
                inner.add_ancestors(parent);
            }
            inner
                .files
                .insert(path.to_path_buf(), content.as_ref().to_vec());
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of files at or below `root`.
    pub fn file_count(&self, root: impl AsRef<Path>) -> usize {
        let root = root.as_ref();
        self.list_files()
            .iter()
            .filter(|p| p.starts_with(root))
            .count()
    }

    fn read(&self) -> StackgenResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::StoreLock.into())
    }

    fn write(&self) -> StackgenResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLock.into())
    }
}

fn not_found(path: &Path, operation: &'static str) -> StackgenError {
    ApplicationError::filesystem(path, operation, io::Error::from(io::ErrorKind::NotFound)).into()
}

impl Filesystem for MemoryFilesystem {
    fn read_to_string(&self, path: &Path) -> StackgenResult<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| {
            ApplicationError::filesystem(
                path,
                "read",
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
            .into()
        })
    }

    fn read_bytes(&self, path: &Path) -> StackgenResult<Vec<u8>> {
        self.read()?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path, "read"))
    }

    fn list_dir(&self, path: &Path) -> StackgenResult<Vec<DirEntry>> {
        let inner = self.read()?;
        if !inner.directories.contains(path) {
            return Err(not_found(path, "list"));
        }

        let dirs = inner
            .directories
            .iter()
            .filter(|d| d.parent() == Some(path))
            .map(|d| DirEntry {
                path: d.clone(),
                is_dir: true,
            });
        let files = inner
            .files
            .keys()
            .filter(|f| f.parent() == Some(path))
            .map(|f| DirEntry {
                path: f.clone(),
                is_dir: false,
            });

        let mut entries: Vec<DirEntry> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read_dir_recursive(&self, path: &Path) -> StackgenResult<Vec<PathBuf>> {
        let inner = self.read()?;
        if !inner.directories.contains(path) {
            return Err(not_found(path, "walk"));
        }
        Ok(inner
            .files
            .keys()
            .filter(|f| f.starts_with(path) && f.as_path() != path)
            .cloned()
            .collect())
    }

    fn write_file(&self, path: &Path, content: &str) -> StackgenResult<()> {
        self.write_bytes(path, content.as_bytes())
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> StackgenResult<()> {
        let mut inner = self.write()?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(not_found(parent, "write into"));
            }
        }
        if inner.directories.contains(path) {
            return Err(ApplicationError::filesystem(
                path,
                "write",
                io::Error::new(io::ErrorKind::IsADirectory, "is a directory"),
            )
            .into());
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> StackgenResult<()> {
        self.write()?.add_ancestors(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_file(&self, path: &Path) -> StackgenResult<()> {
        self.write()?
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path, "remove"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent_directory() {
        let fs = MemoryFilesystem::new();
        let err = fs
            .write_file(Path::new("/out/src/main.go"), "package main")
            .unwrap_err();
        assert!(err.to_string().contains("/out/src"));

        fs.create_dir_all(Path::new("/out/src")).unwrap();
        fs.write_file(Path::new("/out/src/main.go"), "package main")
            .unwrap();
        assert_eq!(
            fs.read_file("/out/src/main.go").as_deref(),
            Some("package main")
        );
        assert!(fs.is_dir(Path::new("/out")));
    }

    #[test]
    fn list_dir_returns_direct_children_only() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/t/api/template.json", "{}");
        fs.add_file("/t/api/src/main.go", "");
        fs.add_file("/t/README.md", "");

        let entries = fs.list_dir(Path::new("/t")).unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    path: PathBuf::from("/t/README.md"),
                    is_dir: false
                },
                DirEntry {
                    path: PathBuf::from("/t/api"),
                    is_dir: true
                },
            ]
        );
    }

    #[test]
    fn recursive_listing_is_sorted() {
        let fs = MemoryFilesystem::new();
        fs.add_file("/t/b.txt", "");
        fs.add_file("/t/a/z.txt", "");
        fs.add_file("/other/x.txt", "");

        assert_eq!(
            fs.read_dir_recursive(Path::new("/t")).unwrap(),
            vec![PathBuf::from("/t/a/z.txt"), PathBuf::from("/t/b.txt")]
        );
    }

    #[test]
    fn missing_paths_report_not_found() {
        let fs = MemoryFilesystem::new();
        let err = fs.read_to_string(Path::new("/nope")).unwrap_err();
        match err {
            StackgenError::Application(e) => assert_eq!(e.io_kind(), Some(io::ErrorKind::NotFound)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(fs.list_dir(Path::new("/nope")).is_err());
        assert!(fs.remove_file(Path::new("/nope")).is_err());
    }

    #[test]
    fn clones_share_state() {
        let fs = MemoryFilesystem::new();
        let other = fs.clone();
        other.add_file("/shared.txt", "x");
        assert!(fs.exists(Path::new("/shared.txt")));
        assert_eq!(fs.file_count("/"), 1);
    }
}
