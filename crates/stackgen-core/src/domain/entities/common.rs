use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::domain::error::TemplateError;

/// An output path guaranteed to stay inside the output root.
///
/// Invariant: relative, normalised (no `.` segments, `/` separators), no
/// `..` components, never empty. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalise `raw` (a rendered template path) into a safe relative path.
    ///
    /// Backslashes are treated as separators, empty and `.` segments are
    /// dropped.
    ///
    /// # Errors
    ///
    /// `UnsafeOutputPath` if the path is absolute, contains `..`, or is empty
    /// after normalisation.
    pub fn try_new(raw: &str) -> Result<Self, TemplateError> {
        let unsafe_path = || TemplateError::UnsafeOutputPath {
            path: raw.to_string(),
        };

        let unified = raw.trim().replace('\\', "/");
        if unified.starts_with('/') || Path::new(&unified).is_absolute() || has_drive_prefix(&unified)
        {
            return Err(unsafe_path());
        }

        let mut segments = Vec::new();
        for component in Path::new(&unified).components() {
            match component {
                Component::Normal(s) => segments.push(s.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(unsafe_path());
                }
            }
        }

        if segments.is_empty() {
            return Err(unsafe_path());
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Resolve under `root`.
    pub fn under(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.0)
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RelativePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
