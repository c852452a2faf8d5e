//! Units of work produced by collection traversal

use std::path::{Path, PathBuf};

/// A candidate track file
///
/// Identity is the absolute path. The relative path is computed against the
/// collection root and is how the analysis backend addresses the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackFile {
    path: PathBuf,
    relative_path: PathBuf,
}

impl TrackFile {
    /// Describe `path` relative to `collection_root`
    ///
    /// Files outside the collection root keep their full path, minus any
    /// leading root component, as their relative path.
    pub fn new(path: impl Into<PathBuf>, collection_root: &Path) -> Self {
        let path = path.into();
        let relative_path = match path.strip_prefix(collection_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path
                .components()
                .filter(|c| !matches!(c, std::path::Component::RootDir | std::path::Component::Prefix(_)))
                .collect(),
        };

        Self {
            path,
            relative_path,
        }
    }

    /// Absolute path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the collection root
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}

/// One step of a collection traversal
///
/// Directories are yielded so the driver can count them; only files are
/// processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEntry {
    /// A track file to process
    File(TrackFile),
    /// A visited directory
    Directory(PathBuf),
}
