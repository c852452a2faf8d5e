//! Collection traversal
//!
//! Turns a target path (single file or directory) into a lazy sequence of
//! [`CollectionEntry`] values. Directories are yielded parent-before-children
//! so the driver can count them. Unreadable subtrees are logged and skipped
//! without stopping the traversal of their siblings.

use crate::error::SetupError;
use crate::models::{CollectionEntry, TrackFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Decides whether a collection entry is left out of a traversal
pub trait PathFilter: Send + Sync {
    fn is_ignored(&self, path: &Path) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn is_ignored(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Lazy traversal result
pub struct Entries {
    inner: Box<dyn Iterator<Item = CollectionEntry> + Send>,
}

impl Iterator for Entries {
    type Item = CollectionEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Produces track files for a pipeline run
pub struct PathEnumerator {
    collection_root: PathBuf,
    filter: Arc<dyn PathFilter>,
}

impl PathEnumerator {
    pub fn new(collection_root: impl Into<PathBuf>, filter: Arc<dyn PathFilter>) -> Self {
        Self {
            collection_root: collection_root.into(),
            filter,
        }
    }

    pub fn collection_root(&self) -> &Path {
        &self.collection_root
    }

    /// Enumerate `target`
    ///
    /// A file target yields exactly that file. A directory target yields the
    /// directory itself followed by every non-ignored entry below it; only
    /// immediate children unless `recursive`. The target itself is never
    /// tested against the filter.
    ///
    /// Both the collection root and the target are resolved to canonical
    /// paths first, so relative paths never contain `..` or a symlinked
    /// root prefix.
    ///
    /// # Errors
    /// Fails before yielding anything when the collection root or the target
    /// does not exist.
    pub fn enumerate(&self, target: &Path, recursive: bool) -> Result<Entries, SetupError> {
        let root = self
            .collection_root
            .canonicalize()
            .map_err(|_| SetupError::RootNotFound(self.collection_root.clone()))?;

        if !root.is_dir() {
            return Err(SetupError::RootNotFound(self.collection_root.clone()));
        }

        let target = resolve_target(target)
            .map_err(|_| SetupError::PathNotFound(target.to_path_buf()))?;

        if !target.starts_with(&root) {
            tracing::warn!(
                path = %target.display(),
                root = %root.display(),
                "Target is outside the collection root"
            );
        }

        if !target.is_dir() {
            let file = TrackFile::new(target, &root);
            return Ok(Entries {
                inner: Box::new(std::iter::once(CollectionEntry::File(file))),
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let filter = Arc::clone(&self.filter);

        let walker = WalkDir::new(target)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !filter.is_ignored(e.path()))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        Some(CollectionEntry::Directory(entry.into_path()))
                    } else if file_type.is_file() || entry.path().is_file() {
                        Some(CollectionEntry::File(TrackFile::new(entry.into_path(), &root)))
                    } else {
                        tracing::debug!(path = %entry.path().display(), "Skipping non-file entry");
                        None
                    }
                }
                Err(e) => {
                    // Continue with siblings
                    tracing::warn!("Error accessing entry: {}", e);
                    None
                }
            });

        Ok(Entries {
            inner: Box::new(walker),
        })
    }
}

/// Canonical form of an enumeration target
///
/// A symlinked file keeps its own name under its canonical parent so it is
/// still addressed from inside the collection.
fn resolve_target(target: &Path) -> std::io::Result<PathBuf> {
    let is_linked_file = std::fs::symlink_metadata(target)?.file_type().is_symlink()
        && target.is_file();

    if is_linked_file {
        if let (Some(parent), Some(name)) = (target.parent(), target.file_name()) {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            return Ok(parent.canonicalize()?.join(name));
        }
    }

    target.canonicalize()
}
