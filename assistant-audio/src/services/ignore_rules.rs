//! Configured ignore rules for collection traversal

use crate::services::PathFilter;
use assistant_common::config::IgnoreConfig;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// [`PathFilter`] built from the `[collection.ignore]` config section
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    collection_root: PathBuf,
    names: HashSet<String>,
    paths: Vec<PathBuf>,
    hidden: bool,
    extensions: Vec<String>,
}

impl IgnoreRules {
    pub fn from_config(collection_root: impl Into<PathBuf>, config: &IgnoreConfig) -> Self {
        let collection_root: PathBuf = collection_root.into();
        // Traversal yields canonical paths
        let collection_root = collection_root
            .canonicalize()
            .unwrap_or(collection_root);

        Self {
            collection_root,
            names: config.names.iter().cloned().collect(),
            paths: config.paths.clone(),
            hidden: config.hidden,
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    fn has_accepted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }
}

impl PathFilter for IgnoreRules {
    fn is_ignored(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.names.contains(&*name) {
            return true;
        }

        if self.hidden && name.starts_with('.') {
            return true;
        }

        if let Ok(relative) = path.strip_prefix(&self.collection_root) {
            if self.paths.iter().any(|p| relative.starts_with(p)) {
                return true;
            }
        }

        !self.extensions.is_empty() && !path.is_dir() && !self.has_accepted_extension(path)
    }
}
