//! Recently opened documents

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default number of entries kept
pub const DEFAULT_LIMIT: usize = 10;

/// Most-recent-first list of document paths without duplicates
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `path` to the front, dropping the oldest entries beyond `limit`
    pub fn add(&mut self, path: &Path, limit: usize) {
        self.paths.retain(|p| p != path);
        self.paths.insert(0, path.to_path_buf());
        self.truncate(limit);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    /// Enforce `limit` (at least one entry) and drop duplicates
    pub fn truncate(&mut self, limit: usize) {
        let mut seen = std::collections::HashSet::new();
        self.paths.retain(|p| seen.insert(p.clone()));
        self.paths.truncate(limit.max(1));
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn most_recent(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
