use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub path: PathBuf,
    /// Page index, 0-based
    pub page: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Label if set, otherwise "Page N"
    pub fn title(&self) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => format!("Page {}", self.page + 1),
        }
    }

    fn is_at(&self, path: &Path, page: usize) -> bool {
        self.page == page && self.path == path
    }
}

/// Bookmarks of every document, at most one per (path, page)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bookmarks {
    entries: Vec<Bookmark>,
}

impl Bookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path, page: usize) -> bool {
        self.entries.iter().any(|b| b.is_at(path, page))
    }

    /// Add a bookmark. An existing one at the same place only gets its
    /// label replaced; returns whether a new bookmark was created.
    pub fn add(&mut self, path: &Path, page: usize, label: Option<String>) -> bool {
        if let Some(existing) = self.entries.iter_mut().find(|b| b.is_at(path, page)) {
            if label.is_some() {
                existing.label = label;
            }
            return false;
        }

        self.entries.push(Bookmark {
            path: path.to_path_buf(),
            page,
            label,
            created_at: Utc::now(),
        });
        true
    }

    pub fn remove(&mut self, path: &Path, page: usize) -> bool {
        let before = self.entries.len();
        self.entries.retain(|b| !b.is_at(path, page));
        self.entries.len() != before
    }

    /// Add or remove; returns whether the page is bookmarked afterwards
    pub fn toggle(&mut self, path: &Path, page: usize) -> bool {
        if self.remove(path, page) {
            false
        } else {
            self.add(path, page, None)
        }
    }

    /// Bookmarks of one document, by page
    pub fn for_document(&self, path: &Path) -> Vec<&Bookmark> {
        let mut found: Vec<&Bookmark> = self.entries.iter().filter(|b| b.path == path).collect();
        found.sort_by_key(|b| b.page);
        found
    }

    /// All bookmarks grouped by document, then by page
    pub fn sorted(&self) -> Vec<&Bookmark> {
        let mut all: Vec<&Bookmark> = self.entries.iter().collect();
        all.sort_by(|a, b| a.path.cmp(&b.path).then(a.page.cmp(&b.page)));
        all
    }

    /// Drop duplicate (path, page) entries, keeping the first
    pub fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .retain(|b| seen.insert((b.path.clone(), b.page)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bookmark_per_path_and_page() {
        let mut bookmarks = Bookmarks::new();
        let doc = Path::new("/docs/a.pdf");
        assert!(bookmarks.add(doc, 3, None));
        assert!(!bookmarks.add(doc, 3, None));
        assert!(!bookmarks.add(doc, 3, Some("Results".into())));
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.for_document(doc)[0].title(), "Results");

        assert!(bookmarks.add(doc, 4, None));
        assert!(bookmarks.add(Path::new("/docs/b.pdf"), 3, None));
        assert_eq!(bookmarks.len(), 3);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut bookmarks = Bookmarks::new();
        let doc = Path::new("deck.pptx");
        assert!(bookmarks.toggle(doc, 0));
        assert!(bookmarks.contains(doc, 0));
        assert!(!bookmarks.toggle(doc, 0));
        assert!(bookmarks.is_empty());
    }

    #[test]
    fn document_bookmarks_are_ordered_by_page() {
        let mut bookmarks = Bookmarks::new();
        let doc = Path::new("a.docx");
        bookmarks.add(doc, 9, None);
        bookmarks.add(doc, 2, None);
        bookmarks.add(Path::new("b.docx"), 1, None);
        let pages: Vec<usize> = bookmarks.for_document(doc).iter().map(|b| b.page).collect();
        assert_eq!(pages, vec![2, 9]);
        assert_eq!(bookmarks.for_document(doc)[0].title(), "Page 3");
    }

    #[test]
    fn dedup_removes_loaded_duplicates() {
        let yaml = r#"
- path: /a.pdf
  page: 1
  created_at: 2024-01-01T00:00:00Z
- path: /a.pdf
  page: 1
  label: dup
  created_at: 2024-01-02T00:00:00Z
"#;
        let mut bookmarks: Bookmarks = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bookmarks.len(), 2);
        bookmarks.dedup();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.iter().next().unwrap().label, None);
    }
}
