//! Viewer state machine

use std::path::PathBuf;

use log::{debug, info};

use super::search::{self, SearchState};
use super::zoom::{Viewport, Zoom, ZoomMode};
use crate::document::Document;
use crate::error::{Result, ViewerError};

/// Commands that modify viewer state
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Open a document, replacing the current one on success
    Open(PathBuf),
    Close,
    /// Go to a page (0-indexed)
    GotoPage(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Set an explicit zoom factor
    SetZoom(f32),
    ZoomIn,
    ZoomOut,
    FitWidth,
    FitPage,
    /// Update the drawable area
    SetViewport(Viewport),
    /// Search all pages; an empty query clears the search
    Search(String),
    NextMatch,
    PrevMatch,
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// A document was opened from this path
    DocumentOpened(PathBuf),
    /// The document was closed
    DocumentClosed,
    /// The current page or zoom changed
    RenderCurrentPage,
    /// Search results or cursor changed
    SearchUpdated,
}

/// What is displayed and how.
///
/// Either no document is open, or one is and `page < page_count`.
#[derive(Debug, Default)]
pub struct ViewerState {
    document: Option<Document>,
    page: usize,
    zoom: Zoom,
    default_zoom: Zoom,
    viewport: Option<Viewport>,
    search: SearchState,
}

impl ViewerState {
    /// Viewer without a document; documents open with `default_zoom`
    #[must_use]
    pub fn new(default_zoom: Zoom) -> Self {
        Self {
            zoom: default_zoom,
            default_zoom,
            ..Self::default()
        }
    }

    /// Zoom used by documents opened from now on
    pub fn set_default_zoom(&mut self, zoom: Zoom) {
        self.default_zoom = zoom;
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, Document::page_count)
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Apply a command and return resulting effects
    pub fn apply(&mut self, cmd: Command) -> Result<Vec<Effect>> {
        match cmd {
            Command::Open(path) => self.open(path),

            Command::Close => {
                if self.document.take().is_some() {
                    self.page = 0;
                    self.search.clear();
                    info!("Document closed");
                    Ok(vec![Effect::DocumentClosed])
                } else {
                    Ok(vec![])
                }
            }

            Command::GotoPage(page) => {
                let count = self.require_document()?.page_count();
                if page >= count {
                    return Err(ViewerError::PageIndexOutOfRange {
                        index: page,
                        page_count: count,
                    });
                }
                Ok(self.move_to(page))
            }

            Command::NextPage => {
                let count = self.require_document()?.page_count();
                if self.page + 1 < count {
                    Ok(self.move_to(self.page + 1))
                } else {
                    Ok(vec![])
                }
            }

            Command::PrevPage => {
                self.require_document()?;
                if self.page > 0 {
                    Ok(self.move_to(self.page - 1))
                } else {
                    Ok(vec![])
                }
            }

            Command::FirstPage => {
                self.require_document()?;
                Ok(self.move_to(0))
            }

            Command::LastPage => {
                let count = self.require_document()?.page_count();
                Ok(self.move_to(count - 1))
            }

            Command::SetZoom(factor) => {
                let changed = self.zoom.set(factor)?;
                Ok(self.render_if(changed))
            }

            Command::ZoomIn => {
                let changed = self.zoom.step_in();
                Ok(self.render_if(changed))
            }

            Command::ZoomOut => {
                let changed = self.zoom.step_out();
                Ok(self.render_if(changed))
            }

            Command::FitWidth => Ok(self.set_fit_mode(ZoomMode::FitWidth)),

            Command::FitPage => Ok(self.set_fit_mode(ZoomMode::FitPage)),

            Command::SetViewport(viewport) => {
                if self.viewport == Some(viewport) {
                    return Ok(vec![]);
                }
                self.viewport = Some(viewport);
                let changed = self.refit();
                Ok(self.render_if(changed))
            }

            Command::Search(query) => self.run_search(query),

            Command::NextMatch => {
                let target = self.search.next_match().map(|m| m.page);
                Ok(self.follow_match(target))
            }

            Command::PrevMatch => {
                let target = self.search.previous_match().map(|m| m.page);
                Ok(self.follow_match(target))
            }
        }
    }

    fn open(&mut self, path: PathBuf) -> Result<Vec<Effect>> {
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        // Open before releasing anything so a failure leaves the viewer as it was
        let document = Document::open(&path)?;

        drop(self.document.take());
        self.document = Some(document);
        self.page = 0;
        self.search.clear();
        self.zoom = self.default_zoom;
        self.refit();

        info!("Viewing {path:?}");
        Ok(vec![Effect::DocumentOpened(path), Effect::RenderCurrentPage])
    }

    fn require_document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(ViewerError::NoDocument)
    }

    fn move_to(&mut self, page: usize) -> Vec<Effect> {
        if self.page == page {
            return vec![];
        }
        debug!("Page {} -> {}", self.page, page);
        self.page = page;
        self.refit();
        vec![Effect::RenderCurrentPage]
    }

    fn render_if(&self, changed: bool) -> Vec<Effect> {
        if changed && self.is_open() {
            vec![Effect::RenderCurrentPage]
        } else {
            vec![]
        }
    }

    fn set_fit_mode(&mut self, mode: ZoomMode) -> Vec<Effect> {
        self.zoom.set_mode(mode);
        let changed = self.refit();
        self.render_if(changed)
    }

    /// Recompute a fit-mode factor for the current page and viewport
    fn refit(&mut self) -> bool {
        let (Some(document), Some(viewport)) = (self.document.as_ref(), self.viewport) else {
            return false;
        };
        match document.page_size(self.page) {
            Ok(size) => self.zoom.refit(size, viewport),
            Err(e) => {
                debug!("Cannot fit page {}: {e}", self.page);
                false
            }
        }
    }

    fn run_search(&mut self, query: String) -> Result<Vec<Effect>> {
        if query.is_empty() {
            let was_active = self.search.is_active();
            self.search.clear();
            return Ok(if was_active {
                vec![Effect::SearchUpdated]
            } else {
                vec![]
            });
        }

        let Some(document) = self.document.as_mut() else {
            return Err(ViewerError::NoDocument);
        };
        let matches = search::search_document(document, &query)?;
        info!("Search {:?}: {} matches", query, matches.len());

        self.search = SearchState::new(query, matches, self.page);
        let target = self.search.current_match().map(|m| m.page);

        let mut effects = vec![Effect::SearchUpdated];
        if let Some(page) = target {
            effects.extend(self.move_to(page));
        }
        Ok(effects)
    }

    fn follow_match(&mut self, target: Option<usize>) -> Vec<Effect> {
        let Some(page) = target else {
            return vec![];
        };
        let mut effects = vec![Effect::SearchUpdated];
        effects.extend(self.move_to(page));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::viewer::zoom::{MAX_ZOOM, MIN_ZOOM};

    fn open_docx(pages: &[&[&str]]) -> (tempfile::TempDir, PathBuf, ViewerState) {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_docx(dir.path(), "doc.docx", pages);
        let mut state = ViewerState::default();
        state.apply(Command::Open(path.clone())).unwrap();
        (dir, path, state)
    }

    #[test]
    fn open_starts_at_first_page() {
        let (_dir, path, state) = open_docx(&[&["one"], &["two"], &["three"]]);
        assert!(state.is_open());
        assert_eq!(state.current_page(), 0);
        assert_eq!(state.page_count(), 3);
        assert_eq!(
            state.document().map(|d| d.path().to_path_buf()),
            Some(std::fs::canonicalize(path).unwrap())
        );
    }

    #[test]
    fn open_reports_effects() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_docx(dir.path(), "a.docx", &[&["a"]]);
        let mut state = ViewerState::default();
        let effects = state.apply(Command::Open(path.clone())).unwrap();
        assert_eq!(
            effects,
            vec![
                Effect::DocumentOpened(std::fs::canonicalize(path).unwrap()),
                Effect::RenderCurrentPage
            ]
        );
    }

    #[test]
    fn goto_rejects_out_of_range_and_keeps_page() {
        let (_dir, _path, mut state) = open_docx(&[&["one"], &["two"], &["three"]]);
        state.apply(Command::GotoPage(1)).unwrap();

        let err = state.apply(Command::GotoPage(3)).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::PageIndexOutOfRange {
                index: 3,
                page_count: 3
            }
        ));
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn goto_without_document_fails() {
        let mut state = ViewerState::default();
        assert!(matches!(
            state.apply(Command::GotoPage(0)),
            Err(ViewerError::NoDocument)
        ));
    }

    #[test]
    fn next_and_prev_stop_at_the_ends() {
        let (_dir, _path, mut state) = open_docx(&[&["one"], &["two"]]);
        assert!(state.apply(Command::PrevPage).unwrap().is_empty());
        assert_eq!(
            state.apply(Command::NextPage).unwrap(),
            vec![Effect::RenderCurrentPage]
        );
        assert!(state.apply(Command::NextPage).unwrap().is_empty());
        assert_eq!(state.current_page(), 1);

        state.apply(Command::FirstPage).unwrap();
        assert_eq!(state.current_page(), 0);
        state.apply(Command::LastPage).unwrap();
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn failed_open_keeps_previous_document() {
        let (_dir, path, mut state) = open_docx(&[&["one"], &["two"]]);
        state.apply(Command::NextPage).unwrap();

        let err = state
            .apply(Command::Open(PathBuf::from("/no/such/file.pdf")))
            .unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));

        let err = state
            .apply(Command::Open(PathBuf::from("notes.txt")))
            .unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat { .. }));

        assert_eq!(
            state.document().map(|d| d.path().to_path_buf()),
            Some(std::fs::canonicalize(path).unwrap())
        );
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn close_returns_to_no_document() {
        let (_dir, _path, mut state) = open_docx(&[&["one"]]);
        assert_eq!(
            state.apply(Command::Close).unwrap(),
            vec![Effect::DocumentClosed]
        );
        assert!(!state.is_open());
        assert!(state.apply(Command::Close).unwrap().is_empty());
        assert_eq!(state.page_count(), 0);
    }

    #[test]
    fn set_zoom_rejects_bad_factors() {
        let (_dir, _path, mut state) = open_docx(&[&["one"]]);
        for bad in [0.0, -2.0, f32::NAN, MAX_ZOOM + 0.5, MIN_ZOOM / 2.0] {
            assert!(matches!(
                state.apply(Command::SetZoom(bad)),
                Err(ViewerError::ZoomOutOfRange { .. })
            ));
        }
        assert_eq!(state.zoom().factor(), 1.0);

        assert_eq!(
            state.apply(Command::SetZoom(2.0)).unwrap(),
            vec![Effect::RenderCurrentPage]
        );
        assert!(state.apply(Command::SetZoom(2.0)).unwrap().is_empty());
    }

    #[test]
    fn fit_modes_follow_viewport() {
        let (_dir, _path, mut state) = open_docx(&[&["one"]]);
        state
            .apply(Command::SetViewport(Viewport::new(306, 2000)))
            .unwrap();

        state.apply(Command::FitWidth).unwrap();
        assert_eq!(state.zoom().mode(), ZoomMode::FitWidth);
        assert!((state.zoom().factor() - 0.5).abs() < 1e-6);

        // Sticky: a new viewport recomputes the factor
        let effects = state
            .apply(Command::SetViewport(Viewport::new(612, 2000)))
            .unwrap();
        assert_eq!(effects, vec![Effect::RenderCurrentPage]);
        assert!((state.zoom().factor() - 1.0).abs() < 1e-6);

        state.apply(Command::FitPage).unwrap();
        assert!((state.zoom().factor() - 1.0).abs() < 1e-6);
        state
            .apply(Command::SetViewport(Viewport::new(612, 396)))
            .unwrap();
        assert!((state.zoom().factor() - 0.5).abs() < 1e-6);

        state.apply(Command::ZoomIn).unwrap();
        assert_eq!(state.zoom().mode(), ZoomMode::Custom);
    }

    #[test]
    fn search_jumps_to_first_match_and_cycles() {
        let (_dir, _path, mut state) = open_docx(&[
            &["Introduction"],
            &["Hello World"],
            &["Nothing here"],
            &["hello again"],
        ]);

        let effects = state.apply(Command::Search("HELLO".into())).unwrap();
        assert_eq!(
            effects,
            vec![Effect::SearchUpdated, Effect::RenderCurrentPage]
        );
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.search().matches.len(), 2);

        state.apply(Command::NextMatch).unwrap();
        assert_eq!(state.current_page(), 3);
        state.apply(Command::NextMatch).unwrap();
        assert_eq!(state.current_page(), 1);
        state.apply(Command::PrevMatch).unwrap();
        assert_eq!(state.current_page(), 3);
    }

    #[test]
    fn search_without_matches_keeps_page() {
        let (_dir, _path, mut state) = open_docx(&[&["alpha"], &["beta"]]);
        state.apply(Command::NextPage).unwrap();
        let effects = state.apply(Command::Search("gamma".into())).unwrap();
        assert_eq!(effects, vec![Effect::SearchUpdated]);
        assert_eq!(state.current_page(), 1);
        assert!(state.apply(Command::NextMatch).unwrap().is_empty());
    }

    #[test]
    fn empty_query_clears_search() {
        let (_dir, _path, mut state) = open_docx(&[&["alpha"]]);
        state.apply(Command::Search("alpha".into())).unwrap();
        assert!(state.search().is_active());
        assert_eq!(
            state.apply(Command::Search(String::new())).unwrap(),
            vec![Effect::SearchUpdated]
        );
        assert!(!state.search().is_active());
    }

    #[test]
    fn reopening_resets_page_and_search() {
        let (dir, _path, mut state) = open_docx(&[&["one"], &["two"]]);
        state.apply(Command::Search("two".into())).unwrap();
        assert_eq!(state.current_page(), 1);

        let other = fixtures::write_docx(dir.path(), "other.docx", &[&["x"], &["y"]]);
        state.apply(Command::Open(other)).unwrap();
        assert_eq!(state.current_page(), 0);
        assert!(!state.search().is_active());
    }
}
