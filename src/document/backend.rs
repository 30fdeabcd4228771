//! Capability set shared by every format backend

use std::sync::atomic::{AtomicUsize, Ordering};

use image::RgbImage;
use log::debug;

use super::format::DocumentFormat;
use crate::error::Result;

/// Page dimensions in points (1/72 inch)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter, the fallback for documents that do not state a size
    pub const LETTER: PageSize = PageSize::new(612.0, 792.0);
    /// 16:9 widescreen slide
    pub const WIDESCREEN: PageSize = PageSize::new(960.0, 540.0);

    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Pixel dimensions of this page rendered at `zoom`, never zero
    #[must_use]
    pub fn scaled_px(&self, zoom: f32) -> (u32, u32) {
        let width = (self.width * zoom).round().max(1.0) as u32;
        let height = (self.height * zoom).round().max(1.0) as u32;
        (width, height)
    }
}

/// Descriptive properties reported by a backend
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    /// Backend-reported format string, e.g. "PDF 1.7"
    pub format: Option<String>,
    pub encryption: Option<String>,
}

/// Outline (table of contents) entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    /// Nesting level, 0 = top level
    pub level: usize,
    /// Target page, 0-indexed
    pub page: usize,
}

/// One implementation per format.
///
/// Callers go through [`super::Document`], which validates page indices and
/// zoom before dispatching, so backends may assume `index < page_count()`.
pub trait PageBackend {
    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> Result<PageSize>;

    fn render_page(&self, index: usize, zoom: f32) -> Result<RgbImage>;

    /// Plain text of a page, `None` when the backend cannot produce any
    fn extract_text(&self, index: usize) -> Option<String>;

    fn metadata(&self) -> Metadata;

    fn outline(&self) -> Vec<OutlineEntry> {
        Vec::new()
    }
}

static LIVE_HANDLES: AtomicUsize = AtomicUsize::new(0);

/// Number of backend handles currently held across the process
pub fn live_handles() -> usize {
    LIVE_HANDLES.load(Ordering::SeqCst)
}

/// Accounts for one acquired backend resource.
///
/// Backends create the guard before touching the file and keep it as their
/// last field, so it is released after the decoder itself, on close and on
/// every early return out of `open`.
#[derive(Debug)]
pub struct HandleGuard {
    format: DocumentFormat,
}

impl HandleGuard {
    pub fn acquire(format: DocumentFormat) -> Self {
        let live = LIVE_HANDLES.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Acquired {format:?} backend handle ({live} live)");
        Self { format }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        let live = LIVE_HANDLES.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Released {:?} backend handle ({live} live)", self.format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_size_grows_with_zoom() {
        let size = PageSize::LETTER;
        assert_eq!(size.scaled_px(1.0), (612, 792));
        assert_eq!(size.scaled_px(0.5), (306, 396));

        let (w1, h1) = size.scaled_px(1.1);
        let (w2, h2) = size.scaled_px(1.2);
        assert!(w2 > w1 && h2 > h1);
    }

    #[test]
    fn scaled_size_never_collapses_to_zero() {
        assert_eq!(PageSize::new(2.0, 2.0).scaled_px(0.1), (1, 1));
    }
}
