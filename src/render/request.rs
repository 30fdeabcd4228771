//! Render request and response types

use std::sync::Arc;

use image::RgbImage;

use crate::error::ViewerError;

/// Unique identifier for render requests, increasing per service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Parameters for rendering a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// Zoom factor, 1.0 = one pixel per point
    pub zoom: f32,
    /// Brightness multiplier, 1.0 = unchanged
    pub brightness: f32,
    /// Invert colors
    pub night_mode: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            brightness: 1.0,
            night_mode: false,
        }
    }
}

/// A rendered page ready for display
#[derive(Clone, Debug)]
pub struct PageImage {
    pub page: usize,
    pub params: RenderParams,
    pub image: RgbImage,
}

impl PageImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum RenderRequest {
    Page {
        id: RequestId,
        page: usize,
        params: RenderParams,
    },

    /// Shutdown the worker
    Shutdown,
}

/// Errors from the render worker
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    #[error(transparent)]
    Document(#[from] ViewerError),

    #[error("render worker is not running")]
    Disconnected,
}

/// Response from the render worker
#[derive(Debug)]
pub enum RenderResponse {
    /// Rendered page data
    Page {
        id: RequestId,
        data: Arc<PageImage>,
    },

    /// Request was superseded before rendering started
    Cancelled(RequestId),

    /// Error during rendering
    Error { id: RequestId, error: RenderFault },

    /// The worker could not open the document and has stopped
    Unavailable(RenderFault),
}

impl RenderResponse {
    pub fn id(&self) -> Option<RequestId> {
        match self {
            RenderResponse::Page { id, .. }
            | RenderResponse::Cancelled(id)
            | RenderResponse::Error { id, .. } => Some(*id),
            RenderResponse::Unavailable(_) => None,
        }
    }
}
