//! Document navigation, zoom and search, independent of the terminal

pub mod search;
pub mod state;
pub mod zoom;

pub use search::{SearchMatch, SearchState};
pub use state::{Command, Effect, ViewerState};
pub use zoom::{MAX_ZOOM, MIN_ZOOM, Viewport, Zoom, ZoomMode};
