// Export modules for use in tests
pub mod bookmark;
pub mod document;
pub mod error;
pub mod event_source;
pub mod inputs;
pub mod main_app;
pub mod notification;
pub mod panic_handler;
pub mod recent_files;
pub mod render;
pub mod settings;
pub mod terminal;
pub mod theme;
pub mod viewer;
pub mod widget;

pub mod test_utils;

// Re-export main app components
pub use main_app::{App, AppAction, run_app_with_event_source};
