//! Error taxonomy for opening, navigating and rendering documents

use std::path::PathBuf;

/// Errors raised by the document adapter and the viewer state machine.
///
/// None of these are fatal to the application: the shell turns them into
/// status-bar messages and keeps running.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("unsupported file type: {}", display_extension(.extension))]
    UnsupportedFormat { extension: Option<String> },

    #[error("cannot read {}: {detail}", .path.display())]
    CorruptFile { path: PathBuf, detail: String },

    #[error("page {index} is out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no document is open")]
    NoDocument,

    #[error("zoom {factor} is outside {min}..={max}")]
    ZoomOutOfRange { factor: f32, min: f32, max: f32 },
}

impl ViewerError {
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::CorruptFile {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_extension(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!(".{ext}"),
        None => "(no extension)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
