//! Format detection by file extension

use std::fmt;
use std::path::Path;

use crate::error::{Result, ViewerError};

/// File formats the viewer can open
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentFormat {
    pub fn all() -> &'static [DocumentFormat] {
        &[
            DocumentFormat::Pdf,
            DocumentFormat::Docx,
            DocumentFormat::Pptx,
        ]
    }

    /// Lowercase extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pptx => "pptx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "Word document",
            DocumentFormat::Pptx => "PowerPoint presentation",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// Detect the format from the path's extension, ignoring case.
    ///
    /// Only the name is inspected; the file is never touched here.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        extension
            .as_deref()
            .and_then(Self::from_extension)
            .ok_or(ViewerError::UnsupportedFormat { extension })
    }

    pub fn is_supported(path: &Path) -> bool {
        Self::detect(path).is_ok()
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
