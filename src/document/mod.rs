//! Uniform access to PDF, DOCX and PPTX files

pub mod backend;
mod docx;
pub mod format;
pub mod layout;
mod ooxml;
#[cfg(feature = "pdf")]
mod pdf;
mod pptx;
pub mod raster;

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};

pub use backend::{Metadata, OutlineEntry, PageBackend, PageSize, live_handles};
pub use format::DocumentFormat;

use crate::error::{Result, ViewerError};

/// An open document.
///
/// Owns its backend; dropping the document releases the backend handle.
/// Page text is extracted lazily and cached for the document's lifetime.
pub struct Document {
    path: PathBuf,
    format: DocumentFormat,
    page_count: usize,
    file_size: u64,
    text_cache: Vec<Option<String>>,
    backend: Box<dyn PageBackend>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("page_count", &self.page_count)
            .finish_non_exhaustive()
    }
}

impl Document {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::detect(path)?;

        let meta = fs::metadata(path).map_err(|e| ViewerError::io(path, e))?;
        if !meta.is_file() {
            return Err(ViewerError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        // Surface permission problems as I/O errors before any decoder sees the file
        fs::File::open(path).map_err(|e| ViewerError::io(path, e))?;

        debug!("Opening {path:?} as {format:?}");
        let backend = open_backend(format, path)?;
        let page_count = backend.page_count();
        if page_count == 0 {
            return Err(ViewerError::corrupt(path, "document has no pages"));
        }

        info!("Opened {path:?} ({format}, {page_count} pages)");
        Ok(Self {
            path: path.to_path_buf(),
            format,
            page_count,
            file_size: meta.len(),
            text_cache: vec![None; page_count],
            backend,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// File name for titles and the status bar
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.page_count {
            Ok(())
        } else {
            Err(ViewerError::PageIndexOutOfRange {
                index,
                page_count: self.page_count,
            })
        }
    }

    pub fn page_size(&self, index: usize) -> Result<PageSize> {
        self.check_index(index)?;
        self.backend.page_size(index)
    }

    pub fn render_page(&self, index: usize, zoom: f32) -> Result<RgbImage> {
        self.check_index(index)?;
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ViewerError::ZoomOutOfRange {
                factor: zoom,
                min: crate::viewer::zoom::MIN_ZOOM,
                max: crate::viewer::zoom::MAX_ZOOM,
            });
        }
        self.backend.render_page(index, zoom)
    }

    /// Text of a page; empty when the backend has none for it
    pub fn extract_text(&mut self, index: usize) -> Result<&str> {
        self.check_index(index)?;
        let backend = &self.backend;
        let text = self.text_cache[index].get_or_insert_with(|| {
            backend.extract_text(index).unwrap_or_else(|| {
                debug!("No text for page {index}");
                String::new()
            })
        });
        Ok(text.as_str())
    }

    /// Whether page text has been extracted already
    pub fn is_text_cached(&self, index: usize) -> bool {
        self.text_cache.get(index).is_some_and(Option::is_some)
    }

    pub fn metadata(&self) -> Metadata {
        self.backend.metadata()
    }

    pub fn outline(&self) -> Vec<OutlineEntry> {
        self.backend.outline()
    }
}

fn open_backend(format: DocumentFormat, path: &Path) -> Result<Box<dyn PageBackend>> {
    Ok(match format {
        #[cfg(feature = "pdf")]
        DocumentFormat::Pdf => Box::new(pdf::PdfBackend::open(path)?),
        #[cfg(not(feature = "pdf"))]
        DocumentFormat::Pdf => {
            return Err(ViewerError::corrupt(
                path,
                "PDF support was not compiled in (enable the `pdf` feature)",
            ));
        }
        DocumentFormat::Docx => Box::new(docx::DocxBackend::open(path)?),
        DocumentFormat::Pptx => Box::new(pptx::PptxBackend::open(path)?),
    })
}

/// Human-readable byte count, e.g. "1.5 MB"
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_size_picks_a_readable_unit() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn unsupported_extension_is_rejected_before_touching_the_file() {
        let err = Document::open("/definitely/not/here/notes.txt").unwrap_err();
        assert!(matches!(err, ViewerError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Document::open("/definitely/not/here/report.pdf").unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }

    #[test]
    fn directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folder.docx");
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            Document::open(&path).unwrap_err(),
            ViewerError::Io { .. }
        ));
    }

    #[test]
    fn garbage_bytes_are_a_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        fs::write(&path, b"this is not a zip archive").unwrap();
        assert!(matches!(
            Document::open(&path).unwrap_err(),
            ViewerError::CorruptFile { .. }
        ));
    }
}
