//! PDF through MuPDF

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{info, warn};
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Matrix, MetadataName, Pixmap, TextPageFlags};

use super::backend::{HandleGuard, Metadata, OutlineEntry, PageBackend, PageSize};
use super::format::DocumentFormat;
use crate::error::{Result, ViewerError};

pub struct PdfBackend {
    path: PathBuf,
    doc: Document,
    page_count: usize,
    _guard: HandleGuard,
}

impl PdfBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let guard = HandleGuard::acquire(DocumentFormat::Pdf);

        let doc = Document::open(path.to_string_lossy().as_ref())
            .map_err(|e| ViewerError::corrupt(path, e.to_string()))?;

        if doc.needs_password().unwrap_or(false) {
            return Err(ViewerError::corrupt(path, "document is password protected"));
        }

        let page_count = doc
            .page_count()
            .map_err(|e| ViewerError::corrupt(path, e.to_string()))?;
        let page_count = usize::try_from(page_count).unwrap_or(0);
        if page_count == 0 {
            return Err(ViewerError::corrupt(path, "document has no pages"));
        }

        info!("Opened PDF {path:?}: {page_count} pages");
        Ok(Self {
            path: path.to_path_buf(),
            doc,
            page_count,
            _guard: guard,
        })
    }

    fn fault(&self, error: mupdf::error::Error) -> ViewerError {
        ViewerError::corrupt(&self.path, error.to_string())
    }

    fn load_page(&self, index: usize) -> Result<mupdf::Page> {
        if index >= self.page_count {
            return Err(ViewerError::PageIndexOutOfRange {
                index,
                page_count: self.page_count,
            });
        }
        self.doc.load_page(index as i32).map_err(|e| self.fault(e))
    }

    fn metadata_field(&self, name: MetadataName) -> Option<String> {
        self.doc
            .metadata(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl PageBackend for PdfBackend {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let page = self.load_page(index)?;
        let bounds = page.bounds().map_err(|e| self.fault(e))?;
        Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn render_page(&self, index: usize, zoom: f32) -> Result<RgbImage> {
        let page = self.load_page(index)?;
        let bounds = page.bounds().map_err(|e| self.fault(e))?;
        let size = PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0);
        let (width_px, height_px) = size.scaled_px(zoom);

        // Scale per axis so the pixmap lands exactly on the rounded size
        let matrix = Matrix::new_scale(width_px as f32 / size.width, height_px as f32 / size.height);
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)
            .map_err(|e| self.fault(e))?;

        let (width, height, pixels) =
            pixmap_to_rgb(&pixmap).map_err(|detail| ViewerError::corrupt(&self.path, detail))?;
        if (width, height) != (width_px, height_px) {
            warn!(
                "MuPDF produced {width}x{height} for page {index}, expected {width_px}x{height_px}"
            );
        }

        RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| ViewerError::corrupt(&self.path, "pixmap size mismatch"))
    }

    fn extract_text(&self, index: usize) -> Option<String> {
        let page = self.load_page(index).ok()?;
        let text_page = page.to_text_page(TextPageFlags::empty()).ok()?;

        let mut lines = Vec::new();
        for block in text_page.blocks() {
            if block.r#type() != TextBlockType::Text {
                continue;
            }
            for line in block.lines() {
                let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                lines.push(text);
            }
        }
        Some(lines.join("\n"))
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            title: self.metadata_field(MetadataName::Title),
            author: self.metadata_field(MetadataName::Author),
            subject: self.metadata_field(MetadataName::Subject),
            keywords: self.metadata_field(MetadataName::Keywords),
            creator: self.metadata_field(MetadataName::Creator),
            producer: self.metadata_field(MetadataName::Producer),
            created: self.metadata_field(MetadataName::CreationDate),
            modified: self.metadata_field(MetadataName::ModDate),
            format: self.metadata_field(MetadataName::Format),
            encryption: self.metadata_field(MetadataName::Encryption),
        }
    }

    fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        if let Ok(outlines) = self.doc.outlines() {
            flatten_outlines(&outlines, 0, &mut entries);
        }
        entries
    }
}

fn flatten_outlines(outlines: &[mupdf::Outline], level: usize, entries: &mut Vec<OutlineEntry>) {
    for outline in outlines {
        let title = outline.title.trim();
        if let Some(dest) = outline.dest {
            if !title.is_empty() {
                entries.push(OutlineEntry {
                    title: title.to_string(),
                    level,
                    page: dest.loc.page_number as usize,
                });
            }
        }
        flatten_outlines(&outline.down, level + 1, entries);
    }
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> std::result::Result<(u32, u32, Vec<u8>), String> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(format!("unsupported pixmap format: {n} channels"));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err("pixmap buffer size mismatch".to_string());
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for row in samples.chunks(stride).take(height) {
        let row = &row[..row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok((width as u32, height as u32, out))
}
