//! Word documents (`.docx`)

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info};
use roxmltree::Node;

use super::backend::{HandleGuard, Metadata, PageBackend, PageSize};
use super::format::DocumentFormat;
use super::layout::{self, LaidOutPage, Margins, PageGeometry, Paragraph, ParagraphStyle};
use super::ooxml::{self, Package, TWIPS_PER_PT};
use super::raster;
use crate::error::{Result, ViewerError};

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxBackend {
    path: PathBuf,
    pages: Vec<LaidOutPage>,
    metadata: Metadata,
    _guard: HandleGuard,
}

impl DocxBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let guard = HandleGuard::acquire(DocumentFormat::Docx);

        let mut package = Package::open(path)?;
        let xml = package.require_part(path, DOCUMENT_PART)?;
        let doc = ooxml::parse_xml(path, DOCUMENT_PART, &xml)?;

        let body = ooxml::descendant(doc.root_element(), "body")
            .ok_or_else(|| ViewerError::corrupt(path, "document has no body"))?;

        let body_content = parse_body(body);
        let pages = layout::paginate(&body_content.paragraphs, &body_content.geometry);
        let metadata = package.properties(path, "Office Open XML (DOCX)");

        info!(
            "Opened DOCX {:?}: {} paragraphs on {} pages",
            path,
            body_content.paragraphs.len(),
            pages.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            pages,
            metadata,
            _guard: guard,
        })
    }
}

impl PageBackend for DocxBackend {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        self.pages
            .get(index)
            .map(|page| page.size)
            .ok_or(ViewerError::PageIndexOutOfRange {
                index,
                page_count: self.pages.len(),
            })
    }

    fn render_page(&self, index: usize, zoom: f32) -> Result<RgbImage> {
        let page = self.pages.get(index).ok_or(ViewerError::PageIndexOutOfRange {
            index,
            page_count: self.pages.len(),
        })?;
        raster::rasterize(page, zoom).map_err(|e| ViewerError::corrupt(&self.path, e))
    }

    fn extract_text(&self, index: usize) -> Option<String> {
        self.pages.get(index).map(|page| page.text.clone())
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }
}

struct BodyContent {
    paragraphs: Vec<Paragraph>,
    geometry: PageGeometry,
}

fn parse_body(body: Node) -> BodyContent {
    let mut paragraphs = Vec::new();
    let mut geometry = PageGeometry::default();

    for node in body.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "p" => parse_paragraph(node, &mut paragraphs),
            "tbl" => parse_table(node, &mut paragraphs),
            "sectPr" => geometry = section_geometry(node),
            "sdt" => {
                // Content controls wrap ordinary paragraphs
                if let Some(content) = ooxml::child(node, "sdtContent") {
                    for inner in content.children().filter(|n| ooxml::is(n, "p")) {
                        parse_paragraph(inner, &mut paragraphs);
                    }
                }
            }
            _ => {}
        }
    }

    debug!("DOCX page geometry: {geometry:?}");
    BodyContent {
        paragraphs,
        geometry,
    }
}

fn paragraph_style(node: Node) -> (ParagraphStyle, bool) {
    let Some(props) = ooxml::child(node, "pPr") else {
        return (ParagraphStyle::Body, false);
    };

    let style = ooxml::child(props, "pStyle")
        .and_then(|style| ooxml::attr(style, "val"))
        .map(style_from_name)
        .unwrap_or(ParagraphStyle::Body);

    let break_before = ooxml::child(props, "pageBreakBefore")
        .is_some_and(|flag| !matches!(ooxml::attr(flag, "val"), Some("0" | "false" | "off")));

    (style, break_before)
}

fn style_from_name(name: &str) -> ParagraphStyle {
    let lower = name.to_ascii_lowercase().replace(' ', "");
    if lower == "title" {
        return ParagraphStyle::Title;
    }
    if let Some(level) = lower.strip_prefix("heading") {
        return ParagraphStyle::Heading(level.parse().unwrap_or(1));
    }
    ParagraphStyle::Body
}

/// Append a paragraph, splitting it at hard page breaks
fn parse_paragraph(node: Node, out: &mut Vec<Paragraph>) {
    let (style, mut page_break_before) = paragraph_style(node);
    let mut text = String::new();

    for run in node.descendants().filter(|n| ooxml::is(n, "r")) {
        for piece in run.children().filter(Node::is_element) {
            match piece.tag_name().name() {
                "t" => text.push_str(piece.text().unwrap_or_default()),
                "tab" => text.push('\t'),
                "cr" => text.push('\n'),
                "br" if ooxml::attr(piece, "type") == Some("page") => {
                    out.push(Paragraph {
                        text: std::mem::take(&mut text),
                        style,
                        page_break_before,
                    });
                    page_break_before = true;
                }
                "br" => text.push('\n'),
                _ => {}
            }
        }
    }

    out.push(Paragraph {
        text,
        style,
        page_break_before,
    });
}

fn parse_table(node: Node, out: &mut Vec<Paragraph>) {
    for row in node.children().filter(|n| ooxml::is(n, "tr")) {
        let cells: Vec<String> = row
            .children()
            .filter(|n| ooxml::is(n, "tc"))
            .map(|cell| {
                let mut cell_paragraphs = Vec::new();
                for paragraph in cell.descendants().filter(|n| ooxml::is(n, "p")) {
                    parse_paragraph(paragraph, &mut cell_paragraphs);
                }
                cell_paragraphs
                    .iter()
                    .map(|p| p.text.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        out.push(Paragraph::body(cells.join(" | ")));
    }
}

fn section_geometry(section: Node) -> PageGeometry {
    let mut geometry = PageGeometry::default();

    if let Some(size) = ooxml::child(section, "pgSz") {
        if let (Some(w), Some(h)) = (ooxml::attr_f32(size, "w"), ooxml::attr_f32(size, "h")) {
            if w > 0.0 && h > 0.0 {
                geometry.size = PageSize::new(w / TWIPS_PER_PT, h / TWIPS_PER_PT);
            }
        }
    }

    if let Some(margins) = ooxml::child(section, "pgMar") {
        let side = |name: &str, fallback: f32| {
            ooxml::attr_f32(margins, name)
                .map(|twips| twips.abs() / TWIPS_PER_PT)
                .unwrap_or(fallback)
        };
        let default = geometry.margins;
        geometry.margins = Margins {
            top: side("top", default.top),
            right: side("right", default.right),
            bottom: side("bottom", default.bottom),
            left: side("left", default.left),
        };
    }

    geometry
}
