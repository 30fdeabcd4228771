//! PowerPoint presentations (`.pptx`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info, warn};
use roxmltree::Node;

use super::backend::{HandleGuard, Metadata, PageBackend, PageSize};
use super::format::DocumentFormat;
use super::layout::{self, LaidOutPage, PlacedLine};
use super::ooxml::{self, EMU_PER_PT, Package, REL_NS};
use super::raster;
use crate::error::{Result, ViewerError};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

const TITLE_SIZE: f32 = 32.0;
const BODY_SIZE: f32 = 18.0;
/// Inner padding of a text box, DrawingML default of 0.1in
const TEXT_INSET: f32 = 7.2;

pub struct PptxBackend {
    path: PathBuf,
    slides: Vec<LaidOutPage>,
    metadata: Metadata,
    _guard: HandleGuard,
}

impl PptxBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let guard = HandleGuard::acquire(DocumentFormat::Pptx);

        let mut package = Package::open(path)?;
        let presentation_xml = package.require_part(path, PRESENTATION_PART)?;
        let rels_xml = package.require_part(path, PRESENTATION_RELS)?;

        let presentation = ooxml::parse_xml(path, PRESENTATION_PART, &presentation_xml)?;
        let rels = ooxml::parse_xml(path, PRESENTATION_RELS, &rels_xml)?;

        let slide_size = slide_size(presentation.root_element());
        let targets = relationship_targets(rels.root_element(), "ppt");
        let slide_parts = slide_order(presentation.root_element(), &targets);

        if slide_parts.is_empty() {
            return Err(ViewerError::corrupt(path, "presentation has no slides"));
        }

        let mut slides = Vec::with_capacity(slide_parts.len());
        for part in &slide_parts {
            let xml = package.require_part(path, part)?;
            let slide = ooxml::parse_xml(path, part, &xml)?;
            slides.push(layout_slide(slide.root_element(), slide_size));
        }

        let metadata = package.properties(path, "Office Open XML (PPTX)");
        info!("Opened PPTX {:?}: {} slides", path, slides.len());

        Ok(Self {
            path: path.to_path_buf(),
            slides,
            metadata,
            _guard: guard,
        })
    }
}

impl PageBackend for PptxBackend {
    fn page_count(&self) -> usize {
        self.slides.len()
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        self.slides
            .get(index)
            .map(|slide| slide.size)
            .ok_or(ViewerError::PageIndexOutOfRange {
                index,
                page_count: self.slides.len(),
            })
    }

    fn render_page(&self, index: usize, zoom: f32) -> Result<RgbImage> {
        let slide = self.slides.get(index).ok_or(ViewerError::PageIndexOutOfRange {
            index,
            page_count: self.slides.len(),
        })?;
        raster::rasterize(slide, zoom).map_err(|e| ViewerError::corrupt(&self.path, e))
    }

    fn extract_text(&self, index: usize) -> Option<String> {
        self.slides.get(index).map(|slide| slide.text.clone())
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }
}

fn slide_size(presentation: Node) -> PageSize {
    ooxml::child(presentation, "sldSz")
        .and_then(|size| {
            let cx = ooxml::attr_f32(size, "cx")?;
            let cy = ooxml::attr_f32(size, "cy")?;
            (cx > 0.0 && cy > 0.0).then(|| PageSize::new(cx / EMU_PER_PT, cy / EMU_PER_PT))
        })
        .unwrap_or(PageSize::WIDESCREEN)
}

/// Relationship id → part name
fn relationship_targets(rels: Node, base_dir: &str) -> HashMap<String, String> {
    rels.children()
        .filter(|n| ooxml::is(n, "Relationship"))
        .filter_map(|rel| {
            let id = rel.attribute("Id")?;
            let target = rel.attribute("Target")?;
            Some((id.to_string(), ooxml::resolve_target(base_dir, target)))
        })
        .collect()
}

fn slide_order(presentation: Node, targets: &HashMap<String, String>) -> Vec<String> {
    let Some(list) = ooxml::child(presentation, "sldIdLst") else {
        return Vec::new();
    };

    list.children()
        .filter(|n| ooxml::is(n, "sldId"))
        .filter_map(|slide| {
            let rel_id = slide.attribute((REL_NS, "id"))?;
            let part = targets.get(rel_id);
            if part.is_none() {
                warn!("Slide relationship {rel_id} has no target");
            }
            part.cloned()
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Frame {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

fn shape_frame(shape: Node) -> Option<Frame> {
    let xfrm = ooxml::descendant(shape, "xfrm")?;
    let off = ooxml::child(xfrm, "off")?;
    let ext = ooxml::child(xfrm, "ext")?;
    Some(Frame {
        x: ooxml::attr_f32(off, "x")? / EMU_PER_PT,
        y: ooxml::attr_f32(off, "y")? / EMU_PER_PT,
        width: ooxml::attr_f32(ext, "cx")? / EMU_PER_PT,
        height: ooxml::attr_f32(ext, "cy")? / EMU_PER_PT,
    })
}

fn is_title_placeholder(shape: Node) -> bool {
    ooxml::descendant(shape, "ph")
        .and_then(|ph| ph.attribute("type"))
        .is_some_and(|kind| kind == "title" || kind == "ctrTitle")
}

/// A text paragraph inside a shape, with its largest run size
struct ShapeParagraph {
    text: String,
    size: Option<f32>,
}

fn text_paragraphs(body: Node) -> Vec<ShapeParagraph> {
    body.children()
        .filter(|n| ooxml::is(n, "p"))
        .map(|paragraph| {
            let mut text = String::new();
            let mut size: Option<f32> = None;

            for piece in paragraph.children().filter(Node::is_element) {
                match piece.tag_name().name() {
                    "r" | "fld" => {
                        if let Some(run_size) = ooxml::child(piece, "rPr")
                            .and_then(|props| ooxml::attr_f32(props, "sz"))
                        {
                            let points = run_size / 100.0;
                            size = Some(size.map_or(points, |s: f32| s.max(points)));
                        }
                        if let Some(t) = ooxml::child(piece, "t") {
                            text.push_str(t.text().unwrap_or_default());
                        }
                    }
                    "br" => text.push('\n'),
                    _ => {}
                }
            }

            if size.is_none() {
                size = ooxml::child(paragraph, "pPr")
                    .and_then(|props| ooxml::child(props, "defRPr"))
                    .and_then(|props| ooxml::attr_f32(props, "sz"))
                    .map(|sz| sz / 100.0);
            }

            ShapeParagraph { text, size }
        })
        .collect()
}

fn table_rows(frame: Node) -> Vec<ShapeParagraph> {
    let Some(table) = ooxml::descendant(frame, "tbl") else {
        return Vec::new();
    };

    table
        .children()
        .filter(|n| ooxml::is(n, "tr"))
        .map(|row| {
            let cells: Vec<String> = row
                .children()
                .filter(|n| ooxml::is(n, "tc"))
                .map(|cell| {
                    ooxml::child(cell, "txBody")
                        .map(|body| {
                            text_paragraphs(body)
                                .into_iter()
                                .map(|p| p.text)
                                .filter(|t| !t.trim().is_empty())
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .unwrap_or_default()
                })
                .collect();
            ShapeParagraph {
                text: cells.join(" | "),
                size: None,
            }
        })
        .collect()
}

/// Places shapes on a slide; shapes without their own frame inherit their
/// position from the layout, so they are stacked into default regions.
struct SlideComposer {
    size: PageSize,
    lines: Vec<PlacedLine>,
    paragraphs: Vec<String>,
    next_body_y: f32,
}

impl SlideComposer {
    fn new(size: PageSize) -> Self {
        Self {
            size,
            lines: Vec::new(),
            paragraphs: Vec::new(),
            next_body_y: size.height * 0.25,
        }
    }

    fn default_frame(&mut self, is_title: bool) -> Frame {
        let margin = self.size.width * 0.05;
        if is_title {
            Frame {
                x: margin,
                y: self.size.height * 0.05,
                width: self.size.width - 2.0 * margin,
                height: self.size.height * 0.15,
            }
        } else {
            Frame {
                x: margin,
                y: self.next_body_y,
                width: self.size.width - 2.0 * margin,
                height: self.size.height - self.next_body_y,
            }
        }
    }

    fn place(&mut self, frame: Option<Frame>, is_title: bool, paragraphs: Vec<ShapeParagraph>) {
        if paragraphs.iter().all(|p| p.text.trim().is_empty()) {
            return;
        }

        let frame = frame.unwrap_or_else(|| self.default_frame(is_title));
        let fallback_size = if is_title { TITLE_SIZE } else { BODY_SIZE };
        let width = (frame.width - 2.0 * TEXT_INSET).max(1.0);
        let mut y = frame.y + TEXT_INSET;

        for paragraph in paragraphs {
            let size = paragraph.size.unwrap_or(fallback_size);
            let wrapped = layout::wrap_to_width(&paragraph.text, size, width);
            for line in wrapped.lines() {
                self.lines.push(PlacedLine {
                    x: frame.x + TEXT_INSET,
                    y: y + size,
                    size,
                    bold: is_title,
                    text: line.to_string(),
                });
                y += layout::line_pitch(size);
            }
            let text = wrapped.source_text(0..wrapped.line_count());
            if !text.is_empty() {
                self.paragraphs.push(text.to_string());
            }
        }

        if !is_title {
            self.next_body_y = self.next_body_y.max(y + TEXT_INSET);
        }
    }

    fn finish(self) -> LaidOutPage {
        LaidOutPage {
            size: self.size,
            lines: self.lines,
            text: self.paragraphs.join("\n"),
        }
    }
}

fn layout_slide(slide: Node, size: PageSize) -> LaidOutPage {
    let mut composer = SlideComposer::new(size);

    let Some(tree) = ooxml::descendant(slide, "spTree") else {
        debug!("Slide without shape tree");
        return composer.finish();
    };

    for shape in tree.descendants().filter(Node::is_element) {
        match shape.tag_name().name() {
            "sp" => {
                let Some(body) = ooxml::child(shape, "txBody") else {
                    continue;
                };
                composer.place(
                    shape_frame(shape),
                    is_title_placeholder(shape),
                    text_paragraphs(body),
                );
            }
            "graphicFrame" => {
                composer.place(shape_frame(shape), false, table_rows(shape));
            }
            _ => {}
        }
    }

    composer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    #[test]
    fn slide_order_follows_the_id_list() {
        let presentation = format!(
            r#"<p:presentation {NS}><p:sldIdLst>
                 <p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
               </p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
        );
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId2" Target="slides/slide1.xml"/>
              <Relationship Id="rId3" Target="slides/slide2.xml"/>
            </Relationships>"#;

        let presentation = roxmltree::Document::parse(&presentation).unwrap();
        let rels = roxmltree::Document::parse(rels).unwrap();
        let targets = relationship_targets(rels.root_element(), "ppt");
        let order = slide_order(presentation.root_element(), &targets);

        assert_eq!(order, vec!["ppt/slides/slide2.xml", "ppt/slides/slide1.xml"]);
        assert_eq!(slide_size(presentation.root_element()), PageSize::new(720.0, 540.0));
    }

    #[test]
    fn missing_slide_size_defaults_to_widescreen() {
        let presentation = format!(r#"<p:presentation {NS}/>"#);
        let presentation = roxmltree::Document::parse(&presentation).unwrap();
        assert_eq!(slide_size(presentation.root_element()), PageSize::WIDESCREEN);
    }

    #[test]
    fn shapes_are_placed_at_their_frames() {
        let slide = format!(
            r#"<p:sld {NS}><p:cSld><p:spTree>
                 <p:sp><p:nvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
                   <p:spPr><a:xfrm><a:off x="127000" y="254000"/><a:ext cx="6350000" cy="1270000"/></a:xfrm></p:spPr>
                   <p:txBody><a:p><a:r><a:rPr sz="4000"/><a:t>Quarterly</a:t></a:r></a:p></p:txBody></p:sp>
                 <p:sp><p:txBody><a:p><a:r><a:t>First point</a:t></a:r></a:p>
                   <a:p><a:r><a:t>Second point</a:t></a:r></a:p></p:txBody></p:sp>
               </p:spTree></p:cSld></p:sld>"#
        );
        let slide = roxmltree::Document::parse(&slide).unwrap();
        let page = layout_slide(slide.root_element(), PageSize::WIDESCREEN);

        assert_eq!(page.text, "Quarterly\nFirst point\nSecond point");
        let title = &page.lines[0];
        assert!(title.bold);
        assert_eq!(title.size, 40.0);
        assert_eq!(title.x, 10.0 + TEXT_INSET);
        assert_eq!(title.y, 20.0 + TEXT_INSET + 40.0);
        assert!(!page.lines[1].bold);
        assert_eq!(page.lines[1].size, BODY_SIZE);
    }

    #[test]
    fn table_frames_join_cells_per_row() {
        let slide = format!(
            r#"<p:sld {NS}><p:cSld><p:spTree><p:graphicFrame><a:graphic><a:graphicData><a:tbl>
                 <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Q1</a:t></a:r></a:p></a:txBody></a:tc>
                       <a:tc><a:txBody><a:p><a:r><a:t>42</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
               </a:tbl></a:graphicData></a:graphic></p:graphicFrame></p:spTree></p:cSld></p:sld>"#
        );
        let slide = roxmltree::Document::parse(&slide).unwrap();
        let page = layout_slide(slide.root_element(), PageSize::WIDESCREEN);
        assert_eq!(page.text, "Q1 | 42");
    }

    #[test]
    fn empty_slide_is_blank() {
        let slide = format!(r#"<p:sld {NS}><p:cSld><p:spTree/></p:cSld></p:sld>"#);
        let slide = roxmltree::Document::parse(&slide).unwrap();
        let page = layout_slide(slide.root_element(), PageSize::WIDESCREEN);
        assert!(page.lines.is_empty());
        assert_eq!(page.text, "");
    }
}
