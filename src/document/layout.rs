//! Text layout for the Office backends
//!
//! DOCX and PPTX carry no pre-computed page geometry we can trust, so their
//! text is laid out here into positioned lines. Glyph widths are estimated
//! from the font size; the result only has to look like the document, not
//! match the authoring application pixel for pixel.

use std::ops::Range;

use super::backend::PageSize;

/// Average glyph advance as a fraction of the font size
const AVG_ADVANCE: f32 = 0.5;
/// Line pitch as a multiple of the font size
const LINE_PITCH: f32 = 1.25;
const TAB_STOP: &str = "    ";

pub const BODY_SIZE: f32 = 11.0;

/// A line of text placed on a page, `y` is the baseline
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub bold: bool,
    pub text: String,
}

/// A page ready for rasterising
#[derive(Clone, Debug, PartialEq)]
pub struct LaidOutPage {
    pub size: PageSize,
    pub lines: Vec<PlacedLine>,
    /// Extracted text: one paragraph per line, unwrapped
    pub text: String,
}

impl LaidOutPage {
    pub fn blank(size: PageSize) -> Self {
        Self {
            size,
            lines: Vec::new(),
            text: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParagraphStyle {
    Title,
    Heading(u8),
    Body,
}

impl ParagraphStyle {
    pub fn font_size(self) -> f32 {
        match self {
            ParagraphStyle::Title => 26.0,
            ParagraphStyle::Heading(1) => 20.0,
            ParagraphStyle::Heading(2) => 16.0,
            ParagraphStyle::Heading(_) => 13.0,
            ParagraphStyle::Body => BODY_SIZE,
        }
    }

    pub fn is_bold(self) -> bool {
        !matches!(self, ParagraphStyle::Body)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
    pub page_break_before: bool,
}

impl Paragraph {
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ParagraphStyle::Body,
            page_break_before: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margins: Margins,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::LETTER,
            margins: Margins::uniform(72.0),
        }
    }
}

impl PageGeometry {
    fn content_width(&self) -> f32 {
        (self.size.width - self.margins.left - self.margins.right).max(1.0)
    }

    fn content_bottom(&self) -> f32 {
        self.size.height - self.margins.bottom
    }
}

/// A paragraph wrapped into display lines. Each line remembers the byte
/// range of the source it shows, so words split at a hyphen or for length
/// can be read back whole.
pub struct Wrapped {
    source: String,
    lines: Vec<(String, Range<usize>)>,
}

impl Wrapped {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|(line, _)| line.as_str())
    }

    /// Source text covered by `lines`, trimmed at both ends
    pub fn source_text(&self, lines: Range<usize>) -> &str {
        let (Some(first), Some(last)) = (
            self.lines.get(lines.start),
            lines.end.checked_sub(1).and_then(|i| self.lines.get(i)),
        ) else {
            return "";
        };
        if first.1.start > last.1.end {
            return "";
        }
        self.source[first.1.start..last.1.end].trim()
    }
}

/// Wrap `text` to fit `width` points at `size`.
///
/// Hard line breaks in the text are kept; an empty paragraph yields a single
/// empty line so it still takes vertical space.
pub fn wrap_to_width(text: &str, size: f32, width: f32) -> Wrapped {
    let columns = ((width / (size * AVG_ADVANCE)).floor() as usize).max(1);
    let source = text.replace('\t', TAB_STOP);

    let mut cursor = 0;
    let mut lines = Vec::new();
    for line in textwrap::wrap(&source, columns) {
        let shown = line.trim_end();
        let span = match source[cursor..].find(shown) {
            Some(offset) => {
                let start = cursor + offset;
                start..start + shown.len()
            }
            None => cursor..cursor,
        };
        cursor = span.end;
        lines.push((line.into_owned(), span));
    }

    if lines.is_empty() {
        lines.push((String::new(), 0..0));
    }
    Wrapped { source, lines }
}

pub fn line_pitch(size: f32) -> f32 {
    size * LINE_PITCH
}

struct PageBuilder {
    size: PageSize,
    lines: Vec<PlacedLine>,
    paragraphs: Vec<String>,
}

impl PageBuilder {
    fn new(size: PageSize) -> Self {
        Self {
            size,
            lines: Vec::new(),
            paragraphs: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.paragraphs.push(text.to_string());
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

/// Flow paragraphs onto pages of the given geometry.
///
/// A page ends when the next line would cross the bottom margin or when a
/// paragraph requests a break. Always returns at least one page.
pub fn paginate(paragraphs: &[Paragraph], geometry: &PageGeometry) -> Vec<LaidOutPage> {
    let mut pages = Vec::new();
    let mut page = PageBuilder::new(geometry.size);
    let mut y = geometry.margins.top;

    for paragraph in paragraphs {
        if paragraph.page_break_before && !page.is_empty() {
            pages.push(std::mem::replace(&mut page, PageBuilder::new(geometry.size)).finish());
            y = geometry.margins.top;
        }

        let size = paragraph.style.font_size();
        let pitch = line_pitch(size);
        let wrapped = wrap_to_width(&paragraph.text, size, geometry.content_width());
        // First line of this paragraph on the current page
        let mut first = 0;

        for (i, line) in wrapped.lines().enumerate() {
            if y + pitch > geometry.content_bottom() && !page.is_empty() {
                page.push_text(wrapped.source_text(first..i));
                pages.push(std::mem::replace(&mut page, PageBuilder::new(geometry.size)).finish());
                y = geometry.margins.top;
                first = i;
            }

            page.lines.push(PlacedLine {
                x: geometry.margins.left,
                y: y + size,
                size,
                bold: paragraph.style.is_bold(),
                text: line.to_string(),
            });
            y += pitch;
        }

        page.push_text(wrapped.source_text(first..wrapped.line_count()));
        y += size * 0.5;
    }

    pages.push(page.finish());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_one_blank_page() {
        let pages = paginate(&[], &PageGeometry::default());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
        assert_eq!(pages[0].text, "");
    }

    #[test]
    fn explicit_break_starts_a_new_page() {
        let paragraphs = vec![
            Paragraph::body("First page"),
            Paragraph {
                text: "Second page".into(),
                style: ParagraphStyle::Body,
                page_break_before: true,
            },
        ];
        let pages = paginate(&paragraphs, &PageGeometry::default());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].text, "First page");
        assert_eq!(pages[1].text, "Second page");
    }

    #[test]
    fn break_on_first_paragraph_does_not_leave_empty_page() {
        let paragraphs = vec![Paragraph {
            text: "Only".into(),
            style: ParagraphStyle::Body,
            page_break_before: true,
        }];
        assert_eq!(paginate(&paragraphs, &PageGeometry::default()).len(), 1);
    }

    #[test]
    fn overflow_spills_onto_following_pages() {
        let paragraphs: Vec<Paragraph> = (0..200)
            .map(|i| Paragraph::body(format!("Paragraph number {i}")))
            .collect();
        let pages = paginate(&paragraphs, &PageGeometry::default());
        assert!(pages.len() > 1);

        let bottom = PageGeometry::default().content_bottom();
        for page in &pages {
            for line in &page.lines {
                assert!(line.y <= bottom + BODY_SIZE);
            }
        }
        assert!(pages.last().unwrap().text.contains("Paragraph number 199"));
    }

    #[test]
    fn wrapped_paragraph_text_is_rejoined_for_search() {
        let long = "Hello World ".repeat(30);
        let pages = paginate(&[Paragraph::body(long.trim())], &PageGeometry::default());
        assert!(pages[0].lines.len() > 1);
        assert_eq!(pages[0].text, long.trim());
    }

    #[test]
    fn words_split_by_the_wrap_stay_whole_in_text() {
        let url = "https://example.com/reports/2024/quarterly/financial-statements-and-supporting-schedules.pdf";
        let text = format!("See {url} for the well-known self-explanatory cross-reference tables");
        let narrow = PageGeometry {
            size: PageSize::new(200.0, 792.0),
            margins: Margins::uniform(20.0),
        };
        let pages = paginate(&[Paragraph::body(text.clone())], &narrow);

        assert!(pages[0].lines.len() > 3);
        assert!(pages[0].lines.iter().all(|l| !l.text.contains(url)));
        assert_eq!(pages[0].text, text);
    }

    #[test]
    fn paragraph_split_across_pages_keeps_source_text() {
        let words: Vec<String> = (0..2000).map(|i| format!("word{i}")).collect();
        let text = words.join(" ");
        let pages = paginate(&[Paragraph::body(text.clone())], &PageGeometry::default());
        assert!(pages.len() > 1);

        let first = &pages[0].text;
        assert!(text.starts_with(first.as_str()));
        let rest: Vec<&str> = pages[1..].iter().map(|p| p.text.as_str()).collect();
        assert_eq!(format!("{first} {}", rest.join(" ")), text);
    }

    #[test]
    fn headings_are_larger_and_bold() {
        assert!(ParagraphStyle::Heading(1).font_size() > ParagraphStyle::Body.font_size());
        assert!(ParagraphStyle::Title.is_bold());
        assert!(!ParagraphStyle::Body.is_bold());
    }
}
