pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Add a Ctrl+character key press
        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Type text into whatever has focus
        pub fn type_text(mut self, text: &str) -> Self {
            self.events.extend(SimulatedEventSource::text(text));
            self
        }

        /// Open the file prompt, replace its content with `path` and submit
        pub fn open_file(self, path: &str) -> Self {
            self.press_ctrl_char('o')
                .press_ctrl_char('u')
                .type_text(path)
                .press_enter()
        }

        pub fn next_page(self, times: usize) -> Self {
            (0..times).fold(self, |s, _| s.press_key(KeyCode::Right))
        }

        pub fn prev_page(self, times: usize) -> Self {
            (0..times).fold(self, |s, _| s.press_key(KeyCode::Left))
        }

        /// Go to a 1-based page through the prompt
        pub fn goto_page(self, page: usize) -> Self {
            self.press_char('g').type_text(&page.to_string()).press_enter()
        }

        /// Search through the find prompt
        pub fn find(self, query: &str) -> Self {
            self.press_char('/')
                .press_ctrl_char('u')
                .type_text(query)
                .press_enter()
        }

        pub fn resize(mut self, cols: u16, rows: u16) -> Self {
            self.events.push(SimulatedEventSource::resize(cols, rows));
            self
        }

        /// Quit the application (Ctrl+Q)
        pub fn quit(self) -> Self {
            self.press_ctrl_char('q')
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

/// Small DOCX, PPTX and PDF files generated on the fly
pub mod fixtures {
    use std::fs::File;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use zip::ZipWriter;
    use zip::write::FileOptions;

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    const PKG_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub const FIXTURE_TITLE: &str = "Fixture document";
    pub const FIXTURE_AUTHOR: &str = "folio tests";

    fn xml_escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn core_properties() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/"><dc:title>{FIXTURE_TITLE}</dc:title><dc:creator>{FIXTURE_AUTHOR}</dc:creator><dcterms:created>2024-03-01T10:00:00Z</dcterms:created></cp:coreProperties>"#
        )
    }

    fn write_zip(path: &Path, parts: &[(String, String)]) {
        let file = File::create(path).expect("create fixture");
        let mut zip = ZipWriter::new(file);
        for (name, content) in parts {
            zip.start_file(name.as_str(), FileOptions::default())
                .expect("start zip entry");
            zip.write_all(content.as_bytes()).expect("write zip entry");
        }
        zip.finish().expect("finish zip");
    }

    /// A DOCX with one page per slice; each string is a paragraph.
    ///
    /// Pages after the first start with a `pageBreakBefore` paragraph, so a
    /// page's text is its paragraphs joined by newlines.
    pub fn write_docx(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
        let mut body = String::new();
        for (page_index, paragraphs) in pages.iter().enumerate() {
            for (i, text) in paragraphs.iter().enumerate() {
                body.push_str("<w:p>");
                if page_index > 0 && i == 0 {
                    body.push_str("<w:pPr><w:pageBreakBefore/></w:pPr>");
                }
                body.push_str(&format!(
                    r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    xml_escape(text)
                ));
            }
        }

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#
        );

        let parts = vec![
            (
                "[Content_Types].xml".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{PKG_RELS_NS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#
                ),
            ),
            ("word/document.xml".to_string(), document),
            ("docProps/core.xml".to_string(), core_properties()),
        ];

        let path = dir.join(name);
        write_zip(&path, &parts);
        path
    }

    /// A 4:3 PPTX; the first string of each slice is the slide title, the
    /// rest are body paragraphs.
    ///
    /// Slides are stored in the archive in reverse order so readers must
    /// follow the presentation's slide list.
    pub fn write_pptx(dir: &Path, name: &str, slides: &[&[&str]]) -> PathBuf {
        let ids: String = (0..slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
            .collect();
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="{P_NS}" xmlns:a="{A_NS}" xmlns:r="{R_NS}"><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
        );

        let rels: String = (0..slides.len())
            .map(|i| {
                format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
                    i + 2,
                    i + 1
                )
            })
            .collect();
        let presentation_rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{PKG_RELS_NS}">{rels}</Relationships>"#
        );

        let mut parts = vec![
            (
                "[Content_Types].xml".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{PKG_RELS_NS}"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#
                ),
            ),
            ("docProps/core.xml".to_string(), core_properties()),
            ("ppt/presentation.xml".to_string(), presentation),
            ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels),
        ];

        for (i, slide) in slides.iter().enumerate().rev() {
            parts.push((format!("ppt/slides/slide{}.xml", i + 1), slide_xml(slide)));
        }

        let path = dir.join(name);
        write_zip(&path, &parts);
        path
    }

    fn slide_xml(texts: &[&str]) -> String {
        let mut shapes = String::new();
        if let Some((title, body)) = texts.split_first() {
            shapes.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="274638"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
                xml_escape(title)
            ));
            if !body.is_empty() {
                let paragraphs: String = body
                    .iter()
                    .map(|text| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", xml_escape(text)))
                    .collect();
                shapes.push_str(&format!(
                    r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="1600200"/><a:ext cx="8229600" cy="4525963"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/>{paragraphs}</p:txBody></p:sp>"#
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="{P_NS}" xmlns:a="{A_NS}" xmlns:r="{R_NS}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld></p:sld>"#
        )
    }

    fn pdf_escape(text: &str) -> String {
        text.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// A Letter-sized PDF with one string per page, drawn in Helvetica
    /// (newlines start new text lines), an outline entry "Section N" per
    /// page and an info dictionary.
    pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
        const CATALOG: usize = 1;
        const PAGES: usize = 2;
        const OUTLINES: usize = 3;
        const FONT: usize = 4;
        const INFO: usize = 5;
        const FIRST_PAGE: usize = 6;

        let page_obj = |i: usize| FIRST_PAGE + 3 * i;
        let contents_obj = |i: usize| FIRST_PAGE + 3 * i + 1;
        let outline_obj = |i: usize| FIRST_PAGE + 3 * i + 2;
        let count = pages.len();

        let mut objects: Vec<String> = Vec::new();
        objects.push(format!(
            "<< /Type /Catalog /Pages {PAGES} 0 R /Outlines {OUTLINES} 0 R >>"
        ));
        let kids: Vec<String> = (0..count).map(|i| format!("{} 0 R", page_obj(i))).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {count} >>",
            kids.join(" ")
        ));
        objects.push(if count == 0 {
            "<< /Type /Outlines /Count 0 >>".to_string()
        } else {
            format!(
                "<< /Type /Outlines /First {} 0 R /Last {} 0 R /Count {count} >>",
                outline_obj(0),
                outline_obj(count - 1)
            )
        });
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
        objects.push(format!(
            "<< /Title ({FIXTURE_TITLE}) /Author ({FIXTURE_AUTHOR}) /Producer (folio fixtures) >>"
        ));

        for (i, text) in pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 {FONT} 0 R >> >> /Contents {} 0 R >>",
                contents_obj(i)
            ));

            let lines: Vec<String> = text
                .lines()
                .map(|line| format!("({}) Tj", pdf_escape(line)))
                .collect();
            let stream = format!("BT /F1 18 Tf 72 720 Td 24 TL {} ET", lines.join(" T* "));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));

            let mut item = format!(
                "<< /Title (Section {}) /Parent {OUTLINES} 0 R /Dest [{} 0 R /Fit]",
                i + 1,
                page_obj(i)
            );
            if i > 0 {
                item.push_str(&format!(" /Prev {} 0 R", outline_obj(i - 1)));
            }
            if i + 1 < count {
                item.push_str(&format!(" /Next {} 0 R", outline_obj(i + 1)));
            }
            item.push_str(" >>");
            objects.push(item);
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.extend_from_slice(xref.as_bytes());
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );

        let path = dir.join(name);
        std::fs::write(&path, pdf).expect("write pdf fixture");
        path
    }

    /// Bytes that are not a document of any format
    pub fn write_garbage(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"this is not a real document\x00\x01\x02").expect("write garbage");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::test_helpers::*;

    #[test]
    fn scenario_builder_collects_events() {
        let scenario = TestScenarioBuilder::new()
            .next_page(2)
            .goto_page(12)
            .press_esc()
            .quit()
            .build();

        // 2 arrows, g, '1', '2', Enter, Esc, Ctrl+Q
        assert_eq!(scenario.remaining(), 8);
    }

    #[test]
    fn pdf_fixture_has_a_valid_xref_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_pdf(dir.path(), "a.pdf", &["one", "two (2)"]);
        let bytes = std::fs::read(path).unwrap();
        let text = String::from_utf8_lossy(&bytes);

        let start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[start..].starts_with("xref\n0 12\n"));

        // Every entry points at its object header
        for (i, entry) in text[start..].lines().skip(3).take(11).enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
        assert!(text.contains("(two \\(2\\)) Tj"));
    }
}
