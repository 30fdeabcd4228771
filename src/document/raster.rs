//! Rasterise laid-out text pages through resvg

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use image::RgbImage;
use log::debug;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

use super::layout::LaidOutPage;

const FONT_FAMILY: &str = "Calibri, Arial, Helvetica, 'Liberation Sans', 'DejaVu Sans', sans-serif";

static FONT_DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

fn system_fonts() -> Arc<usvg::fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!("Loaded {} system font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Serialise a page as an SVG document in page points
pub fn page_to_svg(page: &LaidOutPage) -> String {
    let width = page.size.width;
    let height = page.size.height;
    let mut svg = String::new();

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r##"<rect x="0" y="0" width="{width}" height="{height}" fill="#ffffff"/>"##
    );

    for line in page.lines.iter().filter(|line| !line.text.trim().is_empty()) {
        let weight = if line.bold { "bold" } else { "normal" };
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" font-family="{FONT_FAMILY}" font-size="{}" font-weight="{weight}" fill="#000000" xml:space="preserve">{}</text>"##,
            line.x,
            line.y,
            line.size,
            escape_xml(&line.text)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Render a page at `zoom`; the output is `page.size` scaled by `zoom`.
pub fn rasterize(page: &LaidOutPage, zoom: f32) -> Result<RgbImage, String> {
    let svg = page_to_svg(page);

    let mut options = usvg::Options::default();
    options.fontdb = system_fonts();
    let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| e.to_string())?;

    let (width_px, height_px) = page.size.scaled_px(zoom);
    let mut pixmap = Pixmap::new(width_px, height_px)
        .ok_or_else(|| format!("cannot allocate {width_px}x{height_px} pixmap"))?;
    pixmap.fill(Color::WHITE);

    let scale_x = width_px as f32 / page.size.width;
    let scale_y = height_px as f32 / page.size.height;
    resvg::render(
        &tree,
        Transform::from_scale(scale_x, scale_y),
        &mut pixmap.as_mut(),
    );

    // Opaque white background, so premultiplied RGBA is plain RGBA here.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    RgbImage::from_raw(width_px, height_px, rgb)
        .ok_or_else(|| "pixel buffer size mismatch".to_string())
}
