//! Rendered page drawn with half-block glyphs

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::terminal::CellSize;

const UPPER_HALF: &str = "▀";

/// A page image downsampled to two pixels per terminal cell
#[derive(Clone, Debug)]
pub struct HalfBlockRaster {
    columns: u16,
    /// Pixel rows, two per cell row
    pixel_rows: u32,
    pixels: RgbImage,
}

impl HalfBlockRaster {
    pub fn from_image(image: &RgbImage, cell: CellSize) -> Self {
        let columns = image.width().div_ceil(u32::from(cell.width.max(1))).max(1);
        let cell_rows = image.height().div_ceil(u32::from(cell.height.max(2))).max(1);
        let pixel_rows = cell_rows * 2;
        let pixels = if image.width() == 0 || image.height() == 0 {
            RgbImage::from_pixel(columns, pixel_rows, Rgb([255, 255, 255]))
        } else {
            imageops::resize(image, columns, pixel_rows, FilterType::Triangle)
        };
        Self {
            columns: u16::try_from(columns).unwrap_or(u16::MAX),
            pixel_rows,
            pixels,
        }
    }

    /// Size in cells
    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        u16::try_from(self.pixel_rows / 2).unwrap_or(u16::MAX)
    }

    fn pixel(&self, x: u16, y: u32) -> Rgb<u8> {
        self.pixels
            .get_pixel_checked(u32::from(x), y)
            .copied()
            .unwrap_or(Rgb([255, 255, 255]))
    }
}

/// Scroll offset into a raster, in cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pan {
    pub x: u16,
    pub y: u16,
}

impl Pan {
    /// Keep the offset inside the part of the raster that overflows `area`
    pub fn clamp_to(self, raster: &HalfBlockRaster, area: Rect) -> Self {
        Self {
            x: self.x.min(raster.columns().saturating_sub(area.width)),
            y: self.y.min(raster.rows().saturating_sub(area.height)),
        }
    }
}

pub struct PageView<'a> {
    raster: Option<&'a HalfBlockRaster>,
    pan: Pan,
    background: Color,
    placeholder: Line<'a>,
    true_color: bool,
}

impl<'a> PageView<'a> {
    pub fn new(raster: Option<&'a HalfBlockRaster>, background: Color) -> Self {
        Self {
            raster,
            pan: Pan::default(),
            background,
            placeholder: Line::default(),
            true_color: true,
        }
    }

    pub fn pan(mut self, pan: Pan) -> Self {
        self.pan = pan;
        self
    }

    /// Shown when there is no raster
    pub fn placeholder(mut self, line: impl Into<Line<'a>>) -> Self {
        self.placeholder = line.into();
        self
    }

    pub fn true_color(mut self, true_color: bool) -> Self {
        self.true_color = true_color;
        self
    }

    fn color(&self, pixel: Rgb<u8>) -> Color {
        let [r, g, b] = pixel.0;
        if self.true_color {
            Color::Rgb(r, g, b)
        } else {
            Color::Indexed(ansi256(r, g, b))
        }
    }
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(" ").set_bg(self.background);
                }
            }
        }

        let Some(raster) = self.raster else {
            let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
            Paragraph::new(self.placeholder.clone().centered())
                .wrap(Wrap { trim: true })
                .render(middle, buf);
            return;
        };

        let pan = self.pan.clamp_to(raster, area);
        let width = raster.columns().saturating_sub(pan.x).min(area.width);
        let height = raster.rows().saturating_sub(pan.y).min(area.height);
        // Center pages smaller than the view
        let left = area.x + (area.width - width) / 2;
        let top = area.y + (area.height - height) / 2;

        for row in 0..height {
            let pixel_row = u32::from(pan.y + row) * 2;
            for col in 0..width {
                let upper = raster.pixel(pan.x + col, pixel_row);
                let lower = raster.pixel(pan.x + col, pixel_row + 1);
                let (fg, bg) = (self.color(upper), self.color(lower));
                if let Some(cell) = buf.cell_mut((left + col, top + row)) {
                    cell.set_symbol(UPPER_HALF).set_fg(fg).set_bg(bg);
                }
            }
        }
    }
}

/// Nearest xterm 256-colour index
fn ansi256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            248..=255 => 231,
            v => 232 + (v - 8) / 10,
        };
    }
    let level = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            (v - 35) / 40
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
