use std::env;

use log::debug;
use ratatui::layout::Rect;

use crate::viewer::Viewport;

#[derive(Clone, Debug, Default)]
pub struct TerminalEnv {
    pub term: String,
    pub colorterm: String,
    /// "fg;bg" colour indices some terminals export
    pub colorfgbg: Option<String>,
    pub tmux: bool,
}

impl TerminalEnv {
    pub fn read() -> Self {
        let term = env::var("TERM")
            .ok()
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();
        let colorterm = env::var("COLORTERM")
            .ok()
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        Self {
            term,
            colorterm,
            colorfgbg: env::var("COLORFGBG").ok(),
            tmux: env::var("TMUX").is_ok(),
        }
    }

    pub fn supports_true_color(&self) -> bool {
        self.colorterm.contains("truecolor")
            || self.colorterm.contains("24bit")
            || self.term.contains("direct")
    }

    /// 256-colour terminal that never announced 24-bit support
    pub fn needs_indexed_colors(&self) -> bool {
        !self.supports_true_color() && self.term.contains("256color")
    }
}

/// Pixel size of one terminal cell.
///
/// The page view maps rendered pixels onto cells with this ratio, so a
/// viewport in pixels follows from the cell grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl Default for CellSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CellSize {
    pub const DEFAULT: CellSize = CellSize {
        width: 8,
        height: 16,
    };

    /// Cell size from a terminal's reported window size
    pub fn from_window(columns: u16, rows: u16, width_px: u16, height_px: u16) -> Option<Self> {
        if columns == 0 || rows == 0 {
            return None;
        }
        let width = width_px / columns;
        let height = height_px / rows;
        // Half-block rendering needs an even, non-zero cell height
        (width > 0 && height > 1).then_some(Self {
            width,
            height: height & !1,
        })
    }

    /// Ask the terminal, falling back to 8x16 when it does not report pixels
    pub fn detect() -> Self {
        match crossterm::terminal::window_size() {
            Ok(size) => Self::from_window(size.columns, size.rows, size.width, size.height)
                .unwrap_or_else(|| {
                    debug!("Terminal reports no pixel size, assuming {:?}", Self::DEFAULT);
                    Self::DEFAULT
                }),
            Err(e) => {
                debug!("window_size failed: {e}");
                Self::DEFAULT
            }
        }
    }

    /// Drawable pixels of `area`
    pub fn viewport(&self, area: Rect) -> Viewport {
        Viewport::new(
            u32::from(area.width) * u32::from(self.width),
            u32::from(area.height) * u32::from(self.height),
        )
    }
}
