use ratatui::style::Color;
use serde::{Deserialize, Serialize};

// Color palette structure
#[derive(Clone, Debug)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, invisibles
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Light background
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

/// Theme preference as stored in settings
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the terminal's background
    System,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    /// Next theme in the cycle light → dark → system
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    /// Concrete palette for this preference.
    ///
    /// `System` reads `COLORFGBG` ("fg;bg" as ANSI indices) and falls back to
    /// light when the terminal does not report it.
    pub fn resolve(self, colorfgbg: Option<&str>) -> &'static Base16Palette {
        match self {
            Theme::Light => &LIGHT_PALETTE,
            Theme::Dark => &DARK_PALETTE,
            Theme::System => {
                if colorfgbg.is_some_and(is_dark_background) {
                    &DARK_PALETTE
                } else {
                    &LIGHT_PALETTE
                }
            }
        }
    }
}

fn is_dark_background(colorfgbg: &str) -> bool {
    colorfgbg
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}

// Solarized Light
pub static LIGHT_PALETTE: Base16Palette = Base16Palette {
    base_00: Color::Rgb(0xFD, 0xF6, 0xE3),
    base_01: Color::Rgb(0xEE, 0xE8, 0xD5),
    base_02: Color::Rgb(0x93, 0xA1, 0xA1),
    base_03: Color::Rgb(0x83, 0x94, 0x96),
    base_04: Color::Rgb(0x65, 0x7B, 0x83),
    base_05: Color::Rgb(0x58, 0x6E, 0x75),
    base_06: Color::Rgb(0x07, 0x36, 0x42),
    base_07: Color::Rgb(0x00, 0x2B, 0x36),
    base_08: Color::Rgb(0xDC, 0x32, 0x2F),
    base_09: Color::Rgb(0xCB, 0x4B, 0x16),
    base_0a: Color::Rgb(0xB5, 0x89, 0x00),
    base_0b: Color::Rgb(0x85, 0x99, 0x00),
    base_0c: Color::Rgb(0x2A, 0xA1, 0x98),
    base_0d: Color::Rgb(0x26, 0x8B, 0xD2),
    base_0e: Color::Rgb(0x6C, 0x71, 0xC4),
    base_0f: Color::Rgb(0xD3, 0x36, 0x82),
};

// Oceanic Next
pub static DARK_PALETTE: Base16Palette = Base16Palette {
    base_00: Color::Rgb(0x1B, 0x2B, 0x34),
    base_01: Color::Rgb(0x34, 0x3D, 0x46),
    base_02: Color::Rgb(0x4F, 0x5B, 0x66),
    base_03: Color::Rgb(0x65, 0x73, 0x7E),
    base_04: Color::Rgb(0xA7, 0xAD, 0xBA),
    base_05: Color::Rgb(0xC0, 0xC5, 0xCE),
    base_06: Color::Rgb(0xCD, 0xD3, 0xDE),
    base_07: Color::Rgb(0xD8, 0xDE, 0xE9),
    base_08: Color::Rgb(0xEC, 0x5f, 0x67),
    base_09: Color::Rgb(0xF9, 0x91, 0x57),
    base_0a: Color::Rgb(0xFA, 0xC8, 0x63),
    base_0b: Color::Rgb(0x99, 0xC7, 0x94),
    base_0c: Color::Rgb(0x5F, 0xB3, 0xB3),
    base_0d: Color::Rgb(0x66, 0x99, 0xCC),
    base_0e: Color::Rgb(0xC5, 0x94, 0xC5),
    base_0f: Color::Rgb(0xAB, 0x79, 0x67),
};

impl Base16Palette {
    /// Background, foreground and accent for bars
    pub fn bar_colors(&self) -> (Color, Color, Color) {
        (self.base_01, self.base_05, self.base_0d)
    }

    /// Selected row in lists
    pub fn selection_colors(&self) -> (Color, Color) {
        (self.base_02, self.base_07)
    }

    pub fn error_color(&self) -> Color {
        self.base_08
    }

    pub fn highlight_color(&self) -> Color {
        self.base_0a
    }
}
