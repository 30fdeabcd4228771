//! Zoom factor and fit modes

use serde::{Deserialize, Serialize};

use crate::document::PageSize;
use crate::error::{Result, ViewerError};

/// Minimum allowed zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Maximum allowed zoom factor (400%)
pub const MAX_ZOOM: f32 = 4.0;

/// How the zoom factor is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomMode {
    /// Factor set explicitly or by stepping
    #[default]
    Custom,
    /// Page width fills the viewport
    FitWidth,
    /// Whole page visible in the viewport
    FitPage,
}

impl ZoomMode {
    pub fn label(self) -> &'static str {
        match self {
            ZoomMode::Custom => "",
            ZoomMode::FitWidth => "fit width",
            ZoomMode::FitPage => "fit page",
        }
    }
}

/// Drawable area of the page view, in device pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width_px == 0 || self.height_px == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    factor: f32,
    mode: ZoomMode,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            factor: 1.0,
            mode: ZoomMode::Custom,
        }
    }
}

impl Zoom {
    /// Zoom in rate multiplier per step - 25%
    pub const ZOOM_IN_RATE: f32 = 1.25;
    /// Zoom out rate multiplier per step - 20%
    pub const ZOOM_OUT_RATE: f32 = 0.8;

    /// Fixed factor, clamped into bounds
    #[must_use]
    pub fn custom(factor: f32) -> Self {
        Self {
            factor: Self::clamp_factor(factor),
            mode: ZoomMode::Custom,
        }
    }

    #[must_use]
    pub fn fit(mode: ZoomMode) -> Self {
        Self {
            factor: 1.0,
            mode,
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    /// Zoom as a rounded percentage, e.g. 125
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    /// Accept `factor` only when it is finite and within bounds
    pub fn validate(factor: f32) -> Result<f32> {
        if factor.is_finite() && (MIN_ZOOM..=MAX_ZOOM).contains(&factor) {
            Ok(factor)
        } else {
            Err(ViewerError::ZoomOutOfRange {
                factor,
                min: MIN_ZOOM,
                max: MAX_ZOOM,
            })
        }
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.clamp(MIN_ZOOM, MAX_ZOOM)
        }
    }

    /// Set an explicit factor and leave any fit mode. Returns whether the
    /// factor changed.
    pub fn set(&mut self, factor: f32) -> Result<bool> {
        let factor = Self::validate(factor)?;
        self.mode = ZoomMode::Custom;
        Ok(self.replace_factor(factor))
    }

    /// Zoom in by one step
    pub fn step_in(&mut self) -> bool {
        self.mode = ZoomMode::Custom;
        self.replace_factor(Self::clamp_factor(self.factor * Self::ZOOM_IN_RATE))
    }

    /// Zoom out by one step
    pub fn step_out(&mut self) -> bool {
        self.mode = ZoomMode::Custom;
        self.replace_factor(Self::clamp_factor(self.factor * Self::ZOOM_OUT_RATE))
    }

    pub fn set_mode(&mut self, mode: ZoomMode) {
        self.mode = mode;
    }

    /// Recompute the factor for a fit mode. Custom zoom is left alone.
    /// Returns whether the factor changed.
    pub fn refit(&mut self, page: PageSize, viewport: Viewport) -> bool {
        match Self::fit_factor(self.mode, page, viewport) {
            Some(factor) => self.replace_factor(factor),
            None => false,
        }
    }

    /// Factor that makes `page` fit `viewport` in `mode`, clamped into bounds
    pub fn fit_factor(mode: ZoomMode, page: PageSize, viewport: Viewport) -> Option<f32> {
        if viewport.is_empty() || page.width <= 0.0 || page.height <= 0.0 {
            return None;
        }

        let by_width = viewport.width_px as f32 / page.width;
        let by_height = viewport.height_px as f32 / page.height;
        match mode {
            ZoomMode::Custom => None,
            ZoomMode::FitWidth => Some(Self::clamp_factor(by_width)),
            ZoomMode::FitPage => Some(Self::clamp_factor(by_width.min(by_height))),
        }
    }

    fn replace_factor(&mut self, factor: f32) -> bool {
        let changed = (self.factor - factor).abs() > f32::EPSILON;
        self.factor = factor;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_out_of_bounds_and_keeps_factor() {
        let mut zoom = Zoom::default();
        for bad in [0.0, -1.0, 0.05, 4.01, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                zoom.set(bad),
                Err(ViewerError::ZoomOutOfRange { .. })
            ));
            assert_eq!(zoom.factor(), 1.0);
        }
        assert!(zoom.set(MAX_ZOOM).unwrap());
        assert!(zoom.set(MIN_ZOOM).unwrap());
    }

    #[test]
    fn steps_multiply_and_clamp() {
        let mut zoom = Zoom::default();
        assert!(zoom.step_in());
        assert!((zoom.factor() - 1.25).abs() < 1e-6);
        zoom.step_out();
        assert!((zoom.factor() - 1.0).abs() < 1e-6);

        for _ in 0..20 {
            zoom.step_in();
        }
        assert_eq!(zoom.factor(), MAX_ZOOM);
        assert!(!zoom.step_in());

        for _ in 0..40 {
            zoom.step_out();
        }
        assert_eq!(zoom.factor(), MIN_ZOOM);
    }

    #[test]
    fn fit_width_and_fit_page_use_the_viewport() {
        let page = PageSize::new(600.0, 800.0);
        let viewport = Viewport::new(900, 400);

        assert_eq!(
            Zoom::fit_factor(ZoomMode::FitWidth, page, viewport),
            Some(1.5)
        );
        assert_eq!(
            Zoom::fit_factor(ZoomMode::FitPage, page, viewport),
            Some(0.5)
        );
        assert_eq!(Zoom::fit_factor(ZoomMode::Custom, page, viewport), None);
    }

    #[test]
    fn fit_factor_is_clamped() {
        let page = PageSize::new(100.0, 100.0);
        assert_eq!(
            Zoom::fit_factor(ZoomMode::FitWidth, page, Viewport::new(5000, 5000)),
            Some(MAX_ZOOM)
        );
        assert_eq!(
            Zoom::fit_factor(ZoomMode::FitPage, page, Viewport::new(1, 1)),
            Some(MIN_ZOOM)
        );
        assert_eq!(
            Zoom::fit_factor(ZoomMode::FitPage, page, Viewport::new(0, 10)),
            None
        );
    }

    #[test]
    fn stepping_leaves_fit_mode() {
        let mut zoom = Zoom::fit(ZoomMode::FitPage);
        zoom.step_in();
        assert_eq!(zoom.mode(), ZoomMode::Custom);
    }
}
