//! Brightness and night-mode post-processing

use image::RgbImage;

/// Lowest accepted brightness multiplier
pub const MIN_BRIGHTNESS: f32 = 0.1;
/// Highest accepted brightness multiplier
pub const MAX_BRIGHTNESS: f32 = 2.0;
/// Brightness change per key press
pub const BRIGHTNESS_STEP: f32 = 0.1;

pub fn clamp_brightness(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS)
    } else {
        1.0
    }
}

/// Scale every channel by `brightness`, then invert when `night_mode` is set
pub fn apply(image: &mut RgbImage, brightness: f32, night_mode: bool) {
    let brightness = clamp_brightness(brightness);
    let scale = (brightness - 1.0).abs() > f32::EPSILON;
    if !scale && !night_mode {
        return;
    }

    for value in image.iter_mut() {
        let mut v = *value;
        if scale {
            v = (f32::from(v) * brightness).round().clamp(0.0, 255.0) as u8;
        }
        if night_mode {
            v = 255 - v;
        }
        *value = v;
    }
}
