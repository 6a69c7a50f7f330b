//! RGB to panel gray level conversion.
//!
//! The panel is driven with 8-bit gray values of which only the upper four bits
//! survive packing. Conversion uses the ITU-R BT.709 luma weights in fixed point
//! with four decimal digits. Each channel's term is truncated on its own. The result
//! is inverted, so a drawn color of white (the framework's "on" color) ends up as
//! ink and black ends up as bare paper.

use embedded_graphics::pixelcolor::RgbColor;

use crate::Color;

/// Fixed-point denominator for the luma weights
pub const LUMA_SCALE: u32 = 10_000;
/// Red weight (0.2126)
pub const LUMA_RED: u32 = 2126;
/// Green weight (0.7152)
pub const LUMA_GREEN: u32 = 7152;
/// Blue weight (0.0722)
pub const LUMA_BLUE: u32 = 722;

/// Convert a color to the 8-bit gray value written to the panel.
///
/// `gray = 255 - (r * 2126 / 10000 + g * 7152 / 10000 + b * 722 / 10000)`
///
/// # Example
/// ```rust
/// use embedded_graphics::pixelcolor::RgbColor;
/// use t547_framebuffer::{color::gray_level, Color};
///
/// assert_eq!(gray_level(Color::BLACK), 255);
/// assert_eq!(gray_level(Color::WHITE), 1);
/// ```
#[must_use]
pub fn gray_level(color: Color) -> u8 {
    let luma = u32::from(color.r()) * LUMA_RED / LUMA_SCALE
        + u32::from(color.g()) * LUMA_GREEN / LUMA_SCALE
        + u32::from(color.b()) * LUMA_BLUE / LUMA_SCALE;
    // weights sum to one and each term truncates, so luma never exceeds 255
    255 - luma as u8
}

/// Reduce an 8-bit gray value to the 4-bit level stored in the framebuffer.
#[must_use]
pub const fn quantize(gray: u8) -> u8 {
    gray >> 4
}

/// Gray level as stored in the framebuffer for `color`.
#[must_use]
pub fn nibble_for(color: Color) -> u8 {
    quantize(gray_level(color))
}
