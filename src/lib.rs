//! Partial-refresh framebuffer for the 960×540 grayscale e-paper panel of the
//! LilyGo T5 4.7".
//!
//! ## How the panel is updated
//!
//! The T5 4.7" carries an ED047TC1 parallel e-paper panel driven through an
//! epdiy-style driver. Unlike an LCD, the panel holds its image without power.
//! Changing it is slow and power hungry:
//! - **Power on** – the high-voltage rails are brought up before any waveform is
//!   applied and dropped afterwards
//! - **Clear** – an area is first driven towards white for a number of passes so that
//!   the new image does not blend with the old one
//! - **Draw** – a packed 4-bit grayscale image is streamed for the target area
//! - **Ghosting** – repeated partial updates leave faint remains of earlier content;
//!   a periodic clear of the full screen removes them
//!
//! ### Implications for software
//! - Redrawing only what changed is much faster than redrawing the whole screen, so the
//!   driver keeps a copy of what is on the glass and diffs against it.
//! - Every so often the full screen still has to be redrawn to clear ghosting.
//! - The panel rails should only be on while a refresh is in progress.
//!
//! ## Framebuffer layout
//!
//! Pixels are stored as 4-bit gray levels, two per byte. The low nibble holds the
//! pixel with the even x coordinate and the high nibble the one with the odd x
//! coordinate. A full frame is `WIDTH * HEIGHT / 2` bytes. A nibble of `0xF` is white
//! and `0x0` is black.
//!
//! ## Refresh cycle
//!
//! [`EpdDisplay`] owns two such frames: the *current* one that drawing goes into and
//! the *previous* one that mirrors the panel. On each [`EpdDisplay::display`] call:
//! 1. Every [`Config::full_refresh_interval`]-th call clears and redraws the whole
//!    panel.
//! 2. Otherwise the bounding box of changed pixels is computed by
//!    [`dirty::compute_dirty_rect`], padded and clamped, copied into a compact scratch
//!    buffer by [`region::extract_region`] and only that area is cleared and redrawn.
//!    Nothing is sent if no pixel changed.
//! 3. The current frame is committed into the previous one.
//!
//! ## Example
//! ```rust
//! use embedded_graphics::pixelcolor::RgbColor;
//! use embedded_graphics::prelude::*;
//! use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
//! use t547_framebuffer::{Color, Config, EpdDisplay, Panel, Rect, RefreshKind};
//!
//! struct NullPanel;
//!
//! impl Panel for NullPanel {
//!     fn power_on(&mut self) {}
//!     fn power_off(&mut self) {}
//!     fn clear_area(&mut self, _area: Rect, _passes: u32, _cycles: u32) {}
//!     fn draw_grayscale_image(&mut self, _area: Rect, _data: &[u8]) {}
//! }
//!
//! let mut display = EpdDisplay::new(NullPanel, Config::default());
//! display.setup().unwrap();
//!
//! // The first refresh is always a full one.
//! assert_eq!(display.display().unwrap(), RefreshKind::Full);
//!
//! // Afterwards only the changed area is sent.
//! let kind = display
//!     .update(|d| {
//!         Rectangle::new(Point::new(100, 100), Size::new(20, 10))
//!             .into_styled(PrimitiveStyle::with_fill(Color::WHITE))
//!             .draw(d)
//!             .unwrap();
//!     })
//!     .unwrap();
//! assert_eq!(kind, RefreshKind::Partial(Rect::new(90, 90, 40, 30)));
//! ```
//!
//! ## Available Feature Flags
//!
//! ### `defmt` Feature
//! Implements `defmt::Format` for the public value types so they can be emitted with
//! the `defmt` logging framework. No functional changes; purely adds trait impls.
//!
//! Regular log output goes through the [`log`] facade.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

extern crate alloc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

pub mod color;
pub mod config;
pub mod dirty;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod panel;
pub mod region;

pub use config::Config;
pub use display::{DisplayType, EpdDisplay, PowerState, RefreshKind};
pub use error::{BufferKind, Error};
pub use framebuffer::PackedBuffer;
pub use panel::Panel;

/// Color type accepted by the display
pub type Color = Rgb888;

/// Panel width in pixels
pub const WIDTH: usize = 960;

/// Panel height in pixels
pub const HEIGHT: usize = 540;

/// Size in bytes of one packed frame
pub const BUFFER_LEN: usize = compute_buffer_len(WIDTH, HEIGHT);

/// Computes the size of a packed 4-bit frame
///
/// # Arguments
///
/// * `width` - Frame width in pixels, must be even
/// * `height` - Frame height in pixels
///
/// # Returns
///
/// Number of bytes needed to hold two pixels per byte
#[must_use]
pub const fn compute_buffer_len(width: usize, height: usize) -> usize {
    width * height / 2
}

/// An area of the panel in pixel coordinates.
///
/// Mirrors the rectangle type of the panel driver, so width and height are signed.
/// A rectangle with a non-positive width or height covers nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// The rectangle that covers nothing
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering the whole panel.
    #[must_use]
    pub const fn full_screen() -> Self {
        Self::new(0, 0, WIDTH as i32, HEIGHT as i32)
    }

    /// Returns `true` if the rectangle has no area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if the rectangle is non-empty and lies entirely inside a
    /// `width` × `height` frame.
    #[must_use]
    pub const fn fits_within(&self, width: usize, height: usize) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && (self.x as usize + self.width as usize) <= width
            && (self.y as usize + self.height as usize) <= height
    }

    /// Number of pixels covered, zero for empty rectangles.
    #[must_use]
    pub const fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Convert into an `embedded-graphics` rectangle, `None` if empty.
    #[must_use]
    pub fn to_rectangle(&self) -> Option<Rectangle> {
        if self.is_empty() {
            return None;
        }
        Some(Rectangle::new(
            Point::new(self.x, self.y),
            Size::new(self.width as u32, self.height as u32),
        ))
    }
}
