//! Dirty region tracking.
//!
//! The region to refresh is found by comparing the current frame with the frame
//! last sent to the panel, pixel by pixel, at refresh time. Drawing does not track
//! anything, so a scan is always `O(width * height)`. That is cheap next to a
//! physical refresh, which takes hundreds of milliseconds.
//!
//! The bounding box of all differing pixels is padded by a margin on every side
//! and clamped to the panel.

use log::debug;

use crate::framebuffer::{PackedBuffer, PixelPair};
use crate::Rect;

/// Pixels added on every side of the changed area
pub const DIRTY_MARGIN: i32 = 10;

/// Running bounding box of changed pixels.
///
/// Starts out inverted (`x1 = width, y1 = height, x2 = 0, y2 = 0`) so that the first
/// included pixel sets all four bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyBounds {
    /// Leftmost changed column
    pub x1: i32,
    /// Topmost changed row
    pub y1: i32,
    /// Rightmost changed column
    pub x2: i32,
    /// Bottommost changed row
    pub y2: i32,
}

impl DirtyBounds {
    /// Empty bounds for a `width` × `height` frame.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            x1: width as i32,
            y1: height as i32,
            x2: 0,
            y2: 0,
        }
    }

    /// Grow the bounds to cover `(x, y)`.
    #[inline]
    pub fn include(&mut self, x: usize, y: usize) {
        let (x, y) = (x as i32, y as i32);
        self.x1 = self.x1.min(x);
        self.x2 = self.x2.max(x);
        self.y1 = self.y1.min(y);
        self.y2 = self.y2.max(y);
    }

    /// Returns `true` if no pixel has been included.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    /// Pad by `margin` and clamp to a `width` × `height` frame.
    ///
    /// # Returns
    ///
    /// The padded area, or [`Rect::EMPTY`] if nothing was included. A negative
    /// `margin` is treated as zero, so an included pixel is never cut off.
    #[must_use]
    pub fn to_rect(&self, margin: i32, width: usize, height: usize) -> Rect {
        if self.is_empty() || width == 0 || height == 0 {
            return Rect::EMPTY;
        }
        let margin = margin.max(0);
        let x1 = (self.x1 - margin).max(0);
        let y1 = (self.y1 - margin).max(0);
        let x2 = (self.x2 + margin).min(width as i32 - 1);
        let y2 = (self.y2 + margin).min(height as i32 - 1);
        Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1)
    }
}

/// Collect the bounding box of all pixels that differ between two frames.
///
/// Bytes are compared first; only bytes that differ are split into their two
/// nibbles.
///
/// # Panics
///
/// Panics if the frames differ in size.
#[must_use]
pub fn scan(current: &PackedBuffer, previous: &PackedBuffer) -> DirtyBounds {
    assert_eq!(
        (current.width(), current.height()),
        (previous.width(), previous.height()),
        "frame size mismatch"
    );
    let mut bounds = DirtyBounds::new(current.width(), current.height());
    let row_len = current.row_len();
    if row_len == 0 {
        return bounds;
    }

    let rows = current
        .as_bytes()
        .chunks_exact(row_len)
        .zip(previous.as_bytes().chunks_exact(row_len));
    for (y, (new_row, old_row)) in rows.enumerate() {
        for (i, (&new, &old)) in new_row.iter().zip(old_row).enumerate() {
            let diff = PixelPair::from_byte(new ^ old);
            if diff.byte() == 0 {
                continue;
            }
            if diff.even() != 0 {
                bounds.include(i * 2, y);
            }
            if diff.odd() != 0 {
                bounds.include(i * 2 + 1, y);
            }
        }
    }
    bounds
}

/// Compute the padded area that changed between `previous` and `current`, using
/// the default [`DIRTY_MARGIN`].
///
/// # Example
/// ```rust
/// use t547_framebuffer::{dirty::compute_dirty_rect, BufferKind, PackedBuffer, Rect};
///
/// let previous = PackedBuffer::try_new(960, 540, BufferKind::Previous).unwrap();
/// let mut current = previous.clone();
/// assert!(compute_dirty_rect(&current, &previous).is_empty());
///
/// current.set_gray(100, 50, 0);
/// assert_eq!(compute_dirty_rect(&current, &previous), Rect::new(90, 40, 21, 21));
/// ```
///
/// # Panics
///
/// Panics if the frames differ in size.
#[must_use]
pub fn compute_dirty_rect(current: &PackedBuffer, previous: &PackedBuffer) -> Rect {
    dirty_rect_with_margin(current, previous, DIRTY_MARGIN)
}

/// Compute the area that changed between `previous` and `current`, padded by
/// `margin` on every side.
///
/// # Panics
///
/// Panics if the frames differ in size.
#[must_use]
pub fn dirty_rect_with_margin(current: &PackedBuffer, previous: &PackedBuffer, margin: i32) -> Rect {
    let bounds = scan(current, previous);
    let area = bounds.to_rect(margin, current.width(), current.height());
    if area.is_empty() {
        debug!("No dirty area");
    } else {
        debug!(
            "Dirty area found ({}, {}, {}, {})",
            area.x,
            area.y,
            area.x + area.width - 1,
            area.y + area.height - 1
        );
    }
    area
}
