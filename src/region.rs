//! Extraction of a sub-image from a packed frame.
//!
//! The panel's image transfer takes a packed buffer laid out for the target area
//! only, so a partial refresh first copies the dirty area out of the full frame.
//! The copy keeps the 4-bit packing but re-aligns pixels: the nibble of a pixel is
//! chosen by its column inside the area, not by its column on the panel.

use alloc::vec::Vec;

use crate::error::{BufferKind, Error};
use crate::framebuffer::{try_alloc, PackedBuffer, PixelPair, WHITE_PAIR};
use crate::Rect;

/// Size in bytes of the scratch buffer for `area`.
///
/// Odd widths are rounded up, so every row has room for its last pixel.
#[must_use]
pub const fn scratch_len(area: Rect) -> usize {
    if area.is_empty() {
        0
    } else {
        ((area.width as usize + 1) / 2) * area.height as usize
    }
}

/// Copy `area` of `current` into a freshly allocated packed buffer.
///
/// The pixel at local `(dx, dy)` is stored at byte `dy * width / 2 + dx / 2` of
/// the result, in the high nibble when `dx` is odd and the low nibble otherwise.
/// Each store only touches its own nibble. The buffer starts out white, so a nibble
/// that is never written reads as white.
///
/// The buffer is released when the returned vector is dropped.
///
/// # Errors
///
/// [`Error::OutOfBounds`] if `area` is not empty and does not fit in `current`.
/// [`Error::Allocation`] if the scratch memory is not available.
///
/// # Example
/// ```rust
/// use t547_framebuffer::{region::extract_region, BufferKind, PackedBuffer, Rect};
///
/// let mut fb = PackedBuffer::try_new(8, 2, BufferKind::Current).unwrap();
/// fb.set_gray(3, 1, 0x20);
/// let scratch = extract_region(&fb, Rect::new(2, 1, 2, 1)).unwrap();
/// assert_eq!(scratch, [0x2F]);
/// ```
pub fn extract_region(current: &PackedBuffer, area: Rect) -> Result<Vec<u8>, Error> {
    if area.is_empty() {
        return Ok(Vec::new());
    }
    if !area.fits_within(current.width(), current.height()) {
        return Err(Error::OutOfBounds(area));
    }

    let (x0, y0) = (area.x as usize, area.y as usize);
    let (width, height) = (area.width as usize, area.height as usize);
    let mut scratch = try_alloc(scratch_len(area), WHITE_PAIR, BufferKind::Scratch)?;

    for dy in 0..height {
        for dx in 0..width {
            let level = current.nibble(dx + x0, dy + y0);
            let byte = &mut scratch[dy * width / 2 + dx / 2];
            let mut pair = PixelPair::from_byte(*byte);
            pair.set(dx, level);
            *byte = pair.byte();
        }
    }
    Ok(scratch)
}
