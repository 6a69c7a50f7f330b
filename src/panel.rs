//! Interface to the panel driver.
//!
//! The display only decides *what* to send; the physical sequencing (rails,
//! waveforms, the parallel bus) belongs to the panel driver behind this trait.
//! Panel operations do not report errors: the transport is assumed reliable, and
//! nothing above it could recover anyway.

use crate::Rect;

/// Primitives of an epdiy-style grayscale e-paper driver.
pub trait Panel {
    /// Bring up the panel supply rails.
    fn power_on(&mut self);

    /// Drop the panel supply rails.
    fn power_off(&mut self);

    /// Drive `area` towards white before new content is drawn into it.
    ///
    /// # Arguments
    ///
    /// * `area` - Area to clear
    /// * `passes` - Number of clear passes
    /// * `cycles` - Cycles per pass
    fn clear_area(&mut self, area: Rect, passes: u32, cycles: u32);

    /// Draw a packed 4-bit image into `area`.
    ///
    /// `data` is laid out for `area` alone, two pixels per byte.
    fn draw_grayscale_image(&mut self, area: Rect, data: &[u8]);

    /// The area covering the whole panel.
    fn full_screen(&self) -> Rect {
        Rect::full_screen()
    }
}
