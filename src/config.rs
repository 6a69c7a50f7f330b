//! Display configuration.
//!
//! Values are set in code; there is nothing to parse. The defaults match the
//! refresh policy the T5 4.7" firmware ships with.

use crate::dirty::DIRTY_MARGIN;

/// Number of refreshes between full-screen ghost clears.
///
/// E-paper displays accumulate "ghosting" artifacts with partial updates.
/// A periodic full refresh clears these artifacts.
pub const FULL_REFRESH_INTERVAL: u32 = 10;

/// Clear passes applied to an area before drawing into it
pub const CLEAR_PASSES: u32 = 1;

/// Cycles per clear pass
pub const CLEAR_CYCLES: u32 = 10;

/// Runtime settings of an [`EpdDisplay`](crate::EpdDisplay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Report the display as grayscale instead of binary
    pub greyscale: bool,
    /// A full refresh happens whenever the refresh counter is a multiple of this
    pub full_refresh_interval: u32,
    /// Pixels added on every side of the dirty bounding box
    pub dirty_margin: i32,
    /// Passes handed to the panel's clear primitive
    pub clear_passes: u32,
    /// Cycles handed to the panel's clear primitive
    pub clear_cycles: u32,
}

impl Config {
    /// Configuration with the default refresh policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            greyscale: true,
            full_refresh_interval: FULL_REFRESH_INTERVAL,
            dirty_margin: DIRTY_MARGIN,
            clear_passes: CLEAR_PASSES,
            clear_cycles: CLEAR_CYCLES,
        }
    }

    /// Select grayscale or binary reporting.
    #[must_use]
    pub const fn with_greyscale(mut self, greyscale: bool) -> Self {
        self.greyscale = greyscale;
        self
    }

    /// Set the full refresh interval. Zero is treated as one, i.e. every refresh is
    /// a full one.
    #[must_use]
    pub const fn with_full_refresh_interval(mut self, interval: u32) -> Self {
        self.full_refresh_interval = if interval == 0 { 1 } else { interval };
        self
    }

    /// Set the dirty rectangle padding. Negative values are treated as zero.
    #[must_use]
    pub const fn with_dirty_margin(mut self, margin: i32) -> Self {
        self.dirty_margin = if margin < 0 { 0 } else { margin };
        self
    }

    /// Set the parameters of the clear step.
    #[must_use]
    pub const fn with_clear_cycles(mut self, passes: u32, cycles: u32) -> Self {
        self.clear_passes = passes;
        self.clear_cycles = cycles;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
