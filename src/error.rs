//! Error types for the display driver.

use core::fmt;

use crate::Rect;

/// Which buffer an allocation was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferKind {
    /// The frame that drawing goes into
    Current,
    /// The frame mirroring the panel contents
    Previous,
    /// Per-refresh copy of the dirty region
    Scratch,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::Current => write!(f, "current"),
            BufferKind::Previous => write!(f, "previous"),
            BufferKind::Scratch => write!(f, "scratch"),
        }
    }
}

/// Errors reported by the framebuffer and display driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A buffer could not be allocated
    Allocation {
        /// Buffer that failed
        buffer: BufferKind,
        /// Requested size in bytes
        bytes: usize,
    },
    /// Packed frames hold two pixels per byte and need an even width
    OddWidth(usize),
    /// A region does not lie within the frame
    OutOfBounds(Rect),
    /// `setup()` has not been called yet
    NotSetUp,
    /// Setup failed earlier; the display stays unusable
    Failed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Allocation { buffer, bytes } => {
                write!(f, "could not allocate {bytes} bytes for {buffer} buffer")
            }
            Error::OddWidth(width) => write!(f, "frame width {width} is not even"),
            Error::OutOfBounds(rect) => write!(
                f,
                "region ({}, {}, {}, {}) is outside the frame",
                rect.x, rect.y, rect.width, rect.height
            ),
            Error::NotSetUp => write!(f, "display has not been set up"),
            Error::Failed => write!(f, "display is marked failed"),
        }
    }
}

impl core::error::Error for Error {}
