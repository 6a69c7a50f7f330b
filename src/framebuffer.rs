//! Packed 4-bit grayscale framebuffer.
//!
//! Each byte holds two horizontally adjacent pixels:
//!
//! ```text
//!   bit  7 6 5 4   3 2 1 0
//!       [ odd x ] [ even x ]
//! ```
//!
//! Rows are `width / 2` bytes long and stored top to bottom, so the pixel `(x, y)`
//! lives in byte `y * width / 2 + x / 2`. A nibble of `0xF` is white.
//!
//! Buffers are allocated once with a fallible reservation. Running out of memory is
//! reported as [`Error::Allocation`] instead of aborting, because on the target the
//! frames live in external PSRAM that may be missing or too small.

use alloc::vec::Vec;

use bitfield::bitfield;
use embedded_dma::ReadBuffer;

use crate::color::quantize;
use crate::error::{BufferKind, Error};

/// Byte value of two white pixels
pub const WHITE_PAIR: u8 = 0xFF;

bitfield! {
    /// One byte of a packed frame: two horizontally adjacent pixels.
    ///
    /// The bit layout is as follows:
    /// - Bits 7-4: Gray level of the pixel with the odd x coordinate
    /// - Bits 3-0: Gray level of the pixel with the even x coordinate
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PixelPair(u8);
    impl Debug;
    pub odd, set_odd: 7, 4;
    pub even, set_even: 3, 0;
}

impl PixelPair {
    /// Wrap a byte taken from a packed frame.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// The packed byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.0
    }

    /// Both pixels set to `level`.
    #[must_use]
    pub const fn splat(level: u8) -> Self {
        Self(((level & 0x0F) << 4) | (level & 0x0F))
    }

    /// Level of the pixel at column `x`, picking the nibble by the parity of `x`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize) -> u8 {
        if x % 2 == 1 {
            self.odd()
        } else {
            self.even()
        }
    }

    /// Set the level of the pixel at column `x`, leaving the other nibble alone.
    #[inline]
    pub fn set(&mut self, x: usize, level: u8) {
        if x % 2 == 1 {
            self.set_odd(level);
        } else {
            self.set_even(level);
        }
    }
}

/// Allocate `len` bytes set to `fill`, reporting failure instead of aborting.
pub(crate) fn try_alloc(len: usize, fill: u8, buffer: BufferKind) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { buffer, bytes: len })?;
    data.resize(len, fill);
    Ok(data)
}

/// Byte offset of the pixel `(x, y)` in a packed frame `width` pixels wide.
#[inline]
#[must_use]
pub const fn byte_offset(width: usize, x: usize, y: usize) -> usize {
    y * width / 2 + x / 2
}

/// A heap allocated frame of 4-bit pixels packed two per byte.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PackedBuffer {
    /// Allocate a white frame.
    ///
    /// # Arguments
    ///
    /// * `width` - Frame width in pixels, must be even
    /// * `height` - Frame height in pixels
    /// * `kind` - Reported in the error if the allocation fails
    ///
    /// # Errors
    ///
    /// [`Error::OddWidth`] if `width` is odd, [`Error::Allocation`] if the memory is
    /// not available.
    ///
    /// # Example
    /// ```rust
    /// use t547_framebuffer::{BufferKind, PackedBuffer, BUFFER_LEN, HEIGHT, WIDTH};
    ///
    /// let fb = PackedBuffer::try_new(WIDTH, HEIGHT, BufferKind::Current).unwrap();
    /// assert_eq!(fb.len(), BUFFER_LEN);
    /// assert!(fb.as_bytes().iter().all(|&b| b == 0xFF));
    /// ```
    pub fn try_new(width: usize, height: usize, kind: BufferKind) -> Result<Self, Error> {
        if width % 2 != 0 {
            return Err(Error::OddWidth(width));
        }
        let data = try_alloc(crate::compute_buffer_len(width, height), WHITE_PAIR, kind)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Length of the packed data in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for a frame without pixels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes per packed row
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.width / 2
    }

    /// The packed data, ready to be sent to the panel
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Gray level (`0..=15`) of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame.
    #[must_use]
    pub fn nibble(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        PixelPair(self.data[byte_offset(self.width, x, y)]).get(x)
    }

    /// Store an 8-bit gray value at `(x, y)`, keeping only its upper four bits.
    ///
    /// This is the panel driver's pixel primitive: odd columns take `gray & 0xF0`
    /// into the high nibble, even columns take `gray >> 4` into the low nibble.
    /// Coordinates outside the frame are ignored.
    pub fn set_gray(&mut self, x: usize, y: usize, gray: u8) {
        self.set_nibble(x, y, quantize(gray));
    }

    /// Store a gray level (`0..=15`) at `(x, y)`. Coordinates outside the frame are
    /// ignored.
    pub fn set_nibble(&mut self, x: usize, y: usize, level: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let byte = &mut self.data[byte_offset(self.width, x, y)];
        let mut pair = PixelPair(*byte);
        pair.set(x, level);
        *byte = pair.0;
    }

    /// Set every byte of the frame to `byte`.
    pub fn fill(&mut self, byte: u8) {
        self.data.fill(byte);
    }

    /// Set every pixel to the gray value `gray`.
    pub fn fill_gray(&mut self, gray: u8) {
        self.fill(PixelPair::splat(quantize(gray)).0);
    }

    /// Copy all pixels of `other` into this frame.
    ///
    /// # Panics
    ///
    /// Panics if the frames differ in size.
    pub fn copy_from(&mut self, other: &PackedBuffer) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "frame size mismatch"
        );
        self.data.copy_from_slice(&other.data);
    }
}

unsafe impl ReadBuffer for PackedBuffer {
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        // the vector is never grown after allocation, so the pointer is stable
        (self.data.as_ptr(), self.data.len())
    }
}

impl core::fmt::Debug for PackedBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackedBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("size", &self.data.len())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PackedBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "PackedBuffer<{}x{}> size: {}",
            self.width,
            self.height,
            self.data.len()
        );
    }
}
