// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Frame buffers for addressable RGB LED matrices.
//!
//! The LED chips expect three bytes per pixel in **green, red, blue**
//! order, pixels in wiring order. [`PixelBuffer`] produces exactly that
//! byte stream; [`PixelMatrix`] adds the transport and the power-up
//! blackout; [`SerpentineMatrix`] maps logical coordinates onto the
//! zig-zag wiring of the Powerbrick 8x8 module.
//!
//! # Buffer Layout
//!
//! ```text
//! offset (y * COLS + x) * 3:  [G][R][B]
//! ```

use crate::board::POWERBRICK_MATRIX_SIDE;

/// Sink for a finished frame (WS2812 single-wire protocol).
///
/// The transport owns the data pin and is responsible for bit timing; it
/// must send the bytes unchanged and in order.
pub trait PixelTransport {
    /// Transport failure
    type Error;

    /// Shifts `bytes` out to the pixel chain.
    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Saturates an arbitrary integer into a colour channel.
fn channel(value: i32) -> u8 {
    value.clamp(0, u8::MAX as i32) as u8
}

/// Saturates a coordinate into `0..len`.
fn coordinate(value: i32, len: usize) -> usize {
    value.clamp(0, len.saturating_sub(1) as i32) as usize
}

/// Zero-initialized GRB frame of `ROWS` x `COLS` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer<const ROWS: usize, const COLS: usize> {
    pixels: [[[u8; 3]; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> PixelBuffer<ROWS, COLS> {
    /// Creates an all-black buffer.
    pub const fn new() -> Self {
        Self {
            pixels: [[[0; 3]; COLS]; ROWS],
        }
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        ROWS
    }

    /// Number of columns.
    pub const fn columns(&self) -> usize {
        COLS
    }

    /// Sets the pixel at row `y`, column `x`.
    ///
    /// Coordinates are clamped onto the buffer and colour channels into
    /// `0..=255`.
    pub fn set_pixel(&mut self, y: i32, x: i32, r: i32, g: i32, b: i32) {
        if ROWS == 0 || COLS == 0 {
            return;
        }
        let (y, x) = (coordinate(y, ROWS), coordinate(x, COLS));
        self.pixels[y][x] = [channel(g), channel(r), channel(b)];
    }

    /// Sets every pixel to the same colour.
    pub fn set_all(&mut self, r: i32, g: i32, b: i32) {
        let grb = [channel(g), channel(r), channel(b)];
        for row in self.pixels.iter_mut() {
            row.fill(grb);
        }
    }

    /// Raw bytes in wire order.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_flattened().as_flattened()
    }
}

impl<const ROWS: usize, const COLS: usize> Default for PixelBuffer<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

/// LED matrix: a frame buffer bound to its transport.
///
/// Freshly built matrices ignore writes until [`init`](Self::init) has
/// pushed two black frames; the first frame after power-up is garbled by
/// the strip and would otherwise show random colours.
pub struct PixelMatrix<T, const ROWS: usize, const COLS: usize> {
    buffer: PixelBuffer<ROWS, COLS>,
    transport: T,
    initialized: bool,
}

impl<T: PixelTransport, const ROWS: usize, const COLS: usize> PixelMatrix<T, ROWS, COLS> {
    /// Binds an all-black buffer to `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            buffer: PixelBuffer::new(),
            transport,
            initialized: false,
        }
    }

    /// Blanks the strip, sending two black frames.
    ///
    /// The matrix only counts as initialized once both frames went out;
    /// after a transport error the next call starts the blackout over.
    /// Later calls after success do nothing.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut matrix = PixelMatrix::<_, 1, 4>::new(Ws2812Spi::new(spi));
    /// matrix.init()?;
    /// matrix.set_pixel_1d(0, 255, 0, 0);
    /// matrix.refresh()?;
    /// ```
    pub fn init(&mut self) -> Result<(), T::Error> {
        if self.initialized {
            return Ok(());
        }
        debug!("blanking {}x{} pixel matrix", ROWS, COLS);
        self.buffer.set_all(0, 0, 0);
        for _ in 0..2 {
            self.transport.send(self.buffer.as_bytes())?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Returns `true` once [`init`](Self::init) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// See [`PixelBuffer::set_pixel`]. No-op before `init`.
    pub fn set_pixel(&mut self, y: i32, x: i32, r: i32, g: i32, b: i32) {
        if self.initialized {
            self.buffer.set_pixel(y, x, r, g, b);
        }
    }

    /// Sets pixel `x` of the first row, for single-row strips.
    pub fn set_pixel_1d(&mut self, x: i32, r: i32, g: i32, b: i32) {
        self.set_pixel(0, x, r, g, b);
    }

    /// See [`PixelBuffer::set_all`]. No-op before `init`.
    pub fn set_all(&mut self, r: i32, g: i32, b: i32) {
        if self.initialized {
            self.buffer.set_all(r, g, b);
        }
    }

    /// Sends the buffer to the strip. No-op before `init`.
    pub fn refresh(&mut self) -> Result<(), T::Error> {
        if !self.initialized {
            return Ok(());
        }
        self.transport.send(self.buffer.as_bytes())
    }

    /// Current frame.
    pub fn buffer(&self) -> &PixelBuffer<ROWS, COLS> {
        &self.buffer
    }

    /// Gives the transport back.
    pub fn release(self) -> T {
        self.transport
    }
}

/// Powerbrick 8x8 module, wired column by column in a zig-zag.
///
/// Even columns run top to bottom, odd columns bottom to top, and each
/// column is one run of the chain. Logical `(y, x)` is therefore written
/// to buffer row `x`, column `y` (even `x`) or `7 - y` (odd `x`).
pub struct SerpentineMatrix<T> {
    matrix: PixelMatrix<T, POWERBRICK_MATRIX_SIDE, POWERBRICK_MATRIX_SIDE>,
}

impl<T: PixelTransport> SerpentineMatrix<T> {
    /// Wraps a fresh 8x8 matrix on `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            matrix: PixelMatrix::new(transport),
        }
    }

    /// See [`PixelMatrix::init`].
    pub fn init(&mut self) -> Result<(), T::Error> {
        self.matrix.init()
    }

    /// Sets the pixel at logical row `y`, column `x`.
    pub fn set_pixel(&mut self, y: i32, x: i32, r: i32, g: i32, b: i32) {
        let last = POWERBRICK_MATRIX_SIDE as i32 - 1;
        if x % 2 == 0 {
            self.matrix.set_pixel(x, y, r, g, b);
        } else {
            self.matrix.set_pixel(x, last - y, r, g, b);
        }
    }

    /// See [`PixelMatrix::set_all`].
    pub fn set_all(&mut self, r: i32, g: i32, b: i32) {
        self.matrix.set_all(r, g, b);
    }

    /// See [`PixelMatrix::refresh`].
    pub fn refresh(&mut self) -> Result<(), T::Error> {
        self.matrix.refresh()
    }

    /// Underlying matrix in wiring order.
    pub fn inner(&self) -> &PixelMatrix<T, POWERBRICK_MATRIX_SIDE, POWERBRICK_MATRIX_SIDE> {
        &self.matrix
    }

    /// Gives the transport back.
    pub fn release(self) -> T {
        self.matrix.release()
    }
}
