// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! WS2812 pixel transport over an SPI MOSI line.
//!
//! Clocked at 3 MHz, four SPI bits last 1.33 µs, one WS2812 bit period.
//! Each data bit becomes one nibble on the wire:
//!
//! ```text
//! 1 -> 1110   (0.99 µs high, 0.33 µs low)
//! 0 -> 1000   (0.33 µs high, 0.99 µs low)
//! ```
//!
//! A frame is followed by a run of zero bytes holding the line low long
//! enough for the chain to latch.

use embedded_hal::spi::SpiBus;

use crate::config::WS2812_LATCH_BYTES;
use crate::pixels::PixelTransport;

/// SPI symbols for each pair of data bits, most significant first.
const SYMBOLS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

/// Data bytes encoded per SPI write.
const CHUNK: usize = 16;

/// Encodes one data byte as four SPI bytes.
pub fn encode_byte(byte: u8) -> [u8; 4] {
    [
        SYMBOLS[(byte >> 6) as usize & 0b11],
        SYMBOLS[(byte >> 4) as usize & 0b11],
        SYMBOLS[(byte >> 2) as usize & 0b11],
        SYMBOLS[byte as usize & 0b11],
    ]
}

/// [`PixelTransport`] writing to a WS2812 chain through SPI.
///
/// The bus must run at 3 MHz with MOSI idling low.
pub struct Ws2812Spi<SPI> {
    spi: SPI,
}

impl<SPI: SpiBus<u8>> Ws2812Spi<SPI> {
    /// Wraps a configured SPI bus.
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Gives the bus back.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus<u8>> PixelTransport for Ws2812Spi<SPI> {
    type Error = SPI::Error;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut out = [0u8; CHUNK * 4];
        for chunk in bytes.chunks(CHUNK) {
            for (i, &byte) in chunk.iter().enumerate() {
                out[i * 4..i * 4 + 4].copy_from_slice(&encode_byte(byte));
            }
            self.spi.write(&out[..chunk.len() * 4])?;
        }

        let latch = [0u8; CHUNK * 4];
        let mut remaining = WS2812_LATCH_BYTES;
        while remaining > 0 {
            let n = remaining.min(latch.len());
            self.spi.write(&latch[..n])?;
            remaining -= n;
        }
        self.spi.flush()
    }
}
