// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! In-memory peripherals for unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{self, Operation};
use embedded_hal::{digital, spi};

use crate::pixels::PixelTransport;
use crate::sound::AnalogInput;
use crate::ultrasonic::{EchoPin, Pull};

/// Error returned by every fake when told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl i2c::Error for MockError {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl spi::Error for MockError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

impl digital::Error for MockError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl embedded_io::Error for MockError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// I2C bus with a 256-byte register file per device.
///
/// Two-byte writes `[reg, value]` update the register file; reads return
/// consecutive registers starting at the last written register pointer.
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub registers: [u8; 256],
    pub fail: bool,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            registers: [0; 256],
            fail: false,
        }
    }

    /// Payloads of every write, ignoring the device address.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.writes.iter().map(|(_, bytes)| bytes.clone()).collect()
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = MockError;
}

impl i2c::I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockError);
        }
        let mut pointer = 0usize;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some(&reg) = bytes.first() {
                        pointer = reg as usize;
                    }
                    if let [reg, value] = bytes[..] {
                        self.registers[reg as usize] = value;
                    }
                    self.writes.push((address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = self.registers[(pointer + i) % 256];
                    }
                }
            }
        }
        Ok(())
    }
}

/// Delay that only counts how long it was asked to wait.
#[derive(Default)]
pub struct MockDelay {
    pub elapsed_ns: u64,
}

impl MockDelay {
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}

/// Ultrasonic pin replaying a queue of echo results.
///
/// Once the queue is drained every further measurement times out.
pub struct ScriptedEchoPin {
    pub id: u8,
    pub pull: Option<Pull>,
    pub levels: Vec<bool>,
    pub echoes: VecDeque<Option<u32>>,
    pub measurements: usize,
    pub fail: bool,
}

impl ScriptedEchoPin {
    pub fn new(id: u8, echoes: &[Option<u32>]) -> Self {
        Self {
            id,
            pull: None,
            levels: Vec::new(),
            echoes: echoes.iter().copied().collect(),
            measurements: 0,
            fail: false,
        }
    }

    /// A pin whose sensor never answers.
    pub fn silent(id: u8) -> Self {
        Self::new(id, &[])
    }
}

impl digital::ErrorType for ScriptedEchoPin {
    type Error = MockError;
}

impl EchoPin for ScriptedEchoPin {
    fn id(&self) -> u8 {
        self.id
    }

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        self.pull = Some(pull);
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockError);
        }
        self.levels.push(high);
        Ok(())
    }

    fn pulse_width(&mut self, _timeout_us: u32) -> Result<Option<u32>, Self::Error> {
        self.measurements += 1;
        Ok(self.echoes.pop_front().flatten())
    }
}

/// UART that keeps every byte written to it.
#[derive(Default)]
pub struct CaptureSerial {
    pub bytes: Vec<u8>,
}

impl embedded_io::ErrorType for CaptureSerial {
    type Error = MockError;
}

impl embedded_io::Write for CaptureSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Pixel transport recording each refreshed frame.
///
/// The first `failures` sends fail without recording anything.
#[derive(Default)]
pub struct CaptureTransport {
    pub frames: Vec<Vec<u8>>,
    pub failures: usize,
}

impl PixelTransport for CaptureTransport {
    type Error = MockError;

    fn send(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(MockError);
        }
        self.frames.push(bytes.to_vec());
        Ok(())
    }
}

/// SPI bus recording everything clocked out on MOSI.
#[derive(Default)]
pub struct RecordingSpi {
    pub mosi: Vec<u8>,
    pub flushes: usize,
}

impl spi::ErrorType for RecordingSpi {
    type Error = MockError;
}

impl spi::SpiBus<u8> for RecordingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.mosi.extend_from_slice(words);
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.mosi.extend_from_slice(write);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.mosi.extend_from_slice(words);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

/// Input pin stuck at one level.
pub struct FixedInput(pub bool);

impl digital::ErrorType for FixedInput {
    type Error = MockError;
}

impl digital::InputPin for FixedInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0)
    }
}

/// ADC channel returning one fixed conversion.
pub struct FixedAnalog {
    pub value: u16,
    pub full_scale: u16,
    pub fail: bool,
}

impl FixedAnalog {
    pub fn new(value: u16, full_scale: u16) -> Self {
        Self {
            value,
            full_scale,
            fail: false,
        }
    }
}

impl AnalogInput for FixedAnalog {
    type Error = MockError;

    fn full_scale(&self) -> u16 {
        self.full_scale
    }

    fn read(&mut self) -> Result<u16, Self::Error> {
        if self.fail {
            return Err(MockError);
        }
        Ok(self.value)
    }
}
