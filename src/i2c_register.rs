// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Register-level access to an I2C device.
//!
//! Both I2C peripherals on the add-on boards (the PCA9685 and the gesture
//! sensor) speak the same dialect: a write of `[register, value]` sets a
//! register, and writing a register address followed by a read returns
//! its contents.

use embedded_hal::i2c::I2c;

/// I2C client bound to one 7-bit device address.
pub struct RegisterClient<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RegisterClient<I2C> {
    /// Creates a client talking to `address` on `i2c`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address this client talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Writes `value` into register `reg`.
    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg, value])
    }

    /// Reads one byte from register `reg`.
    pub fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Reads `buf.len()` consecutive bytes starting at register `reg`.
    pub fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), I2C::Error> {
        self.i2c.write_read(self.address, &[reg], buf)
    }

    /// Writes raw bytes in a single transaction.
    pub fn write_block(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, bytes)
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
