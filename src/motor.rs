// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! DC motor control over PCA9685 channel pairs.
//!
//! Each motor winding hangs off an H-bridge whose two inputs are fed by two
//! adjacent PWM channels. Driving the first channel turns the motor
//! forward, driving the second turns it in reverse.
//!
//! # Channel Pairs
//!
//! ```text
//!   pair 0: channels 0 (fwd) / 1 (rev)
//!   pair 1: channels 2 (fwd) / 3 (rev)
//!   pair 2: channels 4 (fwd) / 5 (rev)
//!   pair 3: channels 6 (fwd) / 7 (rev)
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use microx_hal::board::robotbit;
//! use microx_hal::motor::MotorPair;
//!
//! if let Some(m1a) = MotorPair::from_index(robotbit::M1A) {
//!     pwm.set_motor(m1a, 2048)?;  // half speed forward
//!     pwm.set_motor(m1a, -4095)?; // full speed reverse
//!     pwm.stop_motor(m1a)?;
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::pwm::PwmDriver;

/// Number of motor pairs on the PCA9685 (channels 0..=7)
pub const MOTOR_PAIRS: u8 = 4;

/// Two adjacent PWM channels driving one H-bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorPair {
    forward: u8,
}

impl MotorPair {
    /// Pair number `index` (0..=3), or `None` if no such pair exists.
    pub fn from_index(index: u8) -> Option<Self> {
        if index < MOTOR_PAIRS {
            Some(Self { forward: index << 1 })
        } else {
            None
        }
    }

    /// Channel that drives the motor forward.
    pub fn forward(&self) -> u8 {
        self.forward
    }

    /// Channel that drives the motor in reverse.
    pub fn reverse(&self) -> u8 {
        self.forward + 1
    }
}

/// Splits a signed speed into (forward, reverse) duty cycles.
///
/// The speed is clamped to `±max_tick` first. At most one of the two
/// results is nonzero, so the bridge is never driven both ways at once.
pub fn split_speed(speed: i32, max_tick: u16) -> (u16, u16) {
    let max = max_tick as i32;
    let speed = speed.clamp(-max, max);
    if speed < 0 {
        (0, (-speed) as u16)
    } else {
        (speed as u16, 0)
    }
}

impl<I2C: I2c, D: DelayNs> PwmDriver<I2C, D> {
    /// Runs the motor on `pair` at `speed`.
    ///
    /// # Arguments
    ///
    /// * `speed` - Signed duty cycle in `-(levels-1)..=(levels-1)`
    ///   - Positive: forward channel carries `speed`
    ///   - Negative: reverse channel carries `-speed`
    ///   - Out-of-range values are clamped
    pub fn set_motor(&mut self, pair: MotorPair, speed: i32) -> Result<(), I2C::Error> {
        let (forward, reverse) = split_speed(speed, self.config().max_tick());
        trace!("motor ch{} fwd {} rev {}", pair.forward(), forward, reverse);
        self.set_channel(pair.forward(), 0, forward)?;
        self.set_channel(pair.reverse(), 0, reverse)
    }

    /// Stops the motor on `pair` by driving both channels low.
    pub fn stop_motor(&mut self, pair: MotorPair) -> Result<(), I2C::Error> {
        self.set_motor(pair, 0)
    }
}
