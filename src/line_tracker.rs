// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Reflective line tracking sensors.
//!
//! Each channel is a digital input that reports whether the sensor sits
//! over the line. Boards differ in polarity, so the tracker can invert
//! all channels at once.
//!
//! The tracker modules need pull-ups on their outputs. The pins handed to
//! [`LineTracker`] must already have their pull-ups enabled, as in
//! `Input::new(pin, Pull::Up)`; the tracker never reconfigures them.
//!
//! # Examples
//!
//! ```ignore
//! let left = Input::new(p.PIN_6, Pull::Up);
//! let right = Input::new(p.PIN_7, Pull::Up);
//! let mut tracker = LineTracker::active_low([left, right]);
//! let [on_left, on_right] = tracker.read()?;
//! ```

use embedded_hal::digital::InputPin;

/// `N` line sensors read together.
pub struct LineTracker<P, const N: usize> {
    pins: [P; N],
    active_low: bool,
}

impl<P: InputPin, const N: usize> LineTracker<P, N> {
    /// Creates a tracker where a high input means "on the line".
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: false,
        }
    }

    /// Creates a tracker where a low input means "on the line".
    pub fn active_low(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: true,
        }
    }

    /// Reads every channel, left to right.
    pub fn read(&mut self) -> Result<[bool; N], P::Error> {
        let mut pattern = [false; N];
        for (on_line, pin) in pattern.iter_mut().zip(self.pins.iter_mut()) {
            *on_line = pin.is_high()? != self.active_low;
        }
        Ok(pattern)
    }

    /// Gives the pins back.
    pub fn release(self) -> [P; N] {
        self.pins
    }
}
