// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Ultrasonic signal line on an RP2350 GPIO.
//!
//! The line is switched between output (trigger) and input (echo) on the
//! same pin, so it is held as a [`Flex`]. Pulse widths are measured by
//! busy-polling the pin against the embassy time driver.
//!
//! # Examples
//!
//! ```ignore
//! let mut sonar = SonarPin::new(Flex::new(p.PIN_2), 2);
//! let cm = ranger.distance(&mut sonar, SensorModel::POWERBRICK).ok();
//! ```

use core::convert::Infallible;

use embassy_rp::gpio::{self, Flex, Level};
use embassy_time::{Duration, Instant};
use embedded_hal::digital::ErrorType;
use microx_hal::ultrasonic::{EchoPin, Pull};

/// Trigger/echo line of a single-pin ultrasonic sensor.
pub struct SonarPin<'d> {
    /// GPIO flipped between output and input
    pin: Flex<'d>,
    /// GPIO number, keys the ranger's history
    id: u8,
}

impl<'d> SonarPin<'d> {
    /// Wraps GPIO `id`.
    ///
    /// # Arguments
    ///
    /// * `pin` - Flex pin for the signal line
    /// * `id` - GPIO number of `pin`
    pub fn new(pin: Flex<'d>, id: u8) -> Self {
        Self { pin, id }
    }

    /// Polls until the pin reads `level`.
    ///
    /// # Returns
    ///
    /// * `Some(start)` - Instant the level was first seen
    /// * `None` - `timeout` passed first
    fn wait_for_level(&self, level: Level, since: Instant, timeout: Duration) -> Option<Instant> {
        loop {
            if self.pin.get_level() == level {
                return Some(Instant::now());
            }
            if since.elapsed() > timeout {
                return None;
            }
        }
    }
}

impl ErrorType for SonarPin<'_> {
    type Error = Infallible;
}

impl EchoPin for SonarPin<'_> {
    fn id(&self) -> u8 {
        self.id
    }

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        self.pin.set_pull(match pull {
            Pull::None => gpio::Pull::None,
            Pull::Up => gpio::Pull::Up,
            Pull::Down => gpio::Pull::Down,
        });
        Ok(())
    }

    fn set_level(&mut self, high: bool) -> Result<(), Self::Error> {
        self.pin.set_as_output();
        self.pin.set_level(Level::from(high));
        Ok(())
    }

    fn pulse_width(&mut self, timeout_us: u32) -> Result<Option<u32>, Self::Error> {
        self.pin.set_as_input();
        let timeout = Duration::from_micros(timeout_us as u64);
        let start = Instant::now();

        let Some(rise) = self.wait_for_level(Level::High, start, timeout) else {
            return Ok(None);
        };
        let Some(fall) = self.wait_for_level(Level::Low, start, timeout) else {
            return Ok(None);
        };
        Ok(Some((fall - rise).as_micros() as u32))
    }
}
