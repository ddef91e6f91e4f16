// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Single-pin ultrasonic ranger.
//!
//! The supported sensor heads share one signal line for trigger and echo:
//! the MCU drives a 10 µs trigger pulse, releases the line, and the sensor
//! answers with a high pulse whose width is proportional to the distance.
//!
//! # Measurement Cycle
//!
//! ```text
//! Idle -> Triggering -> Listening -> Success
//!                           |
//!                           +-> Timeout -> (wait 10 ms, one retry)
//!                                           |
//!                                           +-> stale value, at most once in a row
//! ```
//!
//! # Calibration
//!
//! The pulse width is converted with `floor(pulse * multiplier / divisor)`.
//! Each sensor head has its own pair; see [`SensorModel`].
//!
//! # Examples
//!
//! ```ignore
//! let mut ranger = Ranger::new(Delay);
//! let cm = ranger.distance(&mut echo_pin, SensorModel::POWERBRICK)?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::ErrorType;

use crate::config::{
    ULTRASONIC_ATTEMPTS, ULTRASONIC_ECHO_TIMEOUT_US, ULTRASONIC_MAX_PINS,
    ULTRASONIC_PRE_TRIGGER_US, ULTRASONIC_RETRY_DELAY_MS, ULTRASONIC_TRIGGER_US,
};

/// Bias resistor on the signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Floating
    None,
    /// Pulled up
    Up,
    /// Pulled down
    Down,
}

/// Bias and calibration of one sensor head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorModel {
    /// Bias the signal line needs
    pub pull: Pull,
    /// Numerator of the pulse-to-distance ratio
    pub multiplier: u32,
    /// Denominator of the pulse-to-distance ratio
    pub divisor: u32,
}

impl SensorModel {
    /// Cat-head sensor v1.0 (connection holes in the ears)
    pub const CAT_HEAD: SensorModel = SensorModel {
        pull: Pull::Down,
        multiplier: 21,
        divisor: 800,
    };

    /// Powerbrick ultrasonic module
    pub const POWERBRICK: SensorModel = SensorModel {
        pull: Pull::None,
        multiplier: 10,
        divisor: 348,
    };

    /// Cat-head sensor with LEDs in the ears
    pub const CAT_HEAD_LEDS: SensorModel = SensorModel {
        pull: Pull::None,
        multiplier: 9,
        divisor: 348,
    };
}

/// Bidirectional GPIO carrying trigger and echo.
pub trait EchoPin: ErrorType {
    /// Pin number, used to keep a separate history per pin.
    fn id(&self) -> u8;

    /// Configures the bias resistor.
    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error>;

    /// Drives the line as an output.
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Releases the line and measures the next high pulse.
    ///
    /// Returns `None` if no complete pulse arrives within `timeout_us`.
    fn pulse_width(&mut self, timeout_us: u32) -> Result<Option<u32>, Self::Error>;
}

/// Outcome of one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reading {
    /// Fresh echo, pulse width in µs
    Echo(u32),
    /// Both attempts timed out; last good pulse width reused
    Stale(u32),
    /// Both attempts timed out and the previous reading was already stale
    Lost,
}

impl Reading {
    /// Pulse width to convert, 0 when nothing usable was measured.
    pub fn pulse_us(&self) -> u32 {
        match *self {
            Reading::Echo(width) | Reading::Stale(width) => width,
            Reading::Lost => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PinHistory {
    last_pulse_us: u32,
    used_fallback: bool,
}

/// Converts a pulse width to a distance, flooring the result.
///
/// # Arguments
///
/// * `pulse_us` - Echo pulse width in µs
/// * `multiplier` / `divisor` - Calibration of the sensor head
///
/// # Returns
///
/// `floor(pulse_us * multiplier / divisor)`, saturated at `u32::MAX`;
/// 0 when `divisor` is 0.
pub fn scale_pulse(pulse_us: u32, multiplier: u32, divisor: u32) -> u32 {
    if divisor == 0 {
        return 0;
    }
    let distance = pulse_us as u64 * multiplier as u64 / divisor as u64;
    u32::try_from(distance).unwrap_or(u32::MAX)
}

/// Ultrasonic measurement state machine with per-pin history.
pub struct Ranger<D> {
    delay: D,
    history: [PinHistory; ULTRASONIC_MAX_PINS],
}

impl<D: DelayNs> Ranger<D> {
    /// Creates a ranger with empty history.
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            history: [PinHistory::default(); ULTRASONIC_MAX_PINS],
        }
    }

    /// Runs one reading on `pin`.
    ///
    /// A timed-out echo is retried once after 10 ms. If the retry also
    /// times out the last good pulse width for this pin is returned, but
    /// never twice in a row. Pins whose id falls outside the history table
    /// read as [`Reading::Lost`] without any I/O.
    ///
    /// # Arguments
    ///
    /// * `pin` - Shared trigger/echo line of the sensor
    /// * `pull` - Bias the sensor head needs on that line
    ///
    /// # Returns
    ///
    /// * `Ok(Reading::Echo(us))` - Fresh pulse width
    /// * `Ok(Reading::Stale(us))` - Both attempts timed out, last good width
    /// * `Ok(Reading::Lost)` - Nothing usable
    /// * `Err(e)` - GPIO fault; the pin's history is left untouched
    pub fn read<P: EchoPin>(&mut self, pin: &mut P, pull: Pull) -> Result<Reading, P::Error> {
        let slot = pin.id() as usize;
        if slot >= ULTRASONIC_MAX_PINS {
            warn!("ultrasonic pin {} has no history slot", slot);
            return Ok(Reading::Lost);
        }

        for attempt in 0..ULTRASONIC_ATTEMPTS {
            if attempt > 0 {
                debug!("no echo on pin {}, retrying", slot);
                self.delay.delay_ms(ULTRASONIC_RETRY_DELAY_MS);
            }
            if let Some(width) = self.ping(pin, pull)? {
                self.history[slot] = PinHistory {
                    last_pulse_us: width,
                    used_fallback: false,
                };
                return Ok(Reading::Echo(width));
            }
        }

        let history = &mut self.history[slot];
        if history.used_fallback {
            history.used_fallback = false;
            warn!("no echo on pin {}, giving up", slot);
            Ok(Reading::Lost)
        } else {
            history.used_fallback = true;
            warn!("no echo on pin {}, reusing {} us", slot, history.last_pulse_us);
            Ok(Reading::Stale(history.last_pulse_us))
        }
    }

    /// Measures the distance on `pin` in the units set by
    /// `multiplier / divisor`.
    ///
    /// Runs [`read`](Self::read) and scales the pulse width with
    /// [`scale_pulse`]. A lost reading measures 0.
    ///
    /// # Arguments
    ///
    /// * `pin` - Shared trigger/echo line of the sensor
    /// * `pull` - Bias the sensor head needs on that line
    /// * `multiplier` / `divisor` - Calibration, see [`SensorModel`]
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Powerbrick module, centimetres
    /// let cm = ranger.measure(&mut pin, Pull::None, 10, 348)?;
    /// ```
    pub fn measure<P: EchoPin>(
        &mut self,
        pin: &mut P,
        pull: Pull,
        multiplier: u32,
        divisor: u32,
    ) -> Result<u32, P::Error> {
        let reading = self.read(pin, pull)?;
        Ok(scale_pulse(reading.pulse_us(), multiplier, divisor))
    }

    /// Measures the distance on `pin` with a known sensor head.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let cm = ranger.distance(&mut pin, SensorModel::CAT_HEAD)?;
    /// ```
    pub fn distance<P: EchoPin>(&mut self, pin: &mut P, model: SensorModel) -> Result<u32, P::Error> {
        self.measure(pin, model.pull, model.multiplier, model.divisor)
    }

    /// One trigger/listen cycle. Zero-width pulses count as timeouts.
    fn ping<P: EchoPin>(&mut self, pin: &mut P, pull: Pull) -> Result<Option<u32>, P::Error> {
        pin.set_pull(pull)?;

        pin.set_level(false)?;
        self.delay.delay_us(ULTRASONIC_PRE_TRIGGER_US);
        pin.set_level(true)?;
        self.delay.delay_us(ULTRASONIC_TRIGGER_US);
        pin.set_level(false)?;

        let width = pin.pulse_width(ULTRASONIC_ECHO_TIMEOUT_US)?;
        Ok(width.filter(|&w| w > 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockError, ScriptedEchoPin};

    fn ranger() -> Ranger<MockDelay> {
        Ranger::new(MockDelay::default())
    }

    #[test]
    fn trigger_pulse_is_low_high_low() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(1, &[Some(580)]);
        assert_eq!(ranger.read(&mut pin, Pull::Down).unwrap(), Reading::Echo(580));
        assert_eq!(pin.levels, vec![false, true, false]);
        assert_eq!(pin.pull, Some(Pull::Down));
        assert_eq!(ranger.delay.elapsed_us(), 12);
    }

    #[test]
    fn distance_is_floored_per_model() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(2, &[Some(580), Some(580), Some(580)]);
        assert_eq!(ranger.distance(&mut pin, SensorModel::CAT_HEAD).unwrap(), 15);
        assert_eq!(ranger.distance(&mut pin, SensorModel::POWERBRICK).unwrap(), 16);
        assert_eq!(ranger.distance(&mut pin, SensorModel::CAT_HEAD_LEDS).unwrap(), 15);
    }

    #[test]
    fn single_timeout_is_retried_after_ten_ms() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(3, &[None, Some(1000)]);
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Echo(1000));
        assert_eq!(pin.measurements, 2);
        assert!(ranger.delay.elapsed_us() >= 10_000);
    }

    #[test]
    fn zero_width_pulse_counts_as_timeout() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(3, &[Some(0), Some(700)]);
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Echo(700));
    }

    #[test]
    fn fallback_is_never_used_twice_in_a_row() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(4, &[Some(800)]);
        assert_eq!(ranger.measure(&mut pin, Pull::None, 1, 1).unwrap(), 800);

        // The sensor is now unplugged
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Stale(800));
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Lost);
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Stale(800));
        assert_eq!(ranger.measure(&mut pin, Pull::None, 1, 1).unwrap(), 0);
        assert_eq!(pin.measurements, 1 + 4 * 2);
    }

    #[test]
    fn silent_sensor_without_history_reads_zero() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::silent(5);
        assert_eq!(ranger.distance(&mut pin, SensorModel::CAT_HEAD).unwrap(), 0);
        assert_eq!(ranger.distance(&mut pin, SensorModel::CAT_HEAD).unwrap(), 0);
    }

    #[test]
    fn fresh_echo_clears_fallback_flag() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(6, &[Some(500), None, None, Some(600)]);
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Echo(500));
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Stale(500));
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Echo(600));
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Stale(600));
    }

    #[test]
    fn history_is_kept_per_pin() {
        let mut ranger = ranger();
        let mut left = ScriptedEchoPin::new(7, &[Some(300)]);
        let mut right = ScriptedEchoPin::new(8, &[Some(900)]);
        ranger.read(&mut left, Pull::None).unwrap();
        ranger.read(&mut right, Pull::None).unwrap();
        assert_eq!(ranger.read(&mut left, Pull::None).unwrap(), Reading::Stale(300));
        assert_eq!(ranger.read(&mut right, Pull::None).unwrap(), Reading::Stale(900));
    }

    #[test]
    fn pin_without_history_slot_is_not_touched() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(40, &[Some(500)]);
        assert_eq!(ranger.measure(&mut pin, Pull::None, 1, 1).unwrap(), 0);
        assert!(pin.levels.is_empty());
        assert_eq!(pin.measurements, 0);
    }

    #[test]
    fn gpio_fault_propagates_and_keeps_history() {
        let mut ranger = ranger();
        let mut pin = ScriptedEchoPin::new(9, &[Some(450)]);
        ranger.read(&mut pin, Pull::None).unwrap();
        pin.fail = true;
        assert_eq!(ranger.read(&mut pin, Pull::None), Err(MockError));
        pin.fail = false;
        assert_eq!(ranger.read(&mut pin, Pull::None).unwrap(), Reading::Stale(450));
    }

    #[test]
    fn zero_divisor_reads_zero() {
        assert_eq!(scale_pulse(1000, 21, 0), 0);
        assert_eq!(scale_pulse(1000, 21, 800), 26);
    }

    #[test]
    fn oversized_scale_saturates() {
        assert_eq!(scale_pulse(u32::MAX, 3, 1), u32::MAX);
        assert_eq!(scale_pulse(u32::MAX, 2, 2), u32::MAX);
        assert_eq!(scale_pulse(4_000_000_000, 2, 3), 2_666_666_666);
    }
}
