// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Servo unit conversions on top of the PWM driver.
//!
//! Every servo command ends up as a pulse width in microseconds, which is
//! converted to ticks with `round(pulse * levels / period)` and clamped to
//! `1..=levels-1`. Tick 0 is reserved for "off" and the top tick is never
//! used, so a servo channel never sits at either encoding boundary.
//!
//! # Profiles
//!
//! | Profile           | Input              | Pulse window (20 ms period)     |
//! |-------------------|--------------------|---------------------------------|
//! | `PulseWidth`      | µs                 | anything, clamped by ticks      |
//! | `ContinuousSpeed` | -1024..=1024       | 500..=2500 µs, stop at 1500 µs  |
//! | `Angle270`        | -45°..=225°        | 600..=2400 µs                   |
//! | `Angle360`        | 0°..360°           | 512..=2512 µs, clamp at 2560 µs |
//!
//! Inputs outside a profile's range are always clamped or wrapped, never
//! rejected.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::pwm::{PwmConfig, PwmDriver};

/// Pulse width of a 360° servo at 0°
pub const ANGLE360_MIN_PULSE_US: f32 = 512.0;

/// Pulse width added over one full turn of a 360° servo
pub const ANGLE360_SPAN_US: f32 = 2000.0;

/// Longest pulse ever sent to a 360° servo
pub const ANGLE360_MAX_PULSE_US: f32 = 2560.0;

/// Rotation range of the 270° servo
const ANGLE270_RANGE_DEG: f32 = 270.0;

/// Offset placing -45° at the start of the 270° servo's range
const ANGLE270_OFFSET_DEG: f32 = 45.0;

/// Normalized angles from here to 360° are closer to the start of the range
const ANGLE270_SNAP_BACK_DEG: f32 = 315.0;

/// Unit a servo command is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoProfile {
    /// Raw pulse width in microseconds
    PulseWidth,
    /// Continuous-rotation servo, signed speed as pulse deflection in µs
    ContinuousSpeed,
    /// Positional servo covering -45°..=225°
    Angle270,
    /// Positional servo covering a full turn
    Angle360,
}

impl ServoProfile {
    /// Pulse width in microseconds for `value` under this profile.
    pub fn pulse_us(&self, value: f32, period_us: u32) -> f32 {
        match self {
            ServoProfile::PulseWidth => value,
            ServoProfile::ContinuousSpeed => continuous_pulse_us(value, period_us),
            ServoProfile::Angle270 => angle270_pulse_us(value, period_us),
            ServoProfile::Angle360 => angle360_pulse_us(value),
        }
    }
}

/// Converts a pulse width to ticks, clamped to `1..=levels-1`.
pub fn pulse_to_ticks(pulse_us: f32, config: &PwmConfig) -> u16 {
    let ticks = libm::roundf(pulse_us * config.levels as f32 / config.period_us.max(1) as f32);
    let max = config.max_tick().max(1) as f32;
    ticks.max(1.0).min(max) as u16
}

/// Stop pulse ± speed, clamped to the continuous servo's window.
pub fn continuous_pulse_us(speed: f32, period_us: u32) -> f32 {
    let period = period_us as f32;
    let stop = period * 3.0 / 40.0;
    let min = period / 40.0;
    let max = period / 8.0;
    (stop + speed).max(min).min(max)
}

/// Folds any angle into the 270° servo's range.
///
/// The angle is shifted by +45° and wrapped to `0..360`. Positions in the
/// 90° dead zone past the end of the range snap to the nearer end: up to
/// 315° to the top (225°), beyond that back to the start (-45°).
pub fn normalize_angle270(degrees: f32) -> f32 {
    let mut norm = (degrees + ANGLE270_OFFSET_DEG) % 360.0;
    if norm < 0.0 {
        norm += 360.0;
    }
    if norm > ANGLE270_RANGE_DEG {
        if norm < ANGLE270_SNAP_BACK_DEG {
            norm = ANGLE270_RANGE_DEG;
        } else {
            norm = 0.0;
        }
    }
    norm
}

/// Pulse width for the 270° servo: 3 % to 12 % of the period.
pub fn angle270_pulse_us(degrees: f32, period_us: u32) -> f32 {
    let period = period_us as f32;
    let min = period * 3.0 / 100.0;
    let max = period * 6.0 / 50.0;
    let span = period * 9.0 / 100.0;
    let pulse = normalize_angle270(degrees) * span / ANGLE270_RANGE_DEG + min;
    pulse.max(min).min(max)
}

/// Pulse width for the 360° servo.
pub fn angle360_pulse_us(degrees: f32) -> f32 {
    let mut norm = degrees % 360.0;
    if norm < 0.0 {
        norm += 360.0;
    }
    let pulse = norm * ANGLE360_SPAN_US / 360.0 + ANGLE360_MIN_PULSE_US;
    pulse.max(ANGLE360_MIN_PULSE_US).min(ANGLE360_MAX_PULSE_US)
}

impl<I2C: I2c, D: DelayNs> PwmDriver<I2C, D> {
    /// Sends a pulse of `pulse_us` microseconds every cycle on `channel`.
    ///
    /// # Arguments
    ///
    /// * `channel` - PCA9685 output, 0..=15
    /// * `pulse_us` - Pulse width; converted with [`pulse_to_ticks`], so
    ///   it never reaches tick 0 or `levels`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// pwm.set_servo_pulse_width(8, 1500.0)?; // centre a standard servo
    /// ```
    pub fn set_servo_pulse_width(&mut self, channel: u8, pulse_us: f32) -> Result<(), I2C::Error> {
        let ticks = pulse_to_ticks(pulse_us, &self.config());
        trace!("servo ch{} -> {} ticks", channel, ticks);
        self.set_channel(channel, 0, ticks)
    }

    /// Runs a continuous-rotation servo at `speed`.
    ///
    /// # Arguments
    ///
    /// * `speed` - Deflection from the stop pulse in µs
    ///   - 0: stop (1500 µs at the default period)
    ///   - -1024..=1024: documented range, clamped to 500..=2500 µs
    pub fn set_continuous_servo_speed(&mut self, channel: u8, speed: i32) -> Result<(), I2C::Error> {
        let pulse = continuous_pulse_us(speed as f32, self.config().period_us);
        self.set_servo_pulse_width(channel, pulse)
    }

    /// Moves a -45°..=225° servo to `degrees`.
    ///
    /// Angles outside the range are folded with [`normalize_angle270`]
    /// and snap to the nearer end of the travel.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// pwm.set_angle_servo(8, 90.0)?;  // 1500 µs
    /// pwm.set_angle_servo(8, 250.0)?; // past the end, held at 225°
    /// ```
    pub fn set_angle_servo(&mut self, channel: u8, degrees: f32) -> Result<(), I2C::Error> {
        let pulse = angle270_pulse_us(degrees, self.config().period_us);
        self.set_servo_pulse_width(channel, pulse)
    }

    /// Moves a 360° servo to `degrees`.
    pub fn set_wide_angle_servo(&mut self, channel: u8, degrees: f32) -> Result<(), I2C::Error> {
        self.set_servo_pulse_width(channel, angle360_pulse_us(degrees))
    }

    /// Commands the servo on `channel` in the unit of `profile`.
    ///
    /// # Arguments
    ///
    /// * `channel` - PCA9685 output, 0..=15
    /// * `profile` - How `value` is interpreted
    /// * `value` - µs, speed or degrees depending on `profile`
    pub fn set_servo(&mut self, channel: u8, profile: ServoProfile, value: f32) -> Result<(), I2C::Error> {
        let pulse = profile.pulse_us(value, self.config().period_us);
        self.set_servo_pulse_width(channel, pulse)
    }
}
