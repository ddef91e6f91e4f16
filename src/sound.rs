// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Sound level from the Powerbrick ultrasonic module.
//!
//! Besides ranging, the module has a microphone whose envelope sits on
//! its analog output. The level is reported on the micro:bit scale,
//! 0..=1023, whatever the resolution of the MCU's converter.

/// Largest sound level reported
pub const SOUND_LEVEL_MAX: u16 = 1023;

/// One ADC channel.
pub trait AnalogInput {
    /// Conversion failure
    type Error;

    /// Largest raw value [`read`](Self::read) can return.
    fn full_scale(&self) -> u16;

    /// Takes one conversion.
    fn read(&mut self) -> Result<u16, Self::Error>;
}

/// Rescales a raw conversion onto 0..=1023.
///
/// A `full_scale` of 0 reads as silence; raw values above it saturate.
pub fn scale_level(raw: u16, full_scale: u16) -> u16 {
    if full_scale == 0 {
        return 0;
    }
    let raw = raw.min(full_scale) as u32;
    (raw * SOUND_LEVEL_MAX as u32 / full_scale as u32) as u16
}

/// Reads the sound level on `input`.
///
/// # Arguments
///
/// * `input` - ADC channel wired to the module's signal pin
///
/// # Returns
///
/// Level in 0..=1023, or the converter's error.
///
/// # Examples
///
/// ```ignore
/// let level = sound_level(&mut mic)?;
/// if level > 600 {
///     player.stop()?;
/// }
/// ```
pub fn sound_level<A: AnalogInput>(input: &mut A) -> Result<u16, A::Error> {
    let raw = input.read()?;
    let level = scale_level(raw, input.full_scale());
    trace!("sound raw {} -> {}", raw, level);
    Ok(level)
}
