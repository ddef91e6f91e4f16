// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Microphone output of the ultrasonic module on an RP2350 ADC pin.
//!
//! # Examples
//!
//! ```ignore
//! let adc = Adc::new_blocking(p.ADC, adc::Config::default());
//! let mut mic = AdcInput::new(adc, adc::Channel::new_pin(p.PIN_26, Pull::None));
//! let level = sound_level(&mut mic).unwrap_or(0);
//! ```

use embassy_rp::adc::{self, Adc, Blocking, Channel};
use microx_hal::sound::AnalogInput;

/// Full-scale reading of the RP2350's 12-bit converter
const ADC_FULL_SCALE: u16 = 4095;

/// One ADC channel with the converter it is sampled on.
pub struct AdcInput<'d> {
    /// Blocking converter
    adc: Adc<'d, Blocking>,
    /// GPIO 26..=29 configured as analog input
    channel: Channel<'d>,
}

impl<'d> AdcInput<'d> {
    /// Binds `channel` to `adc`.
    ///
    /// # Arguments
    ///
    /// * `adc` - Blocking ADC driver
    /// * `channel` - Analog-capable pin
    pub fn new(adc: Adc<'d, Blocking>, channel: Channel<'d>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogInput for AdcInput<'_> {
    type Error = adc::Error;

    fn full_scale(&self) -> u16 {
        ADC_FULL_SCALE
    }

    fn read(&mut self) -> Result<u16, Self::Error> {
        self.adc.blocking_read(&mut self.channel)
    }
}
