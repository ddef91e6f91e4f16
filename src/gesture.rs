// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Driver for the Powerbrick gesture/colour sensor (I2C address 0x6D).
//!
//! The sensor has one active measurement mode at a time; every reading
//! and every LED command first writes the mode it needs into the mode
//! register.
//!
//! # Register Map
//!
//! ```text
//!   0x01  mode (1 ambient, 2 proximity, 3 gesture, 4 active)
//!   0x15  colour: [hue / 2][brightness]
//!   0x17  raw RGBC, 4 bytes
//!   0x18  indicator LED brightness
//!   0x19  single indicator LED: [index][on]
//!   0x1A  indicator LED bitmask
//!   0x1F  proximity
//!   0x29  last gesture
//! ```

use embedded_hal::i2c::I2c;

use crate::config::GESTURE_SENSOR_ADDRESS;
use crate::i2c_register::RegisterClient;

const REG_MODE: u8 = 1;
const REG_COLOR: u8 = 21;
const REG_RAW_RGB: u8 = 23;
const REG_LED_PWM: u8 = 24;
const REG_LED: u8 = 25;
const REG_LED_MASK: u8 = 26;
const REG_PROXIMITY: u8 = 31;
const REG_GESTURE: u8 = 41;

/// Number of indicator LEDs on the sensor.
pub const INDICATOR_LEDS: u8 = 5;

/// Measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorMode {
    Ambient = 1,
    Proximity = 2,
    Gesture = 3,
    Active = 4,
}

/// Gesture/colour sensor on an I2C bus.
pub struct GestureSensor<I2C> {
    regs: RegisterClient<I2C>,
}

impl<I2C: I2c> GestureSensor<I2C> {
    /// Creates a driver at the default address 0x6D.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, GESTURE_SENSOR_ADDRESS)
    }

    /// Creates a driver at a non-default address.
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            regs: RegisterClient::new(i2c, address),
        }
    }

    fn select(&mut self, mode: SensorMode) -> Result<(), I2C::Error> {
        self.regs.write_reg(REG_MODE, mode as u8)
    }

    fn color(&mut self) -> Result<[u8; 2], I2C::Error> {
        self.select(SensorMode::Ambient)?;
        let mut buf = [0u8; 2];
        self.regs.read_regs(REG_COLOR, &mut buf)?;
        Ok(buf)
    }

    /// Ambient brightness, 0..=255.
    pub fn brightness(&mut self) -> Result<u8, I2C::Error> {
        Ok(self.color()?[1])
    }

    /// Dominant hue in degrees, 0..=510 in steps of 2.
    pub fn hue(&mut self) -> Result<u16, I2C::Error> {
        Ok(self.color()?[0] as u16 * 2)
    }

    /// Raw colour channels as reported by the sensor.
    ///
    /// Switches the sensor to active mode first.
    ///
    /// # Returns
    ///
    /// `[r, g, b, clear]` as read from register 0x17 onwards.
    pub fn raw_rgb(&mut self) -> Result<[u8; 4], I2C::Error> {
        self.select(SensorMode::Active)?;
        let mut buf = [0u8; 4];
        self.regs.read_regs(REG_RAW_RGB, &mut buf)?;
        Ok(buf)
    }

    /// Proximity of the nearest object; larger is closer.
    pub fn proximity(&mut self) -> Result<u8, I2C::Error> {
        self.select(SensorMode::Proximity)?;
        self.regs.read_reg(REG_PROXIMITY)
    }

    /// Code of the last recognised gesture, 0 when none.
    pub fn gesture(&mut self) -> Result<u8, I2C::Error> {
        self.select(SensorMode::Gesture)?;
        self.regs.read_reg(REG_GESTURE)
    }

    /// Switches indicator LED `index` on or off.
    ///
    /// The sensor is put in active mode before the index is checked, so
    /// an ignored index still leaves the sensor in active mode.
    ///
    /// # Arguments
    ///
    /// * `index` - 0 for all LEDs, otherwise 1..=4; larger values are ignored
    /// * `on` - `true` to light the LED
    pub fn set_led(&mut self, index: u8, on: bool) -> Result<(), I2C::Error> {
        self.select(SensorMode::Active)?;
        if index >= INDICATOR_LEDS {
            debug!("gesture sensor has no LED {}", index);
            return Ok(());
        }
        self.regs.write_block(&[REG_LED, index, on as u8])
    }

    /// Sets all indicator LEDs at once, bit `n` driving LED `n + 1`.
    ///
    /// Leaves the sensor in proximity mode.
    pub fn set_leds(&mut self, mask: u8) -> Result<(), I2C::Error> {
        self.select(SensorMode::Proximity)?;
        self.regs.write_block(&[REG_LED_MASK, mask])
    }

    /// Sets indicator LED brightness. Leaves the sensor in active mode.
    pub fn set_led_pwm(&mut self, value: u8) -> Result<(), I2C::Error> {
        self.select(SensorMode::Active)?;
        self.regs.write_reg(REG_LED_PWM, value)
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.regs.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockError, MockI2c};

    #[test]
    fn colour_reading_selects_ambient_mode() {
        let mut bus = MockI2c::new();
        bus.registers[21] = 60;
        bus.registers[22] = 200;
        let mut sensor = GestureSensor::new(bus);
        assert_eq!(sensor.brightness().unwrap(), 200);
        assert_eq!(sensor.hue().unwrap(), 120);
        let bus = sensor.release();
        assert_eq!(bus.writes[0], (0x6D, vec![1, 1]));
        assert_eq!(bus.writes[1], (0x6D, vec![21]));
    }

    #[test]
    fn proximity_and_gesture_switch_modes() {
        let mut bus = MockI2c::new();
        bus.registers[31] = 42;
        bus.registers[41] = 3;
        let mut sensor = GestureSensor::new(bus);
        assert_eq!(sensor.proximity().unwrap(), 42);
        assert_eq!(sensor.gesture().unwrap(), 3);
        assert_eq!(
            sensor.release().payloads(),
            vec![vec![1, 2], vec![31], vec![1, 3], vec![41]]
        );
    }

    #[test]
    fn raw_rgb_reads_four_bytes_in_active_mode() {
        let mut bus = MockI2c::new();
        bus.registers[23..27].copy_from_slice(&[1, 2, 3, 4]);
        let mut sensor = GestureSensor::new(bus);
        assert_eq!(sensor.raw_rgb().unwrap(), [1, 2, 3, 4]);
        assert_eq!(sensor.release().payloads(), vec![vec![1, 4], vec![23]]);
    }

    #[test]
    fn led_commands_select_their_mode_first() {
        let mut sensor = GestureSensor::new(MockI2c::new());
        sensor.raw_rgb().unwrap();
        sensor.set_led(1, true).unwrap();
        sensor.set_leds(3).unwrap();
        sensor.set_led_pwm(9).unwrap();
        assert_eq!(
            sensor.release().payloads(),
            vec![
                vec![1, 4],
                vec![23],
                vec![1, 4],
                vec![25, 1, 1],
                vec![1, 2],
                vec![26, 3],
                vec![1, 4],
                vec![24, 9],
            ]
        );
    }

    #[test]
    fn out_of_range_led_only_sets_the_mode() {
        let mut sensor = GestureSensor::new(MockI2c::new());
        sensor.set_led(4, false).unwrap();
        sensor.set_led(5, true).unwrap();
        assert_eq!(
            sensor.release().payloads(),
            vec![vec![1, 4], vec![25, 4, 0], vec![1, 4]]
        );
    }

    #[test]
    fn bus_failure_is_reported() {
        let mut bus = MockI2c::new();
        bus.fail = true;
        let mut sensor = GestureSensor::new(bus);
        assert_eq!(sensor.proximity(), Err(MockError));
    }
}
