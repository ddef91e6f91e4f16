// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! PCA9685 16-channel PWM driver.
//!
//! The chip generates every motor and servo signal on the add-on boards.
//! This module owns its one-time configuration (resolution and cycle
//! period) and writes per-channel duty cycles.
//!
//! # Initialization Sequence
//!
//! ```text
//! MODE1 <- 0x00                       reset
//! old   <- MODE1
//! MODE1 <- (old & 0x7F) | SLEEP       prescaler is only writable asleep
//! PRE_SCALE <- 25 * period / levels - 1
//! MODE1 <- old                        wake
//! wait 5000 µs                        oscillator settles
//! MODE1 <- old | RESTART | AI | ALLCALL
//! ```
//!
//! # Examples
//!
//! ```ignore
//! let mut pwm = PwmDriver::new(i2c, Delay, PwmConfig::default());
//! pwm.set_channel(0, 0, 2048)?; // initializes the chip on first use
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::{
    PCA9685_ADDRESS, PCA9685_CHANNELS, PCA9685_LED0_ON_L, PCA9685_MODE1,
    PCA9685_MODE1_RESTART_AI, PCA9685_MODE1_SLEEP, PCA9685_PRESCALE, PWM_DEFAULT_LEVELS,
    PWM_DEFAULT_PERIOD_US, PWM_OSCILLATOR_SETTLE_US,
};
use crate::i2c_register::RegisterClient;

/// One-time configuration of a PCA9685.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Ticks per PWM cycle
    pub levels: u16,
    /// Length of one PWM cycle in microseconds
    pub period_us: u32,
}

impl PwmConfig {
    /// Prescaler value that yields `period_us` at `levels` ticks per cycle.
    ///
    /// Computed as `25 * period / levels - 1` on the 25 MHz oscillator and
    /// saturated into the register's `0..=255`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// assert_eq!(PwmConfig::default().prescale(), 121);
    /// ```
    pub fn prescale(&self) -> u8 {
        let levels = self.levels.max(1) as u64;
        let ticks = (25 * self.period_us as u64 / levels).saturating_sub(1);
        ticks.min(u8::MAX as u64) as u8
    }

    /// Largest tick a channel can be set to.
    pub fn max_tick(&self) -> u16 {
        self.levels.saturating_sub(1)
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            address: PCA9685_ADDRESS,
            levels: PWM_DEFAULT_LEVELS,
            period_us: PWM_DEFAULT_PERIOD_US,
        }
    }
}

/// PCA9685 driver.
///
/// The configuration is fixed at construction; the chip is programmed
/// lazily on the first channel write (or by an explicit
/// [`initialize`](Self::initialize)) and never again.
pub struct PwmDriver<I2C, D> {
    regs: RegisterClient<I2C>,
    delay: D,
    config: PwmConfig,
    initialized: bool,
}

impl<I2C: I2c, D: DelayNs> PwmDriver<I2C, D> {
    /// Creates a driver for the chip described by `config`.
    ///
    /// No bus traffic happens until the first write.
    pub fn new(i2c: I2C, delay: D, config: PwmConfig) -> Self {
        Self {
            regs: RegisterClient::new(i2c, config.address),
            delay,
            config,
            initialized: false,
        }
    }

    /// Configuration the driver was built with.
    pub fn config(&self) -> PwmConfig {
        self.config
    }

    /// Returns `true` once the chip has been programmed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Resets the chip and programs its cycle period.
    ///
    /// Only the first successful call touches the bus.
    pub fn initialize(&mut self) -> Result<(), I2C::Error> {
        if self.initialized {
            return Ok(());
        }
        self.regs.write_reg(PCA9685_MODE1, 0x00)?;
        self.set_period()?;
        self.initialized = true;
        info!(
            "PCA9685 at {:#x} ready, prescale {}",
            self.regs.address(),
            self.config.prescale()
        );
        Ok(())
    }

    fn set_period(&mut self) -> Result<(), I2C::Error> {
        let prescale = self.config.prescale();
        let old_mode = self.regs.read_reg(PCA9685_MODE1)?;
        let sleep_mode = (old_mode & 0x7F) | PCA9685_MODE1_SLEEP;
        self.regs.write_reg(PCA9685_MODE1, sleep_mode)?;
        self.regs.write_reg(PCA9685_PRESCALE, prescale)?;
        self.regs.write_reg(PCA9685_MODE1, old_mode)?;
        self.delay.delay_us(PWM_OSCILLATOR_SETTLE_US);
        self.regs
            .write_reg(PCA9685_MODE1, old_mode | PCA9685_MODE1_RESTART_AI)
    }

    /// Sets the on and off tick of `channel`.
    ///
    /// Programs the chip first if that has not happened yet. Channels
    /// outside 0..=15 are ignored without touching the bus.
    ///
    /// # Arguments
    ///
    /// * `channel` - PCA9685 output, 0..=15
    /// * `on_tick` - Tick at which the output goes high, normally 0
    /// * `off_tick` - Tick at which the output goes low; callers keep it
    ///   below `levels`
    ///
    /// # Returns
    ///
    /// The bus error of the initialization or the channel write.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// pwm.set_channel(0, 0, 2048)?; // 50 % duty on channel 0
    /// ```
    pub fn set_channel(&mut self, channel: u8, on_tick: u16, off_tick: u16) -> Result<(), I2C::Error> {
        if channel >= PCA9685_CHANNELS {
            warn!("PWM channel {} does not exist", channel);
            return Ok(());
        }
        self.initialize()?;
        let [on_l, on_h] = on_tick.to_le_bytes();
        let [off_l, off_h] = off_tick.to_le_bytes();
        self.regs.write_block(&[
            PCA9685_LED0_ON_L + 4 * channel,
            on_l,
            on_h,
            off_l,
            off_h,
        ])
    }

    /// Drives `channel` fully low.
    pub fn set_channel_off(&mut self, channel: u8) -> Result<(), I2C::Error> {
        self.set_channel(channel, 0, 0)
    }

    /// Gives back the bus and the delay.
    pub fn release(self) -> (I2C, D) {
        (self.regs.release(), self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PWM_COMPENSATED_PERIOD_US;
    use crate::mock::{MockDelay, MockError, MockI2c};

    fn driver() -> PwmDriver<MockI2c, MockDelay> {
        PwmDriver::new(MockI2c::new(), MockDelay::default(), PwmConfig::default())
    }

    #[test]
    fn prescale_follows_period_and_levels() {
        assert_eq!(PwmConfig::default().prescale(), 121);
        let compensated = PwmConfig {
            period_us: PWM_COMPENSATED_PERIOD_US,
            ..PwmConfig::default()
        };
        assert_eq!(compensated.prescale(), 124);
    }

    #[test]
    fn prescale_saturates_for_huge_periods() {
        let slow = PwmConfig {
            period_us: u32::MAX,
            ..PwmConfig::default()
        };
        assert_eq!(slow.prescale(), 255);
        let fast = PwmConfig {
            period_us: 0,
            ..PwmConfig::default()
        };
        assert_eq!(fast.prescale(), 0);
    }

    #[test]
    fn driver_talks_to_configured_address() {
        let config = PwmConfig {
            address: 0x41,
            ..PwmConfig::default()
        };
        let mut pwm = PwmDriver::new(MockI2c::new(), MockDelay::default(), config);
        assert_eq!(pwm.regs.address(), 0x41);
        pwm.set_channel_off(0).unwrap();
        let (bus, _) = pwm.release();
        assert!(bus.writes.iter().all(|(addr, _)| *addr == 0x41));
    }

    #[test]
    fn initialize_programs_prescaler_while_asleep() {
        let mut pwm = driver();
        pwm.initialize().unwrap();
        let (bus, delay) = pwm.release();
        assert_eq!(
            bus.payloads(),
            vec![
                vec![0x00, 0x00],
                vec![0x00],
                vec![0x00, 0x10],
                vec![0xFE, 121],
                vec![0x00, 0x00],
                vec![0x00, 0xA1],
            ]
        );
        assert!(bus.writes.iter().all(|(addr, _)| *addr == 0x40));
        assert!(delay.elapsed_us() >= 5_000);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut pwm = driver();
        pwm.initialize().unwrap();
        pwm.initialize().unwrap();
        assert!(pwm.is_initialized());
        let (bus, _) = pwm.release();
        assert_eq!(bus.writes.len(), 6);
    }

    #[test]
    fn first_channel_write_initializes_lazily() {
        let mut pwm = driver();
        pwm.set_channel(3, 0, 0x0ABC).unwrap();
        assert!(pwm.is_initialized());
        let (bus, _) = pwm.release();
        let payloads = bus.payloads();
        assert_eq!(payloads.len(), 7);
        assert_eq!(payloads[6], vec![0x06 + 12, 0x00, 0x00, 0xBC, 0x0A]);
    }

    #[test]
    fn out_of_range_channel_is_silently_ignored() {
        let mut pwm = driver();
        pwm.set_channel(16, 0, 100).unwrap();
        assert!(!pwm.is_initialized());
        let (bus, _) = pwm.release();
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn failed_initialization_is_retried() {
        let mut bus = MockI2c::new();
        bus.fail = true;
        let mut pwm = PwmDriver::new(bus, MockDelay::default(), PwmConfig::default());
        assert_eq!(pwm.set_channel(0, 0, 1), Err(MockError));
        assert!(!pwm.is_initialized());
    }
}
