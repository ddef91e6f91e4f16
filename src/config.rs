// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware constants for the add-on boards.
//!
//! This module defines every fixed value the drivers rely on:
//! - PCA9685 address, register map and timing
//! - Ultrasonic trigger and echo timing
//! - MP3 module framing and baud rate
//! - Gesture/colour sensor address
//!
//! # PWM Configuration
//!
//! The PCA9685 runs from a 25 MHz oscillator. With the default
//! configuration it produces:
//! - **Resolution**: 12-bit (0-4095 ticks)
//! - **Period**: 20000 µs (50 Hz, standard hobby servo frame)
//! - **Prescale**: `25 * period / levels - 1` = 121

/// Default 7-bit I2C address of the PCA9685 PWM chip
pub const PCA9685_ADDRESS: u8 = 0x40;

/// MODE1 register
pub const PCA9685_MODE1: u8 = 0x00;

/// PRE_SCALE register
pub const PCA9685_PRESCALE: u8 = 0xFE;

/// LED0_ON_L, first byte of channel 0's duty-cycle record
pub const PCA9685_LED0_ON_L: u8 = 0x06;

/// MODE1 SLEEP bit
pub const PCA9685_MODE1_SLEEP: u8 = 0x10;

/// MODE1 bits set when leaving sleep: RESTART | AI | ALLCALL
pub const PCA9685_MODE1_RESTART_AI: u8 = 0xA1;

/// Number of PWM channels on the chip
pub const PCA9685_CHANNELS: u8 = 16;

/// Default PWM resolution in ticks per cycle
pub const PWM_DEFAULT_LEVELS: u16 = 4096;

/// Default PWM cycle period in microseconds (50 Hz)
pub const PWM_DEFAULT_PERIOD_US: u32 = 20_000;

/// Cycle period that compensates a fast-running oscillator on some boards
pub const PWM_COMPENSATED_PERIOD_US: u32 = 20_480;

/// Oscillator stabilization wait after waking the chip
pub const PWM_OSCILLATOR_SETTLE_US: u32 = 5_000;

/// Trigger line held low before the trigger pulse
pub const ULTRASONIC_PRE_TRIGGER_US: u32 = 2;

/// Width of the trigger pulse
pub const ULTRASONIC_TRIGGER_US: u32 = 10;

/// Longest echo pulse accepted before the reading counts as a timeout
pub const ULTRASONIC_ECHO_TIMEOUT_US: u32 = 25_000;

/// Pause before the single retry after a timed-out echo
pub const ULTRASONIC_RETRY_DELAY_MS: u32 = 10;

/// Number of measurement attempts per reading (first try plus one retry)
pub const ULTRASONIC_ATTEMPTS: u8 = 2;

/// Size of the per-pin echo history table
pub const ULTRASONIC_MAX_PINS: usize = 32;

/// UART baud rate of the serial MP3 module
pub const MP3_BAUD_RATE: u32 = 9_600;

/// First byte of every MP3 frame
pub const MP3_START_BYTE: u8 = 0x7E;

/// Last byte of every MP3 frame
pub const MP3_END_BYTE: u8 = 0xEF;

/// Largest payload a single MP3 frame may carry
pub const MP3_MAX_PAYLOAD: usize = 250;

/// Framing overhead: start, length, command, checksum, end
pub const MP3_FRAME_OVERHEAD: usize = 5;

/// Largest encoded MP3 frame
pub const MP3_MAX_FRAME: usize = MP3_MAX_PAYLOAD + MP3_FRAME_OVERHEAD;

/// Loudest volume the MP3 module accepts
pub const MP3_MAX_VOLUME: u8 = 31;

/// Fixed I2C address of the Powerbrick gesture/colour sensor
pub const GESTURE_SENSOR_ADDRESS: u8 = 0x6D;

/// SPI clock for the WS2812 pixel transport (4 SPI bits per data bit)
pub const WS2812_SPI_FREQUENCY_HZ: u32 = 3_000_000;

/// Zero bytes clocked out after a frame to latch the pixels (> 280 µs)
pub const WS2812_LATCH_BYTES: usize = 140;
