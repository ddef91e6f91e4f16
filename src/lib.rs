// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Drivers for micro:bit-style robotics add-on boards.
//!
//! The boards (Robotbit, Superbit, Powerbrick and friends) put a handful
//! of peripherals behind the edge connector. This crate drives them from
//! any MCU with `embedded-hal` 1.0 implementations:
//!
//! - **PWM**: PCA9685 16-channel controller ([`PwmDriver`]) with DC motor
//!   and servo helpers ([`motor`], [`servo`])
//! - **Pixels**: GRB frame buffers for WS2812 strips and matrices
//!   ([`pixels`], [`ws2812`])
//! - **Ranging**: single-pin ultrasonic sensors ([`ultrasonic`]) and the
//!   sound level of the same module ([`sound`])
//! - **Audio**: serial MP3 player framing ([`mp3`])
//! - **Sensors**: gesture/colour sensor and line trackers
//!
//! # Board Tables
//!
//! Channel and pin assignments for the supported boards live in
//! [`board`]; protocol constants in [`config`].
//!
//! # Logging
//!
//! Enable the `defmt` feature to get `defmt` log output. Without it the
//! logging statements compile to nothing.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod board;
pub mod command;
pub mod config;
pub mod gesture;
pub mod i2c_register;
pub mod line_tracker;
pub mod motor;
pub mod mp3;
pub mod pixels;
pub mod pwm;
pub mod servo;
pub mod sound;
pub mod ultrasonic;
pub mod ws2812;

#[cfg(test)]
mod mock;

pub use command::Mp3Command;
pub use gesture::{GestureSensor, SensorMode};
pub use line_tracker::LineTracker;
pub use motor::MotorPair;
pub use mp3::Mp3Player;
pub use pixels::{PixelBuffer, PixelMatrix, PixelTransport, SerpentineMatrix};
pub use pwm::{PwmConfig, PwmDriver};
pub use servo::ServoProfile;
pub use sound::AnalogInput;
pub use ultrasonic::{EchoPin, Pull, Ranger, Reading, SensorModel};
pub use ws2812::Ws2812Spi;
