// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! RP2350 Robot Demo for Robotbit-style Add-on Boards
//!
//! Firmware exercising every driver of the add-on board from an RP2350
//! using the Embassy async runtime.
//!
//! # Hardware Configuration
//! - **Microcontroller**: RP2350A (ARM Cortex-M33)
//! - **PCA9685**: I2C0, SDA on GPIO 4, SCL on GPIO 5, address 0x40
//!   - Motor M1A on channels 0/1, M1B on channels 2/3
//!   - Servo S1 on channel 8
//! - **MP3 player**: UART0 TX on GPIO 0, RX on GPIO 1, 9600 baud
//! - **Pixels**: four WS2812 LEDs, data on SPI0 MOSI (GPIO 19)
//! - **Ultrasonic**: Powerbrick sensor, signal on GPIO 2, microphone
//!   output on GPIO 26 (ADC0)
//!
//! # Behaviour
//! - Drives forward while the path is clear, backs away below 15 cm
//! - Sweeps the servo between 0 and 180 degrees
//! - Colours the pixels from red (close) to green (far)
//! - Plays track 1 on start-up, skips to the next track on a loud noise
//!
//! # Build
//! ```bash
//! cargo build --release --features rp2350 --target thumbv8m.main-none-eabihf
//! ```

#![no_std]
#![no_main]

mod analog;
mod echo;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::gpio::{Flex, Pull};
use embassy_rp::{i2c, spi, uart};
use embassy_time::{Delay, Timer};
use microx_hal::board::{robotbit, servo_channel, ROBOTBIT_PIXELS};
use microx_hal::config::{MP3_BAUD_RATE, WS2812_SPI_FREQUENCY_HZ};
use microx_hal::sound::sound_level;
use microx_hal::{
    MotorPair, Mp3Player, PixelMatrix, PwmConfig, PwmDriver, Ranger, SensorModel, Ws2812Spi,
};
use {defmt_rtt as _, panic_probe as _};

use crate::analog::AdcInput;
use crate::echo::SonarPin;

/// Program metadata for picotool info command
///
/// This information is embedded in the binary and can be read by picotool
/// to display program information when querying the firmware.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"Robot Demo"),
    embassy_rp::binary_info::rp_program_description!(c"RP2350A driving a Robotbit-style add-on board"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Distance below which the robot backs away, in cm
const OBSTACLE_CM: u32 = 15;

/// Distance mapped to pure green, in cm
const FAR_CM: u32 = 60;

/// Sound level that skips the track
const LOUD_LEVEL: u16 = 700;

/// Motor duty when cruising
const CRUISE_SPEED: i32 = 2048;

/// Maps a distance to a red-to-green colour.
///
/// # Arguments
/// * `cm` - Measured distance, 0 meaning no echo
///
/// # Returns
/// `(r, g, b)` with red at 0 cm fading to green at 60 cm and beyond
fn distance_colour(cm: u32) -> (i32, i32, i32) {
    let near = cm.min(FAR_CM) as i32;
    let g = near * 255 / FAR_CM as i32;
    (255 - g, g, 0)
}

/// Main demo task
///
/// # Initialization Sequence
/// 1. Bring up I2C0, UART0 and SPI0
/// 2. Blank the pixels and start the MP3 player
/// 3. Loop: range, steer, sweep servo, update pixels
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("RP2350A Robot Demo Starting!");
    let p = embassy_rp::init(Default::default());

    let i2c = i2c::I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut pwm = PwmDriver::new(i2c, Delay, PwmConfig::default());
    if pwm.initialize().is_err() {
        warn!("PCA9685 not responding");
    }

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = MP3_BAUD_RATE;
    let serial = uart::Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let mut player = Mp3Player::new();
    player.attach(serial);
    player.set_volume(20).ok();
    player.play_file_by_number(1).ok();

    let mut spi_config = spi::Config::default();
    spi_config.frequency = WS2812_SPI_FREQUENCY_HZ;
    let spi = spi::Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let mut pixels =
        PixelMatrix::<_, { ROBOTBIT_PIXELS.rows }, { ROBOTBIT_PIXELS.columns }>::new(
            Ws2812Spi::new(spi),
        );
    pixels.init().ok();
    info!(
        "{} pixels (Robotbit layout, edge pin P{})",
        ROBOTBIT_PIXELS.rows * ROBOTBIT_PIXELS.columns,
        ROBOTBIT_PIXELS.pin
    );

    let mut sonar = SonarPin::new(Flex::new(p.PIN_2), 2);
    let mut ranger = Ranger::new(Delay);

    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let mut mic = AdcInput::new(adc, adc::Channel::new_pin(p.PIN_26, Pull::None));

    let (Some(left), Some(right)) = (
        MotorPair::from_index(robotbit::M1A),
        MotorPair::from_index(robotbit::M1B),
    ) else {
        error!("motor connector table out of range");
        return;
    };
    let servo = servo_channel(1).unwrap_or(8);

    info!("Robot ready!");

    let mut angle = 0.0f32;
    let mut step = 15.0f32;
    loop {
        let cm = ranger
            .distance(&mut sonar, SensorModel::POWERBRICK)
            .unwrap_or(0);

        if cm != 0 && cm < OBSTACLE_CM {
            info!("Obstacle at {} cm, reversing", cm);
            pwm.set_motor(left, -CRUISE_SPEED).ok();
            pwm.set_motor(right, -CRUISE_SPEED).ok();
        } else {
            pwm.set_motor(left, CRUISE_SPEED).ok();
            pwm.set_motor(right, CRUISE_SPEED).ok();
        }

        pwm.set_angle_servo(servo, angle).ok();
        angle += step;
        if !(0.0..=180.0).contains(&angle) {
            step = -step;
            angle += 2.0 * step;
        }

        if let Ok(level) = sound_level(&mut mic) {
            if level > LOUD_LEVEL {
                info!("Loud noise ({}), next track", level);
                player.next().ok();
            }
        }

        let (r, g, b) = distance_colour(cm);
        pixels.set_all(r, g, b);
        pixels.refresh().ok();

        Timer::after_millis(100).await;
    }
}
