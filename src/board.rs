// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Channel and connector tables for each supported board.
//!
//! Every board exposes the same PCA9685 channels under its own names. The
//! tables below resolve those names to plain channel numbers or motor pair
//! indices at the call site, so two boards may name the same channel
//! differently without sharing a type.
//!
//! # Channel Layout
//!
//! ```text
//!  channel  0  1 | 2  3 | 4  5 | 6  7 | 8 ... 15
//!  pair     0    | 1    | 2    | 3    | servo S1 ... S8
//! ```

/// Kittenbot Robotbit motor connectors (pair indices).
pub mod robotbit {
    /// M1A connector
    pub const M1A: u8 = 0;
    /// M1B connector
    pub const M1B: u8 = 1;
    /// M2A connector
    pub const M2A: u8 = 2;
    /// M2B connector
    pub const M2B: u8 = 3;
}

/// Kittenbot Powerbrick motor connectors (pair indices).
pub mod powerbrick {
    /// M1 connector
    pub const M1: u8 = 0;
    /// M2 connector
    pub const M2: u8 = 1;
}

/// First PCA9685 channel wired to a servo connector
pub const FIRST_SERVO_CHANNEL: u8 = 8;

/// Number of servo connectors
pub const SERVO_CONNECTORS: u8 = 8;

/// Resolves servo connector `S1`..`S8` to its PCA9685 channel.
///
/// Returns `None` for connectors outside 1..=8.
pub fn servo_channel(connector: u8) -> Option<u8> {
    if (1..=SERVO_CONNECTORS).contains(&connector) {
        Some(connector + FIRST_SERVO_CHANNEL - 1)
    } else {
        None
    }
}

/// Physical description of an LED matrix wired to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatrixPreset {
    /// micro:bit edge pin carrying the pixel data line
    pub pin: u8,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
}

/// Robotbit onboard pixels: one row of four on P16
pub const ROBOTBIT_PIXELS: MatrixPreset = MatrixPreset {
    pin: 16,
    rows: 1,
    columns: 4,
};

/// Superbit onboard pixels: one row of four on P12
pub const SUPERBIT_PIXELS: MatrixPreset = MatrixPreset {
    pin: 12,
    rows: 1,
    columns: 4,
};

/// Yurobot remote onboard pixels: one row of six on P15
pub const YUROBOT_REMOTE_PIXELS: MatrixPreset = MatrixPreset {
    pin: 15,
    rows: 1,
    columns: 6,
};

/// Powerbrick 8x8 pixel module (serpentine wiring, pin chosen by the user)
pub const POWERBRICK_MATRIX_SIDE: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn servo_connectors_map_to_upper_channels() {
        assert_eq!(servo_channel(1), Some(8));
        assert_eq!(servo_channel(8), Some(15));
        assert_eq!(servo_channel(0), None);
        assert_eq!(servo_channel(9), None);
    }

    #[test]
    fn onboard_strips_are_single_rows() {
        for preset in [ROBOTBIT_PIXELS, SUPERBIT_PIXELS, YUROBOT_REMOTE_PIXELS] {
            assert_eq!(preset.rows, 1);
        }
        assert_eq!(ROBOTBIT_PIXELS.columns, SUPERBIT_PIXELS.columns);
        assert_ne!(ROBOTBIT_PIXELS.pin, SUPERBIT_PIXELS.pin);
        assert_eq!(YUROBOT_REMOTE_PIXELS.columns, 6);
    }

    #[test]
    fn preset_sizes_the_frame_buffer() {
        use crate::pixels::PixelBuffer;

        const ROWS: usize = YUROBOT_REMOTE_PIXELS.rows;
        const COLS: usize = YUROBOT_REMOTE_PIXELS.columns;
        let buffer = PixelBuffer::<ROWS, COLS>::new();
        assert_eq!(buffer.as_bytes().len(), 18);
    }

    #[test]
    fn board_names_alias_the_same_pairs() {
        assert_eq!(robotbit::M1A, powerbrick::M1);
        assert_eq!(robotbit::M1B, powerbrick::M2);
    }
}
