// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Command codes understood by the Powerbrick serial MP3 module.
//!
//! # Command Codes
//!
//! ```text
//!   Transport:  0xAA play   0xAB stop   0xAC next   0xAD prev
//!   Settings:   0xAE volume [0..=31]
//!   Files:      0xA2 play by number [0, n]   0xA3 play by name "..."
//! ```
//!
//! Only the four transport commands may be issued through the raw
//! "control" entry point; the others carry a payload and have dedicated
//! senders.

/// MP3 module command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mp3Command {
    /// Start or resume playback
    Play,
    /// Stop playback
    Stop,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Prev,
    /// Set output volume
    SetVolume,
    /// Play a file by its 1-based index
    PlayIndex,
    /// Play a file by name
    PlayName,
}

impl Mp3Command {
    /// Maps a command byte to a command.
    ///
    /// Returns `None` for bytes the module does not understand.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0xAA => Some(Mp3Command::Play),
            0xAB => Some(Mp3Command::Stop),
            0xAC => Some(Mp3Command::Next),
            0xAD => Some(Mp3Command::Prev),
            0xAE => Some(Mp3Command::SetVolume),
            0xA2 => Some(Mp3Command::PlayIndex),
            0xA3 => Some(Mp3Command::PlayName),
            _ => None,
        }
    }

    /// Command byte sent on the wire.
    pub fn code(&self) -> u8 {
        match self {
            Mp3Command::Play => 0xAA,
            Mp3Command::Stop => 0xAB,
            Mp3Command::Next => 0xAC,
            Mp3Command::Prev => 0xAD,
            Mp3Command::SetVolume => 0xAE,
            Mp3Command::PlayIndex => 0xA2,
            Mp3Command::PlayName => 0xA3,
        }
    }

    /// Returns `true` for play, stop, next and prev.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Mp3Command::Play | Mp3Command::Stop | Mp3Command::Next | Mp3Command::Prev
        )
    }
}
