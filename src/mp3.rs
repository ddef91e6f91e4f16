// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Serial MP3 player framing.
//!
//! The module listens on a 9600 baud UART for frames of the form
//!
//! ```text
//! [0x7E][len][cmd][payload ...][sum][0xEF]
//!   len = payload.len() + 3
//!   sum = (0x7E + len + cmd + payload bytes) mod 256
//! ```
//!
//! Payloads longer than 250 bytes are never sent.
//!
//! # Examples
//!
//! ```ignore
//! let mut player = Mp3Player::new();
//! player.attach(uart);
//! player.set_volume(20)?;
//! player.play_file_by_number(3)?;
//! ```

use embedded_io::Write;

use crate::command::Mp3Command;
use crate::config::{
    MP3_END_BYTE, MP3_FRAME_OVERHEAD, MP3_MAX_FRAME, MP3_MAX_PAYLOAD, MP3_MAX_VOLUME,
    MP3_START_BYTE,
};

/// Encodes one frame into `out`.
///
/// Returns the frame length, or `None` if the payload is longer than 250
/// bytes or `out` is too small.
pub fn encode_frame<I>(command: u8, payload: I, out: &mut [u8]) -> Option<usize>
where
    I: ExactSizeIterator<Item = u8>,
{
    let len = payload.len();
    if len > MP3_MAX_PAYLOAD || out.len() < len + MP3_FRAME_OVERHEAD {
        return None;
    }
    let length = (len + 3) as u8;
    let mut sum = MP3_START_BYTE
        .wrapping_add(length)
        .wrapping_add(command);
    out[0] = MP3_START_BYTE;
    out[1] = length;
    out[2] = command;
    for (slot, byte) in out[3..3 + len].iter_mut().zip(payload) {
        *slot = byte;
        sum = sum.wrapping_add(byte);
    }
    out[len + 3] = sum;
    out[len + 4] = MP3_END_BYTE;
    Some(len + MP3_FRAME_OVERHEAD)
}

/// Serial MP3 player.
///
/// Starts detached; nothing is transmitted until a UART configured for
/// 9600 baud is handed over with [`attach`](Self::attach).
pub struct Mp3Player<W> {
    serial: Option<W>,
}

impl<W: Write> Mp3Player<W> {
    /// Creates a detached player.
    pub fn new() -> Self {
        Self { serial: None }
    }

    /// Attaches the UART the module listens on. Later calls are ignored.
    pub fn attach(&mut self, serial: W) {
        if self.serial.is_none() {
            self.serial = Some(serial);
        }
    }

    /// Returns `true` once a UART is attached.
    pub fn is_attached(&self) -> bool {
        self.serial.is_some()
    }

    /// Sends `command` with a binary payload.
    ///
    /// Dropped without error if the player is detached or the payload is
    /// longer than 250 bytes.
    ///
    /// # Arguments
    ///
    /// * `command` - Command byte, see [`Mp3Command`]
    /// * `payload` - Up to 250 bytes
    ///
    /// # Returns
    ///
    /// The UART's write error, if the frame was sent and failed.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// player.send_command(Mp3Command::SetVolume.code(), &[20])?;
    /// ```
    pub fn send_command(&mut self, command: u8, payload: &[u8]) -> Result<(), W::Error> {
        self.send(command, payload.iter().copied())
    }

    /// Sends `command` with `text` as payload, one byte per character.
    ///
    /// Non-ASCII characters are not supported by the module; their UTF-8
    /// bytes are sent as is.
    pub fn send_string(&mut self, command: u8, text: &str) -> Result<(), W::Error> {
        self.send(command, text.bytes())
    }

    fn send<I>(&mut self, command: u8, payload: I) -> Result<(), W::Error>
    where
        I: ExactSizeIterator<Item = u8>,
    {
        let Some(serial) = self.serial.as_mut() else {
            warn!("MP3 player not attached, dropping command {:#x}", command);
            return Ok(());
        };
        let mut frame = [0u8; MP3_MAX_FRAME];
        let Some(len) = encode_frame(command, payload, &mut frame) else {
            warn!("MP3 payload too long, dropping command {:#x}", command);
            return Ok(());
        };
        trace!("MP3 frame {:#x}, {} bytes", command, len);
        serial.write_all(&frame[..len])
    }

    /// Issues a raw transport action code.
    ///
    /// # Arguments
    ///
    /// * `code` - One of:
    ///   - `0xAA`: play
    ///   - `0xAB`: stop
    ///   - `0xAC`: next
    ///   - `0xAD`: prev
    ///   - anything else: ignored
    pub fn control(&mut self, code: u8) -> Result<(), W::Error> {
        match Mp3Command::from_code(code) {
            Some(command) if command.is_transport() => self.send_command(code, &[]),
            _ => Ok(()),
        }
    }

    /// Starts playback.
    pub fn play(&mut self) -> Result<(), W::Error> {
        self.send_command(Mp3Command::Play.code(), &[])
    }

    /// Stops playback.
    pub fn stop(&mut self) -> Result<(), W::Error> {
        self.send_command(Mp3Command::Stop.code(), &[])
    }

    /// Skips to the next track.
    pub fn next(&mut self) -> Result<(), W::Error> {
        self.send_command(Mp3Command::Next.code(), &[])
    }

    /// Returns to the previous track.
    pub fn prev(&mut self) -> Result<(), W::Error> {
        self.send_command(Mp3Command::Prev.code(), &[])
    }

    /// Sets the volume, clamped to 0..=31.
    pub fn set_volume(&mut self, volume: i32) -> Result<(), W::Error> {
        let volume = volume.clamp(0, MP3_MAX_VOLUME as i32) as u8;
        self.send_command(Mp3Command::SetVolume.code(), &[volume])
    }

    /// Plays file number `number`, clamped to 1..=255.
    ///
    /// The payload is `[0, number]`.
    pub fn play_file_by_number(&mut self, number: i32) -> Result<(), W::Error> {
        let number = number.clamp(1, u8::MAX as i32) as u8;
        self.send_command(Mp3Command::PlayIndex.code(), &[0, number])
    }

    /// Plays the file called `name`. Empty names are ignored.
    pub fn play_file_by_name(&mut self, name: &str) -> Result<(), W::Error> {
        if name.is_empty() {
            return Ok(());
        }
        self.send_string(Mp3Command::PlayName.code(), name)
    }

    /// Detaches and returns the UART.
    pub fn release(self) -> Option<W> {
        self.serial
    }
}

impl<W: Write> Default for Mp3Player<W> {
    fn default() -> Self {
        Self::new()
    }
}
