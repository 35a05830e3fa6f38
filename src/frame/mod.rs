//! Process frames: the validated form of inbound transport messages.
//!
//! Wire layout (little-endian multi-byte fields):
//! ```text
//! Start (type = 1), 41 bytes
//! ┌────┬─────┬──────────────┬─────┬───────┬─────┬───────┬──────┬───────┐
//! │type│ cmd │ meat name 30 │ tgtH│ tgtT  │ curH│ curT  │ door │ secs  │
//! │ 0  │  1  │    2..=31    │ 32  │ 33-34 │ 35  │ 36-37 │  38  │ 39-40 │
//! └────┴─────┴──────────────┴─────┴───────┴─────┴───────┴──────┴───────┘
//!
//! Update (type = 2), 5 bytes
//! ┌────┬─────┬───────┬──────┐
//! │type│ curH│ curT  │ door │
//! │ 0  │  1  │  2-3  │  4   │
//! └────┴─────┴───────┴──────┘
//! ```
//!
//! Temperatures are signed tenths of °C, humidity is percent.

pub mod codec;

pub use codec::{decode, encode_start, encode_update};

use crate::config::CONFIRM_COMMAND;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Frame-type discriminator of a Start frame.
pub const START_TYPE: u8 = 1;
/// Frame-type discriminator of an Update frame.
pub const UPDATE_TYPE: u8 = 2;

/// Fixed width of the meat-name field.
pub const MEAT_NAME_LEN: usize = 30;

pub(crate) const START_COMMAND: usize = 1;
pub(crate) const START_MEAT_NAME: usize = START_COMMAND + 1;
pub(crate) const START_TARGET_HUMIDITY: usize = START_MEAT_NAME + MEAT_NAME_LEN;
pub(crate) const START_TARGET_TEMPERATURE: usize = START_TARGET_HUMIDITY + 1;
pub(crate) const START_CURRENT_HUMIDITY: usize = START_TARGET_TEMPERATURE + 2;
pub(crate) const START_CURRENT_TEMPERATURE: usize = START_CURRENT_HUMIDITY + 1;
pub(crate) const START_DOOR_STATUS: usize = START_CURRENT_TEMPERATURE + 2;
pub(crate) const START_TIME_OF_SMOKING: usize = START_DOOR_STATUS + 1;

/// Total length of a Start frame (41 bytes).
pub const START_FRAME_LEN: usize = START_TIME_OF_SMOKING + 2;

pub(crate) const UPDATE_CURRENT_HUMIDITY: usize = 1;
pub(crate) const UPDATE_CURRENT_TEMPERATURE: usize = UPDATE_CURRENT_HUMIDITY + 1;
pub(crate) const UPDATE_DOOR_STATUS: usize = UPDATE_CURRENT_TEMPERATURE + 2;

/// Total length of an Update frame (5 bytes).
pub const UPDATE_FRAME_LEN: usize = UPDATE_DOOR_STATUS + 1;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Chamber door position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DoorStatus {
    Closed = 0,
    Open = 1,
}

impl DoorStatus {
    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Closed),
            1 => Some(Self::Open),
            _ => None,
        }
    }

    pub const fn to_wire(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// A new cook request (or, with [`CONFIRM_COMMAND`], a removal confirmation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartFrame {
    pub command: u8,
    /// ASCII, NUL padded; not necessarily terminated.
    pub meat_name: [u8; MEAT_NAME_LEN],
    pub target_humidity: u8,
    pub target_temperature: i16,
    pub current_humidity: u8,
    pub current_temperature: i16,
    pub door_status: DoorStatus,
    pub time_of_smoking_secs: u16,
}

impl StartFrame {
    /// Build a name field from `name`, truncated to 30 bytes and NUL padded.
    pub fn name_field(name: &str) -> [u8; MEAT_NAME_LEN] {
        let mut field = [0u8; MEAT_NAME_LEN];
        let bytes = name.as_bytes();
        let n = bytes.len().min(MEAT_NAME_LEN);
        field[..n].copy_from_slice(&bytes[..n]);
        field
    }

    /// Replace the meat name, truncated to 30 bytes and NUL padded.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.meat_name = Self::name_field(name);
        self
    }

    /// Meat name up to the first NUL, non-ASCII bytes replaced by `?`.
    pub fn meat_name_str(&self) -> heapless::String<MEAT_NAME_LEN> {
        meat_name_str(&self.meat_name)
    }

    pub fn is_confirmation(&self) -> bool {
        self.command == CONFIRM_COMMAND
    }
}

/// Printable form of a raw name field: up to the first NUL, non-ASCII
/// bytes replaced by `?`.
pub fn meat_name_str(field: &[u8; MEAT_NAME_LEN]) -> heapless::String<MEAT_NAME_LEN> {
    let mut out = heapless::String::new();
    for &b in field.iter().take_while(|&&b| b != 0) {
        let c = if b.is_ascii_graphic() || b == b' ' {
            b as char
        } else {
            '?'
        };
        // Capacity equals the field width, so this cannot overflow.
        let _ = out.push(c);
    }
    out
}

/// A periodic sensor report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateFrame {
    pub current_humidity: u8,
    pub current_temperature: i16,
    pub door_status: DoorStatus,
}

/// A decoded and validated inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessFrame {
    Start(StartFrame),
    Update(UpdateFrame),
}
