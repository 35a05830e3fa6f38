//! Frame rejection reasons.
//!
//! All variants are `Copy` so a rejection can be handed to the diagnostic
//! sink and logged without allocation.  Range failures accumulate in a
//! [`FieldSet`] bitfield so every offending field is reported at once.

use core::fmt;

// ---------------------------------------------------------------------------
// Validated fields
// ---------------------------------------------------------------------------

/// A range-checked frame field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Field {
    TargetHumidity = 0b0000_0001,
    TargetTemperature = 0b0000_0010,
    CurrentHumidity = 0b0000_0100,
    CurrentTemperature = 0b0000_1000,
    DoorStatus = 0b0001_0000,
    TimeOfSmoking = 0b0010_0000,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Self::TargetHumidity,
        Self::TargetTemperature,
        Self::CurrentHumidity,
        Self::CurrentTemperature,
        Self::DoorStatus,
        Self::TimeOfSmoking,
    ];

    /// Return the bitmask for this field.
    pub const fn mask(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TargetHumidity => "target_humidity",
            Self::TargetTemperature => "target_temperature",
            Self::CurrentHumidity => "current_humidity",
            Self::CurrentTemperature => "current_temperature",
            Self::DoorStatus => "door_status",
            Self::TimeOfSmoking => "time_of_smoking",
        }
    }
}

/// Set of fields that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, field: Field) {
        self.0 |= field.mask();
    }

    pub const fn contains(self, field: Field) -> bool {
        self.0 & field.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(field.name())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Why an inbound byte buffer did not become a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length delivery.
    Empty,
    /// First byte is neither Start nor Update.
    UnknownType(u8),
    /// Buffer shorter than the frame type's fixed layout.
    Truncated { expected: usize, actual: usize },
    /// One or more fields outside their allowed range.
    OutOfRange(FieldSet),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::UnknownType(t) => write!(f, "unknown frame type {t}"),
            Self::Truncated { expected, actual } => {
                write!(f, "truncated frame ({actual} of {expected} bytes)")
            }
            Self::OutOfRange(fields) => write!(f, "out of range: {fields}"),
        }
    }
}
