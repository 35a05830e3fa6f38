//! Inter-task channel fabric.
//!
//! Uses `embassy-sync` bounded MPMC channels and single-slot signals to
//! connect the ingress decoder, the control loop, the cook state machine and
//! the state egress task. The [`Fabric`] is owned by the caller and lent to
//! every unit, so tests can build as many independent fabrics as they like.
//!
//! ```text
//!            StartFrame  ┌──────────────┐ ControlCommand ┌─────────────┐
//!  ┌───────┐ ──cycle───▶ │  Cook FSM    │ ──commands───▶ │ ControlLoop │
//!  │Ingress│             │              │ ◀─temp_ready── │             │
//!  └───────┘ ──sensor──┐ │              │ ◀─humid_ready─ │             │
//!            UpdateFrame └──────────────┘                └─────────────┘
//!                      │        │ CookState   ▲   snapshot   │
//!                      │        ▼             └──────────────┤
//!                      │   ┌────────┐                        │
//!                      │   │ Egress │                        │
//!                      │   └────────┘                        │
//!                      └─────────────────────────────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::control::ControlCommand;
use crate::frame::{StartFrame, UpdateFrame};
use crate::fsm::CookState;

/// Depth of the Start-frame lane (ingress → state machine).
pub const CYCLE_LANE_DEPTH: usize = 4;

/// Depth of the Update-frame lane (ingress → control loop).
pub const SENSOR_LANE_DEPTH: usize = 8;

/// Depth of the command channel (state machine → control loop).
pub const COMMAND_DEPTH: usize = 4;

/// Depth of the state report channel (state machine → egress).
pub const STATE_DEPTH: usize = 16;

pub type CycleLane = Channel<CriticalSectionRawMutex, StartFrame, CYCLE_LANE_DEPTH>;
pub type SensorLane = Channel<CriticalSectionRawMutex, UpdateFrame, SENSOR_LANE_DEPTH>;
pub type CommandChannel = Channel<CriticalSectionRawMutex, ControlCommand, COMMAND_DEPTH>;
pub type StateChannel = Channel<CriticalSectionRawMutex, CookState, STATE_DEPTH>;

/// Single-slot completion signal. Raising twice before a take leaves one
/// pending raise.
pub type ReadySignal = Signal<CriticalSectionRawMutex, ()>;

// ---------------------------------------------------------------------------
// SensorCell
// ---------------------------------------------------------------------------

/// Last sensor pair seen by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Tenths of °C.
    pub temperature: i16,
    /// Percent.
    pub humidity: u8,
}

const VALID_BIT: u32 = 1 << 24;

/// Lock-free single-writer snapshot cell.
///
/// Layout of the packed word: bits 0..16 temperature, 16..24 humidity,
/// bit 24 set once the first reading has been stored.
pub struct SensorCell(AtomicU32);

impl SensorCell {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn store(&self, snapshot: SensorSnapshot) {
        let word = u32::from(snapshot.temperature as u16)
            | (u32::from(snapshot.humidity) << 16)
            | VALID_BIT;
        self.0.store(word, Ordering::Release);
    }

    /// `None` until the first reading has been stored.
    pub fn load(&self) -> Option<SensorSnapshot> {
        let word = self.0.load(Ordering::Acquire);
        if word & VALID_BIT == 0 {
            return None;
        }
        Some(SensorSnapshot {
            temperature: (word & 0xFFFF) as u16 as i16,
            humidity: ((word >> 16) & 0xFF) as u8,
        })
    }
}

impl Default for SensorCell {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Fabric
// ---------------------------------------------------------------------------

/// Every channel, signal and shared cell of one controller instance.
pub struct Fabric {
    /// Start frames for the state machine.
    pub cycle: CycleLane,
    /// Update frames for the control loop.
    pub sensor: SensorLane,
    pub commands: CommandChannel,
    pub states: StateChannel,
    pub temp_ready: ReadySignal,
    pub humid_ready: ReadySignal,
    pub snapshot: SensorCell,
}

impl Fabric {
    pub const fn new() -> Self {
        Self {
            cycle: Channel::new(),
            sensor: Channel::new(),
            commands: Channel::new(),
            states: Channel::new(),
            temp_ready: Signal::new(),
            humid_ready: Signal::new(),
            snapshot: SensorCell::new(),
        }
    }
}

impl Default for Fabric {
    fn default() -> Self {
        Self::new()
    }
}
