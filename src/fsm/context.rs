//! Context threaded through every cook-state handler.
//!
//! Handlers never touch channels. The service fills the [`Inbox`] with
//! whatever the current state waits for, ticks the engine, then flushes the
//! outbox: a [`ControlCommand`] to forward and a request to clear the
//! completion signals.

use crate::channels::SensorSnapshot;
use crate::config::COOLDOWN_TEMP;
use crate::control::ControlCommand;
use crate::frame::{MEAT_NAME_LEN, StartFrame};

/// Inputs delivered to the handlers for one tick.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    /// Start frame taken from the cycle lane. Left in place by a handler
    /// that does not want it; the service then reports it as discarded.
    pub frame: Option<StartFrame>,
    /// `temp_ready` was taken this tick.
    pub temp_ready: bool,
    /// `humid_ready` was taken this tick.
    pub humid_ready: bool,
    /// Latest control-loop snapshot.
    pub snapshot: Option<SensorSnapshot>,
}

/// Parameters of the cycle in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleParams {
    pub meat_name: [u8; MEAT_NAME_LEN],
    pub target_temp: i16,
    pub target_humid: u8,
    pub time_of_smoking_secs: u16,
}

impl CycleParams {
    pub fn from_frame(frame: &StartFrame) -> Self {
        Self {
            meat_name: frame.meat_name,
            target_temp: frame.target_temperature,
            target_humid: frame.target_humidity,
            time_of_smoking_secs: frame.time_of_smoking_secs,
        }
    }
}

pub struct CookContext {
    /// Monotonic time of the current tick.
    pub now_ms: u64,
    pub inbox: Inbox,

    // -- Outbox --
    /// Command to forward to the control loop after this tick.
    pub command: Option<ControlCommand>,
    /// Both completion signals must be reset before the command is sent.
    pub clear_signals: bool,
    /// A confirmation closed the cycle this tick.
    pub cycle_completed: bool,

    // -- Cycle --
    pub cycle: Option<CycleParams>,
    pub cook_started_ms: u64,
    pub cook_duration_ms: u64,

    /// Cooldown ends at or below this temperature (tenths of °C).
    pub cooldown_temp: i16,
}

impl CookContext {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            inbox: Inbox::default(),
            command: None,
            clear_signals: false,
            cycle_completed: false,
            cycle: None,
            cook_started_ms: 0,
            cook_duration_ms: 0,
            cooldown_temp: COOLDOWN_TEMP,
        }
    }

    /// Queue `cmd` for the control loop. A later emit in the same tick wins.
    pub fn emit(&mut self, cmd: ControlCommand) {
        self.command = Some(cmd);
    }

    pub fn target_temp(&self) -> i16 {
        self.cycle.map_or(0, |c| c.target_temp)
    }

    pub fn target_humid(&self) -> u8 {
        self.cycle.map_or(0, |c| c.target_humid)
    }

    /// Milliseconds of cooking left, if the cook timer is running.
    pub fn cook_remaining_ms(&self) -> u64 {
        let elapsed = self.now_ms.saturating_sub(self.cook_started_ms);
        self.cook_duration_ms.saturating_sub(elapsed)
    }
}

impl Default for CookContext {
    fn default() -> Self {
        Self::new()
    }
}
