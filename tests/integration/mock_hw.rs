//! Mock adapters for integration tests.
//!
//! Records every actuator call, event and published state so tests can
//! assert on the full history without touching real GPIO/PWM registers.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use smokehouse::app::events::AppEvent;
use smokehouse::app::ports::{ActuatorPort, Clock, EventSink, StateSink};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Heater(u8),
    Valve(bool),
}

// ── MockActuators ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuators {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heater_duty(&self) -> u8 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Heater(duty) => Some(*duty),
                ActuatorCall::Valve(_) => None,
            })
            .unwrap_or(0)
    }

    pub fn valve_open(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Valve(open) => Some(*open),
                ActuatorCall::Heater(_) => None,
            })
            .unwrap_or(false)
    }
}

impl ActuatorPort for MockActuators {
    fn set_heater_duty(&mut self, duty: u8) {
        self.calls.push(ActuatorCall::Heater(duty));
    }

    fn set_water_valve(&mut self, open: bool) {
        self.calls.push(ActuatorCall::Valve(open));
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── RecordingStateSink ────────────────────────────────────────

/// Shared label log; clones see the same history, so one copy can move
/// into an egress task while the test keeps another.
#[derive(Clone, Default)]
pub struct RecordingStateSink {
    labels: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingStateSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.labels.lock().unwrap().last().cloned()
    }
}

impl StateSink for RecordingStateSink {
    fn publish(&mut self, label: &str) {
        self.labels.lock().unwrap().push(label.to_owned());
    }
}

// ── SimClock ──────────────────────────────────────────────────

/// Manually advanced clock.
#[derive(Default)]
pub struct SimClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
