//! Outbound diagnostic events.
//!
//! The ingress path and the [`CookService`](super::service::CookService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: log to serial,
//! publish on a diagnostics topic, record in a test.

use crate::control::ControlCommand;
use crate::error::DecodeError;
use crate::frame::MEAT_NAME_LEN;
use crate::fsm::CookState;

/// Which frame lane an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Start,
    Update,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(CookState),

    /// The state machine transitioned between states.
    StateChanged { from: CookState, to: CookState },

    /// A new cook cycle was accepted.
    CycleStarted {
        meat: heapless::String<MEAT_NAME_LEN>,
        target_temp: i16,
        target_humid: u8,
        duration_secs: u16,
    },

    /// Removal was confirmed; the machine is back in Idle.
    CycleCompleted,

    /// A control command was queued for the control loop.
    CommandIssued(ControlCommand),

    /// The command channel was full; the command was not delivered.
    CommandDropped(ControlCommand),

    /// The state channel was full; the report was not delivered.
    StateReportDropped(CookState),

    /// An inbound buffer failed to decode.
    FrameRejected(DecodeError),

    /// A valid frame found its lane full.
    FrameDropped(FrameKind),

    /// A start frame arrived while the machine was not waiting for one.
    StaleFrameDiscarded { state: CookState },
}
