//! Log-based sink adapters.
//!
//! [`LogEventSink`] writes structured application events to the logger
//! (UART / USB-CDC in production). [`LogStateSink`] stands in for the
//! outbound transport when none is attached. A future MQTT adapter would
//! implement the same traits.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, StateSink};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::CycleStarted {
                meat,
                target_temp,
                target_humid,
                duration_secs,
            } => {
                info!(
                    "CYCLE | start '{}' | T={:.1}\u{00b0}C | H={}% | {}s",
                    meat,
                    f32::from(*target_temp) / 10.0,
                    target_humid,
                    duration_secs
                );
            }
            AppEvent::CycleCompleted => {
                info!("CYCLE | removal confirmed");
            }
            AppEvent::CommandIssued(cmd) => {
                info!(
                    "CMD   | temp={:?} humid={:?} target={}/{}%",
                    cmd.temp_mode, cmd.humid_mode, cmd.target_temp, cmd.target_humid
                );
            }
            AppEvent::CommandDropped(cmd) => {
                warn!("CMD   | dropped {:?}", cmd);
            }
            AppEvent::StateReportDropped(state) => {
                warn!("STATE | report dropped: {}", state);
            }
            AppEvent::FrameRejected(e) => {
                warn!("FRAME | rejected: {}", e);
            }
            AppEvent::FrameDropped(kind) => {
                warn!("FRAME | {:?} lane full, dropped", kind);
            }
            AppEvent::StaleFrameDiscarded { state } => {
                info!("FRAME | start frame ignored in {}", state);
            }
        }
    }
}

/// Publishes state labels to the log under a fixed topic.
#[derive(Debug)]
pub struct LogStateSink {
    topic: &'static str,
}

impl LogStateSink {
    pub fn new(topic: &'static str) -> Self {
        Self { topic }
    }
}

impl StateSink for LogStateSink {
    fn publish(&mut self, label: &str) {
        info!("PUB   | {} <- {}", self.topic, label);
    }
}
