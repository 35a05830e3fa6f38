//! Cook service: binds the state machine to the channel fabric.
//!
//! [`CookService`] owns the FSM and its context. Each iteration it reports
//! the current state (edge-triggered), fills the handler inbox from the
//! fabric, ticks the engine and flushes the outbox back onto the fabric.
//! Diagnostics go through the [`EventSink`] port passed at each call.
//!
//! ```text
//!  cycle lane ──▶ ┌────────────────────────┐ ──▶ commands
//!  temp_ready ──▶ │      CookService        │ ──▶ states ──▶ run_egress ──▶ StateSink
//! humid_ready ──▶ │  Fsm · CookContext      │ ──▶ EventSink
//!    snapshot ──▶ └────────────────────────┘
//! ```

use core::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::channels::Fabric;
use crate::config::CookConfig;
use crate::control::ControlCommand;
use crate::frame::{MEAT_NAME_LEN, meat_name_str};
use crate::fsm::context::CookContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{CookState, Fsm};

use super::events::AppEvent;
use super::ports::{Clock, EventSink, StateSink};

// ───────────────────────────────────────────────────────────────
// Status snapshot
// ───────────────────────────────────────────────────────────────

/// Point-in-time view of the cook cycle, suitable for a status topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookStatus {
    pub state: &'static str,
    pub meat: heapless::String<MEAT_NAME_LEN>,
    pub target_temp: i16,
    pub target_humid: u8,
    /// Seconds of cooking left; `None` outside `Cooking`.
    pub remaining_secs: Option<u32>,
}

// ───────────────────────────────────────────────────────────────
// CookService
// ───────────────────────────────────────────────────────────────

pub struct CookService<'f> {
    fabric: &'f Fabric,
    fsm: Fsm,
    ctx: CookContext,
    config: CookConfig,
}

impl<'f> CookService<'f> {
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(fabric: &'f Fabric, config: CookConfig) -> Self {
        Self {
            fabric,
            fsm: Fsm::new(build_state_table(), CookState::Idle),
            ctx: CookContext::new(),
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("CookService started in {}", self.fsm.current_state());
    }

    // ── Non-blocking drive ────────────────────────────────────

    /// One iteration without waiting: report, gather whatever is ready,
    /// tick. Returns the state after the tick.
    pub fn poll(&mut self, now_ms: u64, sink: &mut impl EventSink) -> CookState {
        self.report(sink);

        let state = self.fsm.current_state();
        if state.accepts_frames() {
            self.ctx.inbox.frame = self.fabric.cycle.try_receive().ok();
        }
        self.gather(state, sink);

        if let Some(cmd) = self.step(now_ms, sink) {
            self.try_forward(cmd, sink);
        }
        self.fsm.current_state()
    }

    // ── Async drive ───────────────────────────────────────────

    /// Cook task: blocks on the cycle lane in `Idle` and
    /// `WaitForConfirmation`, on the completion signal in `Heating` and
    /// `Humidifying`, and sleep-polls everywhere else.
    pub async fn run<C: Clock>(&mut self, clock: C, sink: &mut impl EventSink) {
        loop {
            self.report(sink);

            let state = self.fsm.current_state();
            match state {
                CookState::Idle | CookState::WaitForConfirmation => {
                    self.ctx.inbox.frame = Some(self.fabric.cycle.receive().await);
                }
                CookState::Heating => {
                    self.fabric.temp_ready.wait().await;
                    self.ctx.inbox.temp_ready = true;
                }
                CookState::Humidifying => {
                    self.fabric.humid_ready.wait().await;
                    self.ctx.inbox.humid_ready = true;
                }
                _ => {}
            }
            self.gather(state, sink);

            if let Some(cmd) = self.step(clock.now_ms(), sink) {
                self.fabric.commands.send(cmd).await;
            }

            let pause_ms = match state {
                CookState::Cooldown => self.config.cooldown_poll_ms,
                CookState::Error => self.config.error_idle_ms,
                _ => self.config.fsm_period_ms,
            };
            async_io_mini::Timer::after(Duration::from_millis(u64::from(pause_ms))).await;
        }
    }

    // ── Manual intervention ───────────────────────────────────

    /// Jump straight to `state`. The only way into or out of `Error`.
    pub fn force_state(&mut self, state: CookState, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        warn!("CookService: forcing {} -> {}", from, state);
        self.fsm.force_transition(state, &mut self.ctx);
        if let Some(cmd) = self.flush(from, sink) {
            self.try_forward(cmd, sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> CookState {
        self.fsm.current_state()
    }

    pub fn status(&self) -> CookStatus {
        let state = self.fsm.current_state();
        let (meat, target_temp, target_humid) = match self.ctx.cycle {
            Some(c) => (meat_name_str(&c.meat_name), c.target_temp, c.target_humid),
            None => (heapless::String::new(), 0, 0),
        };
        let remaining_secs = (state == CookState::Cooking)
            .then(|| self.ctx.cook_remaining_ms().div_ceil(1000) as u32);
        CookStatus {
            state: state.label(),
            meat,
            target_temp,
            target_humid,
            remaining_secs,
        }
    }

    /// [`status`](Self::status) as the JSON body of a status message.
    pub fn status_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.status())
    }

    // ── Internal ──────────────────────────────────────────────

    fn report(&mut self, sink: &mut impl EventSink) {
        if let Some(state) = self.fsm.take_report() {
            info!("state report: {}", state);
            if self.fabric.states.try_send(state).is_err() {
                warn!("state channel full, dropping {}", state);
                sink.emit(&AppEvent::StateReportDropped(state));
            }
        }
    }

    /// Fill the inbox with what `state` waits for. Frames that arrive while
    /// the machine is not waiting for one are drained and discarded.
    fn gather(&mut self, state: CookState, sink: &mut impl EventSink) {
        if !state.accepts_frames() {
            while self.fabric.cycle.try_receive().is_ok() {
                warn!("{}: discarding start frame", state);
                sink.emit(&AppEvent::StaleFrameDiscarded { state });
            }
        }
        match state {
            CookState::Heating => {
                self.ctx.inbox.temp_ready |= self.fabric.temp_ready.try_take().is_some();
            }
            CookState::Humidifying => {
                self.ctx.inbox.humid_ready |= self.fabric.humid_ready.try_take().is_some();
            }
            CookState::Cooldown => self.ctx.inbox.snapshot = self.fabric.snapshot.load(),
            _ => {}
        }
    }

    fn step(&mut self, now_ms: u64, sink: &mut impl EventSink) -> Option<ControlCommand> {
        let from = self.fsm.current_state();
        self.ctx.now_ms = now_ms;
        self.fsm.tick(&mut self.ctx);
        self.flush(from, sink)
    }

    /// Apply the outbox and return the command still to be forwarded.
    fn flush(&mut self, from: CookState, sink: &mut impl EventSink) -> Option<ControlCommand> {
        let to = self.fsm.current_state();

        if core::mem::take(&mut self.ctx.clear_signals) {
            self.fabric.temp_ready.reset();
            self.fabric.humid_ready.reset();
        }

        if let Some(frame) = self.ctx.inbox.frame.take() {
            warn!("{}: ignoring start frame (command {:#04x})", from, frame.command);
            sink.emit(&AppEvent::StaleFrameDiscarded { state: from });
        }

        if to != from {
            if from == CookState::Idle {
                if let Some(c) = self.ctx.cycle {
                    sink.emit(&AppEvent::CycleStarted {
                        meat: meat_name_str(&c.meat_name),
                        target_temp: c.target_temp,
                        target_humid: c.target_humid,
                        duration_secs: c.time_of_smoking_secs,
                    });
                }
            }
            if core::mem::take(&mut self.ctx.cycle_completed) {
                sink.emit(&AppEvent::CycleCompleted);
            }
            sink.emit(&AppEvent::StateChanged { from, to });
        }

        let cmd = self.ctx.command.take()?;
        sink.emit(&AppEvent::CommandIssued(cmd));
        Some(cmd)
    }

    fn try_forward(&self, cmd: ControlCommand, sink: &mut impl EventSink) {
        if self.fabric.commands.try_send(cmd).is_err() {
            warn!("command channel full, dropping {:?}", cmd);
            sink.emit(&AppEvent::CommandDropped(cmd));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Egress
// ───────────────────────────────────────────────────────────────

/// Egress task: forward every state report to the outbound transport.
pub async fn run_egress(fabric: &Fabric, sink: &mut impl StateSink) {
    loop {
        let state = fabric.states.receive().await;
        sink.publish(state.label());
    }
}

/// Non-blocking egress: publish everything queued. Returns the count.
pub fn drain_egress(fabric: &Fabric, sink: &mut impl StateSink) -> usize {
    let mut published = 0;
    while let Ok(state) = fabric.states.try_receive() {
        sink.publish(state.label());
        published += 1;
    }
    published
}
