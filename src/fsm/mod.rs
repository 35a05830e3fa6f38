//! Function-pointer finite state machine engine for the cook cycle.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌─────────────────────┬──────────┬─────────┬───────────────────┐│
//! │  │ CookState           │ on_enter │ on_exit │ on_update         ││
//! │  ├─────────────────────┼──────────┼─────────┼───────────────────┤│
//! │  │ Idle                │ fn(ctx)  │ fn(ctx) │ fn(ctx)->Option<> ││
//! │  │ Heating             │ fn(ctx)  │   :    │ fn(ctx)->Option<> ││
//! │  │ ...                 │          │         │                   ││
//! │  │ Error               │ fn(ctx)  │   :    │ fn(ctx)->Option<> ││
//! │  └─────────────────────┴──────────┴─────────┴───────────────────┘│
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state. If it
//! returns `Some(next)`, the engine runs `on_exit` for the current state,
//! then `on_enter` for the next. At most one transition happens per tick,
//! so pass-through states are still observed and reported.
//!
//! State reporting is edge-triggered: [`Fsm::take_report`] yields the
//! current state once per change.

pub mod context;
pub mod states;

use context::CookContext;
use log::info;
use serde::Serialize;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every stage of the cook cycle.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum CookState {
    Idle = 0,
    Heating = 1,
    Humidifying = 2,
    Cooking = 3,
    FinishedCooking = 4,
    Cooldown = 5,
    ReadyToTakeOut = 6,
    WaitForConfirmation = 7,
    Error = 8,
}

impl CookState {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 9;

    /// Convert an index back to `CookState`. Out-of-range maps to `Error`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Heating,
            2 => Self::Humidifying,
            3 => Self::Cooking,
            4 => Self::FinishedCooking,
            5 => Self::Cooldown,
            6 => Self::ReadyToTakeOut,
            7 => Self::WaitForConfirmation,
            8 => Self::Error,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Error
            }
        }
    }

    /// Label published on the state topic.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Heating => "HEATING",
            Self::Humidifying => "HUMIDIFYING",
            Self::Cooking => "COOKING",
            Self::FinishedCooking => "FINISHED_COOKING",
            Self::Cooldown => "COOLDOWN",
            Self::ReadyToTakeOut => "READY_TO_TAKE_OUT",
            Self::WaitForConfirmation => "WAIT_FOR_TAKE_OUT_CONFIRMATION",
            Self::Error => "ERROR",
        }
    }

    /// States that block on the cycle lane.
    pub const fn accepts_frames(self) -> bool {
        matches!(self, Self::Idle | Self::WaitForConfirmation)
    }
}

impl core::fmt::Display for CookState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut CookContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut CookContext) -> Option<CookState>;

/// Static descriptor for a single state. Stored in a fixed-size array.
pub struct StateDescriptor {
    pub id: CookState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `CookState as usize`.
    table: [StateDescriptor; CookState::COUNT],
    current: usize,
    /// Last state handed out by `take_report`.
    reported: Option<CookState>,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; CookState::COUNT], initial: CookState) -> Self {
        Self {
            table,
            current: initial as usize,
            reported: None,
        }
    }

    /// Run the initial `on_enter`. Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut CookContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Call `on_update` for the current state and apply its transition.
    pub fn tick(&mut self, ctx: &mut CookContext) {
        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    /// Jump to `next` regardless of what `on_update` would return.
    pub fn force_transition(&mut self, next: CookState, ctx: &mut CookContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> CookState {
        self.table[self.current].id
    }

    /// The current state, once per change.
    pub fn take_report(&mut self) -> Option<CookState> {
        let current = self.current_state();
        if self.reported == Some(current) {
            return None;
        }
        self.reported = Some(current);
        Some(current)
    }

    fn transition(&mut self, next: CookState, ctx: &mut CookContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::context::CookContext;
    use super::*;
    use crate::channels::SensorSnapshot;
    use crate::control::{ControlCommand, HumidMode, TempMode};
    use crate::frame::{DoorStatus, StartFrame};

    fn make_fsm() -> (Fsm, CookContext) {
        let mut fsm = Fsm::new(states::build_state_table(), CookState::Idle);
        let mut ctx = CookContext::new();
        fsm.start(&mut ctx);
        (fsm, ctx)
    }

    fn start_frame(command: u8) -> StartFrame {
        StartFrame {
            command,
            meat_name: StartFrame::name_field("Ribs"),
            target_humidity: 80,
            target_temperature: 650,
            current_humidity: 10,
            current_temperature: 200,
            door_status: DoorStatus::Closed,
            time_of_smoking_secs: 10,
        }
    }

    /// Drive a fresh machine into `Cooking` at `now_ms`.
    fn to_cooking(now_ms: u64) -> (Fsm, CookContext) {
        let (mut fsm, mut ctx) = make_fsm();
        ctx.inbox.frame = Some(start_frame(1));
        fsm.tick(&mut ctx);
        ctx.inbox.temp_ready = true;
        fsm.tick(&mut ctx);
        ctx.now_ms = now_ms;
        ctx.inbox.humid_ready = true;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooking);
        (fsm, ctx)
    }

    #[test]
    fn table_rows_match_their_index() {
        for (i, row) in states::build_state_table().iter().enumerate() {
            assert_eq!(row.id as usize, i, "row {} is {:?}", i, row.id);
        }
    }

    #[test]
    fn idle_waits_for_frame() {
        let (mut fsm, mut ctx) = make_fsm();
        for _ in 0..5 {
            fsm.tick(&mut ctx);
        }
        assert_eq!(fsm.current_state(), CookState::Idle);
        assert!(ctx.command.is_none());
    }

    #[test]
    fn start_frame_enters_heating_with_targets() {
        let (mut fsm, mut ctx) = make_fsm();
        ctx.inbox.frame = Some(start_frame(1));
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Heating);
        assert!(ctx.inbox.frame.is_none());
        assert!(ctx.clear_signals);
        assert_eq!(
            ctx.command,
            Some(ControlCommand::new(TempMode::Heating, HumidMode::Off, 650, 80))
        );
    }

    #[test]
    fn heating_and_humidifying_follow_signals() {
        let (mut fsm, mut ctx) = make_fsm();
        ctx.inbox.frame = Some(start_frame(1));
        fsm.tick(&mut ctx);

        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Heating);

        ctx.inbox.temp_ready = true;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Humidifying);
        assert!(!ctx.inbox.temp_ready);
        assert_eq!(ctx.command.map(|c| c.humid_mode), Some(HumidMode::On));

        ctx.inbox.humid_ready = true;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooking);
        assert_eq!(ctx.command.map(|c| c.humid_mode), Some(HumidMode::Hold));
        assert_eq!(ctx.cook_duration_ms, 10_000);
    }

    #[test]
    fn cooking_ends_after_duration() {
        let (mut fsm, mut ctx) = to_cooking(5_000);
        ctx.now_ms = 14_999;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooking);
        assert_eq!(ctx.cook_remaining_ms(), 1);

        ctx.now_ms = 15_000;
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::FinishedCooking);
        assert_eq!(ctx.command.map(|c| c.temp_mode), Some(TempMode::Cooling));
    }

    #[test]
    fn finished_reissues_cooling_command() {
        let (mut fsm, mut ctx) = to_cooking(0);
        ctx.now_ms = 10_000;
        fsm.tick(&mut ctx);
        let first = ctx.command.take();
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooldown);
        assert_eq!(ctx.command, first);
    }

    #[test]
    fn cooldown_waits_for_snapshot_at_threshold() {
        let (mut fsm, mut ctx) = make_fsm();
        fsm.force_transition(CookState::Cooldown, &mut ctx);

        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooldown);

        ctx.inbox.snapshot = Some(SensorSnapshot {
            temperature: 401,
            humidity: 50,
        });
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Cooldown);

        ctx.inbox.snapshot = Some(SensorSnapshot {
            temperature: 400,
            humidity: 50,
        });
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::ReadyToTakeOut);
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::WaitForConfirmation);
    }

    #[test]
    fn only_confirmation_ends_the_cycle() {
        let (mut fsm, mut ctx) = make_fsm();
        fsm.force_transition(CookState::WaitForConfirmation, &mut ctx);

        ctx.inbox.frame = Some(start_frame(1));
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::WaitForConfirmation);
        assert!(ctx.inbox.frame.take().is_some(), "non-confirmation left for discard");

        ctx.inbox.frame = Some(start_frame(crate::config::CONFIRM_COMMAND));
        fsm.tick(&mut ctx);
        assert_eq!(fsm.current_state(), CookState::Idle);
        assert!(ctx.cycle_completed);
        assert!(ctx.cycle.is_none());
    }

    #[test]
    fn error_is_terminal() {
        let (mut fsm, mut ctx) = make_fsm();
        fsm.force_transition(CookState::Error, &mut ctx);
        assert_eq!(ctx.command, Some(ControlCommand::OFF));

        ctx.inbox.frame = Some(start_frame(crate::config::CONFIRM_COMMAND));
        ctx.inbox.temp_ready = true;
        ctx.inbox.humid_ready = true;
        for _ in 0..10 {
            fsm.tick(&mut ctx);
        }
        assert_eq!(fsm.current_state(), CookState::Error);
    }

    #[test]
    fn report_is_edge_triggered() {
        let (mut fsm, mut ctx) = to_cooking(0);
        assert_eq!(fsm.take_report(), Some(CookState::Cooking));
        for t in 1..20 {
            ctx.now_ms = t * 50;
            fsm.tick(&mut ctx);
            assert_eq!(fsm.take_report(), None);
        }
    }

    #[test]
    fn first_report_is_idle() {
        let (mut fsm, _ctx) = make_fsm();
        assert_eq!(fsm.take_report(), Some(CookState::Idle));
        assert_eq!(fsm.take_report(), None);
    }

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<&str> = (0..CookState::COUNT)
            .map(|i| CookState::from_index(i).label())
            .collect();
        for (i, a) in labels.iter().enumerate() {
            assert!(!labels[i + 1..].contains(a), "duplicate label {a}");
        }
        assert_eq!(CookState::WaitForConfirmation.label(), "WAIT_FOR_TAKE_OUT_CONFIRMATION");
    }

    #[test]
    fn state_from_index_roundtrip() {
        for i in 0..CookState::COUNT {
            assert_eq!(CookState::from_index(i) as usize, i);
        }
    }
}
