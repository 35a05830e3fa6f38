//! Concrete cook-state handler functions and table builder.
//!
//! Commands are issued from `on_enter`, so every transition emits exactly
//! one [`ControlCommand`] even when it repeats the one already in effect.
//!
//! ```text
//!  IDLE ──[start frame]──▶ HEATING ──[temp_ready]──▶ HUMIDIFYING
//!    ▲                                                    │
//!    │                                              [humid_ready]
//!    │                                                    ▼
//!  WAIT_FOR_TAKE_OUT_CONFIRMATION                      COOKING
//!    ▲              │                                     │
//!    │        [0xAA frame]──▶ IDLE              [duration elapsed]
//!    │                                                    ▼
//!  READY_TO_TAKE_OUT ◀──[≤ 40.0 °C]── COOLDOWN ◀── FINISHED_COOKING
//!
//!  ERROR: entered and left only by manual intervention.
//! ```

use super::context::{CookContext, CycleParams};
use super::{CookState, StateDescriptor};
use crate::control::{ControlCommand, HumidMode, TempMode};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; CookState::COUNT] {
    [
        StateDescriptor {
            id: CookState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: Some(idle_exit),
            on_update: idle_update,
        },
        StateDescriptor {
            id: CookState::Heating,
            name: "Heating",
            on_enter: Some(heating_enter),
            on_exit: None,
            on_update: heating_update,
        },
        StateDescriptor {
            id: CookState::Humidifying,
            name: "Humidifying",
            on_enter: Some(humidifying_enter),
            on_exit: None,
            on_update: humidifying_update,
        },
        StateDescriptor {
            id: CookState::Cooking,
            name: "Cooking",
            on_enter: Some(cooking_enter),
            on_exit: None,
            on_update: cooking_update,
        },
        StateDescriptor {
            id: CookState::FinishedCooking,
            name: "FinishedCooking",
            on_enter: Some(cooling_off),
            on_exit: None,
            on_update: finished_update,
        },
        StateDescriptor {
            id: CookState::Cooldown,
            name: "Cooldown",
            on_enter: Some(cooling_off),
            on_exit: None,
            on_update: cooldown_update,
        },
        StateDescriptor {
            id: CookState::ReadyToTakeOut,
            name: "ReadyToTakeOut",
            on_enter: Some(ready_enter),
            on_exit: None,
            on_update: ready_update,
        },
        StateDescriptor {
            id: CookState::WaitForConfirmation,
            name: "WaitForConfirmation",
            on_enter: None,
            on_exit: None,
            on_update: wait_update,
        },
        StateDescriptor {
            id: CookState::Error,
            name: "Error",
            on_enter: Some(error_enter),
            on_exit: None,
            on_update: error_update,
        },
    ]
}

fn command(ctx: &CookContext, temp: TempMode, humid: HumidMode) -> ControlCommand {
    ControlCommand::new(temp, humid, ctx.target_temp(), ctx.target_humid())
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: waiting for a start frame
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut CookContext) {
    ctx.cycle = None;
    ctx.cook_started_ms = 0;
    ctx.cook_duration_ms = 0;
}

fn idle_update(ctx: &mut CookContext) -> Option<CookState> {
    let frame = ctx.inbox.frame.take()?;
    let params = CycleParams::from_frame(&frame);
    info!(
        "IDLE: start '{}' target {} / {}% for {}s",
        frame.meat_name_str(),
        params.target_temp,
        params.target_humid,
        params.time_of_smoking_secs
    );
    ctx.cycle = Some(params);
    Some(CookState::Heating)
}

fn idle_exit(ctx: &mut CookContext) {
    // Raises left over from the previous cycle must not skip a stage.
    ctx.clear_signals = true;
}

// ═══════════════════════════════════════════════════════════════════════════
//  HEATING: heater regulating up to target
// ═══════════════════════════════════════════════════════════════════════════

fn heating_enter(ctx: &mut CookContext) {
    ctx.emit(command(ctx, TempMode::Heating, HumidMode::Off));
}

fn heating_update(ctx: &mut CookContext) -> Option<CookState> {
    if core::mem::take(&mut ctx.inbox.temp_ready) {
        info!("HEATING: target temperature reached");
        return Some(CookState::Humidifying);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HUMIDIFYING: holding temperature, filling humidity
// ═══════════════════════════════════════════════════════════════════════════

fn humidifying_enter(ctx: &mut CookContext) {
    ctx.emit(command(ctx, TempMode::Holding, HumidMode::On));
}

fn humidifying_update(ctx: &mut CookContext) -> Option<CookState> {
    if core::mem::take(&mut ctx.inbox.humid_ready) {
        info!("HUMIDIFYING: target humidity reached");
        return Some(CookState::Cooking);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOKING: timed hold
// ═══════════════════════════════════════════════════════════════════════════

fn cooking_enter(ctx: &mut CookContext) {
    let secs = ctx.cycle.map_or(0, |c| c.time_of_smoking_secs);
    ctx.cook_started_ms = ctx.now_ms;
    ctx.cook_duration_ms = u64::from(secs) * 1000;
    ctx.emit(command(ctx, TempMode::Holding, HumidMode::Hold));
}

fn cooking_update(ctx: &mut CookContext) -> Option<CookState> {
    if ctx.now_ms.saturating_sub(ctx.cook_started_ms) >= ctx.cook_duration_ms {
        info!("COOKING: {} ms elapsed", ctx.cook_duration_ms);
        return Some(CookState::FinishedCooking);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  FINISHED_COOKING / COOLDOWN
// ═══════════════════════════════════════════════════════════════════════════

fn cooling_off(ctx: &mut CookContext) {
    ctx.emit(command(ctx, TempMode::Cooling, HumidMode::Off));
}

fn finished_update(_ctx: &mut CookContext) -> Option<CookState> {
    Some(CookState::Cooldown)
}

fn cooldown_update(ctx: &mut CookContext) -> Option<CookState> {
    let snap = ctx.inbox.snapshot.take()?;
    if snap.temperature <= ctx.cooldown_temp {
        info!("COOLDOWN: chamber at {}", snap.temperature);
        return Some(CookState::ReadyToTakeOut);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY_TO_TAKE_OUT / WAIT_FOR_TAKE_OUT_CONFIRMATION
// ═══════════════════════════════════════════════════════════════════════════

fn ready_enter(_ctx: &mut CookContext) {
    info!("READY TO TAKE OUT");
}

fn ready_update(_ctx: &mut CookContext) -> Option<CookState> {
    Some(CookState::WaitForConfirmation)
}

fn wait_update(ctx: &mut CookContext) -> Option<CookState> {
    match ctx.inbox.frame {
        Some(frame) if frame.is_confirmation() => {
            info!("WAIT: removal confirmed");
            ctx.inbox.frame = None;
            ctx.cycle_completed = true;
            Some(CookState::Idle)
        }
        // Anything else stays in the inbox and is discarded by the service.
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR: terminal until manual reset
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut CookContext) {
    warn!("ERROR: actuators off, manual reset required");
    ctx.emit(ControlCommand::OFF);
}

fn error_update(_ctx: &mut CookContext) -> Option<CookState> {
    None
}
