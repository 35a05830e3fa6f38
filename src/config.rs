//! Build-time constants and controller tunables.
//!
//! Wire-level limits are plain `const`s because the frame validator and the
//! cloud side must agree on them.  Gains and periods are grouped in
//! [`CookConfig`] so tests and the host simulator can shorten them; the
//! firmware always runs with [`CookConfig::default()`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire-level limits (tenths of °C, percent)
// ---------------------------------------------------------------------------

/// Lowest accepted temperature (−40.0 °C).
pub const TEMP_MIN: i16 = -400;
/// Highest accepted temperature (300.0 °C).
pub const TEMP_MAX: i16 = 3000;
/// Highest accepted relative humidity.
pub const HUMID_MAX: u8 = 100;
/// Longest accepted cook duration (24 h).
pub const MAX_SMOKING_SECS: u32 = 24 * 60 * 60;

/// Cooldown finishes once the chamber is at or below 40.0 °C.
pub const COOLDOWN_TEMP: i16 = 400;

/// `command` byte of a Start frame that confirms the product was removed.
pub const CONFIRM_COMMAND: u8 = 0xAA;

// ---------------------------------------------------------------------------
// PI gain set
// ---------------------------------------------------------------------------

/// Gains and output limits for one temperature mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiGains {
    pub kp: f32,
    pub ki: f32,
    /// Constant added to `P + I` before clamping (feed-forward hold level).
    pub bias: f32,
    pub out_min: u8,
    pub out_max: u8,
}

// ---------------------------------------------------------------------------
// CookConfig
// ---------------------------------------------------------------------------

/// Controller tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookConfig {
    // --- Temperature regulation ---
    /// Gains while driving the chamber up to target.
    pub heating: PiGains,
    /// Gains while holding the chamber at target.
    pub holding: PiGains,
    /// Symmetric anti-windup bound on the integral term.
    pub integral_limit: f32,

    // --- Timing ---
    /// ControlLoop period (milliseconds)
    pub control_period_ms: u32,
    /// CookStateMachine iteration period (milliseconds)
    pub fsm_period_ms: u32,
    /// Cooldown temperature poll interval (milliseconds)
    pub cooldown_poll_ms: u32,
    /// Sleep between iterations while parked in Error (milliseconds)
    pub error_idle_ms: u32,
}

impl Default for CookConfig {
    fn default() -> Self {
        Self {
            heating: PiGains {
                kp: 2.5,
                ki: 0.05,
                bias: 0.0,
                out_min: 80, // element needs a floor to stay lit
                out_max: 255,
            },
            holding: PiGains {
                kp: 1.5,
                ki: 0.03,
                bias: 150.0,
                out_min: 0,
                out_max: 255,
            },
            integral_limit: 100.0,

            control_period_ms: 200, // 5 Hz
            fsm_period_ms: 50,
            cooldown_poll_ms: 500,
            error_idle_ms: 1000,
        }
    }
}
