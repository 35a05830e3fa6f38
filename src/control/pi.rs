//! PI regulator for the heater duty.
//!
//! Proportional-integral control with a symmetric clamp on the integral
//! term (anti-windup) and a saturated 0–255 output.

use crate::config::PiGains;

/// PI regulator state for one controlled axis.
#[derive(Debug, Clone)]
pub struct PiRegulator {
    integral: f32,
    integral_limit: f32,
}

impl PiRegulator {
    pub const fn new(integral_limit: f32) -> Self {
        Self {
            integral: 0.0,
            integral_limit,
        }
    }

    /// Advance the regulator by `dt_secs` and return the clamped duty.
    ///
    /// `error` is `target - current` in tenths of °C. A non-positive or
    /// non-finite `dt_secs` adds nothing to the integral.
    pub fn update(&mut self, gains: &PiGains, error: f32, dt_secs: f32) -> u8 {
        let p = gains.kp * error;

        if dt_secs.is_finite() && dt_secs > 0.0 {
            self.integral += gains.ki * error * dt_secs;
            self.integral = self
                .integral
                .clamp(-self.integral_limit, self.integral_limit);
        }

        let output = p + self.integral + gains.bias;
        // `as i32` truncates toward zero and saturates on overflow.
        (output as i32).clamp(i32::from(gains.out_min), i32::from(gains.out_max)) as u8
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }
}
