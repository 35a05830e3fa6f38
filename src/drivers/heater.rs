//! Heating element driver.
//!
//! Drives the element through any `embedded-hal` PWM channel. Duty is the
//! controller's 0–255 scale and is mapped onto the channel's own range.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the channel is an LEDC driver (see `hw_init`). Tests use an
//! in-memory channel.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

/// Full-scale controller duty.
pub const DUTY_MAX: u8 = 255;

pub struct HeaterDriver<P: SetDutyCycle> {
    pwm: P,
    duty: u8,
}

impl<P: SetDutyCycle> HeaterDriver<P> {
    /// Wrap `pwm` and force it off.
    pub fn new(mut pwm: P) -> Self {
        if let Err(e) = pwm.set_duty_cycle_fully_off() {
            warn!("heater: initial off failed: {:?}", e);
        }
        Self { pwm, duty: 0 }
    }

    pub fn set(&mut self, duty: u8) {
        if duty == self.duty {
            return;
        }
        match self
            .pwm
            .set_duty_cycle_fraction(u16::from(duty), u16::from(DUTY_MAX))
        {
            Ok(()) => self.duty = duty,
            Err(e) => warn!("heater: set duty {} failed: {:?}", duty, e),
        }
    }

    pub fn off(&mut self) {
        self.set(0);
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }

    pub fn is_on(&self) -> bool {
        self.duty > 0
    }
}
