//! One-shot hardware peripheral initialization.
//!
//! Takes the ESP-IDF peripherals, configures the heater LEDC channel and
//! the water valve output, and hands back ready drivers. Called once from
//! `main()` before the tasks start.

// ── Pin assignments ───────────────────────────────────────────

/// Heating element SSR gate (LEDC channel 0).
pub const HEATER_PWM_GPIO: i32 = 25;
/// Humidifier water valve MOSFET gate, active HIGH.
pub const WATER_VALVE_GPIO: i32 = 26;
/// Heater PWM frequency.
pub const HEATER_PWM_FREQ_HZ: u32 = 5_000;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    TakePeripherals,
    LedcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TakePeripherals => write!(f, "peripherals already taken"),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::{Heater, WaterValve, init_peripherals};

#[cfg(target_os = "espidf")]
mod esp {
    use super::{HEATER_PWM_FREQ_HZ, HEATER_PWM_GPIO, HwInitError, WATER_VALVE_GPIO};
    use crate::drivers::heater::HeaterDriver;
    use crate::drivers::valve::WaterValveDriver;

    use esp_idf_hal::gpio::{AnyOutputPin, Output, OutputPin, PinDriver};
    use esp_idf_hal::ledc::config::TimerConfig;
    use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;
    use log::info;

    pub type Heater = HeaterDriver<LedcDriver<'static>>;
    pub type WaterValve = WaterValveDriver<PinDriver<'static, AnyOutputPin, Output>>;

    pub fn init_peripherals() -> Result<(Heater, WaterValve), HwInitError> {
        let p = Peripherals::take().map_err(|_| HwInitError::TakePeripherals)?;

        let timer_cfg = TimerConfig::new()
            .frequency(Hertz(HEATER_PWM_FREQ_HZ))
            .resolution(Resolution::Bits8);
        let timer = LedcTimerDriver::new(p.ledc.timer0, &timer_cfg)
            .map_err(|e| HwInitError::LedcInitFailed(e.code()))?;
        // The channel borrows the timer for 'static; the timer runs forever.
        let timer: &'static LedcTimerDriver<'static, _> = Box::leak(Box::new(timer));
        let pwm = LedcDriver::new(p.ledc.channel0, timer, p.pins.gpio25)
            .map_err(|e| HwInitError::LedcInitFailed(e.code()))?;
        info!(
            "hw_init: heater on GPIO{} ({} Hz, 8-bit)",
            HEATER_PWM_GPIO, HEATER_PWM_FREQ_HZ
        );

        let valve = PinDriver::output(p.pins.gpio26.downgrade_output())
            .map_err(|e| HwInitError::GpioConfigFailed(e.code()))?;
        info!("hw_init: water valve on GPIO{}", WATER_VALVE_GPIO);

        Ok((HeaterDriver::new(pwm), WaterValveDriver::new(valve)))
    }
}
