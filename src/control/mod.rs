//! Periodic actuator control loop.
//!
//! Each [`ControlLoop::step`] drains the sensor lane and the command
//! channel (latest value wins), runs the temperature PI regulator and the
//! humidity bang-bang controller, writes both actuators and raises the
//! completion signals when a target is reached.

pub mod pi;

use core::time::Duration;

use log::debug;
use serde::Serialize;

use crate::app::ports::{ActuatorPort, Clock};
use crate::channels::{Fabric, SensorSnapshot};
use crate::config::CookConfig;
use pi::PiRegulator;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Temperature regulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TempMode {
    /// Drive up to target, then signal `temp_ready`.
    Heating,
    /// Hold at target indefinitely.
    Holding,
    /// Heater off.
    Cooling,
}

/// Humidity regulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HumidMode {
    /// Fill up to target, then signal `humid_ready`.
    On,
    /// Keep at target.
    Hold,
    /// Valve closed.
    Off,
}

/// Setpoint issued by the state machine on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlCommand {
    pub temp_mode: TempMode,
    pub humid_mode: HumidMode,
    /// Tenths of °C.
    pub target_temp: i16,
    /// Percent.
    pub target_humid: u8,
}

impl ControlCommand {
    /// Everything off. In effect until the first command arrives.
    pub const OFF: Self = Self::new(TempMode::Cooling, HumidMode::Off, 0, 0);

    pub const fn new(
        temp_mode: TempMode,
        humid_mode: HumidMode,
        target_temp: i16,
        target_humid: u8,
    ) -> Self {
        Self {
            temp_mode,
            humid_mode,
            target_temp,
            target_humid,
        }
    }
}

// ---------------------------------------------------------------------------
// ControlLoop
// ---------------------------------------------------------------------------

pub struct ControlLoop<'f, A: ActuatorPort> {
    fabric: &'f Fabric,
    actuators: A,
    config: CookConfig,
    command: ControlCommand,
    temperature: i16,
    humidity: u8,
    regulator: PiRegulator,
    last_step_ms: Option<u64>,
    heater_duty: u8,
    valve_open: bool,
}

impl<'f, A: ActuatorPort> ControlLoop<'f, A> {
    pub fn new(fabric: &'f Fabric, actuators: A, config: CookConfig) -> Self {
        let regulator = PiRegulator::new(config.integral_limit);
        Self {
            fabric,
            actuators,
            config,
            command: ControlCommand::OFF,
            temperature: 0,
            humidity: 0,
            regulator,
            last_step_ms: None,
            heater_duty: 0,
            valve_open: false,
        }
    }

    /// One control iteration at monotonic time `now_ms`.
    pub fn step(&mut self, now_ms: u64) {
        while let Ok(update) = self.fabric.sensor.try_receive() {
            self.temperature = update.current_temperature;
            self.humidity = update.current_humidity;
            self.fabric.snapshot.store(SensorSnapshot {
                temperature: self.temperature,
                humidity: self.humidity,
            });
        }

        while let Ok(command) = self.fabric.commands.try_receive() {
            self.command = command;
        }

        let dt_secs = match self.last_step_ms {
            Some(prev) if now_ms > prev => (now_ms - prev) as f32 / 1000.0,
            _ => 0.0,
        };
        self.last_step_ms = Some(now_ms);

        self.heater_duty = self.regulate_temperature(dt_secs);
        self.valve_open = self.regulate_humidity();

        self.actuators.set_heater_duty(self.heater_duty);
        self.actuators.set_water_valve(self.valve_open);
    }

    fn regulate_temperature(&mut self, dt_secs: f32) -> u8 {
        let cmd = self.command;
        let error = f32::from(cmd.target_temp) - f32::from(self.temperature);

        match cmd.temp_mode {
            TempMode::Heating if self.temperature < cmd.target_temp => {
                let duty = self.regulator.update(&self.config.heating, error, dt_secs);
                debug!(
                    "PI heat: err={} I={:.2} duty={}",
                    error,
                    self.regulator.integral(),
                    duty
                );
                duty
            }
            TempMode::Heating => {
                self.regulator.reset();
                self.fabric.temp_ready.signal(());
                0
            }
            TempMode::Holding => {
                let duty = self.regulator.update(&self.config.holding, error, dt_secs);
                debug!(
                    "PI hold: err={} I={:.2} duty={}",
                    error,
                    self.regulator.integral(),
                    duty
                );
                duty
            }
            TempMode::Cooling => {
                self.regulator.reset();
                0
            }
        }
    }

    fn regulate_humidity(&mut self) -> bool {
        let below = self.humidity < self.command.target_humid;
        match self.command.humid_mode {
            HumidMode::On => {
                if !below {
                    self.fabric.humid_ready.signal(());
                }
                below
            }
            HumidMode::Hold => below,
            HumidMode::Off => false,
        }
    }

    /// Periodic task: step, then sleep one control period.
    pub async fn run<C: Clock>(&mut self, clock: C) {
        let period = Duration::from_millis(u64::from(self.config.control_period_ms));
        loop {
            self.step(clock.now_ms());
            async_io_mini::Timer::after(period).await;
        }
    }

    /// Command currently in effect.
    pub fn command(&self) -> ControlCommand {
        self.command
    }

    /// Duty written on the last step.
    pub fn heater_duty(&self) -> u8 {
        self.heater_duty
    }

    /// Valve state written on the last step.
    pub fn valve_open(&self) -> bool {
        self.valve_open
    }

    pub fn integral(&self) -> f32 {
        self.regulator.integral()
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }
}
