//! Host simulation of the smoker chamber.
//!
//! [`SimulatedSmoker`] is a first-order thermal/humidity plant. The control
//! loop drives it through a [`SimActuators`] handle (heater duty and valve
//! state held in atomics), and the plant reports back as encoded Update
//! frames through [`Ingress`], the same path a real transport uses.
//!
//! ```text
//!  ControlLoop ──ActuatorPort──▶ SimActuators ──▶ SimulatedSmoker
//!       ▲                                              │ advance(dt)
//!       └──── sensor lane ◀── Ingress ◀── Update frame ┘
//! ```

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::info;

use crate::app::ports::{ActuatorPort, EventSink, StateSink};
use crate::config::{CONFIRM_COMMAND, HUMID_MAX, TEMP_MAX, TEMP_MIN};
use crate::frame::{DoorStatus, StartFrame, UpdateFrame, encode_start, encode_update};
use crate::fsm::CookState;
use crate::ingress::{Delivery, Ingress};

// ── Actuator handle ───────────────────────────────────────────

#[derive(Debug, Default)]
struct Outputs {
    duty: AtomicU8,
    valve: AtomicBool,
}

/// Cloneable actuator side of the plant.
#[derive(Debug, Clone, Default)]
pub struct SimActuators {
    outputs: Arc<Outputs>,
}

impl SimActuators {
    pub fn heater_duty(&self) -> u8 {
        self.outputs.duty.load(Ordering::Relaxed)
    }

    pub fn valve_open(&self) -> bool {
        self.outputs.valve.load(Ordering::Relaxed)
    }
}

impl ActuatorPort for SimActuators {
    fn set_heater_duty(&mut self, duty: u8) {
        self.outputs.duty.store(duty, Ordering::Relaxed);
    }

    fn set_water_valve(&mut self, open: bool) {
        self.outputs.valve.store(open, Ordering::Relaxed);
    }
}

// ── Plant ─────────────────────────────────────────────────────

/// Plant coefficients. Temperatures in tenths of °C, humidity in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParams {
    pub ambient_temp: f32,
    /// Heating rate at full duty, tenths of °C per second.
    pub heat_rate: f32,
    /// Fraction of the gap to ambient lost per second.
    pub loss_rate: f32,
    /// Humidity gain per second with the valve open.
    pub fill_rate: f32,
    /// Humidity loss per second with the valve closed.
    pub dry_rate: f32,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            ambient_temp: 200.0,
            heat_rate: 400.0,
            loss_rate: 0.1,
            fill_rate: 10.0,
            dry_rate: 1.0,
        }
    }
}

pub struct SimulatedSmoker {
    params: PlantParams,
    temperature: f32,
    humidity: f32,
    door: DoorStatus,
    actuators: SimActuators,
}

impl SimulatedSmoker {
    pub fn new(params: PlantParams, temperature: i16, humidity: u8) -> Self {
        Self {
            params,
            temperature: f32::from(temperature),
            humidity: f32::from(humidity),
            door: DoorStatus::Closed,
            actuators: SimActuators::default(),
        }
    }

    /// Handle to pass to the control loop.
    pub fn actuators(&self) -> SimActuators {
        self.actuators.clone()
    }

    /// Integrate the plant over `dt_secs` with the current actuator outputs.
    pub fn advance(&mut self, dt_secs: f32) {
        let p = &self.params;
        let power = f32::from(self.actuators.heater_duty()) / 255.0;
        let d_temp = power * p.heat_rate - p.loss_rate * (self.temperature - p.ambient_temp);
        self.temperature = (self.temperature + d_temp * dt_secs)
            .clamp(f32::from(TEMP_MIN), f32::from(TEMP_MAX));

        let d_humid = if self.actuators.valve_open() {
            p.fill_rate
        } else {
            -p.dry_rate
        };
        self.humidity = (self.humidity + d_humid * dt_secs).clamp(0.0, f32::from(HUMID_MAX));
    }

    pub fn temperature(&self) -> i16 {
        self.temperature.round() as i16
    }

    pub fn humidity(&self) -> u8 {
        self.humidity.round() as u8
    }

    pub fn set_door(&mut self, door: DoorStatus) {
        self.door = door;
    }

    /// Current readings as an Update frame.
    pub fn update_frame(&self) -> UpdateFrame {
        UpdateFrame {
            current_humidity: self.humidity(),
            current_temperature: self.temperature(),
            door_status: self.door,
        }
    }

    /// Advance one `period` and report through `ingress`.
    pub fn tick(
        &mut self,
        period: Duration,
        ingress: &Ingress<'_>,
        sink: &mut impl EventSink,
    ) -> Delivery {
        self.advance(period.as_secs_f32());
        ingress.deliver(&encode_update(&self.update_frame()), sink)
    }

    /// Sensor task: tick every `period`.
    pub async fn run(
        &mut self,
        period: Duration,
        ingress: &Ingress<'_>,
        sink: &mut impl EventSink,
    ) {
        loop {
            self.tick(period, ingress, sink);
            async_io_mini::Timer::after(period).await;
        }
    }
}

// ── Operator stand-in ─────────────────────────────────────────

/// A removal confirmation as the cloud side sends it.
pub fn confirmation_frame() -> StartFrame {
    StartFrame {
        command: CONFIRM_COMMAND,
        meat_name: [0; crate::frame::MEAT_NAME_LEN],
        target_humidity: 0,
        target_temperature: 0,
        current_humidity: 0,
        current_temperature: 0,
        door_status: DoorStatus::Open,
        time_of_smoking_secs: 1,
    }
}

/// State sink that forwards to `inner` and confirms removal as soon as
/// the machine asks for it.
pub struct AutoConfirm<'f, S: StateSink, E: EventSink> {
    ingress: Ingress<'f>,
    inner: S,
    events: E,
    confirmations: u32,
}

impl<'f, S: StateSink, E: EventSink> AutoConfirm<'f, S, E> {
    pub fn new(ingress: Ingress<'f>, inner: S, events: E) -> Self {
        Self {
            ingress,
            inner,
            events,
            confirmations: 0,
        }
    }

    pub fn confirmations(&self) -> u32 {
        self.confirmations
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StateSink, E: EventSink> StateSink for AutoConfirm<'_, S, E> {
    fn publish(&mut self, label: &str) {
        self.inner.publish(label);
        if label == CookState::WaitForConfirmation.label() {
            info!("sim: operator confirms removal");
            let bytes = encode_start(&confirmation_frame());
            if let Delivery::Queued(_) = self.ingress.deliver(&bytes, &mut self.events) {
                self.confirmations += 1;
            }
        }
    }
}
