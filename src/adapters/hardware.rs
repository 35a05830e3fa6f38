//! Hardware adapter: bridges the actuator drivers to the domain port.
//!
//! Owns the heater and water valve drivers and exposes them through
//! [`ActuatorPort`]. This is the only module the control loop reaches
//! hardware through. Drivers are generic over `embedded-hal` traits, so
//! the same adapter runs on LEDC/GPIO on the device and on mocks in tests.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::ActuatorPort;
use crate::drivers::heater::HeaterDriver;
use crate::drivers::valve::WaterValveDriver;

pub struct HardwareAdapter<P: SetDutyCycle, V: OutputPin> {
    heater: HeaterDriver<P>,
    valve: WaterValveDriver<V>,
}

impl<P: SetDutyCycle, V: OutputPin> HardwareAdapter<P, V> {
    pub fn new(heater: HeaterDriver<P>, valve: WaterValveDriver<V>) -> Self {
        Self { heater, valve }
    }

    /// Heater off, valve closed.
    pub fn all_off(&mut self) {
        self.heater.off();
        self.valve.set(false);
    }

    pub fn heater(&self) -> &HeaterDriver<P> {
        &self.heater
    }

    pub fn valve(&self) -> &WaterValveDriver<V> {
        &self.valve
    }
}

impl<P: SetDutyCycle, V: OutputPin> ActuatorPort for HardwareAdapter<P, V> {
    fn set_heater_duty(&mut self, duty: u8) {
        self.heater.set(duty);
    }

    fn set_water_valve(&mut self, open: bool) {
        self.valve.set(open);
    }
}
