//! Actuator drivers, hardware initialisation, and task placement.

pub mod heater;
pub mod hw_init;
pub mod task_pin;
pub mod valve;
