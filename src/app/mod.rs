//! Application core: pure domain logic, zero I/O.
//!
//! This module binds the cook-cycle state machine to the channel fabric
//! and defines the diagnostic events it emits. All interaction with
//! hardware and transports happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
