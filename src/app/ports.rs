//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop / CookService (domain)
//! ```
//!
//! Driven adapters (heater, water valve, state publisher, event sinks,
//! clocks) implement these traits. The domain consumes them via generics,
//! so the control loop and the state machine never touch hardware directly.

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the control loop calls this every period.
pub trait ActuatorPort {
    /// Set heating element duty (0 = off, 255 = full power).
    fn set_heater_duty(&mut self, duty: u8);

    /// Open or close the humidifier water valve.
    fn set_water_valve(&mut self, open: bool);
}

// ───────────────────────────────────────────────────────────────
// State sink port (driven adapter: domain → outbound transport)
// ───────────────────────────────────────────────────────────────

/// Publishes cook-state labels to the outbound transport.
pub trait StateSink {
    fn publish(&mut self, label: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log, MQTT
/// diagnostics topic, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<A: ActuatorPort + ?Sized> ActuatorPort for &mut A {
    fn set_heater_duty(&mut self, duty: u8) {
        (**self).set_heater_duty(duty);
    }

    fn set_water_valve(&mut self, open: bool) {
        (**self).set_water_valve(open);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &super::events::AppEvent) {
        (**self).emit(event);
    }
}
