//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                    |
//! |-------------|---------------|--------------------------------|
//! | `hardware`  | ActuatorPort  | Heater PWM, water valve GPIO   |
//! | `log_sink`  | EventSink     | Serial log output              |
//! |             | StateSink     | Serial log (no transport)      |
//! | `time`      | Clock         | ESP32 system timer / Instant   |
//! | `sim`       | ActuatorPort  | Simulated chamber (host)       |
//! |             | StateSink     | Simulated operator             |

pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
