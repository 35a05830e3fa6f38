//! Smokehouse Firmware: Main Entry Point
//!
//! Hexagonal architecture: the cook tasks only see port traits.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   LogStateSink   MonotonicClock│
//! │  (ActuatorPort)    (EventSink)    (StateSink)    (Clock)       │
//! │  SimulatedSmoker + AutoConfirm (host only)                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  ControlLoop (PI)   CookService (FSM)   egress          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Fabric: frame lanes · commands · states · signals · cell      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use smokehouse::channels::Fabric;
use smokehouse::config::CookConfig;

/// Outbound topic the state labels are published under.
const STATE_TOPIC: &str = "smoker/state";

/// Shared by every task for the lifetime of the firmware.
static FABRIC: Fabric = Fabric::new();

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use smokehouse::adapters::hardware::HardwareAdapter;
    use smokehouse::adapters::log_sink::LogStateSink;
    use smokehouse::adapters::time::MonotonicClock;
    use smokehouse::drivers::hw_init;
    use smokehouse::runtime;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Smokehouse v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    let (heater, valve) = hw_init::init_peripherals()?;
    let hardware = HardwareAdapter::new(heater, valve);

    // ── 3. Cook tasks ─────────────────────────────────────────
    let cook = runtime::spawn(
        &FABRIC,
        hardware,
        MonotonicClock::new(),
        LogStateSink::new(STATE_TOPIC),
        CookConfig::default(),
    )?;

    info!("System ready.");
    cook.join()
        .map_err(|_| anyhow::anyhow!("cook task panicked"))?;
    Ok(())
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use core::time::Duration;

    use smokehouse::adapters::log_sink::{LogEventSink, LogStateSink};
    use smokehouse::adapters::sim::{AutoConfirm, PlantParams, SimulatedSmoker};
    use smokehouse::adapters::time::MonotonicClock;
    use smokehouse::frame::{DoorStatus, StartFrame, encode_start};
    use smokehouse::ingress::Ingress;
    use smokehouse::runtime;

    /// Wall time the simulation runs before exiting.
    const SIM_RUN: Duration = Duration::from_secs(60);

    // `log` records are bridged into the subscriber. RUST_LOG overrides the level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    info!("Smokehouse v{} (host simulation)", env!("CARGO_PKG_VERSION"));

    let config = CookConfig::default();
    let period = Duration::from_millis(u64::from(config.control_period_ms));

    let mut plant = SimulatedSmoker::new(PlantParams::default(), 200, 10);
    let actuators = plant.actuators();
    let ingress = Ingress::new(&FABRIC);
    let mut events = LogEventSink::new();

    let request = StartFrame {
        command: 1,
        meat_name: [0; smokehouse::frame::MEAT_NAME_LEN],
        target_humidity: 80,
        target_temperature: 650,
        current_humidity: plant.humidity(),
        current_temperature: plant.temperature(),
        door_status: DoorStatus::Closed,
        time_of_smoking_secs: 10,
    }
    .with_name("Pork belly");
    ingress.deliver(&encode_start(&request), &mut events);

    let states = AutoConfirm::new(
        Ingress::new(&FABRIC),
        LogStateSink::new(STATE_TOPIC),
        LogEventSink::new(),
    );

    runtime::run_cook_tasks(
        &FABRIC,
        actuators,
        MonotonicClock::new(),
        states,
        config,
        futures_lite::future::or(plant.run(period, &ingress, &mut events), async {
            async_io_mini::Timer::after(SIM_RUN).await;
        }),
    );

    info!("simulation finished");
    Ok(())
}
