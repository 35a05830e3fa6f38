//! Full cook cycle on the cooperative executor with real timers.
//!
//! Same wiring as the host binary: control loop, cook service and egress
//! under `run_cook_tasks`, the simulated chamber as the extra task, and an
//! auto-confirming operator on the state sink. Periods and plant rates are
//! sped up so one cycle completes in a couple of seconds.

use core::time::Duration;

use futures_lite::future;

use smokehouse::adapters::log_sink::LogEventSink;
use smokehouse::adapters::sim::{AutoConfirm, PlantParams, SimulatedSmoker};
use smokehouse::adapters::time::MonotonicClock;
use smokehouse::channels::Fabric;
use smokehouse::config::CookConfig;
use smokehouse::control::{ControlCommand, ControlLoop, HumidMode, TempMode};
use smokehouse::frame::{DoorStatus, StartFrame, encode_start};
use smokehouse::ingress::Ingress;
use smokehouse::runtime::run_cook_tasks;

use crate::mock_hw::{RecordingSink, RecordingStateSink};

const PERIOD: Duration = Duration::from_millis(20);
const DEADLINE: Duration = Duration::from_secs(20);

fn fast_config() -> CookConfig {
    CookConfig {
        control_period_ms: 20,
        fsm_period_ms: 10,
        cooldown_poll_ms: 20,
        error_idle_ms: 50,
        ..CookConfig::default()
    }
}

fn fast_plant() -> PlantParams {
    PlantParams {
        ambient_temp: 200.0,
        heat_rate: 4_000.0,
        loss_rate: 1.0,
        fill_rate: 200.0,
        dry_rate: 10.0,
    }
}

#[test]
fn fast_plant_clears_the_heating_target() {
    let fabric = Fabric::new();
    let ingress = Ingress::new(&fabric);
    let mut plant = SimulatedSmoker::new(fast_plant(), 200, 10);
    let mut control = ControlLoop::new(&fabric, plant.actuators(), fast_config());
    let mut events = RecordingSink::new();
    fabric
        .commands
        .try_send(ControlCommand::new(TempMode::Heating, HumidMode::Off, 650, 0))
        .unwrap();

    let reached = (0..1_000u64).any(|step| {
        plant.tick(PERIOD, &ingress, &mut events);
        control.step(step * 20);
        fabric.temp_ready.try_take().is_some()
    });
    assert!(reached, "plateaued at {}", plant.temperature());
}

#[test]
fn executor_runs_a_complete_cycle() {
    let fabric = Fabric::new();
    let ingress = Ingress::new(&fabric);
    let mut plant = SimulatedSmoker::new(fast_plant(), 200, 10);
    let labels = RecordingStateSink::new();
    let egress = AutoConfirm::new(Ingress::new(&fabric), labels.clone(), LogEventSink::new());
    let mut events = RecordingSink::new();

    let request = StartFrame {
        command: 1,
        meat_name: [0; smokehouse::frame::MEAT_NAME_LEN],
        target_humidity: 80,
        target_temperature: 650,
        current_humidity: 10,
        current_temperature: 200,
        door_status: DoorStatus::Closed,
        time_of_smoking_secs: 1,
    }
    .with_name("Trout");
    ingress.deliver(&encode_start(&request), &mut events);

    let actuators = plant.actuators();
    let watcher = labels.clone();
    let completed = run_cook_tasks(
        &fabric,
        actuators,
        MonotonicClock::new(),
        egress,
        fast_config(),
        future::or(
            async {
                plant.run(PERIOD, &ingress, &mut events).await;
                false
            },
            future::or(
                async {
                    while watcher.labels().len() < 9 {
                        async_io_mini::Timer::after(PERIOD).await;
                    }
                    true
                },
                async {
                    async_io_mini::Timer::after(DEADLINE).await;
                    false
                },
            ),
        ),
    );

    assert!(completed, "cycle did not finish, saw {:?}", labels.labels());
    assert_eq!(
        labels.labels(),
        [
            "IDLE",
            "HEATING",
            "HUMIDIFYING",
            "COOKING",
            "FINISHED_COOKING",
            "COOLDOWN",
            "READY_TO_TAKE_OUT",
            "WAIT_FOR_TAKE_OUT_CONFIRMATION",
            "IDLE",
        ]
    );
    assert!(plant.temperature() <= 400);
}
