//! End-to-end cook cycle driven synchronously.
//!
//! The control loop, the cook service, the egress drain and the simulated
//! chamber are stepped by hand on a simulated clock, so every run is
//! deterministic: 50 ms service ticks, 200 ms control and plant ticks.

use core::time::Duration;

use smokehouse::adapters::sim::{AutoConfirm, PlantParams, SimulatedSmoker};
use smokehouse::app::events::AppEvent;
use smokehouse::app::ports::Clock;
use smokehouse::app::service::{CookService, drain_egress};
use smokehouse::channels::Fabric;
use smokehouse::config::{CONFIRM_COMMAND, CookConfig};
use smokehouse::control::ControlLoop;
use smokehouse::frame::{DoorStatus, StartFrame, UpdateFrame, encode_start, encode_update};
use smokehouse::fsm::CookState;
use smokehouse::ingress::{Delivery, Ingress};

use crate::mock_hw::{MockActuators, RecordingSink, RecordingStateSink, SimClock};

const FSM_TICK_MS: u64 = 50;
const CONTROL_TICK_MS: u64 = 200;

fn request(command: u8, secs: u16) -> StartFrame {
    StartFrame {
        command,
        meat_name: [0; smokehouse::frame::MEAT_NAME_LEN],
        target_humidity: 80,
        target_temperature: 650,
        current_humidity: 10,
        current_temperature: 200,
        door_status: DoorStatus::Closed,
        time_of_smoking_secs: secs,
    }
    .with_name("Pork shoulder")
}

fn update(temperature: i16, humidity: u8) -> [u8; 5] {
    encode_update(&UpdateFrame {
        current_humidity: humidity,
        current_temperature: temperature,
        door_status: DoorStatus::Closed,
    })
}

const FULL_CYCLE: [&str; 9] = [
    "IDLE",
    "HEATING",
    "HUMIDIFYING",
    "COOKING",
    "FINISHED_COOKING",
    "COOLDOWN",
    "READY_TO_TAKE_OUT",
    "WAIT_FOR_TAKE_OUT_CONFIRMATION",
    "IDLE",
];

// ── Full cycle against the simulated chamber ─────────────────

#[test]
fn full_cycle_against_simulated_chamber() {
    let fabric = Fabric::new();
    let config = CookConfig::default();
    let clock = SimClock::new();
    let mut events = RecordingSink::new();

    let mut plant = SimulatedSmoker::new(PlantParams::default(), 200, 10);
    let mut control = ControlLoop::new(&fabric, plant.actuators(), config.clone());
    let mut service = CookService::new(&fabric, config);
    let labels = RecordingStateSink::new();
    let mut egress = AutoConfirm::new(Ingress::new(&fabric), labels.clone(), RecordingSink::new());
    let ingress = Ingress::new(&fabric);

    service.start(&mut events);
    assert_eq!(
        ingress.deliver(&encode_start(&request(1, 10)), &mut events),
        Delivery::Queued(smokehouse::app::events::FrameKind::Start)
    );

    let mut cooking_at = None;
    let mut finished_at = None;
    let mut heat_done_temp = None;
    let mut humid_done = None;

    while clock.now_ms() < 120_000 {
        let now = clock.now_ms();
        if now % CONTROL_TICK_MS == 0 {
            plant.tick(Duration::from_millis(CONTROL_TICK_MS), &ingress, &mut events);
            control.step(now);
        }

        let before = service.state();
        let after = service.poll(now, &mut events);
        if before != after {
            match after {
                CookState::Humidifying => heat_done_temp = Some(plant.temperature()),
                CookState::Cooking => {
                    humid_done = Some(plant.humidity());
                    cooking_at = Some(now);
                }
                CookState::FinishedCooking => finished_at = Some(now),
                _ => {}
            }
        }
        drain_egress(&fabric, &mut egress);

        if labels.labels().len() == FULL_CYCLE.len() {
            break;
        }
        clock.advance(FSM_TICK_MS);
    }

    assert_eq!(labels.labels(), FULL_CYCLE);
    assert_eq!(egress.confirmations(), 1);
    assert_eq!(service.state(), CookState::Idle);

    assert!(heat_done_temp.unwrap() >= 650);
    assert!(humid_done.unwrap() >= 80);
    let cooked_ms = finished_at.unwrap() - cooking_at.unwrap();
    assert!(cooked_ms >= 10_000, "cooked for {cooked_ms} ms");
    assert!(plant.temperature() <= 400);

    assert_eq!(events.count(|e| matches!(e, AppEvent::CycleStarted { .. })), 1);
    assert_eq!(events.count(|e| *e == AppEvent::CycleCompleted), 1);
    assert_eq!(events.count(|e| matches!(e, AppEvent::FrameRejected(_))), 0);
}

// ── Thresholds with hand-fed readings ────────────────────────

struct Rig<'f> {
    fabric: &'f Fabric,
    ingress: Ingress<'f>,
    control: ControlLoop<'f, MockActuators>,
    service: CookService<'f>,
    events: RecordingSink,
    now: u64,
}

impl<'f> Rig<'f> {
    fn new(fabric: &'f Fabric) -> Self {
        let config = CookConfig::default();
        let mut events = RecordingSink::new();
        let mut service = CookService::new(fabric, config.clone());
        service.start(&mut events);
        Self {
            fabric,
            ingress: Ingress::new(fabric),
            control: ControlLoop::new(fabric, MockActuators::new(), config),
            service,
            events,
            now: 0,
        }
    }

    fn send(&mut self, bytes: &[u8]) -> Delivery {
        self.ingress.deliver(bytes, &mut self.events)
    }

    /// Control step then service poll at the current time, then advance.
    fn cycle(&mut self, ms: u64) -> CookState {
        self.control.step(self.now);
        let state = self.service.poll(self.now, &mut self.events);
        self.now += ms;
        state
    }

    fn labels(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Ok(state) = self.fabric.states.try_receive() {
            out.push(state.label());
        }
        out
    }
}

#[test]
fn stages_advance_exactly_at_thresholds() {
    let fabric = Fabric::new();
    let mut rig = Rig::new(&fabric);

    rig.send(&encode_start(&request(1, 2)));
    rig.send(&update(200, 10));
    assert_eq!(rig.cycle(50), CookState::Heating);

    // Command lands on the next control step; heater then runs.
    assert_eq!(rig.cycle(50), CookState::Heating);
    assert!(rig.control.heater_duty() > 0);

    rig.send(&update(649, 10));
    assert_eq!(rig.cycle(50), CookState::Heating);
    assert_eq!(rig.cycle(50), CookState::Heating);

    // The control step raises the signal, the poll right after consumes it.
    rig.send(&update(650, 10));
    assert_eq!(rig.cycle(50), CookState::Humidifying);
    assert_eq!(rig.control.heater_duty(), 0);

    rig.send(&update(650, 79));
    assert_eq!(rig.cycle(50), CookState::Humidifying);
    assert!(rig.control.valve_open());

    rig.send(&update(650, 80));
    assert_eq!(rig.cycle(50), CookState::Cooking);
    assert!(!rig.control.valve_open());

    // 2 s of cooking.
    while rig.cycle(50) == CookState::Cooking {}
    assert_eq!(rig.service.state(), CookState::FinishedCooking);
    assert_eq!(rig.cycle(50), CookState::Cooldown);

    rig.send(&update(401, 60));
    assert_eq!(rig.cycle(50), CookState::Cooldown);
    assert_eq!(rig.cycle(50), CookState::Cooldown);
    assert_eq!(rig.control.heater_duty(), 0);
    assert!(!rig.control.valve_open());

    rig.send(&update(400, 60));
    assert_eq!(rig.cycle(50), CookState::ReadyToTakeOut);
    assert_eq!(rig.cycle(50), CookState::WaitForConfirmation);
    // Reported at the top of the next iteration.
    rig.cycle(50);

    assert_eq!(
        rig.labels(),
        &FULL_CYCLE[..8],
        "every stage reported once, in order"
    );
}

#[test]
fn wait_ignores_everything_but_confirmation() {
    let fabric = Fabric::new();
    let mut rig = Rig::new(&fabric);

    rig.service.force_state(CookState::WaitForConfirmation, &mut rig.events);

    rig.send(&encode_start(&request(1, 60)));
    assert_eq!(rig.cycle(50), CookState::WaitForConfirmation);
    assert!(rig.events.events.contains(&AppEvent::StaleFrameDiscarded {
        state: CookState::WaitForConfirmation
    }));

    rig.send(&[1, CONFIRM_COMMAND]);
    assert_eq!(rig.cycle(50), CookState::WaitForConfirmation);

    rig.send(&encode_start(&request(CONFIRM_COMMAND, 1)));
    assert_eq!(rig.cycle(50), CookState::Idle);

    // Back in Idle a fresh request starts a new cycle.
    rig.send(&encode_start(&request(1, 60)));
    assert_eq!(rig.cycle(50), CookState::Heating);
}

#[test]
fn cooldown_waits_for_first_reading() {
    let fabric = Fabric::new();
    let mut rig = Rig::new(&fabric);

    rig.service.force_state(CookState::Cooldown, &mut rig.events);
    for _ in 0..10 {
        assert_eq!(rig.cycle(500), CookState::Cooldown);
    }

    rig.send(&update(150, 20));
    assert_eq!(rig.cycle(500), CookState::ReadyToTakeOut);
}
