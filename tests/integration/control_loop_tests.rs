//! Control loop against the hardware adapter and on a real timer.

use core::convert::Infallible;
use core::time::Duration;

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use smokehouse::adapters::hardware::HardwareAdapter;
use smokehouse::adapters::time::MonotonicClock;
use smokehouse::channels::Fabric;
use smokehouse::config::CookConfig;
use smokehouse::control::{ControlCommand, ControlLoop, HumidMode, TempMode};
use smokehouse::drivers::heater::HeaterDriver;
use smokehouse::drivers::valve::WaterValveDriver;
use smokehouse::frame::{DoorStatus, UpdateFrame};

use crate::mock_hw::MockActuators;

// ── embedded-hal mocks ────────────────────────────────────────

struct Ledc {
    duty: u16,
}

impl embedded_hal::pwm::ErrorType for Ledc {
    type Error = Infallible;
}

impl SetDutyCycle for Ledc {
    fn max_duty_cycle(&self) -> u16 {
        1023
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty;
        Ok(())
    }
}

struct Gpio {
    high: bool,
}

impl embedded_hal::digital::ErrorType for Gpio {
    type Error = Infallible;
}

impl OutputPin for Gpio {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

fn reading(fabric: &Fabric, temperature: i16, humidity: u8) {
    fabric
        .sensor
        .try_send(UpdateFrame {
            current_humidity: humidity,
            current_temperature: temperature,
            door_status: DoorStatus::Closed,
        })
        .unwrap();
}

#[test]
fn heating_reaches_the_pwm_channel_and_valve_pin() {
    let fabric = Fabric::new();
    let hw = HardwareAdapter::new(
        HeaterDriver::new(Ledc { duty: 0 }),
        WaterValveDriver::new(Gpio { high: true }),
    );
    let mut control = ControlLoop::new(&fabric, hw, CookConfig::default());

    fabric
        .commands
        .try_send(ControlCommand::new(TempMode::Heating, HumidMode::On, 900, 70))
        .unwrap();
    reading(&fabric, 200, 30);
    control.step(0);

    // 2.5 * 700 saturates the heater.
    assert_eq!(control.heater_duty(), 255);
    assert_eq!(control.actuators().heater().duty(), 255);
    assert!(control.actuators().valve().is_open());

    fabric
        .commands
        .try_send(ControlCommand::new(TempMode::Cooling, HumidMode::Off, 900, 70))
        .unwrap();
    control.step(200);
    assert!(!control.actuators().heater().is_on());
    assert!(!control.actuators().valve().is_open());
}

#[test]
fn run_steps_once_per_period() {
    let fabric = Fabric::new();
    let config = CookConfig {
        control_period_ms: 10,
        ..CookConfig::default()
    };
    let mut control = ControlLoop::new(&fabric, MockActuators::new(), config);

    futures_lite::future::block_on(futures_lite::future::or(
        control.run(MonotonicClock::new()),
        async {
            async_io_mini::Timer::after(Duration::from_millis(200)).await;
        },
    ));

    // Two writes per step; scheduling jitter only ever makes it fewer.
    let calls = control.actuators().calls.len();
    assert!(calls >= 4, "only {calls} actuator writes");
    assert!(calls <= 2 * 21, "{calls} actuator writes");
    assert_eq!(control.actuators().heater_duty(), 0);
    assert!(!control.actuators().valve_open());
}
