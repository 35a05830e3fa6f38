//! Humidifier water valve (solenoid via low-side MOSFET, active HIGH).

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct WaterValveDriver<P: OutputPin> {
    pin: P,
    open: bool,
}

impl<P: OutputPin> WaterValveDriver<P> {
    /// Wrap `pin` and force the valve closed.
    pub fn new(mut pin: P) -> Self {
        if let Err(e) = pin.set_low() {
            warn!("valve: initial close failed: {:?}", e);
        }
        Self { pin, open: false }
    }

    pub fn set(&mut self, open: bool) {
        if open == self.open {
            return;
        }
        let result = if open {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.open = open,
            Err(e) => warn!("valve: switch to open={} failed: {:?}", open, e),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}
