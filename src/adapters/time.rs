//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side testing and simulation.
//!
//! Also provides the embassy-time driver symbols that `async-io-mini`
//! timers resolve against on the device. The host links embassy-time's
//! own std driver instead.

use crate::app::ports::Clock;

/// Milliseconds since boot (device) or since construction (host).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: read of the free-running RTC counter.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

/// embassy-time driver: current tick (1 tick = 1 µs).
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_now() -> u64 {
    MonotonicClock::new().uptime_us()
}

/// embassy-time driver: wake `waker` once the clock reaches `at`.
#[cfg(target_os = "espidf")]
#[unsafe(no_mangle)]
pub extern "C" fn _embassy_time_schedule_wake(at: u64, waker: *mut core::ffi::c_void) {
    if waker.is_null() {
        return;
    }

    // SAFETY: embassy-time hands over a valid `&Waker` for the duration of
    // the call; it is cloned before returning.
    let waker = unsafe { (*(waker as *const core::task::Waker)).clone() };
    std::thread::spawn(move || {
        let now = _embassy_time_now();
        if at > now {
            std::thread::sleep(core::time::Duration::from_micros(at - now));
        }
        waker.wake();
    });
}
