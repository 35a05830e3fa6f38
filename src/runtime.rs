//! Cook task runtime: the control loop, the cook service and the egress
//! task on one cooperative executor.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! multi-task scheduling and `async-io-mini` for reactor-driven timers
//! (no busy-spinning). Three concurrent futures:
//!
//! 1. **Control**: `ControlLoop::run`, one step every control period
//! 2. **Cook**: `CookService::run`, wakes on frames and completion
//!    signals, sleep-polls while cooking and cooling
//! 3. **Egress**: truly async via `states.receive().await`
//!    (wakes instantly when the service reports a state)
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  Cook Thread                                               │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on (drives reactor + futures)   │  │
//!  │  │  ┌──────────────────────────────────────────────────┐│  │
//!  │  │  │  edge_executor::LocalExecutor                    ││  │
//!  │  │  │                                                  ││  │
//!  │  │  │  ┌─────────┐  ┌───────────┐  ┌───────────────┐   ││  │
//!  │  │  │  │ Control │  │   Cook    │  │ Egress        │   ││  │
//!  │  │  │  │ 200ms ⏱ │  │ wake/poll │  │ wake-on-send  │   ││  │
//!  │  │  │  └─────────┘  └───────────┘  └───────────────┘   ││  │
//!  │  │  └──────────────────────────────────────────────────┘│  │
//!  │  └──────────────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inbound frames arrive from other threads through
//! [`Ingress`](crate::ingress::Ingress); every fabric primitive is guarded
//! by a critical section, so cross-thread delivery is safe.

use core::future::Future;
use std::io;
use std::thread::JoinHandle;

use log::info;

use crate::adapters::log_sink::LogEventSink;
use crate::app::ports::{ActuatorPort, Clock, StateSink};
use crate::app::service::{CookService, run_egress};
use crate::channels::Fabric;
use crate::config::CookConfig;
use crate::control::ControlLoop;
use crate::drivers::task_pin::{self, COOK_TASK};

/// Run the three cook tasks until `until` completes, returning its output.
///
/// `until` runs on the same executor, so it may be another never-ending
/// task (a simulated plant) or a test condition.
pub fn run_cook_tasks<A, C, S, F>(
    fabric: &Fabric,
    actuators: A,
    clock: C,
    mut states: S,
    config: CookConfig,
    until: F,
) -> F::Output
where
    A: ActuatorPort,
    C: Clock + Clone,
    S: StateSink,
    F: Future,
{
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    let mut control = ControlLoop::new(fabric, actuators, config.clone());
    let mut service = CookService::new(fabric, config);
    let mut events = LogEventSink::new();
    service.start(&mut events);

    let control_clock = clock.clone();
    executor
        .spawn(async move { control.run(control_clock).await })
        .detach();
    executor
        .spawn(async move { service.run(clock, &mut events).await })
        .detach();
    executor
        .spawn(async move { run_egress(fabric, &mut states).await })
        .detach();

    info!("cook tasks started (control, cook, egress)");

    futures_lite::future::block_on(executor.run(until))
}

/// Spawn the cook tasks in a dedicated thread pinned to the APP core.
pub fn spawn<A, C, S>(
    fabric: &'static Fabric,
    actuators: A,
    clock: C,
    states: S,
    config: CookConfig,
) -> io::Result<JoinHandle<()>>
where
    A: ActuatorPort + Send + 'static,
    C: Clock + Clone + Send + 'static,
    S: StateSink + Send + 'static,
{
    task_pin::spawn_on_core(COOK_TASK, move || {
        run_cook_tasks(
            fabric,
            actuators,
            clock,
            states,
            config,
            core::future::pending::<()>(),
        );
    })
}
