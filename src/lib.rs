//! Smokehouse cook-cycle controller library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// Pulls in the time driver that async-io-mini timers link against.
use embassy_time as _;

pub mod app;
pub mod channels;
pub mod config;
pub mod control;
pub mod error;
pub mod frame;
pub mod fsm;
pub mod ingress;
pub mod runtime;

pub mod adapters;
pub mod drivers;
