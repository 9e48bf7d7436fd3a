//! Airwatch library - testable modules for the CO2/THI pocket monitor.
//!
//! This library contains the core logic that can be tested on the host machine:
//! the connectivity state machine, time sync, telemetry subscription, payload
//! decoding, and display presentation. The binary (`main.rs`) uses this library
//! and adds the embedded-specific code (WiFi, MQTT, SNTP, ST7789 driver).
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Configuration
pub mod config;

// UI building blocks
pub mod colors;
pub mod styles;
pub mod widgets;

// Core state machines and data model
pub mod app;
pub mod presenter;
pub mod reading;
pub mod retry;
pub mod status;
pub mod telemetry;
pub mod timesync;
pub mod wallclock;

#[cfg(test)]
pub mod testutil;

/// Monotonic milliseconds since boot. All core timing compares these values;
/// the source is injected by the caller (embassy `Instant` on target, a
/// synthetic counter in tests).
pub type Millis = u64;
