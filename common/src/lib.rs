//! Control core for the ultrasonic proximity alarm.
//!
//! This crate contains the platform-agnostic logic shared between the
//! Pico 2 firmware and the desktop simulator:
//!
//! - [`config`]: Thresholds, timing and display constants
//! - [`control`]: Mode and display-dirty state shared with the button path
//! - [`dispatch`]: Deferred work queue drained by a worker task
//! - [`controller`]: The Menu/Alarm state machine
//! - [`threshold`]: Encoder-driven threshold adjustment
//! - [`ranging`]: Ultrasonic echo timing
//! - [`encoder`]: Quadrature decoding
//! - [`watchdog`]: Software-extended watchdog deadline
//! - [`devices`]: Display and buzzer contracts
//! - [`lcd`]: In-memory character LCD and field formatting
//! - [`events`]: Recent-event ring buffer
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` outside of tests. Hardware is reached only through
//! `embedded-hal` traits and the contracts in [`devices`], so everything here
//! runs on the host under `cargo test`.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod controller;
pub mod devices;
pub mod dispatch;
pub mod encoder;
pub mod events;
pub mod lcd;
pub mod ranging;
pub mod threshold;
pub mod watchdog;

// Re-export commonly used items
pub use config::*;
pub use control::{ControlState, Mode, SharedControl};
pub use controller::{AlarmController, Peripherals, Tick};
pub use devices::{Buzzer, CharDisplay};
pub use dispatch::{Deferred, DispatchQueue};
pub use encoder::{PulseCounter, QuadratureDecoder};
pub use ranging::{DistanceSensor, MicrosClock, RangingError, Ultrasonic};
pub use threshold::{Adjustment, ThresholdAdjuster};
pub use watchdog::{DeadlineWatchdog, SharedDeadline, Watchdog};
