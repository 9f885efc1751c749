//! Proximity alarm library - testable modules for the Pico 2 firmware.
//!
//! This library contains the hardware-facing logic that can be tested on the
//! host machine. The binary (`main.rs`) uses this library and adds the
//! embedded-specific code.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p proximity-pico2 --lib --target x86_64-unknown-linux-gnu  # Linux/macOS
//! cargo test -p proximity-pico2 --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

pub mod button;

mod drivers {
    pub mod lcd1602;
}

pub use drivers::lcd1602;
