//! Time sources for the control core.

use embassy_time::Instant;
use proximity_common::MicrosClock;

/// Microseconds since boot from the embassy time driver.
#[derive(Clone, Copy)]
pub struct EmbassyClock;

impl EmbassyClock {
    pub fn now_ms() -> u32 { Instant::now().as_millis() as u32 }
}

impl MicrosClock for EmbassyClock {
    fn now_us(&mut self) -> u64 { Instant::now().as_micros() }
}
