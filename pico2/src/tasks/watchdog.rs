//! Hardware watchdog supervisor.
//!
//! The RP2350 watchdog cannot be set to the control loop's timeout, so it runs
//! with a short period and this task feeds it while the software deadline
//! (last `kick()` from the control loop) holds. Once the deadline lapses the
//! feeding stops and the chip resets within `HW_WATCHDOG_PERIOD_MS`.

use defmt::{info, warn};
use embassy_rp::watchdog::Watchdog;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use proximity_common::SharedDeadline;
use proximity_common::config::{HW_WATCHDOG_FEED_MS, HW_WATCHDOG_PERIOD_MS};

use crate::clock::EmbassyClock;

#[embassy_executor::task]
pub async fn watchdog_task(
    mut watchdog: Watchdog,
    deadline: &'static SharedDeadline<CriticalSectionRawMutex>,
) -> ! {
    watchdog.start(Duration::from_millis(u64::from(HW_WATCHDOG_PERIOD_MS)));
    info!("Watchdog supervisor started ({} ms hardware period)", HW_WATCHDOG_PERIOD_MS);

    let mut starving = false;
    loop {
        if deadline.should_feed(EmbassyClock::now_ms()) {
            watchdog.feed();
        } else if !starving {
            warn!("control loop missed its watchdog deadline, resetting");
            starving = true;
        }
        Timer::after_millis(u64::from(HW_WATCHDOG_FEED_MS)).await;
    }
}
