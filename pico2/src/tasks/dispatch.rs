//! Deferred-handler worker.

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use proximity_common::SharedControl;
use proximity_common::dispatch::{DispatchQueue, dispatch_forever};

/// Runs queued handlers one at a time, in arrival order, against the state
/// it was handed at spawn time.
#[embassy_executor::task]
pub async fn dispatch_task(
    queue: &'static DispatchQueue<CriticalSectionRawMutex>,
    shared: &'static SharedControl<CriticalSectionRawMutex>,
) -> ! {
    info!("Dispatch worker started");
    dispatch_forever(queue, shared).await
}
