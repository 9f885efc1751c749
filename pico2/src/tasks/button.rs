//! Mode button edge task.

use defmt::{debug, info};
use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use proximity_common::dispatch::{Deferred, DispatchQueue, post};
use proximity_pico2::button::ButtonState;

/// Waits for edges on the button and posts a mode toggle for each accepted
/// press. Only the post happens here; the handler runs on the worker.
#[embassy_executor::task]
pub async fn button_task(
    mut button: Input<'static>,
    queue: &'static DispatchQueue<CriticalSectionRawMutex>,
) -> ! {
    info!("Button task started");
    let mut state = ButtonState::new();

    loop {
        button.wait_for_any_edge().await;
        if state.just_pressed(button.is_high(), Instant::now().as_millis()) {
            debug!("button pressed");
            post(queue, Deferred::ToggleMode);
        }
    }
}
