//! Rotary encoder task and the pulse count it publishes.

use core::sync::atomic::{AtomicI32, Ordering};

use defmt::info;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use proximity_common::{PulseCounter, QuadratureDecoder};

/// Cumulative count, written by the encoder task only.
static ENCODER_COUNT: AtomicI32 = AtomicI32::new(0);

/// Decodes both channels on every edge.
#[embassy_executor::task]
pub async fn encoder_task(
    mut a: Input<'static>,
    mut b: Input<'static>,
) -> ! {
    info!("Encoder task started");
    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;
        if decoder.update(a.is_high(), b.is_high()) != 0 {
            ENCODER_COUNT.store(decoder.count(), Ordering::Relaxed);
        }
    }
}

/// Read side of the encoder count for the control loop.
pub struct EncoderCount;

impl PulseCounter for EncoderCount {
    fn pulse_count(&mut self) -> i32 { ENCODER_COUNT.load(Ordering::Relaxed) }
}
