//! Async tasks for the proximity alarm firmware.
//!
//! These Embassy tasks run concurrently with the control loop in `main`:
//! - `button`: Debounced mode button edges, posted to the dispatch queue
//! - `dispatch`: Worker draining the dispatch queue
//! - `encoder`: Quadrature decoding of the rotary encoder
//! - `watchdog`: Feeds the hardware watchdog while the software deadline holds

pub mod button;
pub mod dispatch;
pub mod encoder;
pub mod watchdog;

pub use button::button_task;
pub use dispatch::dispatch_task;
pub use encoder::{EncoderCount, encoder_task};
pub use watchdog::watchdog_task;
