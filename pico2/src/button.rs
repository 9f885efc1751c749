//! Mode button debounce.
//!
//! Time-based edge detection: a level change is accepted only if the previous
//! accepted change is at least `BUTTON_DEBOUNCE_MS` old. Time is passed in so
//! the logic runs on the host.

use proximity_common::config::BUTTON_DEBOUNCE_MS;

/// Button debounce state with time-based edge detection.
pub struct ButtonState {
    was_pressed: bool,
    last_change_ms: Option<u64>,
}

impl ButtonState {
    /// Create a new button state (not pressed).
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change_ms: None,
        }
    }

    /// Returns true only on an accepted press edge.
    ///
    /// The button is wired active-high with a pull-down, so `is_high` means
    /// pressed.
    pub fn just_pressed(
        &mut self,
        is_high: bool,
        now_ms: u64,
    ) -> bool {
        if is_high == self.was_pressed {
            return false;
        }

        if let Some(last) = self.last_change_ms
            && now_ms.saturating_sub(last) < BUTTON_DEBOUNCE_MS
        {
            return false;
        }

        self.was_pressed = is_high;
        self.last_change_ms = Some(now_ms);
        is_high
    }
}

impl Default for ButtonState {
    fn default() -> Self { Self::new() }
}
