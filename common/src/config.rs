//! Compile-time defaults and runtime controller configuration.
//!
//! All values are `const` with compile-time assertions on their ordering, so a
//! bad edit fails the build instead of misbehaving on the device.

// =============================================================================
// Threshold
// =============================================================================

/// Default alarm threshold in centimeters (6 ft).
pub const DEFAULT_THRESHOLD_CM: i32 = 183;

/// Smallest settable threshold (1 ft).
pub const THRESHOLD_MIN_CM: i32 = 31;

/// Largest settable threshold, the sensor's maximum range.
pub const THRESHOLD_MAX_CM: i32 = 400;

const _: () = assert!(THRESHOLD_MIN_CM < DEFAULT_THRESHOLD_CM);
const _: () = assert!(DEFAULT_THRESHOLD_CM < THRESHOLD_MAX_CM);

// =============================================================================
// Loop Timing
// =============================================================================

/// Watchdog timeout. The process restarts if `kick()` is not called within it.
pub const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

/// Pause before each Monitor-mode measurement.
pub const MONITOR_POLL_MS: u32 = 300;

/// Pause before each Adjust-mode encoder read (knob turning speed).
pub const ADJUST_POLL_MS: u32 = 50;

const _: () = assert!(ADJUST_POLL_MS < MONITOR_POLL_MS);
const _: () = assert!(MONITOR_POLL_MS < WATCHDOG_TIMEOUT_MS);

/// Period at which the supervisor feeds the hardware watchdog.
pub const HW_WATCHDOG_FEED_MS: u32 = 1_000;

/// Hardware watchdog period. Must stay below the RP2350 limit (~16.7 s).
pub const HW_WATCHDOG_PERIOD_MS: u32 = 3_000;

const _: () = assert!(HW_WATCHDOG_FEED_MS < HW_WATCHDOG_PERIOD_MS);
const _: () = assert!(HW_WATCHDOG_PERIOD_MS < WATCHDOG_TIMEOUT_MS);

// =============================================================================
// Ranging
// =============================================================================

/// Width of the trigger pulse.
pub const TRIGGER_PULSE_US: u32 = 10;

/// Speed of sound in centimeters per microsecond.
pub const SOUND_CM_PER_US: f32 = 0.03432;

/// Maximum range of the sensor.
pub const MAX_RANGE_CM: f32 = 400.0;

/// Margin applied on top of the round-trip time at maximum range.
const ECHO_TIMEOUT_FACTOR: f32 = 1.5;

/// Upper bound for each echo edge wait.
///
/// Round trip at maximum range (~23.3 ms) times the safety factor.
pub const ECHO_TIMEOUT_US: u32 = (2.0 * MAX_RANGE_CM / SOUND_CM_PER_US * ECHO_TIMEOUT_FACTOR) as u32;

const _: () = assert!(ECHO_TIMEOUT_US / 1000 < MONITOR_POLL_MS);

// =============================================================================
// Display
// =============================================================================

/// Character columns of the LCD.
pub const LCD_COLS: u8 = 16;

/// Character rows of the LCD.
pub const LCD_ROWS: u8 = 2;

/// Top line while monitoring.
pub const MONITOR_BANNER: &str = "Social Distance";

/// Top line while adjusting the threshold.
pub const ADJUST_BANNER: &str = "Set new distance";

/// Top line while an object is too close.
pub const WARNING_BANNER: &str = "Please Back Up! ";

const _: () = assert!(MONITOR_BANNER.len() <= LCD_COLS as usize);
const _: () = assert!(ADJUST_BANNER.len() <= LCD_COLS as usize);
const _: () = assert!(WARNING_BANNER.len() <= LCD_COLS as usize);

/// Digits reserved for the distance on the second line.
pub const DISTANCE_FIELD_WIDTH: u8 = 4;

/// Digits reserved for the threshold on the second line.
pub const THRESHOLD_FIELD_WIDTH: u8 = 3;

/// Shown in the distance field when no echo came back.
pub const NO_ECHO_TEXT: &str = "----";

// =============================================================================
// Dispatch
// =============================================================================

/// Capacity of the deferred-handler queue.
pub const DISPATCH_QUEUE_DEPTH: usize = 32;

/// Minimum spacing between two accepted button edges.
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// =============================================================================
// Runtime Configuration
// =============================================================================

/// When the control loop kicks the watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogPolicy {
    /// Only Monitor iterations kick. Dwelling in Adjust mode longer than the
    /// timeout resets the device.
    MonitorOnly,
    /// Every iteration kicks, regardless of mode.
    #[default]
    EveryIteration,
}

impl WatchdogPolicy {
    /// Whether an iteration in Adjust mode kicks the watchdog.
    #[inline]
    pub const fn kicks_in_adjust(self) -> bool { matches!(self, Self::EveryIteration) }
}

/// Tunables of the Menu/Alarm state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub monitor_poll_ms: u32,
    pub adjust_poll_ms: u32,
    pub watchdog_timeout_ms: u32,
    pub watchdog_policy: WatchdogPolicy,
}

impl ControllerConfig {
    pub const fn new() -> Self {
        Self {
            monitor_poll_ms: MONITOR_POLL_MS,
            adjust_poll_ms: ADJUST_POLL_MS,
            watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
            watchdog_policy: WatchdogPolicy::EveryIteration,
        }
    }

    /// Same timings, reference watchdog behavior.
    pub const fn with_policy(
        mut self,
        policy: WatchdogPolicy,
    ) -> Self {
        self.watchdog_policy = policy;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self { Self::new() }
}
