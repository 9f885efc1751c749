//! Threshold adjustment from the rotary encoder.
//!
//! Owned by the main loop only; needs no locking.

use crate::config::{DEFAULT_THRESHOLD_CM, THRESHOLD_MAX_CM, THRESHOLD_MIN_CM};

/// What one adjuster iteration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Adjustment {
    /// Threshold was below the floor and was raised to it.
    ClampedLow,
    /// Threshold was above the ceiling and was lowered to it.
    ClampedHigh,
    /// Encoder turned clockwise, threshold went up by one.
    Raised,
    /// Encoder turned counter-clockwise, threshold went down by one.
    Lowered,
    /// Encoder turned but the threshold already sits on that bound.
    AtLimit,
    /// Encoder did not move.
    Unchanged,
}

impl Adjustment {
    /// Whether the threshold value changed.
    #[inline]
    pub const fn changed(self) -> bool { !matches!(self, Self::AtLimit | Self::Unchanged) }
}

/// Distance threshold plus the encoder baseline it is adjusted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdAdjuster {
    threshold_cm: i32,
    baseline: i32,
}

impl ThresholdAdjuster {
    pub const fn new() -> Self { Self::with_threshold(DEFAULT_THRESHOLD_CM) }

    /// Start from an arbitrary value. Out-of-range values are corrected by the
    /// next `update`.
    pub const fn with_threshold(threshold_cm: i32) -> Self {
        Self {
            threshold_cm,
            baseline: 0,
        }
    }

    #[inline]
    pub const fn threshold_cm(&self) -> i32 { self.threshold_cm }

    #[inline]
    pub const fn baseline(&self) -> i32 { self.baseline }

    /// One Adjust-mode iteration against the current cumulative pulse count.
    ///
    /// Clamp-low, clamp-high and direction are checked in that order and only
    /// the first that applies runs. A clamp leaves the baseline untouched, so
    /// the pending rotation is applied on the next iteration.
    pub fn update(
        &mut self,
        pulses: i32,
    ) -> Adjustment {
        if self.threshold_cm < THRESHOLD_MIN_CM {
            self.threshold_cm = THRESHOLD_MIN_CM;
            return Adjustment::ClampedLow;
        }
        if self.threshold_cm > THRESHOLD_MAX_CM {
            self.threshold_cm = THRESHOLD_MAX_CM;
            return Adjustment::ClampedHigh;
        }
        if pulses == self.baseline {
            return Adjustment::Unchanged;
        }

        let clockwise = pulses > self.baseline;
        self.baseline = pulses;

        match (clockwise, self.threshold_cm) {
            (true, THRESHOLD_MAX_CM) | (false, THRESHOLD_MIN_CM) => Adjustment::AtLimit,
            (true, _) => {
                self.threshold_cm += 1;
                info!("threshold {} cm", self.threshold_cm);
                Adjustment::Raised
            }
            (false, _) => {
                self.threshold_cm -= 1;
                info!("threshold {} cm", self.threshold_cm);
                Adjustment::Lowered
            }
        }
    }

    /// Whether `distance_cm` is closer than the threshold.
    #[inline]
    pub const fn is_too_close(
        &self,
        distance_cm: u16,
    ) -> bool {
        (distance_cm as i32) < self.threshold_cm
    }
}

impl Default for ThresholdAdjuster {
    fn default() -> Self { Self::new() }
}
