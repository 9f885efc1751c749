//! Rotary encoder pulse counting.
//!
//! `QuadratureDecoder` turns channel A/B levels into a signed cumulative
//! count (4 counts per full quadrature cycle). Only the direction of the
//! count matters to the threshold adjuster.

/// Source of the cumulative encoder pulse count.
pub trait PulseCounter {
    fn pulse_count(&mut self) -> i32;
}

/// Count change for each `(previous << 2) | current` A/B state pair.
/// Zero entries are no-ops or invalid double steps.
const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

/// 4x quadrature state-table decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadratureDecoder {
    state: u8,
    count: i32,
}

impl QuadratureDecoder {
    /// Start from the current channel levels.
    pub const fn new(
        a: bool,
        b: bool,
    ) -> Self {
        Self {
            state: Self::encode(a, b),
            count: 0,
        }
    }

    #[inline]
    const fn encode(
        a: bool,
        b: bool,
    ) -> u8 {
        ((a as u8) << 1) | b as u8
    }

    /// Feed new channel levels. Returns the count change (-1, 0 or 1).
    pub fn update(
        &mut self,
        a: bool,
        b: bool,
    ) -> i8 {
        let next = Self::encode(a, b);
        let step = TRANSITIONS[usize::from((self.state << 2) | next)];
        self.state = next;
        self.count = self.count.wrapping_add(i32::from(step));
        step
    }

    #[inline]
    pub const fn count(&self) -> i32 { self.count }
}

impl PulseCounter for QuadratureDecoder {
    fn pulse_count(&mut self) -> i32 { self.count }
}
