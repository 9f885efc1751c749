//! Ultrasonic time-of-flight ranging.
//!
//! Drives the trigger line for a short pulse, then busy-waits on both echo
//! edges. Each wait is bounded, so a disconnected sensor yields
//! `RangingError::NoEcho` instead of hanging the control loop.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{ECHO_TIMEOUT_US, SOUND_CM_PER_US, TRIGGER_PULSE_US};

/// Free-running microsecond time source.
pub trait MicrosClock {
    fn now_us(&mut self) -> u64;
}

/// Why a measurement produced no distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingError {
    /// Echo line never went high after the trigger.
    NoEcho,
    /// Echo line went high but never came back low.
    EchoTooLong,
    /// GPIO access failed.
    Pin,
}

/// Anything that can produce a distance sample in centimeters.
pub trait DistanceSensor {
    fn measure(&mut self) -> Result<u16, RangingError>;
}

/// Convert an echo pulse width to centimeters, truncating toward zero.
#[inline]
pub fn echo_to_cm(elapsed_us: u64) -> u16 { (elapsed_us as f32 * SOUND_CM_PER_US / 2.0) as u16 }

/// HC-SR04 style sensor on a trigger output and an echo input.
pub struct Ultrasonic<T, E, C, D> {
    trigger: T,
    echo: E,
    clock: C,
    delay: D,
    timeout_us: u32,
}

impl<T, E, C, D> Ultrasonic<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MicrosClock,
    D: DelayNs,
{
    pub fn new(
        trigger: T,
        echo: E,
        clock: C,
        delay: D,
    ) -> Self {
        Self {
            trigger,
            echo,
            clock,
            delay,
            timeout_us: ECHO_TIMEOUT_US,
        }
    }

    /// Override the per-edge wait bound.
    pub fn with_timeout_us(
        mut self,
        timeout_us: u32,
    ) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Pull the trigger line low, ready for the first measurement.
    pub fn idle(&mut self) -> Result<(), RangingError> { self.trigger.set_low().map_err(|_| RangingError::Pin) }

    /// One blocking measurement.
    pub fn measure_cm(&mut self) -> Result<u16, RangingError> {
        self.trigger.set_high().map_err(|_| RangingError::Pin)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| RangingError::Pin)?;

        let armed = self.clock.now_us();
        let start = self.wait_for_level(true, armed).ok_or(RangingError::NoEcho)??;
        let end = self.wait_for_level(false, start).ok_or(RangingError::EchoTooLong)??;

        let elapsed = end.saturating_sub(start);
        let distance = echo_to_cm(elapsed);
        debug!("echo {} us -> {} cm", elapsed, distance);
        Ok(distance)
    }

    /// Spin until the echo line reads `high`, returning the time it did.
    /// `None` once `timeout_us` has passed since `since`.
    fn wait_for_level(
        &mut self,
        high: bool,
        since: u64,
    ) -> Option<Result<u64, RangingError>> {
        loop {
            let level = match self.echo.is_high() {
                Ok(level) => level,
                Err(_) => return Some(Err(RangingError::Pin)),
            };
            let now = self.clock.now_us();
            if level == high {
                return Some(Ok(now));
            }
            if now.saturating_sub(since) > u64::from(self.timeout_us) {
                return None;
            }
        }
    }

    /// Give the pins back.
    pub fn release(self) -> (T, E) { (self.trigger, self.echo) }
}

impl<T, E, C, D> DistanceSensor for Ultrasonic<T, E, C, D>
where
    T: OutputPin,
    E: InputPin,
    C: MicrosClock,
    D: DelayNs,
{
    fn measure(&mut self) -> Result<u16, RangingError> {
        let result = self.measure_cm();
        if let Err(err) = result {
            warn!("ranging failed: {}", err);
        }
        result
    }
}
