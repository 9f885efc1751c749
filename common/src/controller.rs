//! Menu/Alarm state machine.
//!
//! One `step` is one iteration of the main control loop. The branch taken
//! follows `ControlState.mode`:
//!
//! - **Monitor**: wait, measure, print the distance, alarm if closer than the
//!   threshold, otherwise restore the banner if dirty, kick the watchdog.
//! - **Adjust**: restore the banner if dirty, silence the buzzer, wait, run
//!   the threshold adjuster, print the threshold, kick the watchdog if the
//!   policy says so.
//!
//! The top line is edge-triggered: it is only rewritten while the shared
//! dirty flag is set, and rewriting clears it.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::{
    ControllerConfig,
    DISTANCE_FIELD_WIDTH,
    NO_ECHO_TEXT,
    THRESHOLD_FIELD_WIDTH,
    WARNING_BANNER,
};
use crate::control::{Mode, SharedControl};
use crate::devices::{Buzzer, CharDisplay};
use crate::encoder::PulseCounter;
use crate::lcd::{number_field, text_field};
use crate::ranging::{DistanceSensor, RangingError};
use crate::threshold::{Adjustment, ThresholdAdjuster};
use crate::watchdog::Watchdog;

/// Row holding the banner / warning.
const TOP_ROW: u8 = 0;

/// Row holding the distance or threshold value.
const VALUE_ROW: u8 = 1;

/// Devices owned by the control loop.
pub struct Peripherals<D, B, W, S, P> {
    pub display: D,
    pub buzzer: B,
    pub watchdog: W,
    pub sensor: S,
    pub encoder: P,
}

/// Outcome of one loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    Monitor {
        reading: Result<u16, RangingError>,
        alarm: bool,
    },
    Adjust {
        threshold_cm: i32,
        adjustment: Adjustment,
    },
}

/// The main control loop and everything only it touches.
pub struct AlarmController<'a, M: RawMutex, D, B, W, S, P> {
    shared: &'a SharedControl<M>,
    io: Peripherals<D, B, W, S, P>,
    adjuster: ThresholdAdjuster,
    config: ControllerConfig,
    alarm: bool,
}

impl<'a, M, D, B, W, S, P> AlarmController<'a, M, D, B, W, S, P>
where
    M: RawMutex,
    D: CharDisplay,
    B: Buzzer,
    W: Watchdog,
    S: DistanceSensor,
    P: PulseCounter,
{
    pub fn new(
        shared: &'a SharedControl<M>,
        io: Peripherals<D, B, W, S, P>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            shared,
            io,
            adjuster: ThresholdAdjuster::new(),
            config,
            alarm: false,
        }
    }

    /// Replace the threshold adjuster (initial threshold and baseline).
    pub fn with_adjuster(
        mut self,
        adjuster: ThresholdAdjuster,
    ) -> Self {
        self.adjuster = adjuster;
        self
    }

    #[inline]
    pub const fn threshold_cm(&self) -> i32 { self.adjuster.threshold_cm() }

    #[inline]
    pub const fn peripherals(&self) -> &Peripherals<D, B, W, S, P> { &self.io }

    #[inline]
    pub fn peripherals_mut(&mut self) -> &mut Peripherals<D, B, W, S, P> { &mut self.io }

    /// Boot sequence: arm the watchdog, silence the buzzer, bring up the
    /// display with the banner of the current mode.
    pub fn start(&mut self) -> Result<(), D::Error> {
        self.io.watchdog.start(self.config.watchdog_timeout_ms);
        self.io.buzzer.deactivate();
        self.io.display.init()?;
        self.io.display.clear()?;
        self.io.display.print(self.shared.mode().banner())?;
        info!("controller started, threshold {} cm", self.adjuster.threshold_cm());
        Ok(())
    }

    /// One loop iteration.
    pub async fn step<T: DelayNs>(
        &mut self,
        delay: &mut T,
    ) -> Result<Tick, D::Error> {
        match self.shared.mode() {
            Mode::Monitor => self.monitor(delay).await,
            Mode::Adjust => self.adjust(delay).await,
        }
    }

    /// Iterate forever. Display errors are logged and the loop carries on.
    pub async fn run<T: DelayNs>(
        &mut self,
        delay: &mut T,
    ) -> ! {
        loop {
            if self.step(delay).await.is_err() {
                warn!("display write failed");
            }
        }
    }

    async fn monitor<T: DelayNs>(
        &mut self,
        delay: &mut T,
    ) -> Result<Tick, D::Error> {
        delay.delay_ms(self.config.monitor_poll_ms).await;

        let reading = self.io.sensor.measure();
        let alarm = matches!(reading, Ok(cm) if self.adjuster.is_too_close(cm));
        self.set_alarm(alarm, reading.unwrap_or(0));

        let rendered = self.render_monitor(reading, alarm);
        self.io.watchdog.kick();
        rendered?;

        Ok(Tick::Monitor { reading, alarm })
    }

    async fn adjust<T: DelayNs>(
        &mut self,
        delay: &mut T,
    ) -> Result<Tick, D::Error> {
        let banner = self.redraw_banner();
        self.set_alarm(false, 0);

        delay.delay_ms(self.config.adjust_poll_ms).await;

        let pulses = self.io.encoder.pulse_count();
        let adjustment = self.adjuster.update(pulses);
        let threshold_cm = self.adjuster.threshold_cm();

        let rendered = banner.and_then(|()| {
            let value = u32::try_from(threshold_cm).unwrap_or(0);
            self.print_value(&number_field(value, THRESHOLD_FIELD_WIDTH))
        });
        if self.config.watchdog_policy.kicks_in_adjust() {
            self.io.watchdog.kick();
        }
        rendered?;

        Ok(Tick::Adjust {
            threshold_cm,
            adjustment,
        })
    }

    /// Drive the buzzer; logs on alarm edges only.
    fn set_alarm(
        &mut self,
        alarm: bool,
        distance_cm: u16,
    ) {
        if alarm {
            self.io.buzzer.activate();
            if !self.alarm {
                warn!("too close: {} < {} cm", distance_cm, self.adjuster.threshold_cm());
            }
        } else {
            self.io.buzzer.deactivate();
            if self.alarm {
                info!("alarm cleared");
            }
        }
        self.alarm = alarm;
    }

    fn render_monitor(
        &mut self,
        reading: Result<u16, RangingError>,
        alarm: bool,
    ) -> Result<(), D::Error> {
        // Top line first: restoring the banner clears the whole display
        if alarm {
            // Warning overwrites the banner; restore it once clear
            self.shared.mark_dirty();
            self.io.display.set_cursor(0, TOP_ROW)?;
            self.io.display.print(WARNING_BANNER)?;
        } else {
            self.redraw_banner()?;
        }

        let field = match reading {
            Ok(cm) => {
                debug!("distance {} cm", cm);
                number_field(u32::from(cm), DISTANCE_FIELD_WIDTH)
            }
            Err(_) => text_field(NO_ECHO_TEXT, DISTANCE_FIELD_WIDTH),
        };
        self.print_value(&field)
    }

    fn print_value(
        &mut self,
        field: &str,
    ) -> Result<(), D::Error> {
        self.io.display.set_cursor(0, VALUE_ROW)?;
        self.io.display.print(field)
    }

    /// Rewrite the top line if dirty. A failed write leaves it dirty.
    fn redraw_banner(&mut self) -> Result<(), D::Error> {
        let Some(mode) = self.shared.take_redraw() else {
            return Ok(());
        };
        let drawn = self.draw_banner(mode);
        if drawn.is_err() {
            self.shared.mark_dirty();
        }
        drawn
    }

    fn draw_banner(
        &mut self,
        mode: Mode,
    ) -> Result<(), D::Error> {
        self.io.display.clear()?;
        self.io.display.print(mode.banner())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::*;
    use crate::config::{ADJUST_BANNER, MONITOR_BANNER, WATCHDOG_TIMEOUT_MS, WatchdogPolicy};
    use crate::dispatch::{Deferred, DispatchQueue, post, run_pending};
    use crate::lcd::TextLcd;

    /// Virtual milliseconds shared by the fake delay and watchdog.
    #[derive(Clone, Default)]
    struct VirtualTime(Rc<Cell<u64>>);

    impl VirtualTime {
        fn now(&self) -> u64 { self.0.get() }
    }

    struct FakeDelay {
        time: VirtualTime,
        waits: Vec<u32>,
    }

    impl DelayNs for FakeDelay {
        async fn delay_ns(
            &mut self,
            ns: u32,
        ) {
            self.time.0.set(self.time.now() + u64::from(ns / 1_000_000));
        }

        async fn delay_ms(
            &mut self,
            ms: u32,
        ) {
            self.waits.push(ms);
            self.time.0.set(self.time.now() + u64::from(ms));
        }
    }

    #[derive(Default)]
    struct FakeBuzzer {
        active: bool,
        activations: u32,
    }

    impl Buzzer for FakeBuzzer {
        fn activate(&mut self) {
            self.active = true;
            self.activations += 1;
        }

        fn deactivate(&mut self) { self.active = false; }
    }

    #[derive(Default)]
    struct FakeWatchdog {
        time: VirtualTime,
        timeout_ms: Option<u32>,
        kicks: Vec<u64>,
    }

    impl Watchdog for FakeWatchdog {
        fn start(
            &mut self,
            timeout_ms: u32,
        ) {
            self.timeout_ms = Some(timeout_ms);
        }

        fn kick(&mut self) { self.kicks.push(self.time.now()); }
    }

    /// Replays queued readings, then repeats the fallback.
    struct FakeSensor {
        queued: VecDeque<Result<u16, RangingError>>,
        fallback: Result<u16, RangingError>,
    }

    impl FakeSensor {
        fn constant(cm: u16) -> Self {
            Self {
                queued: VecDeque::new(),
                fallback: Ok(cm),
            }
        }
    }

    impl DistanceSensor for FakeSensor {
        fn measure(&mut self) -> Result<u16, RangingError> { self.queued.pop_front().unwrap_or(self.fallback) }
    }

    #[derive(Default)]
    struct FakeEncoder(i32);

    impl PulseCounter for FakeEncoder {
        fn pulse_count(&mut self) -> i32 { self.0 }
    }

    /// Display whose writes fail while `broken` is set.
    #[derive(Default)]
    struct FlakyDisplay {
        lcd: TextLcd,
        broken: bool,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct BusError;

    impl FlakyDisplay {
        fn check(&self) -> Result<(), BusError> { if self.broken { Err(BusError) } else { Ok(()) } }
    }

    impl CharDisplay for FlakyDisplay {
        type Error = BusError;

        fn init(&mut self) -> Result<(), BusError> {
            self.check()?;
            self.lcd.init().map_err(|_| BusError)
        }

        fn clear(&mut self) -> Result<(), BusError> {
            self.check()?;
            self.lcd.clear().map_err(|_| BusError)
        }

        fn set_cursor(
            &mut self,
            col: u8,
            row: u8,
        ) -> Result<(), BusError> {
            self.check()?;
            self.lcd.set_cursor(col, row).map_err(|_| BusError)
        }

        fn print(
            &mut self,
            text: &str,
        ) -> Result<(), BusError> {
            self.check()?;
            self.lcd.print(text).map_err(|_| BusError)
        }

        fn set_backlight(
            &mut self,
            on: bool,
        ) -> Result<(), BusError> {
            self.check()?;
            self.lcd.set_backlight(on).map_err(|_| BusError)
        }
    }

    type Controller<'a, D = TextLcd> = AlarmController<'a, NoopRawMutex, D, FakeBuzzer, FakeWatchdog, FakeSensor, FakeEncoder>;

    struct Rig {
        time: VirtualTime,
        delay: FakeDelay,
    }

    impl Rig {
        fn new() -> Self {
            let time = VirtualTime::default();
            Self {
                delay: FakeDelay {
                    time: time.clone(),
                    waits: Vec::new(),
                },
                time,
            }
        }

        fn controller<'a, D: CharDisplay + Default>(
            &self,
            shared: &'a SharedControl<NoopRawMutex>,
            sensor: FakeSensor,
            config: ControllerConfig,
        ) -> Controller<'a, D> {
            let io = Peripherals {
                display: D::default(),
                buzzer: FakeBuzzer::default(),
                watchdog: FakeWatchdog {
                    time: self.time.clone(),
                    ..FakeWatchdog::default()
                },
                sensor,
                encoder: FakeEncoder::default(),
            };
            let mut controller = AlarmController::new(shared, io, config);
            controller.start().unwrap();
            controller
        }

        fn step<D: CharDisplay>(
            &mut self,
            controller: &mut Controller<'_, D>,
        ) -> Result<Tick, D::Error> {
            block_on(controller.step(&mut self.delay))
        }
    }

    #[test]
    fn test_start_sequence() {
        let shared = SharedControl::new();
        let rig = Rig::new();
        let controller: Controller = rig.controller(&shared, FakeSensor::constant(250), ControllerConfig::default());

        let io = controller.peripherals();
        assert!(io.display.is_initialized());
        assert_eq!(io.display.line(0).trim_end(), MONITOR_BANNER);
        assert_eq!(io.watchdog.timeout_ms, Some(WATCHDOG_TIMEOUT_MS));
        assert!(!io.buzzer.active);
        assert_eq!(controller.threshold_cm(), 183);
    }

    #[test]
    fn test_near_object_raises_alarm() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(100), ControllerConfig::default());

        let tick = rig.step(&mut controller).unwrap();
        assert_eq!(
            tick,
            Tick::Monitor {
                reading: Ok(100),
                alarm: true
            }
        );

        let io = controller.peripherals();
        assert!(io.buzzer.active);
        assert_eq!(io.display.line(0), WARNING_BANNER);
        assert_eq!(io.display.line(1).trim_end(), "100");
        assert!(shared.snapshot().display_dirty);
    }

    #[test]
    fn test_far_object_restores_banner() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let sensor = FakeSensor {
            queued: VecDeque::from([Ok(100)]),
            fallback: Ok(200),
        };
        let mut controller: Controller = rig.controller(&shared, sensor, ControllerConfig::default());

        rig.step(&mut controller).unwrap();
        let tick = rig.step(&mut controller).unwrap();
        assert_eq!(
            tick,
            Tick::Monitor {
                reading: Ok(200),
                alarm: false
            }
        );

        let io = controller.peripherals();
        assert!(!io.buzzer.active);
        assert_eq!(io.display.line(0).trim_end(), MONITOR_BANNER);
        assert_eq!(io.display.line(1).trim_end(), "200");
        assert!(!shared.snapshot().display_dirty);
    }

    #[test]
    fn test_threshold_boundary_is_not_an_alarm() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(183), ControllerConfig::default());
        let tick = rig.step(&mut controller).unwrap();
        assert!(matches!(tick, Tick::Monitor { alarm: false, .. }));
    }

    #[test]
    fn test_banner_is_edge_triggered() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());
        let clears_after_start = controller.peripherals().display.clears();

        for _ in 0..10 {
            rig.step(&mut controller).unwrap();
        }
        assert_eq!(controller.peripherals().display.clears(), clears_after_start);
        // Only the value line is rewritten: one print per iteration
        assert_eq!(controller.peripherals().display.prints(), 1 + 10);
    }

    #[test]
    fn test_distance_field_erases_stale_digits() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let sensor = FakeSensor {
            queued: VecDeque::from([Ok(1024), Ok(250)]),
            fallback: Ok(9),
        };
        let mut controller: Controller = rig.controller(&shared, sensor, ControllerConfig::default());

        rig.step(&mut controller).unwrap();
        assert_eq!(controller.peripherals().display.line(1).trim_end(), "1024");
        rig.step(&mut controller).unwrap();
        assert_eq!(controller.peripherals().display.line(1).trim_end(), "250");
        rig.step(&mut controller).unwrap();
        // Warning fired at 9 cm; value line still shows only the new digit
        assert_eq!(&controller.peripherals().display.line(1)[..4], "9   ");
    }

    #[test]
    fn test_no_echo_shows_dashes_without_alarm() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let sensor = FakeSensor {
            queued: VecDeque::new(),
            fallback: Err(RangingError::NoEcho),
        };
        let mut controller: Controller = rig.controller(&shared, sensor, ControllerConfig::default());

        let tick = rig.step(&mut controller).unwrap();
        assert_eq!(
            tick,
            Tick::Monitor {
                reading: Err(RangingError::NoEcho),
                alarm: false
            }
        );
        let io = controller.peripherals();
        assert_eq!(io.display.line(1).trim_end(), NO_ECHO_TEXT);
        assert!(!io.buzzer.active);
        assert_eq!(io.watchdog.kicks.len(), 1);
    }

    #[test]
    fn test_monitor_waits_before_measuring() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());
        rig.step(&mut controller).unwrap();
        assert_eq!(rig.delay.waits, vec![300]);
    }

    #[test]
    fn test_adjust_mode_changes_threshold() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(100), ControllerConfig::default());
        rig.step(&mut controller).unwrap();
        assert!(controller.peripherals().buzzer.active);

        shared.toggle_mode();
        controller.peripherals_mut().encoder.0 = 3;
        let tick = rig.step(&mut controller).unwrap();
        assert_eq!(
            tick,
            Tick::Adjust {
                threshold_cm: 184,
                adjustment: Adjustment::Raised
            }
        );

        let io = controller.peripherals();
        assert!(!io.buzzer.active);
        assert_eq!(io.display.line(0).trim_end(), ADJUST_BANNER);
        assert_eq!(io.display.line(1).trim_end(), "184");
        assert_eq!(rig.delay.waits, vec![300, 50]);
    }

    #[test]
    fn test_adjust_direction_per_iteration() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());
        shared.toggle_mode();

        for (pulses, expected) in [(1, 184), (5, 185), (5, 185), (2, 184), (-10, 183), (-10, 183)] {
            controller.peripherals_mut().encoder.0 = pulses;
            let tick = rig.step(&mut controller).unwrap();
            assert!(matches!(tick, Tick::Adjust { threshold_cm, .. } if threshold_cm == expected));
        }
    }

    #[test]
    fn test_threshold_value_narrows_in_place() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());
        controller = controller.with_adjuster(ThresholdAdjuster::with_threshold(100));
        shared.toggle_mode();

        controller.peripherals_mut().encoder.0 = -1;
        rig.step(&mut controller).unwrap();
        assert_eq!(controller.peripherals().display.line(1).trim_end(), "99");
    }

    #[test]
    fn test_adjust_clamps_out_of_range_threshold() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());
        controller = controller.with_adjuster(ThresholdAdjuster::with_threshold(1_000));
        shared.toggle_mode();

        controller.peripherals_mut().encoder.0 = 8;
        let tick = rig.step(&mut controller).unwrap();
        assert_eq!(
            tick,
            Tick::Adjust {
                threshold_cm: 400,
                adjustment: Adjustment::ClampedHigh
            }
        );
        assert_eq!(controller.peripherals().display.line(1).trim_end(), "400");
    }

    #[test]
    fn test_new_threshold_applies_to_monitor() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(183), ControllerConfig::default());

        shared.toggle_mode();
        controller.peripherals_mut().encoder.0 = 1;
        rig.step(&mut controller).unwrap();
        shared.toggle_mode();

        let tick = rig.step(&mut controller).unwrap();
        assert!(matches!(tick, Tick::Monitor { alarm: true, .. }));
    }

    #[test]
    fn test_button_press_through_dispatch_queue() {
        let shared = SharedControl::new();
        let queue: DispatchQueue<NoopRawMutex> = DispatchQueue::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(300), ControllerConfig::default());

        post(&queue, Deferred::ToggleMode);
        // Not yet handled by the worker
        assert!(matches!(rig.step(&mut controller).unwrap(), Tick::Monitor { .. }));

        run_pending(&queue, &shared);
        assert!(matches!(rig.step(&mut controller).unwrap(), Tick::Adjust { .. }));
        assert_eq!(controller.peripherals().display.line(0).trim_end(), ADJUST_BANNER);

        post(&queue, Deferred::ToggleMode);
        run_pending(&queue, &shared);
        assert!(matches!(rig.step(&mut controller).unwrap(), Tick::Monitor { .. }));
        assert_eq!(controller.peripherals().display.line(0).trim_end(), MONITOR_BANNER);
        assert_eq!(shared.snapshot().toggle_parity, 0);
    }

    #[test]
    fn test_watchdog_kicked_every_monitor_iteration() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(250), ControllerConfig::default());

        // 30 s of monitoring
        while rig.time.now() < 30_000 {
            rig.step(&mut controller).unwrap();
        }

        let kicks = &controller.peripherals().watchdog.kicks;
        assert_eq!(kicks.len(), 100);
        let mut last = 0;
        for &kick in kicks {
            assert!(kick - last <= 300);
            last = kick;
        }
    }

    #[test]
    fn test_reference_policy_never_kicks_in_adjust() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let config = ControllerConfig::default().with_policy(WatchdogPolicy::MonitorOnly);
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(250), config);
        shared.toggle_mode();

        while rig.time.now() < 30_000 {
            rig.step(&mut controller).unwrap();
        }
        assert!(controller.peripherals().watchdog.kicks.is_empty());
    }

    #[test]
    fn test_default_policy_kicks_in_adjust() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller = rig.controller(&shared, FakeSensor::constant(250), ControllerConfig::default());
        shared.toggle_mode();

        while rig.time.now() < 30_000 {
            rig.step(&mut controller).unwrap();
        }

        let kicks = &controller.peripherals().watchdog.kicks;
        assert_eq!(kicks.len(), 600);
        assert!(kicks.windows(2).all(|pair| pair[1] - pair[0] <= 50));
    }

    #[test]
    fn test_display_error_still_kicks_and_keeps_banner_dirty() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller<FlakyDisplay> =
            rig.controller(&shared, FakeSensor::constant(250), ControllerConfig::default());

        shared.toggle_mode();
        controller.peripherals_mut().display.broken = true;
        assert_eq!(rig.step(&mut controller), Err(BusError));
        assert_eq!(controller.peripherals().watchdog.kicks.len(), 1);
        assert!(shared.snapshot().display_dirty);

        controller.peripherals_mut().display.broken = false;
        rig.step(&mut controller).unwrap();
        assert_eq!(controller.peripherals().display.lcd.line(0).trim_end(), ADJUST_BANNER);
        assert!(!shared.snapshot().display_dirty);
    }

    #[test]
    fn test_buzzer_follows_alarm_despite_display_error() {
        let shared = SharedControl::new();
        let mut rig = Rig::new();
        let mut controller: Controller<FlakyDisplay> =
            rig.controller(&shared, FakeSensor::constant(20), ControllerConfig::default());

        controller.peripherals_mut().display.broken = true;
        assert!(rig.step(&mut controller).is_err());
        assert!(controller.peripherals().buzzer.active);
        assert_eq!(controller.peripherals().watchdog.kicks.len(), 1);
    }
}
