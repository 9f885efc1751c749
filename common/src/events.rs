//! Recent-event ring buffer.
//!
//! Keeps the last few notable events (mode switches, alarm edges, watchdog
//! resets) as short text lines so a front end can show them next to the LCD,
//! and turns each control-loop tick into a printable trace line.

use heapless::{Deque, String};

use crate::config::NO_ECHO_TEXT;
use crate::control::Mode;
use crate::controller::Tick;
use crate::lcd::push_u32;
use crate::ranging::RangingError;

/// Number of events kept.
pub const EVENT_LOG_SIZE: usize = 8;

/// Maximum characters per event line.
pub const EVENT_LINE_LENGTH: usize = 40;

pub type EventLine = String<EVENT_LINE_LENGTH>;

/// Bounded event log, oldest dropped first.
pub struct EventLog {
    buffer: Deque<EventLine, EVENT_LOG_SIZE>,
}

impl EventLog {
    pub const fn new() -> Self { Self { buffer: Deque::new() } }

    /// Append `msg`, truncated to fit a line.
    pub fn push(
        &mut self,
        msg: &str,
    ) {
        if self.buffer.is_full() {
            self.buffer.pop_front();
        }

        let mut line = EventLine::new();
        for c in msg.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        self.buffer.push_back(line).ok();
    }

    /// `label` followed by a decimal value.
    pub fn push_value(
        &mut self,
        label: &str,
        value: u32,
    ) {
        self.push(&value_line(label, value));
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.buffer.iter().map(heapless::string::StringInner::as_str) }

    #[inline]
    pub fn len(&self) -> usize { self.buffer.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.buffer.is_empty() }

    pub fn clear(&mut self) { self.buffer.clear() }
}

impl Default for EventLog {
    fn default() -> Self { Self::new() }
}

/// Tracks consecutive ticks and reports what they show.
///
/// Every tick yields a trace line (each Monitor distance, each threshold
/// change). Mode switches, alarm edges and the first missing echo are also
/// kept in the `EventLog`.
#[derive(Default)]
pub struct TickRecorder {
    mode: Option<Mode>,
    alarm: bool,
    no_echo: bool,
    threshold_cm: Option<i32>,
}

impl TickRecorder {
    pub const fn new() -> Self {
        Self {
            mode: None,
            alarm: false,
            no_echo: false,
            threshold_cm: None,
        }
    }

    /// Record `tick`. Every line produced goes to `emit`; notable ones are
    /// pushed to `log` as well.
    pub fn record(
        &mut self,
        tick: &Tick,
        log: &mut EventLog,
        mut emit: impl FnMut(&str),
    ) {
        let mode = match tick {
            Tick::Monitor { .. } => Mode::Monitor,
            Tick::Adjust { .. } => Mode::Adjust,
        };
        if self.mode.is_some_and(|last| last != mode) {
            let line = match mode {
                Mode::Monitor => "menu: monitor",
                Mode::Adjust => "menu: adjust",
            };
            note(log, &mut emit, line);
        }
        self.mode = Some(mode);

        match *tick {
            Tick::Monitor { reading, alarm } => {
                emit(&*distance_line(reading));

                if alarm && !self.alarm {
                    note(log, &mut emit, &value_line("alarm at cm ", u32::from(reading.unwrap_or(0))));
                } else if !alarm && self.alarm {
                    note(log, &mut emit, "alarm cleared");
                }
                self.alarm = alarm;

                let no_echo = reading == Err(RangingError::NoEcho);
                if no_echo && !self.no_echo {
                    note(log, &mut emit, "no echo");
                }
                self.no_echo = no_echo;
            }
            Tick::Adjust { threshold_cm, .. } => {
                self.alarm = false;
                if self.threshold_cm.is_some_and(|last| last != threshold_cm) {
                    let value = u32::try_from(threshold_cm).unwrap_or(0);
                    note(log, &mut emit, &value_line("threshold cm ", value));
                }
                self.threshold_cm = Some(threshold_cm);
            }
        }
    }
}

fn note(
    log: &mut EventLog,
    emit: &mut impl FnMut(&str),
    line: &str,
) {
    emit(line);
    log.push(line);
}

/// `label` followed by a decimal value.
fn value_line(
    label: &str,
    value: u32,
) -> EventLine {
    let mut line = EventLine::new();
    line.push_str(label).ok();
    push_u32(&mut line, value);
    line
}

fn distance_line(reading: Result<u16, RangingError>) -> EventLine {
    match reading {
        Ok(cm) => {
            let mut line = value_line("distance ", u32::from(cm));
            line.push_str(" cm").ok();
            line
        }
        Err(_) => {
            let mut line = EventLine::new();
            line.push_str("distance ").ok();
            line.push_str(NO_ECHO_TEXT).ok();
            line
        }
    }
}
