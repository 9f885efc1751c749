//! Shared control state and the mode toggle handler.
//!
//! `SharedControl` is the only state touched by both actors: the deferred
//! handler worker and the main control loop. Every access goes through its
//! blocking mutex; nothing hands out references to the guarded fields.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::{ADJUST_BANNER, MONITOR_BANNER};

/// Operating mode of the alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Measure distance and alarm when too close.
    #[default]
    Monitor,
    /// Change the threshold with the rotary encoder.
    Adjust,
}

impl Mode {
    /// The other mode.
    #[inline]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Monitor => Self::Adjust,
            Self::Adjust => Self::Monitor,
        }
    }

    /// Top-line text shown in this mode.
    #[inline]
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Monitor => MONITOR_BANNER,
            Self::Adjust => ADJUST_BANNER,
        }
    }
}

/// Fields guarded by the shared mutex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    pub mode: Mode,
    /// The top display line must be rewritten.
    pub display_dirty: bool,
    /// Button press count modulo 2. Diagnostic only.
    pub toggle_parity: u8,
}

impl ControlState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Monitor,
            display_dirty: false,
            toggle_parity: 0,
        }
    }

    /// One button press: flip the mode, force a redraw, flip the parity.
    pub fn toggle(&mut self) -> Mode {
        self.mode = self.mode.toggle();
        self.display_dirty = true;
        self.toggle_parity ^= 1;
        self.mode
    }
}

impl Default for ControlState {
    fn default() -> Self { Self::new() }
}

/// Mutex-guarded `ControlState`, shared by reference between both actors.
pub struct SharedControl<M: RawMutex> {
    inner: Mutex<M, RefCell<ControlState>>,
}

impl<M: RawMutex> SharedControl<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ControlState::new())),
        }
    }

    /// Run `f` with exclusive access to the state.
    pub fn lock<R>(
        &self,
        f: impl FnOnce(&mut ControlState) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ControlState { self.lock(|state| *state) }

    pub fn mode(&self) -> Mode { self.lock(|state| state.mode) }

    /// Mode toggle handler, run by the deferred-dispatch worker on each
    /// button press. Never blocks beyond the lock itself.
    pub fn toggle_mode(&self) -> Mode {
        let (mode, parity) = self.lock(|state| {
            let mode = state.toggle();
            (mode, state.toggle_parity)
        });
        info!("switched menu: {} (parity {})", mode, parity);
        mode
    }

    /// Request a redraw of the top line.
    pub fn mark_dirty(&self) { self.lock(|state| state.display_dirty = true) }

    /// Consume a pending redraw. Returns the mode to draw the banner for, read
    /// in the same critical section as the flag.
    pub fn take_redraw(&self) -> Option<Mode> {
        self.lock(|state| {
            if state.display_dirty {
                state.display_dirty = false;
                Some(state.mode)
            } else {
                None
            }
        })
    }

    /// Back to power-on state.
    pub fn reset(&self) { self.lock(|state| *state = ControlState::new()) }
}

impl<M: RawMutex> Default for SharedControl<M> {
    fn default() -> Self { Self::new() }
}
