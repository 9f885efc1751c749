//! Watchdog supervision.
//!
//! The control loop only sees the `Watchdog` contract: `start` once, then
//! `kick` at least once per timeout. `SharedDeadline` implements the
//! timeout in software so it can be longer than the hardware allows; a
//! supervisor feeds the real watchdog only while the deadline holds.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::ranging::MicrosClock;

/// Supervisor that restarts the process unless kicked in time.
pub trait Watchdog {
    fn start(
        &mut self,
        timeout_ms: u32,
    );

    fn kick(&mut self);
}

/// Timeout bookkeeping in wrapping milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    timeout_ms: u32,
    last_kick_ms: Option<u32>,
}

impl Deadline {
    pub const fn new() -> Self {
        Self {
            timeout_ms: 0,
            last_kick_ms: None,
        }
    }

    /// Arm with `timeout_ms`, counting from `now_ms`.
    pub fn start(
        &mut self,
        timeout_ms: u32,
        now_ms: u32,
    ) {
        self.timeout_ms = timeout_ms;
        self.last_kick_ms = Some(now_ms);
    }

    #[inline]
    pub const fn is_armed(&self) -> bool { self.last_kick_ms.is_some() }

    /// Restart the countdown. No effect before `start`.
    pub fn kick(
        &mut self,
        now_ms: u32,
    ) {
        if self.last_kick_ms.is_some() {
            self.last_kick_ms = Some(now_ms);
        }
    }

    /// Time left before expiry, `None` when not armed.
    pub fn remaining_ms(
        &self,
        now_ms: u32,
    ) -> Option<u32> {
        self.last_kick_ms
            .map(|last| self.timeout_ms.saturating_sub(now_ms.wrapping_sub(last)))
    }

    /// Armed and not kicked for longer than the timeout.
    pub fn expired(
        &self,
        now_ms: u32,
    ) -> bool {
        self.last_kick_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) > self.timeout_ms)
    }
}

/// `Deadline` shared between the control loop and the supervisor.
pub struct SharedDeadline<M: RawMutex> {
    inner: Mutex<M, Cell<Deadline>>,
}

impl<M: RawMutex> SharedDeadline<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(Deadline::new())),
        }
    }

    fn update(
        &self,
        f: impl FnOnce(&mut Deadline),
    ) {
        self.inner.lock(|cell| {
            let mut deadline = cell.get();
            f(&mut deadline);
            cell.set(deadline);
        });
    }

    pub fn get(&self) -> Deadline { self.inner.lock(Cell::get) }

    pub fn start(
        &self,
        timeout_ms: u32,
        now_ms: u32,
    ) {
        self.update(|d| d.start(timeout_ms, now_ms));
    }

    pub fn kick(
        &self,
        now_ms: u32,
    ) {
        self.update(|d| d.kick(now_ms));
    }

    /// Whether the supervisor may feed the hardware watchdog. True before the
    /// deadline is armed, so boot is covered by the hardware period alone.
    pub fn should_feed(
        &self,
        now_ms: u32,
    ) -> bool {
        !self.get().expired(now_ms)
    }

    /// Disarm, as after a reset.
    pub fn clear(&self) { self.inner.lock(|cell| cell.set(Deadline::new())) }
}

impl<M: RawMutex> Default for SharedDeadline<M> {
    fn default() -> Self { Self::new() }
}

/// `Watchdog` backed by a `SharedDeadline` and a clock.
pub struct DeadlineWatchdog<'a, M: RawMutex, C> {
    deadline: &'a SharedDeadline<M>,
    clock: C,
}

impl<'a, M: RawMutex, C: MicrosClock> DeadlineWatchdog<'a, M, C> {
    pub const fn new(
        deadline: &'a SharedDeadline<M>,
        clock: C,
    ) -> Self {
        Self { deadline, clock }
    }

    fn now_ms(&mut self) -> u32 { (self.clock.now_us() / 1000) as u32 }
}

impl<M: RawMutex, C: MicrosClock> Watchdog for DeadlineWatchdog<'_, M, C> {
    fn start(
        &mut self,
        timeout_ms: u32,
    ) {
        let now = self.now_ms();
        self.deadline.start(timeout_ms, now);
        info!("watchdog started, timeout {} ms", timeout_ms);
    }

    fn kick(&mut self) {
        let now = self.now_ms();
        self.deadline.kick(now);
    }
}
