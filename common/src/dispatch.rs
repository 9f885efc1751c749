//! Deferred handler dispatch.
//!
//! The raw button interrupt only posts a `Deferred` request into a bounded
//! FIFO. A single dedicated worker drains the queue and runs each handler
//! with full locking freedom, outside interrupt context.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use crate::config::DISPATCH_QUEUE_DEPTH;
use crate::control::{Mode, SharedControl};

/// Zero-argument work item posted from interrupt context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Deferred {
    /// Button pressed: run the mode toggle handler.
    ToggleMode,
}

impl Deferred {
    /// Execute the handler against the shared state. Returns the mode it
    /// left behind, read under the same lock as the change.
    pub fn run<M: RawMutex>(
        self,
        shared: &SharedControl<M>,
    ) -> Mode {
        match self {
            Self::ToggleMode => shared.toggle_mode(),
        }
    }
}

/// Single-consumer FIFO of deferred requests.
pub type DispatchQueue<M> = Channel<M, Deferred, DISPATCH_QUEUE_DEPTH>;

/// Post a request without blocking. Returns `false` if the queue was full and
/// the request was dropped.
pub fn post<M: RawMutex>(
    queue: &DispatchQueue<M>,
    request: Deferred,
) -> bool {
    match queue.try_send(request) {
        Ok(()) => true,
        Err(_) => {
            warn!("dispatch queue full, dropped {}", request);
            false
        }
    }
}

/// Run every request already queued, in order. Returns how many ran.
pub fn run_pending<M: RawMutex, S: RawMutex>(
    queue: &DispatchQueue<M>,
    shared: &SharedControl<S>,
) -> usize {
    let mut ran = 0;
    while let Ok(request) = queue.try_receive() {
        request.run(shared);
        ran += 1;
    }
    ran
}

/// Worker loop: wait for requests and run them one at a time, forever.
pub async fn dispatch_forever<M: RawMutex, S: RawMutex>(
    queue: &DispatchQueue<M>,
    shared: &SharedControl<S>,
) -> ! {
    loop {
        let request = queue.receive().await;
        let mode = request.run(shared);
        debug!("dispatched {} -> {}", request, mode);
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::select::{Either, select};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    use super::*;

    #[test]
    fn test_post_then_run_pending() {
        let queue: DispatchQueue<NoopRawMutex> = Channel::new();
        let shared: SharedControl<NoopRawMutex> = SharedControl::new();

        assert!(post(&queue, Deferred::ToggleMode));
        assert!(post(&queue, Deferred::ToggleMode));
        assert!(post(&queue, Deferred::ToggleMode));

        // Posting alone must not mutate state
        assert_eq!(shared.mode(), Mode::Monitor);

        assert_eq!(run_pending(&queue, &shared), 3);
        let state = shared.snapshot();
        assert_eq!(state.mode, Mode::Adjust);
        assert_eq!(state.toggle_parity, 1);
        assert_eq!(run_pending(&queue, &shared), 0);
    }

    #[test]
    fn test_run_reports_new_mode() {
        let shared: SharedControl<NoopRawMutex> = SharedControl::new();
        assert_eq!(Deferred::ToggleMode.run(&shared), Mode::Adjust);
        assert_eq!(Deferred::ToggleMode.run(&shared), Mode::Monitor);
    }

    #[test]
    fn test_clear_discards_queued_requests() {
        let queue: DispatchQueue<NoopRawMutex> = Channel::new();
        let shared: SharedControl<NoopRawMutex> = SharedControl::new();
        post(&queue, Deferred::ToggleMode);
        post(&queue, Deferred::ToggleMode);

        queue.clear();
        assert_eq!(run_pending(&queue, &shared), 0);
        assert_eq!(shared.mode(), Mode::Monitor);
    }

    #[test]
    fn test_full_queue_drops_request() {
        let queue: DispatchQueue<NoopRawMutex> = Channel::new();
        for _ in 0..DISPATCH_QUEUE_DEPTH {
            assert!(post(&queue, Deferred::ToggleMode));
        }
        assert!(!post(&queue, Deferred::ToggleMode));
    }

    #[test]
    fn test_worker_runs_queued_requests() {
        let queue: DispatchQueue<NoopRawMutex> = Channel::new();
        let shared: SharedControl<NoopRawMutex> = SharedControl::new();
        post(&queue, Deferred::ToggleMode);
        post(&queue, Deferred::ToggleMode);

        // The worker never returns; stop it once the queue is drained.
        let worker = dispatch_forever(&queue, &shared);
        let drained = async {
            while !queue.is_empty() {
                embassy_futures::yield_now().await;
            }
        };
        let outcome = embassy_futures::block_on(select(worker, drained));
        assert!(matches!(outcome, Either::Second(())));

        assert_eq!(shared.mode(), Mode::Monitor);
        assert!(shared.snapshot().display_dirty);
    }
}
