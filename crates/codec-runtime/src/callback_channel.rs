// crates/codec-runtime/src/callback_channel.rs
//
// Cross-thread dispatch primitive from worker to driver thread (§4.4).
// Grounded on the bounded `crossbeam_channel` pair in
// `velocut_media::worker::MediaWorker` (`tx`/`rx`, capacity 512) — the
// difference from the teacher is the explicit `release` step and the
// ownership-returning rejection, since a dropped driver-side receiver must
// never silently leak the native resource riding inside the payload.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};

pub enum DispatchResult<T> {
    Delivered,
    Queued,
    RejectedReleased(T),
    RejectedFull(T),
}

/// One dispatch channel per facade. `capacity` bounds how many callbacks
/// may sit unconsumed before the worker must treat further ones as
/// lost-to-driver (§5 Backpressure).
pub struct CallbackChannel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    released: AtomicBool,
    /// Outputs lost to backpressure since the last drain. The payload itself
    /// is gone by the time this increments, so the driver can't learn about
    /// the drop from `try_recv` — it has to ask separately (§5 Backpressure:
    /// "queue_size still decrements and dequeue still fires").
    dropped_outputs: AtomicUsize,
}

impl<T> CallbackChannel<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        CallbackChannel { tx, rx, released: AtomicBool::new(false), dropped_outputs: AtomicUsize::new(0) }
    }

    /// Called from the worker thread when an output event was rejected
    /// (full or released channel) instead of delivered.
    pub fn note_output_dropped(&self) {
        self.dropped_outputs.fetch_add(1, Ordering::AcqRel);
    }

    /// Drains the dropped-output count accumulated since the last call.
    pub fn take_dropped_outputs(&self) -> usize {
        self.dropped_outputs.swap(0, Ordering::AcqRel)
    }

    /// Called from the worker thread. Distinguishes "delivered" (the
    /// channel was empty just before this send, so a waiting driver would
    /// observe it next) from "queued" (something was already ahead of it)
    /// — both leave the payload with the channel, but callers that want to
    /// know whether an immediate wakeup is warranted can branch on this.
    pub fn dispatch(&self, payload: T) -> DispatchResult<T> {
        if self.released.load(Ordering::Acquire) {
            return DispatchResult::RejectedReleased(payload);
        }
        let was_empty = self.tx.is_empty();
        match self.tx.try_send(payload) {
            Ok(()) => {
                if was_empty {
                    DispatchResult::Delivered
                } else {
                    DispatchResult::Queued
                }
            }
            Err(TrySendError::Full(payload)) => DispatchResult::RejectedFull(payload),
            Err(TrySendError::Disconnected(payload)) => DispatchResult::RejectedReleased(payload),
        }
    }

    /// Called from the driver thread's event loop to drain dispatched
    /// callbacks without blocking.
    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Idempotent. Once released, every subsequent `dispatch` returns
    /// ownership to the caller instead of queuing.
    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_dispatch_into_empty_channel_is_delivered() {
        let ch: CallbackChannel<i32> = CallbackChannel::new(4);
        assert!(matches!(ch.dispatch(1), DispatchResult::Delivered));
        assert!(matches!(ch.dispatch(2), DispatchResult::Queued));
    }

    #[test]
    fn dispatch_after_release_returns_ownership() {
        let ch: CallbackChannel<String> = CallbackChannel::new(4);
        ch.release();
        match ch.dispatch("payload".to_string()) {
            DispatchResult::RejectedReleased(payload) => assert_eq!(payload, "payload"),
            _ => panic!("expected rejection after release"),
        }
    }

    #[test]
    fn release_is_idempotent() {
        let ch: CallbackChannel<i32> = CallbackChannel::new(1);
        ch.release();
        ch.release();
        assert!(ch.is_released());
    }

    #[test]
    fn full_channel_returns_payload_for_worker_to_release() {
        let ch: CallbackChannel<i32> = CallbackChannel::new(1);
        assert!(matches!(ch.dispatch(1), DispatchResult::Delivered));
        match ch.dispatch(2) {
            DispatchResult::RejectedFull(payload) => assert_eq!(payload, 2),
            _ => panic!("expected full rejection"),
        }
    }

    #[test]
    fn dropped_output_count_accumulates_and_drains_once() {
        let ch: CallbackChannel<i32> = CallbackChannel::new(4);
        ch.note_output_dropped();
        ch.note_output_dropped();
        assert_eq!(ch.take_dropped_outputs(), 2);
        assert_eq!(ch.take_dropped_outputs(), 0);
    }

    #[test]
    fn delivered_payload_is_received_in_submission_order() {
        let ch: CallbackChannel<i32> = CallbackChannel::new(4);
        ch.dispatch(1);
        ch.dispatch(2);
        assert_eq!(ch.try_recv(), Some(1));
        assert_eq!(ch.try_recv(), Some(2));
        assert_eq!(ch.try_recv(), None);
    }
}
