//! Teardown handshake between a port owner and its real-time callback.
//!
//! Unregistering a native port while the callback is mid-drain is unsafe,
//! so closing is a two-signal protocol: the owner raises "close requested"
//! and waits, the callback acknowledges on its next invocation instead of
//! draining, and only then does the owner touch the native port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

pub struct ShutdownHandshake {
    requested: AtomicBool,
    ack_tx: Sender<()>,
    ack_rx: Receiver<()>,
}

impl ShutdownHandshake {
    pub fn new() -> Self {
        let (ack_tx, ack_rx) = bounded(1);
        Self {
            requested: AtomicBool::new(false),
            ack_tx,
            ack_rx,
        }
    }

    /// Raises the close request and waits for the callback to acknowledge.
    ///
    /// Returns `false` if the callback did not answer within `timeout`; the
    /// timeout is a safety valve so a stopped driver thread cannot hang the
    /// closing thread forever.
    pub fn request_and_wait(&self, timeout: Duration) -> bool {
        // A previous timed-out close may have left a late ack behind.
        while self.ack_rx.try_recv().is_ok() {}
        self.requested.store(true, Ordering::Release);
        self.ack_rx.recv_timeout(timeout).is_ok()
    }

    /// Real-time side: called on every callback invocation. If a close was
    /// requested, clears the flag and acknowledges exactly once. Lock-free,
    /// never blocks.
    #[inline]
    pub fn acknowledge_if_requested(&self) -> bool {
        if !self.requested.load(Ordering::Relaxed) {
            return false;
        }
        if self.requested.swap(false, Ordering::AcqRel) {
            let _ = self.ack_tx.try_send(());
            return true;
        }
        false
    }

    /// Whether a close request is currently pending.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

impl Default for ShutdownHandshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledge_answers_exactly_once_per_request() {
        let handshake = ShutdownHandshake::new();
        assert!(!handshake.acknowledge_if_requested());

        handshake.requested.store(true, Ordering::Release);
        assert!(handshake.acknowledge_if_requested());
        assert!(!handshake.acknowledge_if_requested());
        assert_eq!(handshake.ack_rx.try_recv(), Ok(()));
        assert!(handshake.ack_rx.try_recv().is_err());
    }

    #[test]
    fn wait_times_out_without_a_callback() {
        let handshake = ShutdownHandshake::new();
        assert!(!handshake.request_and_wait(Duration::from_millis(10)));
        assert!(handshake.is_requested());
    }
}
