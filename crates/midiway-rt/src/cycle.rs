//! The per-cycle drain entry point handed to native driver callbacks.

use std::sync::Arc;

use crate::ring::MessageConsumer;
use crate::shutdown::ShutdownHandshake;

/// Real-time drain state for one output port.
///
/// `run` is the only function a driver callback needs to call. It is plain,
/// allocation-free and non-blocking, so it can just as well be invoked by a
/// test loop standing in for the driver's scheduler.
pub struct OutputCycle {
    consumer: MessageConsumer,
    shutdown: Arc<ShutdownHandshake>,
    scratch: Box<[u8]>,
}

impl OutputCycle {
    pub fn new(consumer: MessageConsumer, shutdown: Arc<ShutdownHandshake>) -> Self {
        // Sized to the ring, so no queued message can ever outgrow it.
        let scratch = vec![0u8; consumer.capacity()].into_boxed_slice();
        Self {
            consumer,
            shutdown,
            scratch,
        }
    }

    /// Runs one driver cycle.
    ///
    /// Checks the shutdown flag first, on every invocation regardless of
    /// port state: once a close is requested this acknowledges and returns
    /// instead of draining. Otherwise every queued message is handed to
    /// `write` in FIFO order. Errors have nowhere to go on this thread, so
    /// `write` is infallible by design.
    #[inline]
    pub fn run(&mut self, mut write: impl FnMut(&[u8])) {
        if self.shutdown.acknowledge_if_requested() {
            return;
        }
        while let Some(len) = self.consumer.read_into(&mut self.scratch) {
            write(&self.scratch[..len]);
        }
    }

    /// Messages still queued for the next cycle.
    pub fn pending(&self) -> usize {
        self.consumer.pending()
    }
}
