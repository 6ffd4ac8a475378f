//! Lock-free SPSC transport for raw MIDI messages.
//!
//! Two byte rings are kept in lockstep: one carries message payloads, the
//! other a 4-byte little-endian length header per message. The consumer
//! reads the header first so it can reserve destination space in the native
//! driver's buffer before copying the payload.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Payload capacity used when a configuration does not override it.
pub const DEFAULT_CAPACITY: usize = 16384;

const HEADER_LEN: usize = 4;

/// The message did not fit into the remaining ring space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("message ring is full")]
pub struct RingFull;

/// Creates a message transport with the given payload byte capacity.
///
/// The producer half belongs to the calling thread, the consumer half to
/// the driver's real-time callback. Neither side ever blocks.
pub fn message_ring(capacity: usize) -> (MessageProducer, MessageConsumer) {
    let (payload_tx, payload_rx) = HeapRb::<u8>::new(capacity).split();
    let (header_tx, header_rx) = HeapRb::<u8>::new(capacity).split();
    (
        MessageProducer {
            payload: payload_tx,
            headers: header_tx,
            dropped: 0,
        },
        MessageConsumer {
            payload: payload_rx,
            headers: header_rx,
            pending_len: None,
            capacity,
        },
    )
}

/// Producer half of the message transport. Single-threaded by contract;
/// callers with multiple sending threads must serialize access themselves.
pub struct MessageProducer {
    payload: HeapProducer<u8>,
    headers: HeapProducer<u8>,
    dropped: u64,
}

impl MessageProducer {
    /// Queues one message. Never blocks and never allocates.
    ///
    /// Space in both rings is checked before anything is written, so a
    /// rejected message leaves previously queued data untouched. The
    /// payload is committed before its header; a header visible to the
    /// consumer therefore always has its full payload behind it.
    #[inline]
    pub fn push(&mut self, message: &[u8]) -> Result<(), RingFull> {
        if message.len() > self.payload.free_len() || self.headers.free_len() < HEADER_LEN {
            self.dropped = self.dropped.wrapping_add(1);
            return Err(RingFull);
        }
        let written = self.payload.push_slice(message);
        debug_assert_eq!(written, message.len());
        let header = (message.len() as u32).to_le_bytes();
        let written = self.headers.push_slice(&header);
        debug_assert_eq!(written, HEADER_LEN);
        Ok(())
    }

    /// Number of messages rejected because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Payload bytes that can currently be queued.
    pub fn free_bytes(&self) -> usize {
        self.payload.free_len()
    }
}

/// Consumer half of the message transport, owned by the real-time callback.
pub struct MessageConsumer {
    payload: HeapConsumer<u8>,
    headers: HeapConsumer<u8>,
    pending_len: Option<usize>,
    capacity: usize,
}

impl MessageConsumer {
    /// Length of the next queued message without consuming its payload.
    #[inline]
    pub fn peek_len(&mut self) -> Option<usize> {
        if self.pending_len.is_none() && self.headers.len() >= HEADER_LEN {
            let mut header = [0u8; HEADER_LEN];
            let read = self.headers.pop_slice(&mut header);
            debug_assert_eq!(read, HEADER_LEN);
            self.pending_len = Some(u32::from_le_bytes(header) as usize);
        }
        self.pending_len
    }

    /// Copies the next message into `out` and returns its length.
    ///
    /// Returns `None` when nothing is queued, or when `out` is too small;
    /// in the latter case the message stays queued.
    #[inline]
    pub fn read_into(&mut self, out: &mut [u8]) -> Option<usize> {
        let len = self.peek_len()?;
        if out.len() < len {
            return None;
        }
        let read = self.payload.pop_slice(&mut out[..len]);
        debug_assert_eq!(read, len);
        self.pending_len = None;
        Some(len)
    }

    /// Number of queued messages.
    pub fn pending(&self) -> usize {
        self.headers.len() / HEADER_LEN + usize::from(self.pending_len.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Payload byte capacity the transport was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
