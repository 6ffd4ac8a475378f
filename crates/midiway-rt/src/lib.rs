//! Real-time primitives shared between the midiway port layer and its
//! native driver callbacks.

pub mod cycle;
pub mod ring;
pub mod shutdown;

pub use cycle::OutputCycle;
pub use ring::{message_ring, MessageConsumer, MessageProducer, RingFull, DEFAULT_CAPACITY};
pub use shutdown::ShutdownHandshake;
