//! Uniform MIDI port layer over heterogeneous native backends.
//!
//! Each backend adapts one native driver API (JACK, ALSA, ...) to the same
//! small set of verbs: enumerate ports, open a real or virtual port, send a
//! raw message, observe hotplug. Backends are selected at compile time
//! through the [`backend::Backend`] descriptor trait or at run time through
//! the [`backends`] registry keyed by [`Api`].
//!
//! Message payloads are opaque byte blobs; this crate does not interpret
//! MIDI semantics.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod backends;
pub mod config;
pub mod observer;
pub mod output;

pub use backend::{Backend, MidiInPort, MidiObserver, MidiOutPort};
pub use backends::{available_apis, descriptors, make_output, BackendInfo};
pub use config::{InputConfig, ObserverConfig, OutputConfig};
pub use observer::{PortEvent, PortWatcher};
pub use output::{OutputDriver, OutputHandle};

/// Identifier for one supported native driver API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Api {
    /// No-op backend, always available.
    Dummy,
    /// JACK Audio Connection Kit.
    Jack,
    /// ALSA sequencer.
    AlsaSeq,
    /// ALSA raw UMP.
    AlsaRawUmp,
}

impl Api {
    /// Short machine name.
    pub fn name(self) -> &'static str {
        match self {
            Api::Dummy => "dummy",
            Api::Jack => "jack",
            Api::AlsaSeq => "alsa_seq",
            Api::AlsaRawUmp => "alsa_raw_ump",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Api::Dummy => "Dummy",
            Api::Jack => "JACK",
            Api::AlsaSeq => "ALSA (sequencer)",
            Api::AlsaRawUmp => "ALSA (raw UMP)",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Errors that can be produced while dealing with MIDI backends.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The backend cannot support the requested operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// A native driver call failed.
    #[error("driver error: {0}")]
    Driver(String),
    /// The native server is not running or unreachable.
    #[error("native server unavailable: {0}")]
    ServerUnavailable(String),
    /// A requested port name exceeds the backend's limit; rejected before
    /// any native call is made.
    #[error("port name too long ({len} bytes, backend limit {max})")]
    PortNameTooLong { len: usize, max: usize },
    /// No native input port exists at the requested index.
    #[error("no input port at index {0}")]
    UnknownPort(usize),
    /// The device has no native client; `connect` has not succeeded.
    #[error("not connected to a native client")]
    NotConnected,
    /// The outgoing message ring is full; the message was dropped.
    #[error("output queue is full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, MidiError>;
