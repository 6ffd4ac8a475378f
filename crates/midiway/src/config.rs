//! Backend-agnostic configuration records.
//!
//! Backend-specific records live next to their backend (for example
//! [`crate::backends::jack::JackOutputConfig`]). A device receives both at
//! open time and treats them as read-only for its lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by every output device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Client name registered with the native driver.
    pub client_name: String,
    /// Payload byte capacity of the outgoing message ring.
    pub ring_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            client_name: "midiway".into(),
            ring_capacity: midiway_rt::DEFAULT_CAPACITY,
        }
    }
}

/// Configuration shared by every input device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Client name registered with the native driver.
    pub client_name: String,
    /// Drop incoming system-exclusive messages.
    pub ignore_sysex: bool,
    /// Drop incoming timing messages.
    pub ignore_timing: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            client_name: "midiway".into(),
            ignore_sysex: false,
            ignore_timing: true,
        }
    }
}

/// Configuration shared by every hotplug observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Client name registered with the native driver.
    pub client_name: String,
    /// Interval between enumeration polls.
    pub poll_interval: Duration,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            client_name: "midiway".into(),
            poll_interval: Duration::from_secs(1),
        }
    }
}
