//! Capability contracts and the backend descriptor convention.

use crate::config::{InputConfig, ObserverConfig, OutputConfig};
use crate::observer::PortEvent;
use crate::{Api, Result};

/// Output device capability contract.
///
/// Driver errors are returned; operations a backend cannot support warn via
/// `tracing` and leave the device in its prior state. Expected failure
/// modes like "server not running" are queried through [`is_connected`],
/// not surfaced as panics.
///
/// [`is_connected`]: MidiOutPort::is_connected
pub trait MidiOutPort: Send {
    /// The API this device targets. Constant for the instance.
    fn api(&self) -> Api;

    /// Opens a port and connects it to the native input at `index`.
    ///
    /// Idempotent: an already registered port is reused. Failure to reach
    /// the input at `index` is not fatal; the port stays open.
    fn open_port(&mut self, index: usize, port_name: &str) -> Result<()>;

    /// Opens a port without connecting it anywhere.
    fn open_virtual_port(&mut self, port_name: &str) -> Result<()>;

    /// Tears the port down. No-op if no port is open.
    fn close_port(&mut self);

    /// Renames the open port.
    fn set_port_name(&mut self, port_name: &str) -> Result<()>;

    /// Number of native input ports this device could connect to.
    fn port_count(&self) -> usize;

    /// Name of the native input port at `index`, if in range.
    fn port_name(&self, index: usize) -> Option<String>;

    /// Queues a raw message for the driver. Never blocks; a full queue is
    /// reported as [`crate::MidiError::QueueFull`] and the message dropped.
    fn send(&mut self, message: &[u8]) -> Result<()>;

    /// Whether a native client exists.
    fn is_connected(&self) -> bool;

    /// Whether a port is currently registered.
    fn is_port_open(&self) -> bool;
}

/// Input device capability contract.
pub trait MidiInPort: Send {
    fn api(&self) -> Api;
    fn open_port(&mut self, index: usize, port_name: &str) -> Result<()>;
    fn open_virtual_port(&mut self, port_name: &str) -> Result<()>;
    fn close_port(&mut self);
    fn port_count(&self) -> usize;
    fn port_name(&self, index: usize) -> Option<String>;
}

/// Port hotplug observer capability contract.
pub trait MidiObserver: Send {
    fn api(&self) -> Api;
    /// Next pending hotplug event, if any. Never blocks.
    fn try_recv(&self) -> Option<PortEvent>;
}

/// Compile-time descriptor for one backend: role bindings plus identity.
///
/// Holds no state and has no lifecycle; it only selects types and carries
/// constants, so generic code can instantiate any backend's devices without
/// branching. Failures surface when a device is actually constructed or
/// operated, never from the descriptor itself.
pub trait Backend {
    type Output: MidiOutPort;
    type Input: MidiInPort;
    type Observer: MidiObserver;
    type OutputConfig: Default;
    type InputConfig: Default;
    type ObserverConfig: Default;

    const API: Api;
    const NAME: &'static str;
    const DISPLAY_NAME: &'static str;

    fn new_output(config: OutputConfig, api_config: Self::OutputConfig) -> Result<Self::Output>;
    fn new_input(config: InputConfig, api_config: Self::InputConfig) -> Result<Self::Input>;
    fn new_observer(
        config: ObserverConfig,
        api_config: Self::ObserverConfig,
    ) -> Result<Self::Observer>;
}
