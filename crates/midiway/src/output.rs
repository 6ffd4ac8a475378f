//! Generic output port lifecycle shared by every backend.
//!
//! [`OutputHandle`] drives the `Disconnected -> Connected -> PortOpen`
//! state machine against the native verbs of an [`OutputDriver`], and owns
//! the producer half of the real-time message transport. The consumer half
//! travels into the driver's callback inside an
//! [`OutputCycle`](midiway_rt::OutputCycle).

use std::sync::Arc;
use std::time::Duration;

use midiway_rt::{message_ring, MessageProducer, OutputCycle, ShutdownHandshake};

use crate::backend::MidiOutPort;
use crate::config::OutputConfig;
use crate::{Api, MidiError, Result};

/// Native verbs one backend must supply for its output side.
///
/// The driver owns the native client and port handles; the handle above it
/// owns the transport and the state machine. A mock implementation is all
/// that is needed to exercise the lifecycle without a driver installed.
pub trait OutputDriver: Send {
    const API: Api;

    /// Creates the native client and wires `cycle` into its real-time
    /// callback. Called at most once per connected epoch.
    fn connect(&mut self, client_name: &str, cycle: OutputCycle) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Registers the native output port.
    fn open_port(&mut self, port_name: &str) -> Result<()>;

    fn has_port(&self) -> bool;

    /// Connects the registered port to the native input at `index`.
    fn connect_to(&mut self, index: usize) -> Result<()>;

    /// Unregisters the native port. The caller has already run the
    /// teardown handshake; the callback is past its last drain.
    fn close_port(&mut self) -> Result<()>;

    /// Renames the registered port.
    fn rename_port(&mut self, port_name: &str) -> Result<()>;

    /// Names of the native input ports the output could connect to.
    fn input_ports(&self) -> Vec<String>;

    /// Native limit on the full (client-qualified) port name length.
    fn max_port_name_len(&self) -> usize;

    /// Releases the native client.
    fn disconnect(&mut self);
}

/// Output device built from a driver plus the real-time transport.
pub struct OutputHandle<D: OutputDriver> {
    driver: D,
    config: OutputConfig,
    close_timeout: Duration,
    producer: Option<MessageProducer>,
    shutdown: Option<Arc<ShutdownHandshake>>,
}

impl<D: OutputDriver> OutputHandle<D> {
    /// Creates the handle and eagerly attempts to connect. A failed connect
    /// is recoverable: the handle stays usable and reports itself as
    /// disconnected.
    pub fn new(driver: D, config: OutputConfig, close_timeout: Duration) -> Self {
        let mut handle = Self {
            driver,
            config,
            close_timeout,
            producer: None,
            shutdown: None,
        };
        handle.connect();
        handle
    }

    /// Lazily creates the transport and the native client. Idempotent.
    pub fn connect(&mut self) {
        if self.driver.is_connected() {
            return;
        }
        let (producer, consumer) = message_ring(self.config.ring_capacity);
        let shutdown = Arc::new(ShutdownHandshake::new());
        let cycle = OutputCycle::new(consumer, Arc::clone(&shutdown));
        match self.driver.connect(&self.config.client_name, cycle) {
            Ok(()) => {
                self.producer = Some(producer);
                self.shutdown = Some(shutdown);
            }
            Err(err) => {
                tracing::warn!(api = %D::API, %err, "native client unavailable; output stays disconnected");
            }
        }
    }

    /// Messages rejected so far because the outgoing ring was full.
    pub fn dropped(&self) -> u64 {
        self.producer.as_ref().map_or(0, MessageProducer::dropped)
    }

    /// Access the driver instance.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable access to the driver instance.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The full port name counts against the native limit, client prefix
    /// included. Checked before any native call.
    fn validate_port_name(&self, port_name: &str) -> Result<()> {
        let max = self.driver.max_port_name_len();
        let len = self.config.client_name.len() + 1 + port_name.len();
        if len > max {
            return Err(MidiError::PortNameTooLong { len, max });
        }
        Ok(())
    }

    fn register_port(&mut self, port_name: &str) -> Result<()> {
        self.validate_port_name(port_name)?;
        self.connect();
        if !self.driver.is_connected() {
            return Err(MidiError::NotConnected);
        }
        if !self.driver.has_port() {
            self.driver.open_port(port_name)?;
        }
        Ok(())
    }
}

impl<D: OutputDriver> MidiOutPort for OutputHandle<D> {
    fn api(&self) -> Api {
        D::API
    }

    fn open_port(&mut self, index: usize, port_name: &str) -> Result<()> {
        self.register_port(port_name)?;
        if let Err(err) = self.driver.connect_to(index) {
            tracing::warn!(index, %err, "could not connect to requested input; port stays open");
        }
        Ok(())
    }

    fn open_virtual_port(&mut self, port_name: &str) -> Result<()> {
        self.register_port(port_name)
    }

    fn close_port(&mut self) {
        if !self.driver.has_port() {
            return;
        }
        if let Some(shutdown) = &self.shutdown {
            if !shutdown.request_and_wait(self.close_timeout) {
                tracing::warn!("callback did not acknowledge close within the timeout");
            }
        }
        if let Err(err) = self.driver.close_port() {
            tracing::warn!(%err, "failed to unregister native port");
        }
    }

    fn set_port_name(&mut self, port_name: &str) -> Result<()> {
        self.validate_port_name(port_name)?;
        if !self.driver.has_port() {
            tracing::warn!("set_port_name called without an open port");
            return Err(MidiError::Unsupported("set_port_name requires an open port"));
        }
        self.driver.rename_port(port_name)
    }

    fn port_count(&self) -> usize {
        if !self.driver.is_connected() {
            return 0;
        }
        self.driver.input_ports().len()
    }

    fn port_name(&self, index: usize) -> Option<String> {
        if !self.driver.is_connected() {
            return None;
        }
        self.driver.input_ports().get(index).cloned()
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        // The driver can lose its client while opening a port; a producer
        // whose consumer died with the client must not accept messages.
        if !self.driver.is_connected() {
            return Err(MidiError::NotConnected);
        }
        match &mut self.producer {
            Some(producer) => producer.push(message).map_err(|_| MidiError::QueueFull),
            None => Err(MidiError::NotConnected),
        }
    }

    fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }

    fn is_port_open(&self) -> bool {
        self.driver.has_port()
    }
}

impl<D: OutputDriver> Drop for OutputHandle<D> {
    fn drop(&mut self) {
        // Port before client; the port belongs to the client.
        self.close_port();
        self.driver.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockDriver {
        fail_connect: bool,
        fail_next_open: bool,
        lose_client_on_open: bool,
        connected: bool,
        port: Option<String>,
        cycle: Option<OutputCycle>,
        native_calls: usize,
        registrations: usize,
        connect_requests: Vec<usize>,
    }

    impl OutputDriver for MockDriver {
        const API: Api = Api::Dummy;

        fn connect(&mut self, _client_name: &str, cycle: OutputCycle) -> Result<()> {
            self.native_calls += 1;
            if self.fail_connect {
                return Err(MidiError::ServerUnavailable("mock server down".into()));
            }
            self.connected = true;
            self.cycle = Some(cycle);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn open_port(&mut self, port_name: &str) -> Result<()> {
            self.native_calls += 1;
            if self.lose_client_on_open {
                // Models an activation failure that takes the client and the
                // transport consumer down with it.
                self.connected = false;
                self.cycle = None;
                return Err(MidiError::Driver("activation failed".into()));
            }
            if self.fail_next_open {
                self.fail_next_open = false;
                return Err(MidiError::Driver("registration failed".into()));
            }
            self.registrations += 1;
            self.port = Some(port_name.into());
            Ok(())
        }

        fn has_port(&self) -> bool {
            self.port.is_some()
        }

        fn connect_to(&mut self, index: usize) -> Result<()> {
            self.native_calls += 1;
            if index >= self.input_ports().len() {
                return Err(MidiError::UnknownPort(index));
            }
            self.connect_requests.push(index);
            Ok(())
        }

        fn close_port(&mut self) -> Result<()> {
            self.native_calls += 1;
            self.port = None;
            Ok(())
        }

        fn rename_port(&mut self, port_name: &str) -> Result<()> {
            self.native_calls += 1;
            self.port = Some(port_name.into());
            Ok(())
        }

        fn input_ports(&self) -> Vec<String> {
            vec!["system:midi_1".into(), "system:midi_2".into()]
        }

        fn max_port_name_len(&self) -> usize {
            32
        }

        fn disconnect(&mut self) {
            self.connected = false;
            self.cycle = None;
        }
    }

    fn handle() -> OutputHandle<MockDriver> {
        OutputHandle::new(
            MockDriver::default(),
            OutputConfig::default(),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn oversized_port_name_is_rejected_before_any_native_call() {
        let mut out = handle();
        let calls_before = out.driver().native_calls;
        let err = out
            .open_port(0, "a-port-name-that-is-far-too-long-for-the-mock")
            .unwrap_err();
        assert!(matches!(err, MidiError::PortNameTooLong { .. }));
        assert_eq!(out.driver().native_calls, calls_before);
        assert!(!out.is_port_open());
    }

    #[test]
    fn open_port_twice_reuses_the_registered_port() {
        let mut out = handle();
        out.open_port(0, "out").unwrap();
        out.open_port(1, "out").unwrap();
        assert_eq!(out.driver().registrations, 1);
        assert_eq!(out.driver().connect_requests, vec![0, 1]);
        assert!(out.is_port_open());
    }

    #[test]
    fn close_port_is_idempotent_and_safe_before_open() {
        let mut out = handle();
        out.close_port();
        out.open_virtual_port("out").unwrap();
        out.close_port();
        assert!(!out.is_port_open());
        assert!(out.is_connected());
        out.close_port();
    }

    #[test]
    fn failed_connect_degrades_without_crashing() {
        let mut out = OutputHandle::new(
            MockDriver {
                fail_connect: true,
                ..MockDriver::default()
            },
            OutputConfig::default(),
            Duration::from_millis(10),
        );
        assert!(!out.is_connected());
        assert_eq!(out.port_count(), 0);
        assert!(matches!(out.send(&[0x90, 60, 100]), Err(MidiError::NotConnected)));
        assert!(matches!(out.open_port(0, "out"), Err(MidiError::NotConnected)));
    }

    #[test]
    fn sent_messages_reach_the_cycle_in_order() {
        let mut out = handle();
        out.open_virtual_port("out").unwrap();
        out.send(&[0x90, 60, 100]).unwrap();
        out.send(&[0x80, 60, 0]).unwrap();

        let mut cycle = out.driver_mut().cycle.take().unwrap();
        let mut seen = Vec::new();
        cycle.run(|msg| seen.push(msg.to_vec()));
        assert_eq!(seen, vec![vec![0x90, 60, 100], vec![0x80, 60, 0]]);
    }

    #[test]
    fn full_ring_reports_queue_full_and_counts_drops() {
        let mut out = OutputHandle::new(
            MockDriver::default(),
            OutputConfig {
                ring_capacity: 8,
                ..OutputConfig::default()
            },
            Duration::from_millis(10),
        );
        out.send(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert!(matches!(out.send(&[7, 8, 9]), Err(MidiError::QueueFull)));
        assert_eq!(out.dropped(), 1);
    }

    #[test]
    fn registration_failure_leaves_the_device_connected_for_retry() {
        let mut out = handle();
        out.driver_mut().fail_next_open = true;
        assert!(matches!(
            out.open_virtual_port("out"),
            Err(MidiError::Driver(_))
        ));
        assert!(out.is_connected());
        assert!(!out.is_port_open());

        out.open_virtual_port("out").unwrap();
        assert!(out.is_port_open());
        out.send(&[0xF8]).unwrap();
        let mut cycle = out.driver_mut().cycle.take().unwrap();
        let mut seen = Vec::new();
        cycle.run(|msg| seen.push(msg.to_vec()));
        assert_eq!(seen, vec![vec![0xF8]]);
    }

    #[test]
    fn send_after_the_client_is_lost_reports_not_connected() {
        let mut out = handle();
        out.driver_mut().lose_client_on_open = true;
        assert!(matches!(
            out.open_virtual_port("out"),
            Err(MidiError::Driver(_))
        ));
        assert!(!out.is_connected());
        assert!(matches!(
            out.send(&[0x90, 60, 100]),
            Err(MidiError::NotConnected)
        ));
    }

    #[test]
    fn connecting_to_a_missing_input_is_not_fatal() {
        let mut out = handle();
        out.open_port(7, "out").unwrap();
        assert!(out.is_port_open());
        assert!(out.driver().connect_requests.is_empty());
    }

    #[test]
    fn set_port_name_without_a_port_is_a_reported_no_op() {
        let mut out = handle();
        assert!(matches!(
            out.set_port_name("renamed"),
            Err(MidiError::Unsupported(_))
        ));
        out.open_virtual_port("out").unwrap();
        out.set_port_name("renamed").unwrap();
        assert_eq!(out.driver().port.as_deref(), Some("renamed"));
    }
}
