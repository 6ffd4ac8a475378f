//! Real JACK output driver.
//!
//! The jack crate's `activate_async` consumes the client and the process
//! handler owns the output port, so the client is activated when the port
//! opens and deactivated when it closes; the port object is recovered from
//! the returned handler and unregistered. The lifecycle semantics above
//! this driver are unchanged.

use jack::{Client, ClientOptions, Control, PortSpec, ProcessScope, RawMidi};
use midiway_rt::OutputCycle;

use super::JackOutputConfig;
use crate::config::OutputConfig;
use crate::output::{OutputDriver, OutputHandle};
use crate::{Api, MidiError, Result};

pub type JackMidiOut = OutputHandle<JackDriver>;

pub fn new_output(config: OutputConfig, api_config: JackOutputConfig) -> Result<JackMidiOut> {
    Ok(OutputHandle::new(
        JackDriver::default(),
        config,
        api_config.close_timeout,
    ))
}

struct Notifications;

impl jack::NotificationHandler for Notifications {}

struct Processor {
    port: jack::Port<jack::MidiOut>,
    cycle: OutputCycle,
}

impl jack::ProcessHandler for Processor {
    fn process(&mut self, _client: &Client, ps: &ProcessScope) -> Control {
        let mut writer = self.port.writer(ps);
        self.cycle.run(|bytes| {
            // A rejected write means the driver buffer for this cycle is
            // full; nothing to report from the real-time thread.
            let _ = writer.write(&RawMidi { time: 0, bytes });
        });
        Control::Continue
    }
}

#[derive(Default)]
pub struct JackDriver {
    idle: Option<Client>,
    running: Option<jack::AsyncClient<Notifications, Processor>>,
    pending_cycle: Option<OutputCycle>,
    port_full_name: Option<String>,
}

fn midi_input_ports(client: &Client) -> Vec<String> {
    client.ports(
        None,
        Some(jack::MidiIn::default().jack_port_type()),
        jack::PortFlags::IS_INPUT,
    )
}

impl OutputDriver for JackDriver {
    const API: Api = Api::Jack;

    fn connect(&mut self, client_name: &str, cycle: OutputCycle) -> Result<()> {
        let (client, _status) = Client::new(client_name, ClientOptions::NO_START_SERVER)
            .map_err(|err| MidiError::ServerUnavailable(err.to_string()))?;
        self.idle = Some(client);
        self.pending_cycle = Some(cycle);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.idle.is_some() || self.running.is_some()
    }

    fn open_port(&mut self, port_name: &str) -> Result<()> {
        let client = self.idle.take().ok_or(MidiError::NotConnected)?;
        let Some(cycle) = self.pending_cycle.take() else {
            self.idle = Some(client);
            return Err(MidiError::NotConnected);
        };
        let port = match client.register_port(port_name, jack::MidiOut::default()) {
            Ok(port) => port,
            Err(err) => {
                // Registration failure is retryable: the client and the
                // transport consumer both survive for the next attempt.
                self.idle = Some(client);
                self.pending_cycle = Some(cycle);
                return Err(MidiError::Driver(err.to_string()));
            }
        };
        let full_name = format!("{}:{}", client.name(), port_name);
        let running = match client.activate_async(Notifications, Processor { port, cycle }) {
            Ok(running) => running,
            Err(err) => {
                // Activation consumed the client and the consumer half of
                // the transport; the driver is disconnected now and a later
                // connect() rebuilds both rings along with the client.
                return Err(MidiError::Driver(err.to_string()));
            }
        };
        self.port_full_name = Some(full_name);
        self.running = Some(running);
        Ok(())
    }

    fn has_port(&self) -> bool {
        self.running.is_some()
    }

    fn connect_to(&mut self, index: usize) -> Result<()> {
        let running = self.running.as_ref().ok_or(MidiError::NotConnected)?;
        let source = self
            .port_full_name
            .as_deref()
            .ok_or(MidiError::NotConnected)?;
        let inputs = midi_input_ports(running.as_client());
        let Some(dest) = inputs.get(index) else {
            return Err(MidiError::UnknownPort(index));
        };
        running
            .as_client()
            .connect_ports_by_name(source, dest)
            .map_err(|err| MidiError::Driver(err.to_string()))
    }

    fn close_port(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        self.port_full_name = None;
        match running.deactivate() {
            Ok((client, _notifications, processor)) => {
                let Processor { port, cycle } = processor;
                if let Err(err) = client.unregister_port(port) {
                    tracing::warn!(%err, "failed to unregister JACK port");
                }
                self.pending_cycle = Some(cycle);
                self.idle = Some(client);
                Ok(())
            }
            Err(err) => Err(MidiError::Driver(err.to_string())),
        }
    }

    fn rename_port(&mut self, port_name: &str) -> Result<()> {
        let running = self.running.as_ref().ok_or(MidiError::NotConnected)?;
        let current = self
            .port_full_name
            .clone()
            .ok_or(MidiError::NotConnected)?;
        let port = running
            .as_client()
            .port_by_name(&current)
            .ok_or_else(|| MidiError::Driver(format!("port {current} not found")))?;
        port.set_name(port_name)
            .map_err(|err| MidiError::Driver(err.to_string()))?;
        self.port_full_name = Some(format!("{}:{}", running.as_client().name(), port_name));
        Ok(())
    }

    fn input_ports(&self) -> Vec<String> {
        if let Some(running) = &self.running {
            midi_input_ports(running.as_client())
        } else if let Some(client) = &self.idle {
            midi_input_ports(client)
        } else {
            Vec::new()
        }
    }

    fn max_port_name_len(&self) -> usize {
        jack::PORT_NAME_SIZE
    }

    fn disconnect(&mut self) {
        // Dropping the client closes it; the controller has already torn
        // the port down.
        self.idle = None;
        self.pending_cycle = None;
    }
}
