//! Always-available no-op backend.
//!
//! Serves two purposes: a safe fallback when no native driver is usable,
//! and a filler for descriptor role slots a backend cannot provide (the
//! JACK descriptor binds its input role here, for example).

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, MidiInPort, MidiObserver, MidiOutPort};
use crate::config::{InputConfig, ObserverConfig, OutputConfig};
use crate::observer::PortEvent;
use crate::{Api, Result};

/// Backend-specific configuration slot; carries nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DummyConfig;

pub struct DummyBackend;

impl Backend for DummyBackend {
    type Output = DummyMidiOut;
    type Input = DummyMidiIn;
    type Observer = DummyObserver;
    type OutputConfig = DummyConfig;
    type InputConfig = DummyConfig;
    type ObserverConfig = DummyConfig;

    const API: Api = Api::Dummy;
    const NAME: &'static str = "dummy";
    const DISPLAY_NAME: &'static str = "Dummy";

    fn new_output(_config: OutputConfig, _api_config: DummyConfig) -> Result<DummyMidiOut> {
        Ok(DummyMidiOut)
    }

    fn new_input(_config: InputConfig, _api_config: DummyConfig) -> Result<DummyMidiIn> {
        Ok(DummyMidiIn)
    }

    fn new_observer(_config: ObserverConfig, _api_config: DummyConfig) -> Result<DummyObserver> {
        Ok(DummyObserver)
    }
}

/// Output device that accepts every operation and does nothing.
pub struct DummyMidiOut;

impl MidiOutPort for DummyMidiOut {
    fn api(&self) -> Api {
        Api::Dummy
    }

    fn open_port(&mut self, _index: usize, _port_name: &str) -> Result<()> {
        tracing::warn!("dummy output: open_port does nothing");
        Ok(())
    }

    fn open_virtual_port(&mut self, _port_name: &str) -> Result<()> {
        tracing::warn!("dummy output: open_virtual_port does nothing");
        Ok(())
    }

    fn close_port(&mut self) {}

    fn set_port_name(&mut self, _port_name: &str) -> Result<()> {
        Ok(())
    }

    fn port_count(&self) -> usize {
        0
    }

    fn port_name(&self, _index: usize) -> Option<String> {
        None
    }

    fn send(&mut self, _message: &[u8]) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn is_port_open(&self) -> bool {
        false
    }
}

pub struct DummyMidiIn;

impl MidiInPort for DummyMidiIn {
    fn api(&self) -> Api {
        Api::Dummy
    }

    fn open_port(&mut self, _index: usize, _port_name: &str) -> Result<()> {
        tracing::warn!("dummy input: open_port does nothing");
        Ok(())
    }

    fn open_virtual_port(&mut self, _port_name: &str) -> Result<()> {
        tracing::warn!("dummy input: open_virtual_port does nothing");
        Ok(())
    }

    fn close_port(&mut self) {}

    fn port_count(&self) -> usize {
        0
    }

    fn port_name(&self, _index: usize) -> Option<String> {
        None
    }
}

pub struct DummyObserver;

impl MidiObserver for DummyObserver {
    fn api(&self) -> Api {
        Api::Dummy
    }

    fn try_recv(&self) -> Option<PortEvent> {
        None
    }
}
