//! JACK backend.
//!
//! The real driver sits behind `feature = "jack"`. Without the feature the
//! descriptor still compiles against a stub that reports the backend as
//! unavailable instead of failing the build. The input role is bound to
//! the dummy input; only output and observation are implemented here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::backends::dummy::{DummyConfig, DummyMidiIn};
use crate::config::{InputConfig, ObserverConfig, OutputConfig};
use crate::{Api, Result};

#[cfg(feature = "jack")]
mod observer;
#[cfg(feature = "jack")]
mod output;

#[cfg(feature = "jack")]
pub use observer::JackObserver;
#[cfg(feature = "jack")]
pub use output::{JackDriver, JackMidiOut};

/// JACK-specific output options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackOutputConfig {
    /// Bound on the wait for the process callback to acknowledge a close.
    pub close_timeout: Duration,
}

impl Default for JackOutputConfig {
    fn default() -> Self {
        Self {
            close_timeout: Duration::from_secs(1),
        }
    }
}

pub struct JackBackend;

impl Backend for JackBackend {
    type Output = JackMidiOut;
    type Input = DummyMidiIn;
    type Observer = JackObserver;
    type OutputConfig = JackOutputConfig;
    type InputConfig = DummyConfig;
    type ObserverConfig = DummyConfig;

    const API: Api = Api::Jack;
    const NAME: &'static str = "jack";
    const DISPLAY_NAME: &'static str = "JACK";

    fn new_output(config: OutputConfig, api_config: JackOutputConfig) -> Result<JackMidiOut> {
        #[cfg(feature = "jack")]
        {
            output::new_output(config, api_config)
        }
        #[cfg(not(feature = "jack"))]
        {
            stub::new_output(config, api_config)
        }
    }

    fn new_input(_config: InputConfig, _api_config: DummyConfig) -> Result<DummyMidiIn> {
        Ok(DummyMidiIn)
    }

    fn new_observer(config: ObserverConfig, _api_config: DummyConfig) -> Result<JackObserver> {
        #[cfg(feature = "jack")]
        {
            observer::new_observer(config)
        }
        #[cfg(not(feature = "jack"))]
        {
            stub::new_observer(config)
        }
    }
}

#[cfg(not(feature = "jack"))]
pub use stub::{JackMidiOut, JackObserver};

#[cfg(not(feature = "jack"))]
mod stub {
    use super::JackOutputConfig;
    use crate::backend::{MidiObserver, MidiOutPort};
    use crate::config::{ObserverConfig, OutputConfig};
    use crate::observer::PortEvent;
    use crate::{Api, MidiError, Result};

    const UNAVAILABLE: &str = "JACK backend not available in this build";

    pub struct JackMidiOut;

    pub fn new_output(_config: OutputConfig, _api_config: JackOutputConfig) -> Result<JackMidiOut> {
        tracing::warn!("{UNAVAILABLE}; output stays disconnected");
        Ok(JackMidiOut)
    }

    impl MidiOutPort for JackMidiOut {
        fn api(&self) -> Api {
            Api::Jack
        }

        fn open_port(&mut self, _index: usize, _port_name: &str) -> Result<()> {
            Err(MidiError::ServerUnavailable(UNAVAILABLE.into()))
        }

        fn open_virtual_port(&mut self, _port_name: &str) -> Result<()> {
            Err(MidiError::ServerUnavailable(UNAVAILABLE.into()))
        }

        fn close_port(&mut self) {}

        fn set_port_name(&mut self, _port_name: &str) -> Result<()> {
            Err(MidiError::Unsupported(UNAVAILABLE))
        }

        fn port_count(&self) -> usize {
            0
        }

        fn port_name(&self, _index: usize) -> Option<String> {
            None
        }

        fn send(&mut self, _message: &[u8]) -> Result<()> {
            Err(MidiError::NotConnected)
        }

        fn is_connected(&self) -> bool {
            false
        }

        fn is_port_open(&self) -> bool {
            false
        }
    }

    pub struct JackObserver;

    pub fn new_observer(_config: ObserverConfig) -> Result<JackObserver> {
        tracing::warn!("{UNAVAILABLE}; observer will never report events");
        Ok(JackObserver)
    }

    impl MidiObserver for JackObserver {
        fn api(&self) -> Api {
            Api::Jack
        }

        fn try_recv(&self) -> Option<PortEvent> {
            None
        }
    }
}
