//! Real JACK hotplug observer.

use jack::{Client, ClientOptions, PortSpec};

use crate::backend::MidiObserver;
use crate::config::ObserverConfig;
use crate::observer::{PortEvent, PortWatcher};
use crate::{Api, MidiError, Result};

pub struct JackObserver {
    watcher: PortWatcher,
}

pub fn new_observer(config: ObserverConfig) -> Result<JackObserver> {
    let (client, _status) = Client::new(&config.client_name, ClientOptions::NO_START_SERVER)
        .map_err(|err| MidiError::ServerUnavailable(err.to_string()))?;
    let watcher = PortWatcher::spawn(
        move || {
            client.ports(
                None,
                Some(jack::MidiIn::default().jack_port_type()),
                jack::PortFlags::IS_INPUT,
            )
        },
        config.poll_interval,
    )?;
    Ok(JackObserver { watcher })
}

impl MidiObserver for JackObserver {
    fn api(&self) -> Api {
        Api::Jack
    }

    fn try_recv(&self) -> Option<PortEvent> {
        self.watcher.try_recv()
    }
}
