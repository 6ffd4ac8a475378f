//! Concrete backends and the runtime registry over them.

pub mod dummy;
pub mod jack;

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, MidiOutPort};
use crate::config::OutputConfig;
use crate::{Api, MidiError, Result};

/// Identity card for one compiled backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub api: Api,
    pub name: String,
    pub display_name: String,
}

fn info<B: Backend>() -> BackendInfo {
    BackendInfo {
        api: B::API,
        name: B::NAME.into(),
        display_name: B::DISPLAY_NAME.into(),
    }
}

/// Descriptors for every backend compiled into this build.
pub fn descriptors() -> Vec<BackendInfo> {
    vec![info::<jack::JackBackend>(), info::<dummy::DummyBackend>()]
}

/// APIs with a compiled backend, in preference order.
pub fn available_apis() -> Vec<Api> {
    descriptors().into_iter().map(|d| d.api).collect()
}

/// Constructs an output device for `api` with default backend-specific
/// configuration.
pub fn make_output(api: Api, config: OutputConfig) -> Result<Box<dyn MidiOutPort>> {
    match api {
        Api::Dummy => Ok(Box::new(dummy::DummyBackend::new_output(
            config,
            Default::default(),
        )?)),
        Api::Jack => Ok(Box::new(jack::JackBackend::new_output(
            config,
            Default::default(),
        )?)),
        Api::AlsaSeq | Api::AlsaRawUmp => {
            Err(MidiError::Unsupported("no compiled backend for this API"))
        }
    }
}
