//! Polling hotplug watcher shared by the backend observers.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::{MidiError, Result};

/// Port hotplug event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEvent {
    /// A port appeared. Ports present at spawn time are reported too.
    Added(String),
    /// A previously seen port disappeared.
    Removed(String),
}

/// Watcher that periodically enumerates ports and diffs the snapshots.
pub struct PortWatcher {
    stop_tx: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
    rx: Receiver<PortEvent>,
}

impl PortWatcher {
    /// Spawn a watcher polling `enumerate` every `interval`.
    pub fn spawn<F>(enumerate: F, interval: Duration) -> Result<Self>
    where
        F: Fn() -> Vec<String> + Send + 'static,
    {
        let (event_tx, event_rx) = bounded(64);
        let (stop_tx, stop_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("midiway-observer".into())
            .spawn(move || {
                let mut known: Vec<String> = Vec::new();
                while stop_rx.try_recv().is_err() {
                    let snapshot = enumerate();
                    for name in &snapshot {
                        if !known.contains(name) {
                            let _ = event_tx.try_send(PortEvent::Added(name.clone()));
                        }
                    }
                    for name in &known {
                        if !snapshot.contains(name) {
                            let _ = event_tx.try_send(PortEvent::Removed(name.clone()));
                        }
                    }
                    known = snapshot;
                    thread::park_timeout(interval);
                }
            })
            .map_err(|err| MidiError::Driver(err.to_string()))?;
        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(handle),
            rx: event_rx,
        })
    }

    /// Receive the next hotplug event, if available.
    pub fn try_recv(&self) -> Option<PortEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for PortWatcher {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn snapshot_changes_become_added_and_removed_events() {
        let ports = Arc::new(Mutex::new(vec!["a".to_string()]));
        let source = Arc::clone(&ports);
        let watcher = PortWatcher::spawn(
            move || source.lock().unwrap().clone(),
            Duration::from_millis(5),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(watcher.try_recv(), Some(PortEvent::Added("a".into())));

        *ports.lock().unwrap() = vec!["b".to_string()];
        thread::sleep(Duration::from_millis(50));

        let mut events = Vec::new();
        while let Some(event) = watcher.try_recv() {
            events.push(event);
        }
        assert!(events.contains(&PortEvent::Added("b".into())));
        assert!(events.contains(&PortEvent::Removed("a".into())));
    }
}
