//! Shared fakes for the console integration tests.
#![allow(dead_code)]

use bench_console::command::Command;
use bench_console::data::{SampleStore, SharedStore};
use bench_console::error::{AppResult, BackendOperation, ConsoleError};
use bench_console::hardware::{Backend, SampleObserver};
use bench_console::sample::Sample;
use bench_console::settings::{GeometryStore, WindowGeometry};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Something the console asked a collaborator to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A command, with the number of samples in the store when it arrived.
    Command { command: Command, stored: usize },
    AtExit,
    SaveGeometry(WindowGeometry),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

/// Backend that records every call instead of talking to an instrument.
pub struct RecordingBackend {
    store: SharedStore,
    events: EventLog,
    observer: Mutex<Option<Arc<dyn SampleObserver>>>,
    pub fail_commands: bool,
    pub fail_exit: bool,
}

impl RecordingBackend {
    pub fn new(events: EventLog) -> Self {
        Self {
            store: SampleStore::shared(),
            events,
            observer: Mutex::new(None),
            fail_commands: false,
            fail_exit: false,
        }
    }

    /// Appends a sample and pushes it, the way an acquisition loop would.
    pub fn push(&self, sample: Sample) {
        self.store.write().append(sample).unwrap();
        self.push_raw(Some(sample));
    }

    /// Pushes without touching the store.
    pub fn push_raw(&self, sample: Option<Sample>) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.on_sample(sample);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.observer.lock().is_some()
    }
}

impl Backend for RecordingBackend {
    fn subscribe(&self, observer: Arc<dyn SampleObserver>) {
        *self.observer.lock() = Some(observer);
    }

    fn send_command(&self, command: Command) -> AppResult<()> {
        let stored = self.store.read().len();
        self.events.lock().push(Event::Command { command, stored });
        if self.fail_commands {
            return Err(ConsoleError::backend(
                BackendOperation::Command,
                "instrument not responding",
            ));
        }
        Ok(())
    }

    fn datastore(&self) -> SharedStore {
        self.store.clone()
    }

    fn at_exit(&self) -> AppResult<()> {
        self.events.lock().push(Event::AtExit);
        if self.fail_exit {
            return Err(ConsoleError::backend(
                BackendOperation::Shutdown,
                "session already closed",
            ));
        }
        Ok(())
    }
}

/// Geometry store that records saves into the shared event log.
pub struct RecordingGeometry {
    pub events: EventLog,
    pub fail: bool,
}

impl GeometryStore for RecordingGeometry {
    fn save_geometry(&mut self, geometry: &WindowGeometry) -> AppResult<()> {
        self.events.lock().push(Event::SaveGeometry(*geometry));
        if self.fail {
            return Err(ConsoleError::Io(std::io::Error::other("settings are read-only")));
        }
        Ok(())
    }
}

pub fn sample(secs: f64, voltage: f64, set_voltage: f64, set_current: f64, is_on: bool) -> Sample {
    Sample {
        time: Duration::from_secs_f64(secs),
        voltage,
        current: 0.8,
        set_voltage,
        set_current,
        is_on,
    }
}

pub fn commands(events: &EventLog) -> Vec<Command> {
    events
        .lock()
        .iter()
        .filter_map(|e| match e {
            Event::Command { command, .. } => Some(*command),
            _ => None,
        })
        .collect()
}
