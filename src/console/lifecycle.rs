//! Reset and shutdown sequences.
//!
//! Both sequences are best effort: every step runs even when an earlier one failed, and the
//! failures are collected into the returned report instead of aborting the sequence.
//!
//! | Sequence | Steps, in order |
//! |---|---|
//! | reset | export window → clear store → `RESET` command |
//! | shutdown | persist geometry → backend `at_exit` → accept close |

use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::error::{AppResult, BackendOperation, ConsoleError};
use crate::hardware::Backend;
use crate::settings::{GeometryStore, WindowGeometry};

/// Console connection lifecycle. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not yet subscribed to a backend.
    Disconnected,
    /// Receiving pushes and accepting operator input.
    Connected,
    /// Shutdown sequence in progress.
    Closing,
    /// Shutdown finished; pushes are ignored.
    Closed,
}

/// Outcome of a reset sequence.
#[derive(Debug, Default)]
pub struct ResetReport {
    /// File the window was exported to, if the export succeeded.
    pub exported: Option<PathBuf>,
    /// Samples dropped from the store.
    pub cleared: usize,
    /// Whether the `RESET` command was handed to the backend.
    pub reset_sent: bool,
    /// Failures collected along the way.
    pub errors: Vec<ConsoleError>,
}

impl ResetReport {
    /// No step failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of a shutdown sequence.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Window geometry was persisted.
    pub geometry_saved: bool,
    /// `at_exit` succeeded.
    pub backend_closed: bool,
    /// The window may close. Always true once the sequence ran.
    pub close_accepted: bool,
    /// Failures collected along the way.
    pub errors: Vec<ConsoleError>,
}

impl ShutdownReport {
    /// Collapses the collected failures into a single error.
    pub fn into_result(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ConsoleError::ShutdownFailed(self.errors))
        }
    }
}

/// Flushes the window to `export_dir`, clears it, then resets the instrument.
pub fn run_reset<B: Backend + ?Sized>(backend: &B, export_dir: &Path) -> ResetReport {
    let store = backend.datastore();
    let mut report = ResetReport::default();

    let exported = store.read().write(export_dir);
    match exported {
        Ok(path) => report.exported = Some(path),
        Err(e) => report.errors.push(e.during(BackendOperation::Export)),
    }

    {
        let mut store = store.write();
        report.cleared = store.len();
        store.reset();
    }

    match backend.send_command(Command::reset()) {
        Ok(()) => report.reset_sent = true,
        Err(e) => report.errors.push(e),
    }

    tracing::info!(
        exported = ?report.exported,
        cleared = report.cleared,
        reset_sent = report.reset_sent,
        errors = report.errors.len(),
        "Reset sequence finished"
    );
    report
}

/// Persists window geometry, then shuts the backend down.
pub fn run_shutdown<B: Backend + ?Sized>(
    backend: &B,
    geometry: &WindowGeometry,
    settings: &mut dyn GeometryStore,
) -> ShutdownReport {
    let mut report = ShutdownReport::default();

    match settings.save_geometry(geometry) {
        Ok(()) => report.geometry_saved = true,
        Err(e) => report.errors.push(e),
    }

    match backend.at_exit() {
        Ok(()) => report.backend_closed = true,
        Err(e) => report.errors.push(e.during(BackendOperation::Shutdown)),
    }

    report.close_accepted = true;
    tracing::info!(
        geometry_saved = report.geometry_saved,
        backend_closed = report.backend_closed,
        "Shutdown sequence finished"
    );
    report
}
