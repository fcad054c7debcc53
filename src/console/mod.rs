//! The console view-model.
//!
//! [`Console`] sits between the toolkit and a [`Backend`]. It owns the control state, the chart
//! frame and the status log, and is driven entirely from the UI thread:
//!
//! - **Pushes**: the backend posts samples through a mailbox; [`Console::pump`] drains it and
//!   runs [`Console::on_sample`] for each one, which syncs unfocused controls and redraws the
//!   chart from the full sample window.
//! - **Operator actions**: [`Console::submit_setpoint`], [`Console::toggle_enabled`] and
//!   [`Console::reset`] turn input into commands.
//! - **Close**: [`Console::close`] runs the shutdown sequence once and ends the lifecycle.
//!
//! Every entry point reports its own failures to tracing and the status log. The returned
//! errors are informational; none of them leaves the console unusable.

pub mod chart;
pub mod controls;
pub mod dispatch;
pub mod lifecycle;
pub mod status;
pub mod sync;

pub use chart::{
    Axis, AxisRange, ChartFrame, ChartRenderer, ChartSettings, LegendPlacement, TraceStyle,
};
pub use controls::{ChangeOrigin, ControlId, ControlPanel, ControlState};
pub use lifecycle::{LifecycleState, ResetReport, ShutdownReport};
pub use status::{StatusEntry, StatusLevel, StatusLog};
pub use sync::SyncReport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::Command;
use crate::config::ConsoleConfig;
use crate::data::SharedStore;
use crate::error::{AppResult, BackendOperation, ConsoleError, SetpointKind};
use crate::hardware::{mailbox, Backend, SampleMailbox, SampleObserver, Waker};
use crate::sample::Sample;
use crate::settings::{GeometryStore, WindowGeometry};

/// View-model binding the controls, chart and status log to one backend.
pub struct Console<B: Backend> {
    backend: B,
    store: SharedStore,
    mailbox: SampleMailbox,
    controls: ControlPanel,
    chart: ChartRenderer,
    status: StatusLog,
    state: LifecycleState,
    decimals: usize,
    export_dir: PathBuf,
}

impl<B: Backend> Console<B> {
    /// Subscribes to `backend` and returns a connected console.
    ///
    /// `waker` is called after every push, from whatever thread the backend pushes on.
    pub fn new(backend: B, config: &ConsoleConfig, waker: Option<Waker>) -> Self {
        let (observer, mailbox) = mailbox(waker);
        let store = backend.datastore();
        let mut console = Self {
            backend,
            store,
            mailbox,
            controls: ControlPanel::default(),
            chart: ChartRenderer::new(ChartSettings::from(&config.display)),
            status: StatusLog::new(config.display.status_capacity),
            state: LifecycleState::Disconnected,
            decimals: config.display.setpoint_decimals,
            export_dir: config.storage.export_dir.clone(),
        };

        let observer: Arc<dyn SampleObserver> = observer;
        console.backend.subscribe(observer);
        console.state = LifecycleState::Connected;
        tracing::info!(export_dir = %console.export_dir.display(), "Console connected");
        console
    }

    /// Handles every push received since the last call. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let pushes = self.mailbox.drain();
        let handled = pushes.len();
        for push in pushes {
            self.on_sample(push.as_ref());
        }
        handled
    }

    /// Syncs unfocused controls to `sample` and redraws the chart.
    ///
    /// `None` ("no data yet") and pushes after close are skipped entirely.
    pub fn on_sample(&mut self, sample: Option<&Sample>) -> Option<SyncReport> {
        if self.state != LifecycleState::Connected {
            tracing::trace!(state = ?self.state, "Ignoring push on inactive console");
            return None;
        }
        let sample = sample?;

        let report = sync::sync_controls(&mut self.controls, sample, self.decimals);
        let window = self.store.read();
        self.chart.redraw(window.samples());
        Some(report)
    }

    /// Commits the text of a setpoint field as a `SET_VOLTAGE` or `SET_CURRENT` command.
    ///
    /// Text that does not parse leaves the field as typed and in focus, and sends nothing.
    /// Otherwise exactly one command is sent and the field returns to tracking the backend,
    /// whether or not the backend accepted the command.
    pub fn submit_setpoint(&mut self, kind: SetpointKind) -> AppResult<Command> {
        self.ensure_connected()?;

        let field = self.controls.setpoint_mut(kind);
        field.begin_submit();
        let parsed = dispatch::parse_setpoint(kind, field.text());
        let value = match parsed {
            Ok(value) => value,
            Err(e) => {
                self.controls.setpoint_mut(kind).resume_editing();
                self.report(&e);
                return Err(e);
            }
        };

        let command = dispatch::setpoint_command(kind, value);
        let sent = self.send(command);
        self.controls.setpoint_mut(kind).release_focus();
        sent.map(|()| command)
    }

    /// Applies a change of the enabled toggle.
    ///
    /// Only [`ChangeOrigin::User`] changes dispatch `ENABLE`; a [`ChangeOrigin::Sync`] change
    /// just records the new state.
    pub fn toggle_enabled(
        &mut self,
        checked: bool,
        origin: ChangeOrigin,
    ) -> AppResult<Option<Command>> {
        if origin == ChangeOrigin::Sync {
            self.controls.enabled.set_checked(checked);
            return Ok(None);
        }
        self.ensure_connected()?;

        self.controls.enabled.set_checked(checked);
        self.controls.enabled.begin_submit();
        let command = Command::enable(checked);
        let sent = self.send(command);
        self.controls.enabled.release_focus();
        sent.map(|()| Some(command))
    }

    /// Runs the reset sequence: export, clear, then `RESET`.
    ///
    /// Failed steps are reported and collected in the returned report; the remaining steps
    /// still run.
    pub fn reset(&mut self) -> AppResult<ResetReport> {
        self.ensure_connected()?;

        let report = lifecycle::run_reset(&self.backend, &self.export_dir);
        for e in &report.errors {
            self.report(e);
        }
        if let Some(path) = &report.exported {
            self.status
                .push(StatusLevel::Info, format!("Exported samples to {}", path.display()));
        }
        if report.reset_sent {
            self.status.push(StatusLevel::Info, "Instrument reset");
        }
        Ok(report)
    }

    /// Writes the current window to the export directory without clearing it.
    pub fn export_samples(&mut self) -> AppResult<PathBuf> {
        self.ensure_connected()?;

        let exported = self.store.read().write(&self.export_dir);
        match exported {
            Ok(path) => {
                self.status
                    .push(StatusLevel::Info, format!("Exported samples to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                let e = e.during(BackendOperation::Export);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Runs the shutdown sequence and moves the console to `Closed`.
    ///
    /// A second call does nothing and accepts the close again.
    pub fn close(
        &mut self,
        geometry: &WindowGeometry,
        settings: &mut dyn GeometryStore,
    ) -> ShutdownReport {
        if self.state == LifecycleState::Closed {
            return ShutdownReport {
                close_accepted: true,
                ..ShutdownReport::default()
            };
        }

        self.state = LifecycleState::Closing;
        let report = lifecycle::run_shutdown(&self.backend, geometry, settings);
        for e in &report.errors {
            self.report(e);
        }
        self.state = LifecycleState::Closed;
        report
    }

    /// Logs an error and adds it to the status log.
    pub fn report(&mut self, err: &ConsoleError) {
        if err.is_recoverable() {
            tracing::warn!(error = %err, "Console operation failed");
            self.status.push(StatusLevel::Warn, err.to_string());
        } else {
            tracing::error!(error = %err, "Console operation failed");
            self.status.push(StatusLevel::Error, err.to_string());
        }
    }

    fn send(&mut self, command: Command) -> AppResult<()> {
        tracing::debug!(%command, "Sending command");
        self.backend.send_command(command).map_err(|e| {
            let e = e.during(BackendOperation::Command);
            self.report(&e);
            e
        })
    }

    fn ensure_connected(&self) -> AppResult<()> {
        match self.state {
            LifecycleState::Connected => Ok(()),
            other => Err(ConsoleError::InvalidState(other)),
        }
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The synced controls.
    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    /// Control state for the toolkit to bind widgets and route focus events to.
    pub fn controls_mut(&mut self) -> &mut ControlPanel {
        &mut self.controls
    }

    /// The chart and its latest frame.
    pub fn chart(&self) -> &ChartRenderer {
        &self.chart
    }

    /// On-screen status log.
    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    /// On-screen status log, mutably.
    pub fn status_mut(&mut self) -> &mut StatusLog {
        &mut self.status
    }

    /// The backend's sample store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// The connected backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Directory reset exports go to.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Offline {
        store: SharedStore,
        sent: Mutex<Vec<Command>>,
    }

    impl Backend for Offline {
        fn subscribe(&self, _observer: Arc<dyn SampleObserver>) {}

        fn send_command(&self, command: Command) -> AppResult<()> {
            self.sent.lock().push(command);
            Err(ConsoleError::backend(BackendOperation::Command, "link down"))
        }

        fn datastore(&self) -> SharedStore {
            self.store.clone()
        }

        fn at_exit(&self) -> AppResult<()> {
            Ok(())
        }
    }

    fn console() -> Console<Offline> {
        Console::new(Offline::default(), &ConsoleConfig::default(), None)
    }

    #[test]
    #[traced_test]
    fn backend_failures_are_logged_and_listed() {
        let mut console = console();
        assert!(console.toggle_enabled(true, ChangeOrigin::User).is_err());

        assert!(logs_contain("Console operation failed"));
        assert!(logs_contain("link down"));
        assert_eq!(console.status().latest().map(|e| e.level), Some(StatusLevel::Warn));
        assert_eq!(console.backend().sent.lock().len(), 1);
        assert_eq!(console.controls().enabled.state(), ControlState::Synced);
    }

    #[test]
    #[traced_test]
    fn invalid_input_never_reaches_the_backend() {
        let mut console = console();
        console.controls_mut().focus_in(ControlId::CurrentSetpoint);
        console.controls_mut().current.set_text("nan");

        let err = console.submit_setpoint(SetpointKind::Current).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidInput { .. }));
        assert!(console.backend().sent.lock().is_empty());
        assert!(logs_contain("Invalid current setpoint"));
    }

    #[test]
    fn empty_push_before_any_sample_is_skipped() {
        let mut console = console();
        assert!(console.on_sample(None).is_none());
        assert!(console.chart().frame().is_none());
    }
}
