//! Simulated Power Supply
//!
//! Provides a [`Backend`] that behaves like a bench supply driving a resistive load, for
//! running the console without physical hardware.
//!
//! # Behavior
//!
//! - Constant-voltage / constant-current regulation into `load_ohms`
//! - First-order settling towards the regulated operating point
//! - Optional multiplicative measurement noise
//! - One sample per `poll_interval_ms`, appended to the store and pushed to the observer
//!
//! All timing uses `tokio::time`, so tests can run it on a paused clock.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{Command, CommandKind, CommandValue};
use crate::config::InstrumentConfig;
use crate::data::{SampleStore, SharedStore};
use crate::error::{AppResult, BackendOperation, ConsoleError};
use crate::hardware::capabilities::{Backend, SampleObserver};
use crate::sample::Sample;

type ObserverSlot = Arc<Mutex<Option<Arc<dyn SampleObserver>>>>;

// =============================================================================
// SupplyModel - electrical behavior
// =============================================================================

/// Electrical state of the simulated supply.
#[derive(Debug, Clone)]
pub struct SupplyModel {
    config: InstrumentConfig,
    set_voltage: f64,
    set_current: f64,
    is_on: bool,
    voltage: f64,
}

impl SupplyModel {
    /// Powered-up state: output off, default setpoints.
    pub fn new(config: InstrumentConfig) -> Self {
        Self {
            set_voltage: config.default_set_voltage,
            set_current: config.default_set_current,
            is_on: false,
            voltage: 0.0,
            config,
        }
    }

    /// Voltage setpoint.
    pub fn set_voltage(&self) -> f64 {
        self.set_voltage
    }

    /// Current limit.
    pub fn set_current(&self) -> f64 {
        self.set_current
    }

    /// Whether the output is enabled.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Output voltage the regulator is steering towards.
    pub fn target_voltage(&self) -> f64 {
        if !self.is_on {
            return 0.0;
        }
        // CV until the load would draw more than the limit, CC beyond that.
        let cv_current = self.set_voltage / self.config.load_ohms;
        if cv_current <= self.set_current {
            self.set_voltage
        } else {
            self.set_current * self.config.load_ohms
        }
    }

    /// Applies one command. Setpoints are clamped to the instrument rating.
    pub fn apply(&mut self, command: Command) {
        match (command.kind, command.value) {
            (CommandKind::Enable, CommandValue::Flag(on)) => self.is_on = on,
            (CommandKind::SetVoltage, CommandValue::Number(v)) if v.is_finite() => {
                self.set_voltage = v.clamp(0.0, self.config.max_voltage);
            }
            (CommandKind::SetCurrent, CommandValue::Number(a)) if a.is_finite() => {
                self.set_current = a.clamp(0.0, self.config.rated_current);
            }
            (CommandKind::Reset, _) => {
                *self = Self::new(self.config.clone());
            }
            (kind, value) => {
                tracing::warn!(%kind, ?value, "Ignoring command with unexpected payload");
            }
        }
    }

    /// Advances the output by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let tau = self.config.slew_time_constant_secs;
        let target = self.target_voltage();
        if tau <= 0.0 {
            self.voltage = target;
        } else {
            let alpha = 1.0 - (-dt / tau).exp();
            self.voltage += (target - self.voltage) * alpha;
        }
    }

    /// Reads the instrument at `time`, applying measurement noise.
    pub fn sample<R: Rng>(&self, time: std::time::Duration, rng: &mut R) -> Sample {
        let noise = self.config.noise_fraction;
        let mut jitter = || {
            if noise > 0.0 {
                1.0 + rng.gen_range(-noise..=noise)
            } else {
                1.0
            }
        };
        let voltage = self.voltage.max(0.0);
        let current = voltage / self.config.load_ohms;
        Sample {
            time,
            voltage: voltage * jitter(),
            current: current * jitter(),
            set_voltage: self.set_voltage,
            set_current: self.set_current,
            is_on: self.is_on,
        }
    }
}

// =============================================================================
// SimulatedSupply - Backend implementation
// =============================================================================

/// Simulated bench supply running its acquisition loop on a tokio task.
///
/// # Example
///
/// ```rust,ignore
/// let supply = SimulatedSupply::spawn(InstrumentConfig::default(), &runtime.handle());
/// supply.subscribe(observer);
/// supply.send_command(Command::enable(true))?;
/// ```
pub struct SimulatedSupply {
    store: SharedStore,
    observer: ObserverSlot,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedSupply {
    /// Starts the acquisition task on `handle`.
    pub fn spawn(config: InstrumentConfig, handle: &tokio::runtime::Handle) -> Self {
        let store = SampleStore::shared();
        let observer: ObserverSlot = Arc::new(Mutex::new(None));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(false);

        let task = handle.spawn(acquisition_loop(
            SupplyModel::new(config.clone()),
            config.poll_interval(),
            store.clone(),
            observer.clone(),
            command_rx,
            shutdown_rx,
        ));
        tracing::info!(
            poll_ms = config.poll_interval_ms,
            load_ohms = config.load_ohms,
            "Simulated supply started"
        );

        Self {
            store,
            observer,
            commands,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Whether the acquisition task is still running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Backend for SimulatedSupply {
    fn subscribe(&self, observer: Arc<dyn SampleObserver>) {
        if self.observer.lock().replace(observer).is_some() {
            tracing::warn!("Replacing existing sample observer");
        }
    }

    fn send_command(&self, command: Command) -> AppResult<()> {
        self.commands.send(command).map_err(|_| {
            ConsoleError::backend(BackendOperation::Command, "instrument session is closed")
        })
    }

    fn datastore(&self) -> SharedStore {
        self.store.clone()
    }

    fn at_exit(&self) -> AppResult<()> {
        let Some(task) = self.task.lock().take() else {
            tracing::debug!("Simulated supply already shut down");
            return Ok(());
        };
        // The loop exits on its own once it sees the flag; abort covers a task that is
        // not being polled any more.
        if self.shutdown.send(true).is_err() {
            task.abort();
        }
        self.observer.lock().take();
        tracing::info!("Simulated supply shut down");
        Ok(())
    }
}

impl Drop for SimulatedSupply {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

async fn acquisition_loop(
    mut model: SupplyModel,
    period: std::time::Duration,
    store: SharedStore,
    observer: ObserverSlot,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut rng = StdRng::from_entropy();
    let mut origin = Instant::now();
    let mut last_step = origin;
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    notify(&observer, None);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                model.step(now.duration_since(last_step).as_secs_f64());
                last_step = now;

                let sample = model.sample(now.duration_since(origin), &mut rng);
                if let Err(e) = store.write().append(sample) {
                    tracing::warn!(error = %e, "Dropping sample");
                    continue;
                }
                notify(&observer, Some(sample));
            }
            Some(command) = commands.recv() => {
                tracing::debug!(%command, "Simulated supply applying command");
                model.apply(command);
                if command.kind == CommandKind::Reset {
                    // New test: restart the time base and drop anything stamped on the old one.
                    origin = Instant::now();
                    store.write().reset();
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    tracing::debug!("Acquisition loop stopped");
}

fn notify(observer: &ObserverSlot, sample: Option<Sample>) {
    // Clone out of the lock so the observer never runs while it is held.
    let current = observer.lock().clone();
    if let Some(observer) = current {
        observer.on_sample(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::time::Duration;

    fn quiet_config() -> InstrumentConfig {
        InstrumentConfig {
            noise_fraction: 0.0,
            slew_time_constant_secs: 0.0,
            ..InstrumentConfig::default()
        }
    }

    #[test]
    fn constant_voltage_below_current_limit() {
        let mut model = SupplyModel::new(quiet_config());
        model.apply(Command::set_voltage(4.0));
        model.apply(Command::set_current(2.0));
        model.apply(Command::enable(true));
        model.step(0.5);

        let s = model.sample(Duration::from_secs(1), &mut StepRng::new(0, 1));
        assert_eq!(s.voltage, 4.0);
        assert_eq!(s.current, 1.0);
        assert!(s.is_on);
    }

    #[test]
    fn constant_current_when_load_draws_too_much() {
        let mut model = SupplyModel::new(quiet_config());
        model.apply(Command::set_voltage(12.0));
        model.apply(Command::set_current(1.5));
        model.apply(Command::enable(true));
        model.step(0.5);

        let s = model.sample(Duration::ZERO, &mut StepRng::new(0, 1));
        assert_eq!(s.current, 1.5);
        assert_eq!(s.voltage, 6.0);
    }

    #[test]
    fn setpoints_are_clamped_and_nan_ignored() {
        let mut model = SupplyModel::new(quiet_config());
        model.apply(Command::set_voltage(99.0));
        model.apply(Command::set_current(-3.0));
        assert_eq!(model.set_voltage(), 30.0);
        assert_eq!(model.set_current(), 0.0);

        model.apply(Command::set_voltage(f64::NAN));
        assert_eq!(model.set_voltage(), 30.0);
    }

    #[test]
    fn reset_restores_power_up_state() {
        let mut model = SupplyModel::new(quiet_config());
        model.apply(Command::set_voltage(5.0));
        model.apply(Command::enable(true));
        model.apply(Command::reset());
        assert!(!model.is_on());
        assert_eq!(model.set_voltage(), 0.0);
        assert_eq!(model.set_current(), 1.0);
    }

    #[test]
    fn output_settles_exponentially() {
        let config = InstrumentConfig {
            noise_fraction: 0.0,
            slew_time_constant_secs: 1.0,
            ..InstrumentConfig::default()
        };
        let mut model = SupplyModel::new(config);
        model.apply(Command::set_voltage(2.0));
        model.apply(Command::enable(true));
        model.step(1.0);

        let s = model.sample(Duration::ZERO, &mut StepRng::new(0, 1));
        let expected = 2.0 * (1.0 - (-1.0f64).exp());
        assert!((s.voltage - expected).abs() < 1e-9);
    }
}
