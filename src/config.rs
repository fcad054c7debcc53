//! Console configuration using Figment
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults (`ConsoleConfig::default()`)
//! 2. A TOML file (`config/default.toml` unless another path is given)
//! 3. Environment variables prefixed with `BENCH_CONSOLE_`, nested with `__`
//!
//! # Example
//! ```no_run
//! use bench_console::config::ConsoleConfig;
//!
//! let config = ConsoleConfig::load()?;
//! println!("Application: {}", config.application.name);
//! # Ok::<(), bench_console::error::ConsoleError>(())
//! ```
//!
//! Example override: `BENCH_CONSOLE_DISPLAY__MIN_WINDOW_SECS=120`

use crate::error::{AppResult, ConsoleError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level console configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Application settings
    pub application: ApplicationConfig,
    /// Chart and control formatting
    pub display: DisplayConfig,
    /// Export location for the reset sequence
    pub storage: StorageConfig,
    /// Window geometry defaults and settings file
    pub window: WindowConfig,
    /// Simulated instrument parameters
    pub instrument: InstrumentConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name, also used to scope the settings directory
    pub name: String,
    /// Window title
    pub title: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "bench-console".to_string(),
            title: "Battery tester".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Display constants for the chart and setpoint controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places shown in the setpoint fields
    pub setpoint_decimals: usize,
    /// Minimum span of the time axis, in seconds
    pub min_window_secs: f64,
    /// Fixed upper bound of the current axis (instrument rating), in amperes
    pub current_ceiling_amps: f64,
    /// Maximum number of characters accepted by a setpoint field
    pub setpoint_max_chars: usize,
    /// Headroom added above the highest voltage, as a fraction of the visible span
    pub voltage_headroom: f64,
    /// Smallest visible voltage span, used when all data sits at or below the setpoint
    pub min_voltage_span: f64,
    /// Entries kept in the on-screen status log
    pub status_capacity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            setpoint_decimals: 2,
            min_window_secs: 60.0,
            current_ceiling_amps: 10.0,
            setpoint_max_chars: 5,
            voltage_headroom: 0.05,
            min_voltage_span: 0.1,
            status_capacity: 200,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory the reset sequence exports the sample window into
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("./tmp/"),
        }
    }
}

/// Window geometry defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Size used when no geometry was saved yet
    pub default_size: [f32; 2],
    /// Position used when no geometry was saved yet
    pub default_pos: [f32; 2],
    /// Explicit settings file; defaults to the platform config directory
    pub settings_file: Option<PathBuf>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            default_size: [1024.0, 600.0],
            default_pos: [0.0, 0.0],
            settings_file: None,
        }
    }
}

/// Simulated power supply parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Acquisition period in milliseconds
    pub poll_interval_ms: u64,
    /// Highest voltage setpoint accepted, in volts
    pub max_voltage: f64,
    /// Highest current limit accepted, in amperes
    pub rated_current: f64,
    /// Resistance of the simulated load, in ohms
    pub load_ohms: f64,
    /// Output settling time constant, in seconds
    pub slew_time_constant_secs: f64,
    /// Relative amplitude of measurement noise (0 disables noise)
    pub noise_fraction: f64,
    /// Voltage setpoint after power-up and reset
    pub default_set_voltage: f64,
    /// Current limit after power-up and reset
    pub default_set_current: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_voltage: 30.0,
            rated_current: 10.0,
            load_ohms: 4.0,
            slew_time_constant_secs: 0.8,
            noise_fraction: 0.002,
            default_set_voltage: 0.0,
            default_set_current: 1.0,
        }
    }
}

impl InstrumentConfig {
    /// Acquisition period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ConsoleConfig {
    /// Load configuration from `config/default.toml` and environment variables
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file path. A missing file leaves the defaults in place.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Self::figment(path.as_ref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(ConsoleConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BENCH_CONSOLE_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return Err(ConsoleError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let display = &self.display;
        if !(display.min_window_secs.is_finite() && display.min_window_secs > 0.0) {
            return Err(ConsoleError::Configuration(format!(
                "Invalid min_window_secs {}. Must be positive",
                display.min_window_secs
            )));
        }
        if !(display.current_ceiling_amps.is_finite() && display.current_ceiling_amps > 0.0) {
            return Err(ConsoleError::Configuration(format!(
                "Invalid current_ceiling_amps {}. Must be positive",
                display.current_ceiling_amps
            )));
        }
        if display.setpoint_max_chars == 0 {
            return Err(ConsoleError::Configuration(
                "setpoint_max_chars must be at least 1".to_string(),
            ));
        }
        if !(display.min_voltage_span.is_finite() && display.min_voltage_span > 0.0)
            || !(display.voltage_headroom.is_finite() && display.voltage_headroom >= 0.0)
        {
            return Err(ConsoleError::Configuration(
                "voltage_headroom must be >= 0 and min_voltage_span > 0".to_string(),
            ));
        }

        let instrument = &self.instrument;
        if instrument.poll_interval_ms == 0 {
            return Err(ConsoleError::Configuration(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if !(instrument.load_ohms.is_finite() && instrument.load_ohms > 0.0) {
            return Err(ConsoleError::Configuration(format!(
                "Invalid load_ohms {}. Must be positive",
                instrument.load_ohms
            )));
        }
        if !(0.0..=instrument.max_voltage).contains(&instrument.default_set_voltage)
            || !(0.0..=instrument.rated_current).contains(&instrument.default_set_current)
        {
            return Err(ConsoleError::Configuration(
                "Default setpoints must lie within the instrument rating".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let config = ConsoleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.display.setpoint_decimals, 2);
        assert_eq!(config.display.min_window_secs, 60.0);
        assert_eq!(config.window.default_size, [1024.0, 600.0]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConsoleConfig::load_from("does/not/exist.toml").unwrap();
            assert_eq!(config, ConsoleConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_and_env_layers_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "console.toml",
                r#"
                [display]
                min_window_secs = 120.0

                [storage]
                export_dir = "exports"
                "#,
            )?;
            jail.set_env("BENCH_CONSOLE_DISPLAY__CURRENT_CEILING_AMPS", "5.0");

            let config = ConsoleConfig::load_from("console.toml").unwrap();
            assert_eq!(config.display.min_window_secs, 120.0);
            assert_eq!(config.display.current_ceiling_amps, 5.0);
            assert_eq!(config.storage.export_dir, PathBuf::from("exports"));
            assert_eq!(config.display.setpoint_decimals, 2);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = ConsoleConfig::default();
        config.application.log_level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConsoleError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_window_and_ceiling() {
        let mut config = ConsoleConfig::default();
        config.display.min_window_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.display.current_ceiling_amps = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_chart_scaling_rejected() {
        let mut config = ConsoleConfig::default();
        config.display.voltage_headroom = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.display.min_voltage_span = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = ConsoleConfig::default();
        config.display.voltage_headroom = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nan_headroom_from_env_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("BENCH_CONSOLE_DISPLAY__VOLTAGE_HEADROOM", "nan");
            assert!(ConsoleConfig::load_from("absent.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_default_setpoint_outside_rating() {
        let mut config = ConsoleConfig::default();
        config.instrument.default_set_current = 12.0;
        assert!(config.validate().is_err());
    }
}
