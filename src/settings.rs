//! Persisted window settings.
//!
//! Settings live in a small JSON document of `"Group/key"` entries, stored in the platform
//! config directory (`<config_dir>/<application name>/settings.json`) unless the configuration
//! names a file explicitly. The console only persists the main window geometry:
//!
//! - **`MainWindow/size`**: `[width, height]` in logical points
//! - **`MainWindow/pos`**: `[x, y]` of the outer window
//!
//! Missing or malformed entries fall back to the configured defaults (1024×600 at the
//! origin). Writes are kept in memory until [`SettingsStore::sync`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::WindowConfig;
use crate::error::{AppResult, ConsoleError};

/// Settings key of the window size.
pub const SIZE_KEY: &str = "MainWindow/size";
/// Settings key of the window position.
pub const POS_KEY: &str = "MainWindow/pos";

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Size and position of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// Inner size in logical points.
    pub size: [f32; 2],
    /// Outer position in logical points.
    pub pos: [f32; 2],
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::from(&WindowConfig::default())
    }
}

impl From<&WindowConfig> for WindowGeometry {
    fn from(window: &WindowConfig) -> Self {
        Self {
            size: window.default_size,
            pos: window.default_pos,
        }
    }
}

/// Somewhere window geometry can be persisted on shutdown.
pub trait GeometryStore {
    /// Saves and flushes `geometry`.
    fn save_geometry(&mut self, geometry: &WindowGeometry) -> AppResult<()>;
}

/// JSON-backed key/value settings file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, serde_json::Value>,
}

impl SettingsStore {
    /// An empty store that will be written to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
        }
    }

    /// Opens the settings file at `path`. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// `<config_dir>/<app_name>/settings.json`.
    pub fn default_path(app_name: &str) -> AppResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| ConsoleError::NoSettingsDir(PathBuf::from(app_name)))?;
        Ok(base.join(app_name).join(SETTINGS_FILE_NAME))
    }

    /// File the store syncs to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads `key`; `None` when absent or of the wrong shape.
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.values.get(key)?;
        match serde_json::from_value(raw.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed setting");
                None
            }
        }
    }

    /// Sets `key` in memory; see [`SettingsStore::sync`].
    pub fn set_value<T: Serialize>(&mut self, key: &str, value: &T) -> AppResult<()> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Writes all entries to disk, creating the parent directory if needed.
    pub fn sync(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Settings written");
        Ok(())
    }

    /// Saved geometry, with each missing entry taken from `defaults`.
    pub fn load_geometry(&self, defaults: WindowGeometry) -> WindowGeometry {
        WindowGeometry {
            size: self.value(SIZE_KEY).unwrap_or(defaults.size),
            pos: self.value(POS_KEY).unwrap_or(defaults.pos),
        }
    }
}

impl GeometryStore for SettingsStore {
    fn save_geometry(&mut self, geometry: &WindowGeometry) -> AppResult<()> {
        self.set_value(SIZE_KEY, &geometry.size)?;
        self.set_value(POS_KEY, &geometry.pos)?;
        self.sync()
    }
}
