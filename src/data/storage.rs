//! In-memory sample history with CSV export.
//!
//! The [`SampleStore`] is owned by the backend. The backend appends one sample per
//! acquisition tick; the console reads it to draw the chart and, during a reset, asks it to
//! export and then clear itself. It is shared between the backend task and the UI thread as
//! a [`SharedStore`].
use crate::{
    error::{AppResult, ConsoleError},
    sample::{FieldValue, Sample, SampleField},
};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The store as shared between the backend and the console.
pub type SharedStore = Arc<RwLock<SampleStore>>;

/// Append-only, time-ordered sample history for the current session.
#[derive(Debug, Default, Clone)]
pub struct SampleStore {
    samples: Vec<Sample>,
}

impl SampleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh store for sharing.
    pub fn shared() -> SharedStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Appends a sample. Samples older than the latest one are rejected so the window stays
    /// chronological.
    pub fn append(&mut self, sample: Sample) -> AppResult<()> {
        if let Some(latest) = self.samples.last() {
            if sample.time < latest.time {
                return Err(ConsoleError::OutOfOrderSample {
                    latest: latest.time,
                    incoming: sample.time,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// The whole window, oldest first.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Latest value of a named field, `None` while the store is empty.
    pub fn lastval(&self, field: SampleField) -> Option<FieldValue> {
        self.latest().map(|s| s.field(field))
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops the in-memory history.
    pub fn reset(&mut self) {
        let dropped = self.samples.len();
        self.samples.clear();
        tracing::debug!(dropped, "Sample store cleared");
    }

    /// Exports the window as a timestamped CSV file inside `dir` and returns its path.
    ///
    /// The directory is created if needed. An empty store still produces a file with only
    /// the header row. An existing export is never overwritten; a clashing name gets a
    /// `_N` suffix.
    pub fn write(&self, dir: &Path) -> AppResult<PathBuf> {
        self.write_at(dir, chrono::Local::now())
    }

    fn write_at(&self, dir: &Path, now: chrono::DateTime<chrono::Local>) -> AppResult<PathBuf> {
        #[cfg(not(feature = "storage_csv"))]
        {
            let _ = (dir, now);
            return Err(ConsoleError::FeatureNotEnabled("storage_csv".to_string()));
        }

        #[cfg(feature = "storage_csv")]
        {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
            let (path, file) = create_export_file(dir, &export_file_stem(now))?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(SampleField::ALL.iter().map(SampleField::name))?;
            for s in &self.samples {
                writer.write_record(&[
                    format!("{:.3}", s.seconds()),
                    s.voltage.to_string(),
                    s.current.to_string(),
                    s.set_voltage.to_string(),
                    s.set_current.to_string(),
                    s.is_on.to_string(),
                ])?;
            }
            writer.flush()?;
            tracing::info!(path = %path.display(), rows = self.samples.len(), "Exported samples");
            Ok(path)
        }
    }
}

#[cfg_attr(not(feature = "storage_csv"), allow(dead_code))]
fn export_file_stem(now: chrono::DateTime<chrono::Local>) -> String {
    format!("samples_{}", now.format("%Y%m%d_%H%M%S_%3f"))
}

/// Opens `<stem>.csv`, or the first free `<stem>_N.csv`, refusing to truncate.
#[cfg_attr(not(feature = "storage_csv"), allow(dead_code))]
fn create_export_file(dir: &Path, stem: &str) -> AppResult<(PathBuf, std::fs::File)> {
    let mut attempt = 0u32;
    loop {
        let name = match attempt {
            0 => format!("{stem}.csv"),
            n => format!("{stem}_{n}.csv"),
        };
        let path = dir.join(name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
