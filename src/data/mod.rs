//! Sample history and export.
pub mod storage;

pub use storage::{SampleStore, SharedStore};
