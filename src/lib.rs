//! # Bench Console Library
//!
//! This crate is the core of the `bench-console` application, an operator console for a bench
//! power source used in battery tests. It keeps the displayed controls and a live
//! voltage/current chart in step with a backend that pushes samples continuously, while never
//! overwriting a value the operator is in the middle of typing.
//!
//! ## Crate Structure
//!
//! - **`command`**: The fixed command vocabulary (`ENABLE`, `SET_VOLTAGE`, `SET_CURRENT`, `RESET`).
//! - **`config`**: Layered configuration (defaults, TOML file, environment) loaded with `figment`.
//! - **`console`**: The view-model: control state, view-model sync, chart frames, command
//!   dispatch, the reset and shutdown sequences and the status log.
//! - **`data`**: The backend-owned sample store and its CSV export.
//! - **`error`**: The `ConsoleError` enum used across the crate.
//! - **`gui`**: The native `eframe`/`egui` front end.
//! - **`hardware`**: The `Backend`/`SampleObserver` contracts and a simulated supply.
//! - **`logging`**: `tracing-subscriber` setup.
//! - **`sample`**: The `Sample` record and its named fields.
//! - **`settings`**: Persisted window geometry.

pub mod command;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod gui;
pub mod hardware;
pub mod logging;
pub mod sample;
pub mod settings;
