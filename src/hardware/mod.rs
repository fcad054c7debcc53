//! Instrument backends.
//!
//! `capabilities` holds the contracts the console consumes; `mock` provides a simulated
//! bench supply implementing them.

pub mod capabilities;
pub mod mock;

pub use capabilities::{mailbox, Backend, MailboxObserver, SampleMailbox, SampleObserver, Waker};
pub use mock::{SimulatedSupply, SupplyModel};
