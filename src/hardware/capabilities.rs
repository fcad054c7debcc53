//! Backend capabilities consumed by the console.
//!
//! The console never talks to an instrument directly. It depends on two small contracts:
//!
//! - [`Backend`]: owns the instrument session and the sample history, accepts commands and
//!   pushes every new sample to its single subscriber.
//! - [`SampleObserver`]: the subscriber side, with one method, `on_sample`.
//!
//! # Threading
//!
//! Backends usually acquire on their own task or thread, so `on_sample` is called off the UI
//! thread. [`MailboxObserver`] is the observer the console hands to the backend: it only posts
//! the sample into a channel and wakes the UI. The UI thread then drains the paired
//! [`SampleMailbox`] and runs the sync and chart steps itself, so control state and the chart
//! are only ever touched from one thread.
//!
//! # Contract
//!
//! - `subscribe` replaces any previous observer; a backend holds at most one.
//! - `send_command` is fire-and-forget. The result only says whether the request could be
//!   handed to the instrument session; the effect shows up in a later sample.
//! - `at_exit` closes the instrument session and releases resources.
//! - All methods take `&self`; implementations use interior mutability for state.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::command::Command;
use crate::data::SharedStore;
use crate::error::AppResult;
use crate::sample::Sample;

/// Receives backend pushes. `None` means "no data yet".
pub trait SampleObserver: Send + Sync {
    fn on_sample(&self, sample: Option<Sample>);
}

/// The instrument-owning side of the console.
pub trait Backend: Send {
    /// Registers the sole observer, replacing any earlier one.
    fn subscribe(&self, observer: Arc<dyn SampleObserver>);

    /// Queues one command for the instrument.
    fn send_command(&self, command: Command) -> AppResult<()>;

    /// The sample history owned by this backend.
    fn datastore(&self) -> SharedStore;

    /// Shuts the instrument session down.
    fn at_exit(&self) -> AppResult<()>;
}

/// Callback used to wake the UI thread after a push, e.g. an egui repaint request.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Observer that forwards pushes to a [`SampleMailbox`].
pub struct MailboxObserver {
    tx: mpsc::UnboundedSender<Option<Sample>>,
    waker: Option<Waker>,
}

impl SampleObserver for MailboxObserver {
    fn on_sample(&self, sample: Option<Sample>) {
        if self.tx.send(sample).is_err() {
            tracing::trace!("Sample mailbox closed; dropping push");
            return;
        }
        if let Some(wake) = &self.waker {
            wake();
        }
    }
}

/// UI-thread end of the sample channel.
pub struct SampleMailbox {
    rx: mpsc::UnboundedReceiver<Option<Sample>>,
}

impl SampleMailbox {
    /// Takes every push received so far, oldest first, without blocking.
    pub fn drain(&mut self) -> Vec<Option<Sample>> {
        let mut pushes = Vec::new();
        while let Ok(push) = self.rx.try_recv() {
            pushes.push(push);
        }
        pushes
    }
}

/// Creates a connected observer/mailbox pair.
pub fn mailbox(waker: Option<Waker>) -> (Arc<MailboxObserver>, SampleMailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(MailboxObserver { tx, waker }), SampleMailbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn sample(secs: u64) -> Sample {
        Sample {
            time: Duration::from_secs(secs),
            voltage: 1.0,
            current: 0.1,
            set_voltage: 1.0,
            set_current: 1.0,
            is_on: false,
        }
    }

    #[test]
    fn mailbox_preserves_order_and_wakes() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let (observer, mut mailbox) = mailbox(Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        observer.on_sample(None);
        observer.on_sample(Some(sample(1)));
        observer.on_sample(Some(sample(2)));

        let pushes = mailbox.drain();
        assert_eq!(pushes.len(), 3);
        assert!(pushes[0].is_none());
        assert_eq!(pushes[2].map(|s| s.time), Some(Duration::from_secs(2)));
        assert_eq!(wakes.load(Ordering::SeqCst), 3);
        assert!(mailbox.drain().is_empty());
    }

    #[test]
    fn push_after_mailbox_dropped_is_ignored() {
        let (observer, mailbox) = mailbox(None);
        drop(mailbox);
        observer.on_sample(Some(sample(1)));
    }
}
