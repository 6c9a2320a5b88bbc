//! Fan-out delivery of engine signals.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::trace;

use crate::adapter::EngineSignal;

/// Broadcasts engine signals to every live subscriber.
///
/// Each subscriber gets its own unbounded channel. Subscribers whose receiver
/// was dropped are pruned on the next emit.
#[derive(Clone, Default)]
pub struct SignalHub {
    subscribers: Arc<Mutex<Vec<Sender<EngineSignal>>>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription.
    pub fn subscribe(&self) -> Receiver<EngineSignal> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver a signal to all subscribers.
    pub fn emit(&self, signal: EngineSignal) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(signal.clone()).is_ok());
        trace!("Emitted {:?} to {} subscribers", signal, subscribers.len());
    }

    /// Number of live subscribers as of the last emit.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
