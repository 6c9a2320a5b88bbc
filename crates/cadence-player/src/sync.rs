//! Delivery of engine signals into the controller.

use cadence_engine::{EngineAdapter, EngineSignal};
use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{debug, warn};

use crate::controller::PlaybackController;

/// Republishes engine signals to a [`PlaybackController`].
///
/// Holds one subscription to the engine's signal stream. `pump` drains
/// whatever has arrived and hands it to the controller on the caller's
/// thread, so the controller never sees a signal concurrently with a command.
#[derive(Default)]
pub struct Synchronizer {
    signals: Option<Receiver<EngineSignal>>,
}

impl Synchronizer {
    pub const fn new() -> Self {
        Self { signals: None }
    }

    /// Subscribe to the engine currently attached to `controller`.
    pub fn for_controller<E: EngineAdapter>(controller: &PlaybackController<E>) -> Self {
        let mut sync = Self::new();
        sync.rebind(controller);
        sync
    }

    /// Subscribe to `engine`, dropping any previous subscription.
    pub fn bind<E: EngineAdapter>(&mut self, engine: &E) {
        self.signals = Some(engine.subscribe());
        debug!("Synchronizer bound to engine");
    }

    /// Follow an engine swap on `controller`.
    pub fn rebind<E: EngineAdapter>(&mut self, controller: &PlaybackController<E>) {
        match controller.engine() {
            Some(engine) => self.bind(engine),
            None => self.unbind(),
        }
    }

    /// Drop the subscription. Later signals are never delivered.
    pub fn unbind(&mut self) {
        if self.signals.take().is_some() {
            debug!("Synchronizer unbound");
        }
    }

    pub const fn is_bound(&self) -> bool {
        self.signals.is_some()
    }

    /// Deliver every signal received so far. Returns how many were delivered.
    pub fn pump<E: EngineAdapter>(&mut self, controller: &mut PlaybackController<E>) -> usize {
        let Some(signals) = self.signals.as_ref() else {
            return 0;
        };

        let mut delivered = 0;
        let mut closed = false;
        loop {
            match signals.try_recv() {
                Ok(signal) => {
                    controller.handle_signal(signal);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        if closed {
            warn!("Engine signal stream closed");
            self.signals = None;
        }
        delivered
    }
}
